//! 处理上下文
//!
//! 封装"本次处理用什么档位、每张多少积分、正在处理第几张"这些信息

use std::fmt::Display;

use crate::models::{ItemId, UpscaleMode, UpscaleResolution};

/// 一次处理的固定参数
///
/// 在开始时确定，处理期间不变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunCtx {
    pub resolution: UpscaleResolution,
    pub mode: UpscaleMode,
    /// 每张图片的积分，开始时按档位确定
    pub cost: u64,
    /// 本次选中的条目数
    pub total: usize,
}

impl RunCtx {
    pub fn new(resolution: UpscaleResolution, mode: UpscaleMode, total: usize) -> Self {
        Self {
            resolution,
            mode,
            cost: resolution.cost(),
            total,
        }
    }

    /// 本次处理所需的全部积分
    pub fn required_credits(&self) -> u64 {
        self.cost.saturating_mul(self.total as u64)
    }

    pub fn item(&self, index: usize, id: ItemId, file_name: impl Into<String>) -> ItemCtx {
        ItemCtx {
            index,
            total: self.total,
            id,
            file_name: file_name.into(),
        }
    }
}

/// 单个条目的上下文（用于日志）
#[derive(Debug, Clone)]
pub struct ItemCtx {
    /// 从 1 开始
    pub index: usize,
    pub total: usize,
    pub id: ItemId,
    pub file_name: String,
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[图片 {}/{} #{} {}]",
            self.index, self.total, self.id, self.file_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_credits() {
        let ctx = RunCtx::new(UpscaleResolution::Res4K, UpscaleMode::Standard, 3);
        assert_eq!(ctx.cost, 4);
        assert_eq!(ctx.required_credits(), 12);
    }

    #[test]
    fn test_item_ctx_display() {
        let ctx = RunCtx::new(UpscaleResolution::Res2K, UpscaleMode::Anime, 5);
        let item = ctx.item(2, ItemId::new(), "cat.png");
        let text = item.to_string();
        assert!(text.starts_with("[图片 2/5 #"));
        assert!(text.ends_with(" cat.png]"));
    }
}
