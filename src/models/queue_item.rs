use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::payload::ImagePayload;

/// 失败描述为空时使用的默认文本
pub const DEFAULT_ERROR_MESSAGE: &str = "Failed";

/// 处理中途被丢弃（超时、任务取消）时记录的失败信息
pub const INTERRUPTED_MESSAGE: &str = "处理被中断";

/// 队列条目 ID，入队时生成，生命周期内不变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 日志里只显示前 8 位
        let s = self.0.simple().to_string();
        f.write_str(&s[..8])
    }
}

/// 条目状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Processing => "processing",
            ItemStatus::Completed => "completed",
            ItemStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// 条目状态及其附带数据
///
/// 结果只存在于 `Completed`，错误描述只存在于 `Error`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemState {
    Pending,
    Processing,
    Completed { result: ImagePayload },
    Error { message: String },
}

impl ItemState {
    pub fn status(&self) -> ItemStatus {
        match self {
            ItemState::Pending => ItemStatus::Pending,
            ItemState::Processing => ItemStatus::Processing,
            ItemState::Completed { .. } => ItemStatus::Completed,
            ItemState::Error { .. } => ItemStatus::Error,
        }
    }
}

/// 队列条目
#[derive(Debug, Clone)]
pub struct QueueItem {
    id: ItemId,
    file_name: String,
    source: Arc<ImagePayload>,
    state: ItemState,
}

impl QueueItem {
    pub(crate) fn new(file_name: impl Into<String>, source: ImagePayload) -> Self {
        Self {
            id: ItemId::new(),
            file_name: file_name.into(),
            source: Arc::new(source),
            state: ItemState::Pending,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn source(&self) -> &ImagePayload {
        &self.source
    }

    /// 共享原图引用，处理期间不必复制图片数据
    pub fn source_handle(&self) -> Arc<ImagePayload> {
        Arc::clone(&self.source)
    }

    pub fn state(&self) -> &ItemState {
        &self.state
    }

    pub fn status(&self) -> ItemStatus {
        self.state.status()
    }

    pub fn result(&self) -> Option<&ImagePayload> {
        match &self.state {
            ItemState::Completed { result } => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            ItemState::Error { message } => Some(message),
            _ => None,
        }
    }

    /// 下载文件名：`upscaled-<原文件名>`
    pub fn download_name(&self) -> String {
        format!("upscaled-{}", self.file_name)
    }

    // ========== 状态迁移 ==========
    // 只允许从合法的前驱状态迁移，返回是否生效

    pub(crate) fn mark_processing(&mut self) -> bool {
        if self.state != ItemState::Pending {
            return false;
        }
        self.state = ItemState::Processing;
        true
    }

    pub(crate) fn mark_completed(&mut self, result: ImagePayload) -> bool {
        if self.state != ItemState::Processing {
            return false;
        }
        self.state = ItemState::Completed { result };
        true
    }

    pub(crate) fn mark_failed(&mut self, message: impl Into<String>) -> bool {
        if self.state != ItemState::Processing {
            return false;
        }
        let message = message.into();
        let message = if message.trim().is_empty() {
            DEFAULT_ERROR_MESSAGE.to_string()
        } else {
            message
        };
        self.state = ItemState::Error { message };
        true
    }
}
