//! 放大档位目录
//!
//! 每个分辨率档位对应固定的积分价格和说明，启动后只读

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 输出分辨率档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UpscaleResolution {
    #[serde(rename = "2K")]
    Res2K,
    #[default]
    #[serde(rename = "4K")]
    Res4K,
    #[serde(rename = "8K")]
    Res8K,
    #[serde(rename = "16K")]
    Res16K,
}

impl UpscaleResolution {
    /// 档位标识（"2K" / "4K" / "8K" / "16K"）
    pub fn as_str(self) -> &'static str {
        match self {
            UpscaleResolution::Res2K => "2K",
            UpscaleResolution::Res4K => "4K",
            UpscaleResolution::Res8K => "8K",
            UpscaleResolution::Res16K => "16K",
        }
    }

    /// 获取该档位的目录条目
    pub fn option(self) -> &'static UpscaleOption {
        option_for(self)
    }

    /// 该档位每张图片消耗的积分
    pub fn cost(self) -> u64 {
        self.option().cost
    }

    /// API 的 imageSize 参数
    ///
    /// 模型最高只能直接生成 4K，8K/16K 依赖提示词补足细节
    pub fn target_image_size(self) -> &'static str {
        match self {
            UpscaleResolution::Res2K => "2K",
            UpscaleResolution::Res4K | UpscaleResolution::Res8K | UpscaleResolution::Res16K => {
                "4K"
            }
        }
    }

    /// 提示词中的分辨率描述
    pub fn resolution_detail(self) -> &'static str {
        match self {
            UpscaleResolution::Res2K => "QHD or 2K",
            UpscaleResolution::Res4K => "UHD or 4K",
            UpscaleResolution::Res8K => "UHD 8K",
            UpscaleResolution::Res16K => "UHD 16K",
        }
    }

    /// 提示词中的像素目标
    pub fn pixel_target(self) -> &'static str {
        match self {
            UpscaleResolution::Res2K => "2560 x 1440 pixels",
            UpscaleResolution::Res4K => "3840 x 2160 pixels",
            UpscaleResolution::Res8K => "7680 × 4320 pixels",
            UpscaleResolution::Res16K => "15360 x 8640 pixels",
        }
    }
}

impl fmt::Display for UpscaleResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpscaleResolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "2K" => Ok(UpscaleResolution::Res2K),
            "4K" => Ok(UpscaleResolution::Res4K),
            "8K" => Ok(UpscaleResolution::Res8K),
            "16K" => Ok(UpscaleResolution::Res16K),
            other => Err(format!("未知的分辨率档位: {}", other)),
        }
    }
}

/// 档位目录条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpscaleOption {
    pub resolution: UpscaleResolution,
    /// 每张图片消耗的积分（正整数）
    pub cost: u64,
    pub label: &'static str,
    pub description: &'static str,
}

pub static UPSCALE_OPTIONS: [UpscaleOption; 4] = [
    UpscaleOption {
        resolution: UpscaleResolution::Res2K,
        cost: 2,
        label: "2K QHD",
        description: "QHD or 2K or 1440p - 2560 x 1440 pixels",
    },
    UpscaleOption {
        resolution: UpscaleResolution::Res4K,
        cost: 4,
        label: "4K UHD",
        description: "UHD or 4K or 2160p - 3840 x 2160 pixels",
    },
    UpscaleOption {
        resolution: UpscaleResolution::Res8K,
        cost: 8,
        label: "8K UHD",
        description: "UHD 8K or 4320p - 7680 × 4320 pixels",
    },
    UpscaleOption {
        resolution: UpscaleResolution::Res16K,
        cost: 12,
        label: "16K UHD",
        description: "UHD 16K or 8640p - 15360 x 8640 pixels",
    },
];

/// 按档位查找目录条目
pub fn option_for(resolution: UpscaleResolution) -> &'static UpscaleOption {
    match resolution {
        UpscaleResolution::Res2K => &UPSCALE_OPTIONS[0],
        UpscaleResolution::Res4K => &UPSCALE_OPTIONS[1],
        UpscaleResolution::Res8K => &UPSCALE_OPTIONS[2],
        UpscaleResolution::Res16K => &UPSCALE_OPTIONS[3],
    }
}
