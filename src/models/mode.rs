/// 增强模式
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpscaleMode {
    /// 标准
    #[default]
    Standard,
    /// 降噪 / 锐化
    Denoise,
    /// 人像
    Portrait,
    /// 夜景 / 弱光
    Night,
    /// 动漫 / 卡通
    Anime,
}

static MODES_BY_NAME: phf::Map<&'static str, UpscaleMode> = phf_map! {
    "standard" => UpscaleMode::Standard,
    "denoise" => UpscaleMode::Denoise,
    "portrait" => UpscaleMode::Portrait,
    "night" => UpscaleMode::Night,
    "anime" => UpscaleMode::Anime,
};

impl UpscaleMode {
    pub const ALL: [UpscaleMode; 5] = [
        UpscaleMode::Standard,
        UpscaleMode::Denoise,
        UpscaleMode::Portrait,
        UpscaleMode::Night,
        UpscaleMode::Anime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UpscaleMode::Standard => "standard",
            UpscaleMode::Denoise => "denoise",
            UpscaleMode::Portrait => "portrait",
            UpscaleMode::Night => "night",
            UpscaleMode::Anime => "anime",
        }
    }

    /// 显示名称
    pub fn label(self) -> &'static str {
        match self {
            UpscaleMode::Standard => "Standard",
            UpscaleMode::Denoise => "Denoise / Sharpen",
            UpscaleMode::Portrait => "Portrait",
            UpscaleMode::Night => "Night / Low Light",
            UpscaleMode::Anime => "Anime / Cartoon",
        }
    }

    /// 追加到提示词中的模式说明
    pub fn instruction(self) -> &'static str {
        match self {
            UpscaleMode::Standard => "Style: Photorealistic, high definition, sharp details.",
            UpscaleMode::Denoise => "Focus on noise reduction, removing grain, and sharpening edges while maintaining natural textures.",
            UpscaleMode::Portrait => "Focus on facial enhancement, realistic skin texture, clear eyes, and natural lighting correction for portraits.",
            UpscaleMode::Night => "Focus on low-light enhancement, noise reduction in shadows, and dynamic range improvement for night scenes.",
            UpscaleMode::Anime => "Focus on anime/cartoon style preservation, sharp line art, vibrant colors, and 2D rendering aesthetics.",
        }
    }
}

impl fmt::Display for UpscaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpscaleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MODES_BY_NAME
            .get(s.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| format!("未知的增强模式: {}", s))
    }
}
