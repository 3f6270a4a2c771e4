use serde::Deserialize;
use std::path::Path;

use crate::error::AppResult;
use crate::models::{load_toml, UpscaleMode, UpscaleResolution};

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- Gemini API 配置 ---
    /// API Key，为空表示尚未配置
    pub gemini_api_key: String,
    pub gemini_api_base_url: String,
    pub model_name: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    // --- 队列配置 ---
    /// 待处理图片所在目录
    pub input_folder: String,
    /// 放大结果的输出目录
    pub output_folder: String,
    /// 启动时赠送的积分
    pub starting_credits: u64,
    /// 启动时购买的积分套餐 ID（可选）
    pub purchase_package: Option<String>,
    pub resolution: UpscaleResolution,
    pub mode: UpscaleMode,
    // --- 日志配置 ---
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model_name: "gemini-3-pro-image-preview".to_string(),
            request_timeout_secs: 300,
            input_folder: "input_images".to_string(),
            output_folder: "upscaled".to_string(),
            starting_credits: 0,
            purchase_package: None,
            resolution: UpscaleResolution::Res4K,
            mode: UpscaleMode::Standard,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    /// 先读 `UPSCALER_CONFIG` 指向的 TOML 文件（如果有），再用环境变量覆盖
    pub async fn load() -> AppResult<Self> {
        let base = match std::env::var("UPSCALER_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path)).await?,
            Err(_) => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    pub async fn from_toml_file(path: &Path) -> AppResult<Self> {
        load_toml(path).await
    }

    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 用环境变量覆盖已有配置，未设置或解析失败的字段保持原值
    pub fn with_env_overrides(self) -> Self {
        let current = self;
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .unwrap_or(current.gemini_api_key),
            gemini_api_base_url: std::env::var("GEMINI_API_BASE_URL").unwrap_or(current.gemini_api_base_url),
            model_name: std::env::var("MODEL_NAME").unwrap_or(current.model_name),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(current.request_timeout_secs),
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(current.input_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(current.output_folder),
            starting_credits: std::env::var("STARTING_CREDITS").ok().and_then(|v| v.parse().ok()).unwrap_or(current.starting_credits),
            purchase_package: std::env::var("PURCHASE_PACKAGE").ok().or(current.purchase_package),
            resolution: std::env::var("UPSCALE_RESOLUTION").ok().and_then(|v| v.parse().ok()).unwrap_or(current.resolution),
            mode: std::env::var("UPSCALE_MODE").ok().and_then(|v| v.parse().ok()).unwrap_or(current.mode),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(current.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(current.output_log_file),
        }
    }
}
