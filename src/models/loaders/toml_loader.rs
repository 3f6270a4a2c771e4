use crate::error::{AppError, AppResult, FileError};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载数据并反序列化为指定类型
pub async fn load_toml<T: DeserializeOwned>(toml_file_path: &Path) -> AppResult<T> {
    if !toml_file_path.exists() {
        return Err(FileError::NotFound {
            path: toml_file_path.display().to_string(),
        }
        .into());
    }

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(toml_file_path.display().to_string(), e))?;

    let value: T = toml::from_str(&content).map_err(|e| FileError::TomlParseFailed {
        path: toml_file_path.display().to_string(),
        source: Box::new(e),
    })?;

    tracing::debug!("已加载 TOML 文件: {}", toml_file_path.display());

    Ok(value)
}
