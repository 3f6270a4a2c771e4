use crate::error::{AppError, AppResult, FileError};
use crate::models::payload::ImagePayload;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 读入的图片文件
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub file_name: String,
    pub payload: ImagePayload,
}

/// 被拒绝的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub file_name: String,
    pub reason: String,
}

/// 一次导入的结果
#[derive(Debug, Default)]
pub struct IngestReport {
    pub accepted: Vec<LoadedImage>,
    pub rejected: Vec<RejectedFile>,
}

/// 判断图片格式并返回 MIME 类型
///
/// 优先按文件内容识别，识别不了再看扩展名
pub fn detect_image_mime(path: &Path, bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_path(path).ok())
        .map(|format| format.to_mime_type())
        .filter(|mime| mime.starts_with("image/"))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// 读取单个图片文件
///
/// 非图片文件返回 `FileError::NotAnImage`，不会进入队列
pub async fn load_image(path: &Path) -> AppResult<LoadedImage> {
    if !path.exists() {
        return Err(FileError::NotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let bytes = fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let mime = detect_image_mime(path, &bytes).ok_or_else(|| FileError::NotAnImage {
        path: path.display().to_string(),
    })?;

    Ok(LoadedImage {
        file_name: display_name(path),
        payload: ImagePayload::new(bytes, mime),
    })
}

/// 批量读取多个文件，保持传入顺序
///
/// 读取失败或不是图片的文件记录在 `rejected` 中并打印警告
pub async fn load_images(paths: &[PathBuf]) -> IngestReport {
    let mut report = IngestReport::default();

    for path in paths {
        match load_image(path).await {
            Ok(image) => {
                tracing::debug!("已读取图片: {} ({} bytes)", image.file_name, image.payload.len());
                report.accepted.push(image);
            }
            Err(e) => {
                tracing::warn!("跳过文件 {}: {}", path.display(), e);
                report.rejected.push(RejectedFile {
                    file_name: display_name(path),
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}

/// 从文件夹中读取所有图片，按文件名排序
pub async fn load_image_folder(folder_path: &str) -> AppResult<IngestReport> {
    let folder = PathBuf::from(folder_path);

    if !folder.is_dir() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    tracing::info!("在 {} 中找到 {} 个文件", folder_path, paths.len());

    Ok(load_images(&paths).await)
}
