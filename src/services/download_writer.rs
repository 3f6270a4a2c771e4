//! 下载写入服务 - 业务能力层
//!
//! 只负责把已完成条目的结果写到输出目录，不关心流程

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, QueueError};
use crate::models::{ItemStatus, QueueItem};
use crate::queue::BatchQueue;

/// 下载写入服务
///
/// 文件名固定为 `upscaled-<原文件名>`
pub struct DownloadWriter {
    output_dir: PathBuf,
}

impl DownloadWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 写出单个已完成条目
    ///
    /// # 返回
    /// 返回写入的文件路径
    pub async fn download(&self, item: &QueueItem) -> AppResult<PathBuf> {
        let result = item.result().ok_or(QueueError::NotCompleted(item.id()))?;

        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::file_write_failed(self.output_dir.display().to_string(), e))?;

        let path = self.output_dir.join(item.download_name());
        fs::write(&path, result.bytes())
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        debug!("写出结果: {} ({} bytes)", path.display(), result.len());

        Ok(path)
    }

    /// 按队列顺序写出所有已完成条目
    pub async fn download_all(&self, queue: &BatchQueue) -> AppResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        for item in queue.items_with_status(ItemStatus::Completed) {
            written.push(self.download(item).await?);
        }
        if !written.is_empty() {
            info!("💾 已保存 {} 个结果到 {}", written.len(), self.output_dir.display());
        }
        Ok(written)
    }
}
