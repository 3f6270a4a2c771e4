//! 图片数据
//!
//! 原始字节 + MIME 类型，可与 data URL 互相转换

use base64::{engine::general_purpose, Engine};
use regex::Regex;
use std::io::Cursor;
use std::sync::OnceLock;

use crate::error::{ApiError, AppError, AppResult};

/// 图片数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    mime_type: String,
}

fn data_url_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^data:(image/(?:png|jpeg|jpg|webp));base64,").expect("valid data url regex")
    })
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// 从 base64 字符串解码（可带 data URL 前缀）
    ///
    /// 没有前缀时使用 `default_mime`
    pub fn from_base64(encoded: &str, default_mime: &str) -> AppResult<Self> {
        let (mime, data) = match data_url_prefix().captures(encoded) {
            Some(caps) => {
                let prefix_len = caps.get(0).map(|m| m.end()).unwrap_or(0);
                let mime = caps
                    .get(1)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| default_mime.to_string());
                (mime, &encoded[prefix_len..])
            }
            None => (default_mime.to_string(), encoded),
        };

        let bytes = general_purpose::STANDARD.decode(data.trim()).map_err(|e| {
            AppError::Api(ApiError::InvalidImageData {
                source: Box::new(e),
            })
        })?;

        Ok(Self::new(bytes, mime))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 不带前缀的 base64 编码
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// 读取图片宽高（只解析文件头）
    pub fn dimensions(&self) -> AppResult<(u32, u32)> {
        image::ImageReader::new(Cursor::new(&self.bytes))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| {
                AppError::Api(ApiError::InvalidImageData {
                    source: Box::new(e),
                })
            })
    }
}
