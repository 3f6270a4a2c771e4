/// Gemini API 客户端
///
/// 封装 generateContent 接口的 HTTP 调用
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::clients::credentials::CredentialStore;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};

// ========== 请求 / 响应结构 ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// base64 编码的数据
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    /// "1K" / "2K" / "4K"
    pub image_size: String,
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// 第一个候选结果中的第一张图片
    pub fn first_inline_image(&self) -> Option<&InlineData> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| part.inline_data.as_ref())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// 从错误响应体中取出错误信息，不是 JSON 时返回原文
fn error_message_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.message)
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
}

// ========== 客户端 ==========

/// Gemini 客户端
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model_name: String,
    credentials: CredentialStore,
}

impl GeminiClient {
    /// 创建新的 Gemini 客户端
    pub fn new(config: &Config, credentials: CredentialStore) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed("reqwest::Client", e))?;

        Ok(Self {
            http,
            base_url: config.gemini_api_base_url.trim_end_matches('/').to_string(),
            model_name: config.model_name.clone(),
            credentials,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model_name)
    }

    /// 调用 generateContent
    ///
    /// # 返回
    /// 成功时返回解析后的响应；非 2xx 状态码返回 `ApiError::BadResponse`
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> AppResult<GenerateContentResponse> {
        let endpoint = self.endpoint();
        let api_key = self
            .credentials
            .get()
            .await
            .ok_or(ApiError::MissingCredential)?;

        debug!("调用 Gemini API，模型: {}", self.model_name);

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.clone(), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.clone(), e))?;

        if !status.is_success() {
            let message = error_message_from_body(&body);
            warn!("Gemini API 返回错误: status={} message={:?}", status, message);
            return Err(ApiError::BadResponse {
                endpoint,
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        debug!("Gemini API 调用成功，候选数: {}", parsed.candidates.len());

        Ok(parsed)
    }
}
