//! 图片放大服务 - 业务能力层
//!
//! 只负责"放大一张图片"能力，不关心队列和积分
//!
//! ## 技术栈
//! - 通过 `GeminiClient`（reqwest）调用 generateContent 接口
//! - 使用 `image` crate 读取原图尺寸，选择最接近的宽高比

use async_trait::async_trait;
use tracing::{debug, error};

use crate::clients::gemini_client::{
    Content, GenerateContentRequest, GenerationConfig, ImageConfig, Part,
};
use crate::clients::GeminiClient;
use crate::error::{ApiError, AppResult};
use crate::models::{ImagePayload, UpscaleMode, UpscaleResolution};

/// 放大能力
///
/// 处理流程只依赖这个接口，测试中可以替换为假实现
#[async_trait]
pub trait Upscaler: Send + Sync {
    async fn upscale(
        &self,
        source: &ImagePayload,
        resolution: UpscaleResolution,
        mode: UpscaleMode,
    ) -> AppResult<ImagePayload>;
}

/// 模型支持的宽高比
const SUPPORTED_ASPECT_RATIOS: [(&str, f64); 5] = [
    ("1:1", 1.0),
    ("3:4", 3.0 / 4.0),
    ("4:3", 4.0 / 3.0),
    ("9:16", 9.0 / 16.0),
    ("16:9", 16.0 / 9.0),
];

/// 选择与原图最接近的宽高比，避免输出被裁剪
///
/// 距离相同时取列表中靠前的一个
pub fn closest_aspect_ratio(width: u32, height: u32) -> &'static str {
    if height == 0 {
        return SUPPORTED_ASPECT_RATIOS[0].0;
    }
    let ratio = width as f64 / height as f64;

    SUPPORTED_ASPECT_RATIOS
        .iter()
        .fold(SUPPORTED_ASPECT_RATIOS[0], |best, &candidate| {
            if (candidate.1 - ratio).abs() < (best.1 - ratio).abs() {
                candidate
            } else {
                best
            }
        })
        .0
}

/// 构建放大提示词
pub fn build_upscale_prompt(
    resolution: UpscaleResolution,
    mode: UpscaleMode,
    aspect_ratio: &str,
    width: u32,
    height: u32,
) -> String {
    let pixel_target = resolution.pixel_target();
    format!(
        "Upscale this image to {detail} resolution ({pixel_target}).

CRITICAL INSTRUCTIONS TO PREVENT CROPPING AND ZOOMING:
1. PRESERVE THE EXACT COMPOSITION AND FIELD OF VIEW of the original image.
2. DO NOT CROP any part of the image.
3. DO NOT ZOOM IN. The borders of the output must match the borders of the input.
4. If the requested aspect ratio ({aspect_ratio}) differs slightly from the input ({width}x{height}), you must fit the ENTIRE image content within the frame, adding padding if absolutely necessary, rather than cropping.
5. The goal is a high-fidelity upscale, not a re-composition.

Output Specifications:
- Resolution target: {pixel_target}
- {instruction}
",
        detail = resolution.resolution_detail(),
        instruction = mode.instruction(),
    )
}

/// 基于 Gemini 的放大服务
///
/// 职责：
/// - 计算宽高比、构建提示词
/// - 调用 generateContent 并取出返回的图片
/// - 不修改队列，不扣积分
pub struct GeminiUpscaler {
    client: GeminiClient,
}

impl GeminiUpscaler {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    fn build_request(
        &self,
        source: &ImagePayload,
        resolution: UpscaleResolution,
        mode: UpscaleMode,
    ) -> AppResult<GenerateContentRequest> {
        let (width, height) = source.dimensions()?;
        let aspect_ratio = closest_aspect_ratio(width, height);
        debug!(
            "原图尺寸 {}x{}，宽高比 {}，目标 {}",
            width,
            height,
            aspect_ratio,
            resolution.target_image_size()
        );

        let prompt = build_upscale_prompt(resolution, mode, aspect_ratio, width, height);

        Ok(GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    // 统一按 PNG 提交
                    Part::inline_data("image/png", source.to_base64()),
                    Part::text(prompt),
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: Some(ImageConfig {
                    image_size: resolution.target_image_size().to_string(),
                    aspect_ratio: aspect_ratio.to_string(),
                }),
            }),
        })
    }
}

#[async_trait]
impl Upscaler for GeminiUpscaler {
    async fn upscale(
        &self,
        source: &ImagePayload,
        resolution: UpscaleResolution,
        mode: UpscaleMode,
    ) -> AppResult<ImagePayload> {
        let request = self.build_request(source, resolution, mode)?;

        let response = self.client.generate_content(&request).await.map_err(|e| {
            error!("Upscale error: {}", e);
            e
        })?;

        let inline = response
            .first_inline_image()
            .ok_or_else(|| ApiError::EmptyResponse {
                endpoint: self.client.model_name().to_string(),
            })?;

        ImagePayload::from_base64(&inline.data, &inline.mime_type)
    }
}
