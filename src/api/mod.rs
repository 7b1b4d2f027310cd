mod types;

use async_trait::async_trait;

pub use types::*;

use crate::config::Config;
use crate::core::prompt::{build_edit_parts, build_generation_prompt, clean_up_prompt, PromptPart};
use crate::core::style::{AspectRatio, StylePreset};
use crate::core::{GenerationBackend, StudioError};
use crate::http_client;
use crate::media::ImageAsset;

/// Client for the hosted image model.
///
/// One request per operation: no retries, no streaming. Failures are terminal
/// for the call and must be re-triggered by the caller.
pub struct StudioClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl StudioClient {
    /// Create a new client from config
    pub fn from_config(config: &Config) -> Result<Self, StudioError> {
        let api_key = config
            .api_key()
            .ok_or(StudioError::MissingApiKey)?
            .to_string();

        Ok(Self {
            client: http_client::build(config.api.timeout_secs),
            api_key,
            base_url: config.api.base_url.clone(),
            model: config.api.model.clone(),
        })
    }

    /// Transform the photo into a styled studio portrait.
    pub async fn generate(
        &self,
        image: &ImageAsset,
        style: &StylePreset,
        aspect_ratio: &AspectRatio,
    ) -> Result<ImageAsset, StudioError> {
        let request = generate_request(image, style, aspect_ratio);
        self.request(&request).await
    }

    /// Enhance the photo without changing its content.
    pub async fn clean_up(&self, image: &ImageAsset) -> Result<ImageAsset, StudioError> {
        let request = clean_up_request(image);
        self.request(&request).await
    }

    /// Apply a text-guided edit, optionally steered by a reference image.
    pub async fn edit(
        &self,
        image: &ImageAsset,
        instruction: &str,
        reference: Option<&ImageAsset>,
    ) -> Result<ImageAsset, StudioError> {
        let request = edit_request(image, instruction, reference);
        self.request(&request).await
    }

    /// Issue one generateContent call and extract the returned image.
    async fn request(&self, request: &GenerateRequest) -> Result<ImageAsset, StudioError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        tracing::debug!("Sending generate request to model {}", self.model);
        if let Ok(body) = serde_json::to_string_pretty(request) {
            tracing::trace!("Request body: {}", body);
        }

        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!("Response status: {}", status);
        tracing::trace!("Response body: {}", body);

        if !status.is_success() {
            return Err(upstream_error(status.as_u16(), &body));
        }

        let response: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| StudioError::InvalidResponse(e.to_string()))?;

        extract_image(response)
    }
}

#[async_trait]
impl GenerationBackend for StudioClient {
    async fn generate(
        &self,
        image: &ImageAsset,
        style: &StylePreset,
        aspect_ratio: &AspectRatio,
    ) -> Result<ImageAsset, StudioError> {
        StudioClient::generate(self, image, style, aspect_ratio).await
    }

    async fn clean_up(&self, image: &ImageAsset) -> Result<ImageAsset, StudioError> {
        StudioClient::clean_up(self, image).await
    }

    async fn edit(
        &self,
        image: &ImageAsset,
        instruction: &str,
        reference: Option<&ImageAsset>,
    ) -> Result<ImageAsset, StudioError> {
        StudioClient::edit(self, image, instruction, reference).await
    }
}

fn inline_part(image: &ImageAsset) -> ContentPart {
    ContentPart::InlineData {
        inline_data: InlineData {
            mime_type: image.mime_type().to_string(),
            data: image.base64().to_string(),
        },
    }
}

fn text_part(text: impl Into<String>) -> ContentPart {
    ContentPart::Text { text: text.into() }
}

fn wire_parts(parts: Vec<PromptPart>) -> Vec<ContentPart> {
    parts
        .into_iter()
        .map(|part| match part {
            PromptPart::Text(text) => text_part(text),
            PromptPart::Image(image) => inline_part(&image),
        })
        .collect()
}

fn request_with_parts(parts: Vec<ContentPart>, image_config: Option<ImageConfig>) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content { parts, role: None }],
        generation_config: Some(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
            image_config,
        }),
    }
}

/// Style-generation payload: image first, then the combined prompt. The
/// aspect-ratio config is attached only to this flow.
fn generate_request(
    image: &ImageAsset,
    style: &StylePreset,
    aspect_ratio: &AspectRatio,
) -> GenerateRequest {
    let parts = vec![inline_part(image), text_part(build_generation_prompt(style))];
    request_with_parts(
        parts,
        Some(ImageConfig {
            aspect_ratio: Some(aspect_ratio.value.to_string()),
        }),
    )
}

/// Clean-up payload: image first, then the fixed enhancement instruction.
fn clean_up_request(image: &ImageAsset) -> GenerateRequest {
    let parts = vec![inline_part(image), text_part(clean_up_prompt())];
    request_with_parts(parts, None)
}

/// Edit payload: the prompt builder fixes the part order.
fn edit_request(
    image: &ImageAsset,
    instruction: &str,
    reference: Option<&ImageAsset>,
) -> GenerateRequest {
    let parts = wire_parts(build_edit_parts(image, instruction, reference));
    request_with_parts(parts, None)
}

/// Map a non-2xx response to an upstream failure, forwarding the service's
/// message verbatim when the body carries one.
fn upstream_error(status: u16, body: &str) -> StudioError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body.to_string()
            }
        });
    StudioError::Upstream {
        message,
        source: None,
    }
}

/// Scan the response for the returned image: first candidate, first part
/// carrying inline data. A response without one means the model declined,
/// which is surfaced distinctly from transport failures.
fn extract_image(response: GenerateResponse) -> Result<ImageAsset, StudioError> {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            let detail = feedback
                .block_reason_message
                .clone()
                .unwrap_or_else(|| reason.clone());
            return Err(StudioError::NoImageReturned(Some(detail)));
        }
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(StudioError::NoImageReturned(None));
    };

    if let Some(reason) = &candidate.finish_reason {
        if reason != "STOP" && reason != "MAX_TOKENS" {
            let detail = candidate
                .finish_message
                .clone()
                .unwrap_or_else(|| reason.clone());
            tracing::warn!("Generation refused: {} - {}", reason, detail);
            return Err(StudioError::NoImageReturned(Some(detail)));
        }
    }

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

    let mut image = None;
    for part in parts {
        match part {
            ContentPart::InlineData { inline_data } => {
                if image.is_none() {
                    image = Some(inline_data);
                } else {
                    // Contract: only the first image part is consumed.
                    tracing::debug!("Ignoring extra image part in response");
                }
            }
            ContentPart::Text { text } => {
                tracing::debug!("Response text: {}", text);
            }
        }
    }

    match image {
        Some(inline_data) => ImageAsset::from_base64(&inline_data.data, inline_data.mime_type),
        None => Err(StudioError::NoImageReturned(None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::prompt::{BASE_PROMPT, STYLE_DELIMITER};
    use crate::core::style::{aspect_ratio_by_id, style_by_id};

    fn asset(byte: u8) -> ImageAsset {
        ImageAsset::new(vec![byte], "image/png")
    }

    fn text_of(part: &ContentPart) -> &str {
        match part {
            ContentPart::Text { text } => text,
            ContentPart::InlineData { .. } => panic!("expected text part"),
        }
    }

    #[test]
    fn generate_request_carries_image_then_full_prompt() {
        let style = style_by_id("monochrome").unwrap();
        let ratio = aspect_ratio_by_id("widescreen").unwrap();
        let request = generate_request(&asset(1), &style, &ratio);

        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 2);
        assert!(matches!(&parts[0], ContentPart::InlineData { .. }));

        let prompt = text_of(&parts[1]);
        assert_eq!(prompt, build_generation_prompt(&style));
        assert!(prompt.starts_with(BASE_PROMPT));
        assert!(prompt.contains(STYLE_DELIMITER));
        assert!(prompt.ends_with(style.prompt_suffix));

        let config = request.generation_config.as_ref().unwrap();
        let modalities = config.response_modalities.as_ref().unwrap();
        assert!(modalities.contains(&"IMAGE".to_string()));
        assert!(modalities.contains(&"TEXT".to_string()));
        assert_eq!(
            config.image_config.as_ref().unwrap().aspect_ratio.as_deref(),
            Some("16:9")
        );
    }

    #[test]
    fn clean_up_request_has_no_aspect_ratio_config() {
        let request = clean_up_request(&asset(1));

        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 2);
        assert_eq!(text_of(&parts[1]), clean_up_prompt());
        assert!(request
            .generation_config
            .as_ref()
            .unwrap()
            .image_config
            .is_none());
    }

    #[test]
    fn clean_up_request_is_byte_identical_across_calls() {
        let image = asset(1);
        let first = serde_json::to_string(&clean_up_request(&image)).unwrap();
        let second = serde_json::to_string(&clean_up_request(&image)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn edit_request_orders_parts_with_reference() {
        let target = asset(1);
        let reference = asset(2);
        let request = edit_request(&target, "swap the backdrop", Some(&reference));

        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 5);
        assert!(matches!(&parts[0], ContentPart::Text { .. }));
        assert!(matches!(&parts[1], ContentPart::InlineData { .. }));
        assert!(matches!(&parts[2], ContentPart::Text { .. }));
        assert!(matches!(&parts[3], ContentPart::InlineData { .. }));
        assert_eq!(
            text_of(&parts[4]),
            "My instruction is: \"swap the backdrop\""
        );
        assert!(request
            .generation_config
            .as_ref()
            .unwrap()
            .image_config
            .is_none());
    }

    #[test]
    fn edit_request_without_reference_has_three_parts() {
        let request = edit_request(&asset(1), "brighten the eyes", None);
        assert_eq!(request.contents[0].parts.len(), 3);
    }

    #[test]
    fn extract_takes_first_image_part_of_first_candidate() {
        let json = r#"{
            "candidates": [
                { "content": { "parts": [
                    { "text": "Sure." },
                    { "inlineData": { "mimeType": "image/png", "data": "AQID" } },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "BAUG" } }
                ] }, "finishReason": "STOP" },
                { "content": { "parts": [
                    { "inlineData": { "mimeType": "image/webp", "data": "Bwg=" } }
                ] } }
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        let image = extract_image(response).unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn extract_without_image_is_a_distinct_failure() {
        let json = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "I cannot edit this photo." } ] } }
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        let err = extract_image(response).unwrap_err();
        assert!(matches!(err, StudioError::NoImageReturned(None)));
    }

    #[test]
    fn extract_surfaces_blocked_prompt_detail() {
        let json = r#"{
            "candidates": [],
            "promptFeedback": { "blockReason": "SAFETY", "blockReasonMessage": "Blocked for safety" }
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        let err = extract_image(response).unwrap_err();
        assert!(matches!(
            err,
            StudioError::NoImageReturned(Some(ref d)) if d == "Blocked for safety"
        ));
    }

    #[test]
    fn extract_surfaces_refusal_finish_reason() {
        let json = r#"{
            "candidates": [ { "finishReason": "IMAGE_SAFETY" } ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        let err = extract_image(response).unwrap_err();
        assert!(matches!(
            err,
            StudioError::NoImageReturned(Some(ref d)) if d == "IMAGE_SAFETY"
        ));
    }

    #[test]
    fn upstream_error_forwards_service_message() {
        let body = r#"{ "error": { "code": 429, "message": "Resource exhausted", "status": "RESOURCE_EXHAUSTED" } }"#;
        let err = upstream_error(429, body);
        assert!(matches!(
            err,
            StudioError::Upstream { ref message, .. } if message == "Resource exhausted"
        ));
    }

    #[test]
    fn upstream_error_falls_back_to_status() {
        let err = upstream_error(502, "");
        assert!(matches!(
            err,
            StudioError::Upstream { ref message, .. } if message == "HTTP 502"
        ));
    }
}
