use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, InlineData, Part};
use crate::ai::ImageGenerationService;
use crate::models::AspectRatio;
use crate::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ImageRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: ImageGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageGenerationConfig {
    response_modalities: Vec<String>,
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

/// Format an inline payload as a `data:` URI.
pub fn to_data_uri(inline_data: &InlineData) -> String {
    format!("data:{};base64,{}", inline_data.mime_type, inline_data.data)
}

pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(120),
                client,
            ),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    async fn request_image(
        &self,
        image_prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Option<String>> {
        let request = ImageRequest {
            contents: vec![Content::user_text(image_prompt.to_string())],
            generation_config: ImageGenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: ImageConfig {
                    aspect_ratio: aspect_ratio.api_ratio().to_string(),
                },
            },
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let image = response.first_parts().iter().find_map(|p| match p {
            Part::InlineData { inline_data } if !inline_data.data.is_empty() => Some(inline_data),
            _ => None,
        });

        Ok(image.map(|inline_data| {
            tracing::debug!(
                "Gemini returned image with mime_type: {}",
                inline_data.mime_type
            );
            to_data_uri(inline_data)
        }))
    }
}

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_image(
        &self,
        image_prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Option<String> {
        if aspect_ratio.api_ratio() != aspect_ratio.as_str() {
            tracing::debug!(
                "Requested aspect ratio {} rendered as {}",
                aspect_ratio,
                aspect_ratio.api_ratio()
            );
        }

        match self.request_image(image_prompt, aspect_ratio).await {
            Ok(Some(uri)) => Some(uri),
            Ok(None) => {
                tracing::warn!("No image data in Gemini response");
                None
            }
            Err(e) => {
                tracing::warn!("Error generating image: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use wiremock::matchers::body_string_contains;
    use wiremock::{MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

    fn make_client(server: &MockServer) -> GeminiImageClient {
        GeminiImageClient::new("key".to_string(), DEFAULT_MODEL.to_string())
            .with_base_url(server.uri())
    }

    fn image_response(mime_type: &str, data: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your image" },
                        { "inlineData": { "mimeType": mime_type, "data": data } }
                    ]
                }
            }]
        }))
    }

    #[tokio::test]
    async fn test_generate_image_returns_data_uri() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(image_response("image/png", "iVBORw0KGgo="))
            .mount(&server)
            .await;

        let uri = make_client(&server)
            .generate_image("a dream", AspectRatio::Square)
            .await
            .unwrap();
        assert_eq!(uri, "data:image/png;base64,iVBORw0KGgo=");
    }

    #[tokio::test]
    async fn test_four_five_is_requested_as_three_four() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains("\"aspectRatio\":\"3:4\""))
            .and(body_string_contains("\"responseModalities\":[\"IMAGE\"]"))
            .and(body_string_contains("a rocket launching"))
            .respond_with(image_response("image/jpeg", "/9j/4AAQ"))
            .expect(1)
            .mount(&server)
            .await;

        let uri = make_client(&server)
            .generate_image("a rocket launching", AspectRatio::Portrait4x5)
            .await
            .unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_landscape_ratio_passes_through() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains("\"aspectRatio\":\"16:9\""))
            .respond_with(image_response("image/png", "AAAA"))
            .expect(1)
            .mount(&server)
            .await;

        assert!(make_client(&server)
            .generate_image("a city skyline", AspectRatio::Landscape16x9)
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_text_only_response_is_no_image() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "no image here" }] }
                }]
            })))
            .mount(&server)
            .await;

        let result = make_client(&server)
            .generate_image("a dream", AspectRatio::Square)
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_empty_candidates_is_no_image() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let result = make_client(&server)
            .generate_image("a dream", AspectRatio::Square)
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_api_error_is_no_image() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let result = make_client(&server)
            .generate_image("a dream", AspectRatio::Story9x16)
            .await;
        assert!(result.is_none());
    }
}
