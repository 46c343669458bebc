use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, Part};
use crate::ai::{PostText, TextGenerationService, CONTENT_FALLBACK};
use crate::models::GenerationConfig;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct TextRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: TextGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextGenerationConfig {
    response_mime_type: String,
    response_schema: ResponseSchema,
}

/// Subset of the OpenAPI schema object Gemini accepts for structured output.
#[derive(Debug, Serialize)]
struct ResponseSchema {
    #[serde(rename = "type")]
    schema_type: &'static str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<&'static str, ResponseSchema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    required: Vec<&'static str>,
}

impl ResponseSchema {
    fn string() -> Self {
        Self {
            schema_type: "STRING",
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    /// `{ postContent: STRING, imagePrompt: STRING }`, both required.
    fn post() -> Self {
        let mut properties = BTreeMap::new();
        properties.insert("postContent", Self::string());
        properties.insert("imagePrompt", Self::string());

        Self {
            schema_type: "OBJECT",
            properties,
            required: vec!["postContent", "imagePrompt"],
        }
    }
}

/// Structured payload as emitted by the model. Fields are optional here so a
/// partial payload degrades to the fallbacks instead of failing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuredPost {
    #[serde(default)]
    post_content: Option<String>,
    #[serde(default)]
    image_prompt: Option<String>,
}

impl From<StructuredPost> for PostText {
    fn from(raw: StructuredPost) -> Self {
        let content = raw
            .post_content
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| CONTENT_FALLBACK.to_string());

        PostText {
            content,
            image_prompt: raw.image_prompt.unwrap_or_default(),
        }
    }
}

pub struct GeminiTextClient {
    http: GeminiHttpClient,
}

impl GeminiTextClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(30),
                client,
            ),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    /// Concatenated text parts of the first candidate; the structured payload
    /// may be split across several parts.
    fn extract_text(response: &GenerateContentResponse) -> Option<String> {
        let texts: Vec<&str> = response
            .first_parts()
            .iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect();

        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    async fn request_post(&self, config: &GenerationConfig) -> Result<PostText> {
        let request = TextRequest {
            contents: vec![Content::user_text(prompts::post_text(config))],
            generation_config: TextGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: ResponseSchema::post(),
            },
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let text = Self::extract_text(&response)
            .ok_or_else(|| Error::AiProvider("No text in Gemini response".to_string()))?;

        let raw: StructuredPost = serde_json::from_str(&text)?;
        Ok(raw.into())
    }
}

#[async_trait]
impl TextGenerationService for GeminiTextClient {
    async fn generate_text(&self, config: &GenerationConfig) -> Result<PostText> {
        tracing::info!(
            "Generating {} {} post for {} (model: {})",
            config.length,
            config.tone,
            config.platform,
            self.http.model()
        );

        self.request_post(config).await.map_err(|e| {
            tracing::error!("Error generating post text: {}", e);
            Error::TextGeneration(Box::new(e))
        })
    }
}
