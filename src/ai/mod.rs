//! AI service integration for post text and image generation
//!
//! Both steps are delegated to a hosted generative model. The traits here are
//! the seam the studio flow depends on; Gemini implementations live in
//! [`gemini`] and in-memory doubles in [`mock`].

pub mod gemini;
pub mod mock;

pub use gemini::{GeminiImageClient, GeminiTextClient};
pub use mock::{MockImageClient, MockTextClient};

use crate::models::{AspectRatio, GenerationConfig};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Fallback post body used when the model omits `postContent`.
pub const CONTENT_FALLBACK: &str = "Failed to generate content.";

/// Output of the text step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostText {
    pub content: String,
    /// Suggested prompt for the image step; may be empty.
    pub image_prompt: String,
}

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Write a post for `config`.
    ///
    /// Fails with [`crate::Error::TextGeneration`] on transport or parse
    /// failures. A successful result never has empty `content`.
    async fn generate_text(&self, config: &GenerationConfig) -> Result<PostText>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Render an image and return it as a `data:` URI.
    ///
    /// `None` means no image was produced. That is a normal, retryable outcome.
    async fn generate_image(&self, image_prompt: &str, aspect_ratio: AspectRatio)
        -> Option<String>;
}
