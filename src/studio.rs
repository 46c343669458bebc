//! Composition root tying the session store to the generation services.

use crate::ai::{
    GeminiImageClient, GeminiTextClient, ImageGenerationService, TextGenerationService,
};
use crate::models::{Config, GeneratedPost, GenerationConfig, GenerationStatus};
use crate::store::{ConfigField, StudioStore};
use crate::Result;
use tracing::{error, info, warn};

/// Drives the submit → text → image flow over a [`StudioStore`].
pub struct Studio {
    text: Box<dyn TextGenerationService>,
    image: Box<dyn ImageGenerationService>,
    store: StudioStore,
}

/// Injectable service bundle used to construct [`Studio`] in tests/harnesses.
pub struct StudioServices {
    pub text: Box<dyn TextGenerationService>,
    pub image: Box<dyn ImageGenerationService>,
}

impl Studio {
    pub fn with_services(services: StudioServices) -> Self {
        Self {
            text: services.text,
            image: services.image,
            store: StudioStore::new(),
        }
    }

    /// Build a studio backed by Gemini from environment configuration.
    pub fn from_config(config: &Config) -> Self {
        // Reuse one HTTP connection pool across both clients.
        let http_client = reqwest::Client::new();

        info!("Text model: {}", config.text_model);
        info!("Image model: {}", config.image_model);

        let text = GeminiTextClient::new_with_client(
            config.gemini_api_key.clone(),
            config.text_model.clone(),
            http_client.clone(),
        )
        .with_base_url(config.gemini_base_url.clone());

        let image = GeminiImageClient::new_with_client(
            config.gemini_api_key.clone(),
            config.image_model.clone(),
            http_client,
        )
        .with_base_url(config.gemini_base_url.clone());

        Self::with_services(StudioServices {
            text: Box::new(text),
            image: Box::new(image),
        })
    }

    pub fn store(&self) -> &StudioStore {
        &self.store
    }

    pub fn config(&self) -> &GenerationConfig {
        self.store.config()
    }

    pub fn status(&self) -> GenerationStatus {
        self.store.status()
    }

    pub fn current(&self) -> Option<&GeneratedPost> {
        self.store.current()
    }

    pub fn history(&self) -> &[GeneratedPost] {
        self.store.history()
    }

    /// Display projection of the history, truncated to `limit` entries.
    pub fn history_preview(&self, limit: usize) -> &[GeneratedPost] {
        self.store.recent(limit)
    }

    pub fn set_field(&mut self, field: ConfigField) {
        self.store.set_field(field);
    }

    pub fn reset_to_defaults(&mut self) {
        self.store.reset_to_defaults();
    }

    pub fn select_from_history(&mut self, id: &str) -> Result<&GeneratedPost> {
        self.store.select_from_history(id)
    }

    /// Generate post text from the active config and record the result.
    ///
    /// On failure the status becomes [`GenerationStatus::Error`] and no post
    /// is recorded.
    pub async fn generate_post(&mut self) -> Result<&GeneratedPost> {
        let request = self.store.begin_text_request()?;
        info!(
            "Generating post for {} about \"{}\"",
            request.config().platform,
            request.config().topic.trim()
        );

        let result = self.text.generate_text(request.config()).await;
        match result {
            Ok(text) => {
                let post = self.store.finish_text_request(request, text)?;
                info!("Generated post {} ({} chars)", post.id, post.content.len());
                Ok(post)
            }
            Err(e) => {
                error!("Post generation failed: {}", e);
                self.store.fail_text_request(request);
                Err(e)
            }
        }
    }

    /// Generate an image for the current post and attach it.
    ///
    /// Returns the data URI when one was produced. `None` covers both "nothing
    /// to do" (no current post or empty image prompt) and "no image available";
    /// the post is left unchanged in either case and the step may be retried.
    pub async fn generate_image(&mut self) -> Option<String> {
        let request = self.store.begin_image_request()?;
        info!(
            "Generating {} image for post {}",
            request.aspect_ratio(),
            request.post_id()
        );

        let image = self
            .image
            .generate_image(request.image_prompt(), request.aspect_ratio())
            .await;

        if image.is_none() {
            warn!("Image not available for post {}", request.post_id());
        }

        if self.store.finish_image_request(request, image.clone()) {
            image
        } else {
            None
        }
    }
}
