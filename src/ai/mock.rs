use super::{ImageGenerationService, PostText, TextGenerationService};
use crate::models::{AspectRatio, GenerationConfig};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted text generator. Responses cycle; `None` entries fail the call.
#[derive(Clone)]
pub struct MockTextClient {
    responses: Arc<Mutex<Vec<Option<PostText>>>>,
    requests: Arc<Mutex<Vec<GenerationConfig>>>,
}

impl MockTextClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, content: &str, image_prompt: &str) -> Self {
        self.responses.lock().unwrap().push(Some(PostText {
            content: content.to_string(),
            image_prompt: image_prompt.to_string(),
        }));
        self
    }

    pub fn with_failure(self) -> Self {
        self.responses.lock().unwrap().push(None);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<GenerationConfig> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockTextClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerationService for MockTextClient {
    async fn generate_text(&self, config: &GenerationConfig) -> Result<PostText> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(config.clone());
            requests.len()
        };

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(PostText {
                content: format!("A {} post about {}", config.platform, config.topic.trim()),
                image_prompt: format!("An illustration of {}", config.topic.trim()),
            });
        }

        match &responses[(count - 1) % responses.len()] {
            Some(text) => Ok(text.clone()),
            None => Err(Error::TextGeneration(Box::new(Error::AiProvider(
                "mock transport failure".to_string(),
            )))),
        }
    }
}

/// Scripted image generator. Responses cycle; `None` entries mean no image.
#[derive(Clone)]
pub struct MockImageClient {
    responses: Arc<Mutex<Vec<Option<String>>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockImageClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_image(self, data_uri: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Some(data_uri.to_string()));
        self
    }

    pub fn with_no_image(self) -> Self {
        self.responses.lock().unwrap().push(None);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// `(prompt, provider ratio)` pairs in call order.
    pub fn get_requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockImageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageClient {
    async fn generate_image(
        &self,
        image_prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Option<String> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push((
                image_prompt.to_string(),
                aspect_ratio.api_ratio().to_string(),
            ));
            requests.len()
        };

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // 1x1 transparent PNG
            return Some(
                "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII="
                    .to_string(),
            );
        }

        responses[(count - 1) % responses.len()].clone()
    }
}
