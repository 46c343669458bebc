//! Session state for the studio
//!
//! [`StudioStore`] owns the active [`GenerationConfig`], the session history of
//! [`GeneratedPost`]s (most recent first) and the coarse [`GenerationStatus`].
//! The "current" post is held as an id into the history, so the current
//! projection and its history entry can never disagree.
//!
//! Outbound calls are bracketed by request tickets. A text ticket is tied to
//! the selection it was issued under: picking another post from history
//! before it completes makes the ticket stale and its response is dropped. An
//! image ticket names the post it was issued for and only ever touches that
//! post.

use crate::ai::PostText;
use crate::models::{
    AspectRatio, GeneratedPost, GenerationConfig, GenerationStatus, Length, Platform, Tone,
};
use crate::{Error, Result};
use tracing::{debug, info, warn};

/// One field of [`GenerationConfig`] with its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigField {
    Topic(String),
    Platform(Platform),
    Tone(Tone),
    Length(Length),
    AspectRatio(AspectRatio),
    IncludeHashtags(bool),
    IncludeEmoji(bool),
}

/// Fields that may be merged into an existing post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostUpdate {
    pub generated_image_url: Option<String>,
}

/// Ticket for an in-flight text generation.
#[derive(Debug, Clone)]
pub struct TextRequest {
    seq: u64,
    config: GenerationConfig,
}

impl TextRequest {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Config snapshot taken at submit time.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }
}

/// Ticket for an in-flight image generation, bound to its target post.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    post_id: String,
    image_prompt: String,
    aspect_ratio: AspectRatio,
}

impl ImageRequest {
    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn image_prompt(&self) -> &str {
        &self.image_prompt
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }
}

#[derive(Debug, Default)]
pub struct StudioStore {
    config: GenerationConfig,
    history: Vec<GeneratedPost>,
    current_id: Option<String>,
    status: GenerationStatus,
    /// Bumped on every text submit and every history selection.
    latest_seq: u64,
}

impl StudioStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    /// All posts of this session, most recent first.
    pub fn history(&self) -> &[GeneratedPost] {
        &self.history
    }

    /// At most `limit` of the most recent posts.
    pub fn recent(&self, limit: usize) -> &[GeneratedPost] {
        &self.history[..self.history.len().min(limit)]
    }

    pub fn current(&self) -> Option<&GeneratedPost> {
        let id = self.current_id.as_deref()?;
        self.history.iter().find(|p| p.id == id)
    }

    pub fn can_submit(&self) -> bool {
        self.config.is_submittable() && self.status != GenerationStatus::GeneratingText
    }

    pub fn set_field(&mut self, field: ConfigField) {
        debug!("Config change: {:?}", field);
        match field {
            ConfigField::Topic(topic) => self.config.topic = topic,
            ConfigField::Platform(platform) => self.config.platform = platform,
            ConfigField::Tone(tone) => self.config.tone = tone,
            ConfigField::Length(length) => self.config.length = length,
            ConfigField::AspectRatio(ratio) => self.config.aspect_ratio = ratio,
            ConfigField::IncludeHashtags(on) => self.config.include_hashtags = on,
            ConfigField::IncludeEmoji(on) => self.config.include_emoji = on,
        }
    }

    pub fn reset_to_defaults(&mut self) {
        self.config = GenerationConfig::default();
    }

    /// Prepend a completed post to history and make it current.
    pub fn record_post(&mut self, post: GeneratedPost) {
        info!("Recorded post {} ({} in history)", post.id, self.history.len() + 1);
        self.current_id = Some(post.id.clone());
        self.history.insert(0, post);
    }

    /// Merge `update` into the current post.
    ///
    /// Returns whether anything changed. A post's image URL is set at most once.
    pub fn update_current_post(&mut self, update: PostUpdate) -> Result<bool> {
        let id = self
            .current_id
            .clone()
            .ok_or_else(|| Error::UnknownPost("no current post".to_string()))?;
        self.update_post(&id, update)
    }

    /// Merge `update` into the post with `id`, wherever it sits in history.
    pub fn update_post(&mut self, id: &str, update: PostUpdate) -> Result<bool> {
        let post = self
            .history
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::UnknownPost(id.to_string()))?;

        match update.generated_image_url {
            Some(url) if post.generated_image_url.is_none() => {
                post.generated_image_url = Some(url);
                Ok(true)
            }
            Some(_) => {
                warn!("Post {} already has an image, ignoring update", id);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Make a past post current and restore the config that produced it.
    ///
    /// Any text request still in flight becomes stale.
    pub fn select_from_history(&mut self, id: &str) -> Result<&GeneratedPost> {
        let index = self
            .history
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::UnknownPost(id.to_string()))?;

        self.latest_seq += 1;
        self.current_id = Some(id.to_string());
        self.config = self.history[index].config.clone();
        if self.status == GenerationStatus::GeneratingText {
            self.status = GenerationStatus::Complete;
        }

        Ok(&self.history[index])
    }

    /// Start a text generation from a snapshot of the active config.
    pub fn begin_text_request(&mut self) -> Result<TextRequest> {
        if !self.config.is_submittable() {
            return Err(Error::ConfigInvalid("topic is blank".to_string()));
        }

        self.latest_seq += 1;
        self.status = GenerationStatus::GeneratingText;
        self.current_id = None;

        Ok(TextRequest {
            seq: self.latest_seq,
            config: self.config.clone(),
        })
    }

    /// Turn a successful text response into a recorded post.
    pub fn finish_text_request(
        &mut self,
        request: TextRequest,
        text: PostText,
    ) -> Result<&GeneratedPost> {
        if request.seq != self.latest_seq {
            warn!(
                "Discarding text response for request {} (latest is {})",
                request.seq, self.latest_seq
            );
            return Err(Error::StaleResponse(request.seq));
        }

        let post = GeneratedPost::new(text.content, text.image_prompt, request.config);
        let id = post.id.clone();
        self.record_post(post);
        self.status = GenerationStatus::Complete;

        self.history
            .iter()
            .find(|p| p.id == id)
            .ok_or(Error::UnknownPost(id))
    }

    /// Record a failed text request. History is left untouched.
    pub fn fail_text_request(&mut self, request: TextRequest) {
        if request.seq == self.latest_seq {
            self.status = GenerationStatus::Error;
        } else {
            debug!("Ignoring failure of superseded request {}", request.seq);
        }
    }

    /// Start an image generation for the current post.
    ///
    /// `None` when there is no current post or it has no image prompt.
    pub fn begin_image_request(&mut self) -> Option<ImageRequest> {
        let post = self.current()?;
        if post.image_prompt.trim().is_empty() {
            return None;
        }

        let request = ImageRequest {
            post_id: post.id.clone(),
            image_prompt: post.image_prompt.clone(),
            aspect_ratio: post.config.aspect_ratio,
        };
        self.status = GenerationStatus::GeneratingImage;
        Some(request)
    }

    /// Apply an image outcome to the post the request was issued for.
    ///
    /// Returns whether the post gained an image.
    pub fn finish_image_request(&mut self, request: ImageRequest, image: Option<String>) -> bool {
        if self.status == GenerationStatus::GeneratingImage {
            self.status = GenerationStatus::Complete;
        }

        let Some(url) = image else {
            info!("No image available for post {}", request.post_id);
            return false;
        };

        let update = PostUpdate {
            generated_image_url: Some(url),
        };
        match self.update_post(&request.post_id, update) {
            Ok(applied) => applied,
            Err(e) => {
                warn!("Dropping image for post {}: {}", request.post_id, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(content: &str, image_prompt: &str) -> PostText {
        PostText {
            content: content.to_string(),
            image_prompt: image_prompt.to_string(),
        }
    }

    fn store_with_topic(topic: &str) -> StudioStore {
        let mut store = StudioStore::new();
        store.set_field(ConfigField::Topic(topic.to_string()));
        store
    }

    fn generate(store: &mut StudioStore, content: &str) -> String {
        let request = store.begin_text_request().unwrap();
        store
            .finish_text_request(request, text(content, "a picture"))
            .unwrap()
            .id
            .clone()
    }

    #[test]
    fn test_set_field_replaces_single_field() {
        let mut store = StudioStore::new();
        store.set_field(ConfigField::Platform(Platform::Threads));
        store.set_field(ConfigField::IncludeEmoji(false));

        assert_eq!(store.config().platform, Platform::Threads);
        assert!(!store.config().include_emoji);
        assert_eq!(store.config().tone, Tone::Professional);
        assert!(store.config().include_hashtags);
    }

    #[test]
    fn test_can_submit_requires_non_blank_topic() {
        let mut store = StudioStore::new();
        assert!(!store.can_submit());
        store.set_field(ConfigField::Topic("  ".to_string()));
        assert!(!store.can_submit());
        store.set_field(ConfigField::Topic("coffee".to_string()));
        assert!(store.can_submit());
    }

    #[test]
    fn test_reset_to_defaults_is_idempotent() {
        let mut store = store_with_topic("coffee");
        store.set_field(ConfigField::Length(Length::Long));

        store.reset_to_defaults();
        let first = store.config().clone();
        store.reset_to_defaults();

        assert_eq!(&first, store.config());
        assert_eq!(first, GenerationConfig::default());
    }

    #[test]
    fn test_blank_topic_is_config_invalid() {
        let mut store = StudioStore::new();
        let err = store.begin_text_request().unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid(_)));
        assert_eq!(store.status(), GenerationStatus::Idle);
    }

    #[test]
    fn test_record_post_prepends_and_becomes_current() {
        let mut store = store_with_topic("coffee");
        let first = generate(&mut store, "one");
        let second = generate(&mut store, "two");

        assert_eq!(store.history().len(), 2);
        assert_eq!(store.history()[0].id, second);
        assert_eq!(store.history()[1].id, first);
        assert_eq!(store.current().unwrap().id, second);
        assert_eq!(store.status(), GenerationStatus::Complete);
    }

    #[test]
    fn test_post_keeps_config_snapshot() {
        let mut store = store_with_topic("coffee");
        let request = store.begin_text_request().unwrap();
        store.set_field(ConfigField::Topic("tea".to_string()));
        store.finish_text_request(request, text("c", "p")).unwrap();

        assert_eq!(store.current().unwrap().config.topic, "coffee");
        assert_eq!(store.config().topic, "tea");
    }

    #[test]
    fn test_update_current_post_keeps_history_consistent() {
        let mut store = store_with_topic("coffee");
        generate(&mut store, "one");

        let changed = store
            .update_current_post(PostUpdate {
                generated_image_url: Some("data:image/png;base64,AAAA".to_string()),
            })
            .unwrap();

        assert!(changed);
        assert_eq!(store.current().unwrap(), &store.history()[0]);
        assert_eq!(
            store.history()[0].generated_image_url.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn test_image_url_is_set_at_most_once() {
        let mut store = store_with_topic("coffee");
        generate(&mut store, "one");

        let first = PostUpdate {
            generated_image_url: Some("data:image/png;base64,AAAA".to_string()),
        };
        let second = PostUpdate {
            generated_image_url: Some("data:image/png;base64,BBBB".to_string()),
        };
        assert!(store.update_current_post(first).unwrap());
        assert!(!store.update_current_post(second).unwrap());
        assert_eq!(
            store.current().unwrap().generated_image_url.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn test_update_without_current_post_fails() {
        let mut store = StudioStore::new();
        let err = store.update_current_post(PostUpdate::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownPost(_)));
    }

    #[test]
    fn test_select_from_history_restores_config() {
        let mut store = store_with_topic("coffee");
        store.set_field(ConfigField::AspectRatio(AspectRatio::Portrait4x5));
        let first = generate(&mut store, "one");
        let used = store.history()[0].config.clone();

        store.set_field(ConfigField::Topic("tea".to_string()));
        store.set_field(ConfigField::Platform(Platform::Pinterest));
        generate(&mut store, "two");

        store.select_from_history(&first).unwrap();
        assert_eq!(store.current().unwrap().id, first);
        assert_eq!(store.config(), &used);
    }

    #[test]
    fn test_select_unknown_id_fails() {
        let mut store = StudioStore::new();
        assert!(matches!(
            store.select_from_history("missing"),
            Err(Error::UnknownPost(_))
        ));
    }

    #[test]
    fn test_text_response_after_selection_is_discarded() {
        let mut store = store_with_topic("coffee");
        let first = generate(&mut store, "one");

        let pending = store.begin_text_request().unwrap();
        store.select_from_history(&first).unwrap();

        let err = store
            .finish_text_request(pending, text("late", "p"))
            .unwrap_err();
        assert!(matches!(err, Error::StaleResponse(_)));
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.current().unwrap().id, first);
    }

    #[test]
    fn test_stale_failure_does_not_flip_status() {
        let mut store = store_with_topic("coffee");
        let first = generate(&mut store, "one");

        let pending = store.begin_text_request().unwrap();
        store.select_from_history(&first).unwrap();
        store.fail_text_request(pending);

        assert_eq!(store.status(), GenerationStatus::Complete);
    }

    #[test]
    fn test_failed_text_request_sets_error_and_keeps_history() {
        let mut store = store_with_topic("coffee");
        generate(&mut store, "one");

        let request = store.begin_text_request().unwrap();
        store.fail_text_request(request);

        assert_eq!(store.status(), GenerationStatus::Error);
        assert_eq!(store.history().len(), 1);
    }

    #[test]
    fn test_image_lands_on_target_post_after_selection() {
        let mut store = store_with_topic("coffee");
        let first = generate(&mut store, "one");
        let second = generate(&mut store, "two");

        let request = store.begin_image_request().unwrap();
        assert_eq!(request.post_id(), second);
        store.select_from_history(&first).unwrap();

        assert!(store.finish_image_request(request, Some("data:image/png;base64,AA".into())));
        assert_eq!(store.current().unwrap().id, first);
        assert!(store.current().unwrap().generated_image_url.is_none());
        assert_eq!(
            store.history()[0].generated_image_url.as_deref(),
            Some("data:image/png;base64,AA")
        );
    }

    #[test]
    fn test_no_image_leaves_post_unchanged() {
        let mut store = store_with_topic("coffee");
        generate(&mut store, "one");
        let before = store.current().unwrap().clone();

        let request = store.begin_image_request().unwrap();
        assert_eq!(store.status(), GenerationStatus::GeneratingImage);
        assert!(!store.finish_image_request(request, None));

        assert_eq!(store.current().unwrap(), &before);
        assert_eq!(store.status(), GenerationStatus::Complete);
    }

    #[test]
    fn test_begin_image_request_needs_prompt() {
        let mut store = store_with_topic("coffee");
        assert!(store.begin_image_request().is_none());

        let request = store.begin_text_request().unwrap();
        store.finish_text_request(request, text("c", "")).unwrap();
        assert!(store.begin_image_request().is_none());
        assert_eq!(store.status(), GenerationStatus::Complete);
    }

    #[test]
    fn test_recent_truncates() {
        let mut store = store_with_topic("coffee");
        for i in 0..5 {
            generate(&mut store, &format!("post {}", i));
        }

        assert_eq!(store.recent(3).len(), 3);
        assert_eq!(store.recent(3)[0].content, "post 4");
        assert_eq!(store.recent(10).len(), 5);
    }
}
