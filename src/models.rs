//! Data models and structures
//!
//! Defines the generation parameters, the posts produced from them, and the
//! environment-driven runtime configuration.

use crate::ai::gemini::client::DEFAULT_BASE_URL;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_STATE_FILE: &str = ".socialpulse/state.json";

/// Lowercase, whitespace/punctuation-free form used when parsing user input.
fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Platform {
    #[default]
    LinkedIn,
    Pinterest,
    Instagram,
    Facebook,
    Threads,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::LinkedIn,
        Platform::Pinterest,
        Platform::Instagram,
        Platform::Facebook,
        Platform::Threads,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "LinkedIn",
            Platform::Pinterest => "Pinterest",
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::Threads => "Threads",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|p| normalize(p.as_str()) == wanted)
            .ok_or_else(|| Error::InvalidValue(format!("unknown platform '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Humorous,
    Inspirational,
    Educational,
    Persuasive,
}

impl Tone {
    pub const ALL: [Tone; 6] = [
        Tone::Professional,
        Tone::Casual,
        Tone::Humorous,
        Tone::Inspirational,
        Tone::Educational,
        Tone::Persuasive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Casual => "Casual",
            Tone::Humorous => "Humorous",
            Tone::Inspirational => "Inspirational",
            Tone::Educational => "Educational",
            Tone::Persuasive => "Persuasive",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|t| normalize(t.as_str()) == wanted)
            .ok_or_else(|| Error::InvalidValue(format!("unknown tone '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Length {
    Short,
    #[default]
    Medium,
    Long,
}

impl Length {
    pub const ALL: [Length; 3] = [Length::Short, Length::Medium, Length::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            Length::Short => "Short",
            Length::Medium => "Medium",
            Length::Long => "Long",
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Length {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|l| normalize(l.as_str()) == wanted)
            .ok_or_else(|| Error::InvalidValue(format!("unknown length '{}'", s)))
    }
}

/// Image shapes offered to the user.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "4:5")]
    Portrait4x5,
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "9:16")]
    Story9x16,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Portrait3x4,
        AspectRatio::Portrait4x5,
        AspectRatio::Landscape16x9,
        AspectRatio::Story9x16,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Story9x16 => "9:16",
        }
    }

    /// Ratio string sent to the image model.
    ///
    /// The model accepts `1:1`, `3:4`, `4:3`, `9:16` and `16:9`. There is no
    /// `4:5`, so that option is rendered at `3:4`, the closest supported
    /// portrait ratio. Callers must not assume a 4:5 image comes back.
    pub fn api_ratio(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait3x4 | AspectRatio::Portrait4x5 => "3:4",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Story9x16 => "9:16",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().replace(['x', 'X'], ":");
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == trimmed)
            .ok_or_else(|| Error::InvalidValue(format!("unknown aspect ratio '{}'", s)))
    }
}

/// Parameters for one generation, snapshotted onto the resulting post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub topic: String,
    pub platform: Platform,
    pub tone: Tone,
    pub length: Length,
    pub aspect_ratio: AspectRatio,
    pub include_hashtags: bool,
    pub include_emoji: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            topic: String::new(),
            platform: Platform::default(),
            tone: Tone::default(),
            length: Length::default(),
            aspect_ratio: AspectRatio::default(),
            include_hashtags: true,
            include_emoji: true,
        }
    }
}

impl GenerationConfig {
    /// Whether the config may be submitted: the topic must not be blank.
    pub fn is_submittable(&self) -> bool {
        !self.topic.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPost {
    pub id: String,
    pub content: String,
    pub image_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_image_url: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub config: GenerationConfig,
}

impl GeneratedPost {
    pub fn new(content: String, image_prompt: String, config: GenerationConfig) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content,
            image_prompt,
            generated_image_url: None,
            timestamp: Utc::now(),
            config,
        }
    }
}

/// Coarse state of the single generation flow.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    #[default]
    Idle,
    GeneratingText,
    GeneratingImage,
    Complete,
    Error,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub state_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        allow_missing_env_file(dotenvy::dotenv())?;

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("GEMINI_API_KEY not set".to_string()))?;

        Ok(Self {
            gemini_api_key,
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            text_model: std::env::var("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|_| DEFAULT_TEXT_MODEL.to_string()),
            image_model: std::env::var("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string()),
            state_file: std::env::var("SOCIALPULSE_STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_FILE)),
        })
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn allow_missing_env_file<T>(result: std::result::Result<T, dotenvy::Error>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}
