//! SocialPulse - generates social media posts and matching images
//!
//! A user picks a topic, platform, tone, length and image shape; the post text
//! and an accompanying image are produced by a hosted generative model. The
//! session keeps every generated post in memory, most recent first.

pub mod ai;
pub mod error;
pub mod models;
pub mod preferences;
pub mod prompts;
pub mod store;
pub mod studio;

pub use error::{Error, Result};
