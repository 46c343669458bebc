use anyhow::{Context, Result};
use base64::Engine as _;
use clap::Parser;
use socialpulse::models::{AspectRatio, Config, Length, Platform, Tone};
use socialpulse::preferences::PreferenceFile;
use socialpulse::store::ConfigField;
use socialpulse::studio::Studio;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "socialpulse")]
#[command(about = "Generate a social media post and an accompanying image")]
struct CliArgs {
    /// What the post should be about.
    #[arg(long)]
    topic: String,

    #[arg(long, default_value = "linkedin", value_parser = parse_platform)]
    platform: Platform,

    #[arg(long, default_value = "professional", value_parser = parse_tone)]
    tone: Tone,

    #[arg(long, default_value = "medium", value_parser = parse_length)]
    length: Length,

    /// One of 1:1, 3:4, 4:5, 16:9, 9:16.
    #[arg(long, default_value = "1:1", value_parser = parse_aspect_ratio)]
    aspect_ratio: AspectRatio,

    #[arg(long)]
    no_hashtags: bool,

    #[arg(long)]
    no_emoji: bool,

    /// Also generate the accompanying image.
    #[arg(long)]
    image: bool,

    /// Write the generated image to this path (implies --image).
    #[arg(long, value_name = "PATH")]
    image_out: Option<PathBuf>,
}

fn parse_platform(input: &str) -> std::result::Result<Platform, String> {
    input.parse().map_err(|e: socialpulse::Error| e.to_string())
}

fn parse_tone(input: &str) -> std::result::Result<Tone, String> {
    input.parse().map_err(|e: socialpulse::Error| e.to_string())
}

fn parse_length(input: &str) -> std::result::Result<Length, String> {
    input.parse().map_err(|e: socialpulse::Error| e.to_string())
}

fn parse_aspect_ratio(input: &str) -> std::result::Result<AspectRatio, String> {
    input.parse().map_err(|e: socialpulse::Error| e.to_string())
}

/// Decode a `data:<mime>;base64,<payload>` URI into raw bytes.
fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let payload = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .context("Image is not a base64 data URI")?;

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .context("Failed to decode image payload")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "socialpulse=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let preferences = PreferenceFile::new(config.state_file.clone());
    match preferences.mark_visited() {
        Ok(true) => info!("Welcome to SocialPulse studio"),
        Ok(false) => {}
        Err(e) => warn!("Could not save preferences: {}", e),
    }

    let mut studio = Studio::from_config(&config);
    studio.set_field(ConfigField::Topic(args.topic));
    studio.set_field(ConfigField::Platform(args.platform));
    studio.set_field(ConfigField::Tone(args.tone));
    studio.set_field(ConfigField::Length(args.length));
    studio.set_field(ConfigField::AspectRatio(args.aspect_ratio));
    studio.set_field(ConfigField::IncludeHashtags(!args.no_hashtags));
    studio.set_field(ConfigField::IncludeEmoji(!args.no_emoji));

    let post = match studio.generate_post().await {
        Ok(post) => post.clone(),
        Err(e) => {
            error!("Generation failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", post.content);
    if !post.image_prompt.is_empty() {
        println!("\nImage prompt: {}", post.image_prompt);
    }

    if args.image || args.image_out.is_some() {
        match studio.generate_image().await {
            Some(uri) => {
                if let Some(path) = args.image_out {
                    let bytes = decode_data_uri(&uri)?;
                    std::fs::write(&path, bytes)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Saved image to {}", path.display());
                } else {
                    info!("Generated image ({} bytes as data URI)", uri.len());
                }
            }
            None => warn!("Image not available, try again later"),
        }
    }

    Ok(())
}
