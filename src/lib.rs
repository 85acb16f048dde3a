//! Rasi - Daily Horoscope Video Publisher
//!
//! A CLI tool that renders narrated daily zodiac horoscope videos and
//! publishes them to YouTube.
//!
//! The name "Rasi" comes from the Tamil word for a zodiac sign.
//!
//! # Overview
//!
//! Rasi allows you to:
//! - Generate the day's horoscope copy in Tamil, English, or Hindi
//! - Narrate it with cloud or local text-to-speech
//! - Compose a video by looping a background clip under the narration
//! - Upload the result to YouTube and file it in a playlist
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt management
//! - `language` - Supported languages and per-language conventions
//! - `gemini` - Text-generation backend client
//! - `text` - Horoscope generation and formatting
//! - `speech` - Text-to-speech synthesis (cloud and local engines)
//! - `audio` - Narration speed and loudness adjustment
//! - `video` - Background-loop video composition
//! - `metadata` - Upload title, description, and tag generation
//! - `upload` - YouTube authentication and resumable upload
//! - `pipeline` - Render-chain coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use rasi::config::Settings;
//! use rasi::language::Language;
//! use rasi::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     let result = pipeline.render(Language::Tamil).await?;
//!     println!("Rendered {}", result.output_path.display());
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod gemini;
pub mod language;
pub mod metadata;
pub mod pipeline;
pub mod speech;
pub mod text;
pub mod upload;
pub mod video;

pub use error::{RasiError, Result};
