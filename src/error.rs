//! Error types for Rasi.

use thiserror::Error;

/// Library-level error type for Rasi operations.
///
/// Stages classify failures two ways: text and metadata generation are
/// recoverable (callers substitute fixed defaults), while speech synthesis,
/// audio processing, video composition, authentication and upload are fatal
/// for the run.
#[derive(Error, Debug)]
pub enum RasiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid language selector: {0}")]
    Language(String),

    #[error("Text generation failed: {0}")]
    TextGeneration(String),

    #[error("Speech synthesis failed: {0}")]
    Speech(String),

    #[error("Audio processing failed: {0}")]
    Audio(String),

    #[error("Video composition failed: {0}")]
    Video(String),

    #[error("Metadata generation failed: {0}")]
    Metadata(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Rendered video not found: {0}")]
    VideoNotFound(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Rasi operations.
pub type Result<T> = std::result::Result<T, RasiError>;
