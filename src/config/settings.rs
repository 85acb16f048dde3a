//! Configuration settings for Rasi.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub text: TextSettings,
    pub speech: SpeechSettings,
    pub audio: AudioSettings,
    pub video: VideoSettings,
    pub upload: UploadSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data (token cache, etc.).
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.rasi".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Text generation backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    /// Gemini model name.
    pub model: String,
    /// Sampling temperature (0.0 to 1.0).
    pub temperature: f32,
    /// Nucleus sampling parameter.
    pub top_p: f32,
    /// Top-k sampling parameter.
    pub top_k: u32,
    /// Maximum length of response.
    pub max_output_tokens: u32,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

/// Speech synthesis engine type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpeechEngine {
    /// Cloud voice over HTTP (default).
    #[default]
    Cloud,
    /// Local espeak-ng engine with voice heuristics.
    Local,
}

impl std::str::FromStr for SpeechEngine {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cloud" => Ok(SpeechEngine::Cloud),
            "local" | "espeak" => Ok(SpeechEngine::Local),
            _ => Err(format!("Unknown speech engine: {}", s)),
        }
    }
}

impl std::fmt::Display for SpeechEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeechEngine::Cloud => write!(f, "cloud"),
            SpeechEngine::Local => write!(f, "local"),
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Engine to use (cloud, local).
    pub engine: SpeechEngine,
    /// Regional accent domain for the cloud voice.
    pub accent: String,
    /// Maximum characters per cloud TTS request.
    pub max_chunk_chars: usize,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            engine: SpeechEngine::Cloud,
            accent: "co.in".to_string(),
            max_chunk_chars: 200,
        }
    }
}

/// Audio post-processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Playback speed multiplier applied to the synthesized speech.
    pub speed_factor: f64,
    /// Loudness gain applied after peak normalization.
    pub volume_gain: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            speed_factor: 1.5,
            volume_gain: 2.0,
        }
    }
}

/// Video composition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    /// Path to the template clip that gets looped under the narration.
    pub template_path: String,
    /// Directory where rendered videos are written.
    pub output_dir: String,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            template_path: "template.mp4".to_string(),
            output_dir: ".".to_string(),
        }
    }
}

/// YouTube upload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Path to the OAuth client secrets file.
    pub client_secrets_file: String,
    /// Path to the cached token file.
    pub token_file: String,
    /// Playlist the uploaded video is added to.
    pub playlist_id: String,
    /// Channel link included in generated descriptions.
    pub channel_url: String,
    /// Playlist link included in generated descriptions.
    pub playlist_url: String,
    /// OAuth scopes requested during authentication.
    pub scopes: Vec<String>,
    /// Upload chunk size in bytes.
    pub chunk_size: usize,
    /// YouTube category id for uploads.
    pub category_id: String,
    /// Privacy status for uploads (public, private, unlisted).
    pub privacy_status: String,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            client_secrets_file: "client.json".to_string(),
            token_file: "~/.rasi/youtube_token.json".to_string(),
            playlist_id: "PLhv_6lhldIL52dNu3VGOZCjRwDkjeVST_".to_string(),
            channel_url: "https://www.youtube.com/@rdrjsethurajan".to_string(),
            playlist_url:
                "https://www.youtube.com/playlist?list=PLhv_6lhldIL6_-JayMXRAxaFtNIElnkEs"
                    .to_string(),
            scopes: vec![
                "https://www.googleapis.com/auth/youtube.upload".to_string(),
                "https://www.googleapis.com/auth/youtube.force-ssl".to_string(),
            ],
            chunk_size: 8 * 1024 * 1024,
            category_id: "24".to_string(),
            privacy_status: "public".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::RasiError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rasi")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded template video path.
    pub fn template_path(&self) -> PathBuf {
        Self::expand_path(&self.video.template_path)
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.video.output_dir)
    }

    /// Get the expanded token cache path.
    pub fn token_path(&self) -> PathBuf {
        Self::expand_path(&self.upload.token_file)
    }

    /// Get the expanded client secrets path.
    pub fn client_secrets_path(&self) -> PathBuf {
        Self::expand_path(&self.upload.client_secrets_file)
    }

    /// Rendered video path for a language, under the output directory.
    pub fn rendered_video_path(&self, language: crate::language::Language) -> PathBuf {
        self.output_dir().join(language.output_filename())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.audio.speed_factor, 1.5);
        assert_eq!(settings.audio.volume_gain, 2.0);
        assert_eq!(settings.speech.engine, SpeechEngine::Cloud);
        assert_eq!(settings.upload.scopes.len(), 2);
    }

    #[test]
    fn test_rendered_video_path_is_language_keyed() {
        let settings = Settings::default();
        let ta = settings.rendered_video_path(Language::Tamil);
        let en = settings.rendered_video_path(Language::English);
        assert_ne!(ta, en);
        assert!(ta.ends_with("output_video.mp4"));
        assert!(en.ends_with("output_video_1.mp4"));
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = Settings::default();
        let content = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&content).unwrap();
        assert_eq!(parsed.text.model, settings.text.model);
        assert_eq!(parsed.audio.speed_factor, settings.audio.speed_factor);
    }
}
