//! Configuration management for Rasi.

mod prompts;
mod settings;

pub use prompts::{HoroscopePrompt, MetadataPrompts, Prompts};
pub use settings::{
    AudioSettings, GeneralSettings, PromptSettings, Settings, SpeechEngine, SpeechSettings,
    TextSettings, UploadSettings, VideoSettings,
};
