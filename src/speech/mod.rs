//! Speech synthesis engines.
//!
//! Two interchangeable engines produce a WAV file from formatted horoscope
//! text: a cloud voice over HTTP and a local espeak-ng voice. Both render to
//! a file on disk (the local engine cannot stream), and both failures are
//! fatal for the run.

mod cloud;
mod local;

pub use cloud::CloudSynthesizer;
pub use local::LocalSynthesizer;

use crate::config::{SpeechEngine, SpeechSettings};
use crate::error::Result;
use crate::language::Language;
use async_trait::async_trait;
use std::path::Path;

/// Contract for speech synthesis: (text, language) -> WAV file on disk.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Render `text` as speech into `output` (WAV).
    async fn synthesize(&self, text: &str, language: Language, output: &Path) -> Result<()>;
}

/// Create the synthesizer selected in settings.
pub fn create_synthesizer(settings: &SpeechSettings) -> Box<dyn Synthesizer> {
    match settings.engine {
        SpeechEngine::Cloud => Box::new(CloudSynthesizer::new(settings)),
        SpeechEngine::Local => Box::new(LocalSynthesizer::new()),
    }
}
