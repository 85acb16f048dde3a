//! Render-chain orchestrator.
//!
//! Runs text -> speech -> speed-adjust -> compose, strictly in order: each
//! stage finishes (network round trips included) before the next begins.
//! Text generation failures are recoverable (a fixed default is narrated);
//! every later stage is fatal. All intra-run files live in a job-scoped
//! temp directory.

use crate::audio::SpeedAdjuster;
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::gemini::GeminiClient;
use crate::language::Language;
use crate::speech::{create_synthesizer, Synthesizer};
use crate::text::{fallback_text, TextGenerator};
use crate::video;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// The render pipeline for one language.
pub struct Pipeline {
    settings: Settings,
    prompts: Prompts,
    gemini: GeminiClient,
    synthesizer: Box<dyn Synthesizer>,
}

impl Pipeline {
    /// Create a pipeline from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let gemini = GeminiClient::new(&settings.text)?;
        let synthesizer = create_synthesizer(&settings.speech);

        Ok(Self {
            settings,
            prompts,
            gemini,
            synthesizer,
        })
    }

    /// Render the horoscope video for a language.
    #[instrument(skip(self), fields(lang = %language))]
    pub async fn render(&self, language: Language) -> Result<RenderResult> {
        info!("Starting render for {}", language.display_name());

        // Job-scoped working directory; removed on every exit path.
        let job_dir = tempfile::tempdir()?;

        // Stage 1: horoscope text (recoverable).
        let generator = TextGenerator::new(&self.gemini, &self.prompts);
        let (text, used_fallback_text) = match generator.generate(language).await {
            Ok(text) => (text, false),
            Err(e) => {
                warn!("Text generation failed ({}), narrating the default copy", e);
                (fallback_text(language), true)
            }
        };
        info!("Horoscope text ready ({} characters)", text.chars().count());

        // Stage 2: speech synthesis (fatal).
        let raw_speech = job_dir.path().join("speech_raw.wav");
        self.synthesizer
            .synthesize(&text, language, &raw_speech)
            .await?;

        // Stage 3: speed adjustment (fatal).
        let adjusted_speech = job_dir.path().join("speech.wav");
        let adjuster = SpeedAdjuster::new(&self.settings.audio);
        let narration_duration = adjuster.adjust(&raw_speech, &adjusted_speech).await?;

        // Stage 4: video composition (fatal).
        let output_path = self.settings.rendered_video_path(language);
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let report = video::compose(
            &self.settings.template_path(),
            &adjusted_speech,
            &output_path,
        )
        .await?;

        info!(
            "Render complete: {} ({:.2}s, {} template loops)",
            output_path.display(),
            report.audio_duration,
            report.repeat_count
        );

        Ok(RenderResult {
            output_path,
            duration: narration_duration,
            repeat_count: report.repeat_count,
            used_fallback_text,
        })
    }
}

/// Result of a render run.
#[derive(Debug)]
pub struct RenderResult {
    /// Where the rendered video was written.
    pub output_path: PathBuf,
    /// Final video duration in seconds.
    pub duration: f64,
    /// How many times the template clip was looped.
    pub repeat_count: u32,
    /// Whether the default copy was narrated because generation failed.
    pub used_fallback_text: bool,
}
