//! Render command implementation.

use crate::cli::output::format_duration;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::language::Language;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the render command.
pub async fn run_render(lang: &str, settings: Settings) -> Result<()> {
    let language: Language = lang.parse().map_err(|e: crate::error::RasiError| {
        Output::error(&format!("{}", e));
        anyhow::anyhow!(e)
    })?;

    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Render, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'rasi doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    Output::info(&format!(
        "Rendering today's {} horoscope video",
        language.display_name()
    ));

    let pipeline = Pipeline::new(settings)?;

    let spinner = Output::spinner("Rendering (text, narration, video)...");
    let result = pipeline.render(language).await;
    spinner.finish_and_clear();

    match result {
        Ok(render) => {
            if render.used_fallback_text {
                Output::warning("Text generation failed; the default copy was narrated instead.");
            }
            Output::success(&format!("Video rendered: {}", render.output_path.display()));
            Output::kv("Duration", &format_duration(render.duration));
            Output::kv("Template loops", &render.repeat_count.to_string());
            Output::info(&format!(
                "Publish it with: rasi upload --lang {}",
                language.code()
            ));
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Render failed: {}", e));
            Err(e.into())
        }
    }
}
