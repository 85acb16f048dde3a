//! Upload command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::RasiError;
use crate::gemini::GeminiClient;
use crate::language::Language;
use crate::metadata::MetadataGenerator;
use crate::upload::{Authenticator, ClientSecrets, YouTubeUploader};
use anyhow::Result;

/// Run the upload command.
pub async fn run_upload(lang: &str, settings: Settings) -> Result<()> {
    let language: Language = lang.parse().map_err(|e: RasiError| {
        Output::error(&format!("{}", e));
        anyhow::anyhow!(e)
    })?;

    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Upload, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'rasi doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    // The rendered video for this language must already exist.
    let video_path = settings.rendered_video_path(language);
    if !video_path.exists() {
        let e = RasiError::VideoNotFound(video_path.display().to_string());
        Output::error(&format!("{}", e));
        Output::info(&format!(
            "Render it first with: rasi render --lang {}",
            language.code()
        ));
        return Err(e.into());
    }

    Output::info(&format!(
        "Uploading {} horoscope video: {}",
        language.display_name(),
        video_path.display()
    ));

    // Metadata: title, description, tags. Falls back to fixed copy on failure.
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let gemini = GeminiClient::new(&settings.text)?;
    let generator = MetadataGenerator::new(&gemini, &prompts, &settings.upload);

    let spinner = Output::spinner("Generating video metadata...");
    let metadata = generator.generate(language).await;
    spinner.finish_and_clear();

    Output::kv("Title", &metadata.title);
    Output::kv("Tags", &metadata.tags.join(", "));

    // OAuth: cached token, refresh, or interactive browser flow.
    let secrets = ClientSecrets::load(&settings.client_secrets_path())?;
    let authenticator = Authenticator::new(
        secrets,
        settings.token_path(),
        settings.upload.scopes.clone(),
    );
    let token = authenticator.authenticate().await?;

    // Upload from a copy in a temp file so the staging copy is always
    // removed, even when the transfer fails.
    let staged = tempfile::NamedTempFile::new()?;
    std::fs::copy(&video_path, staged.path())?;

    let uploader = YouTubeUploader::new(token.access_token, settings.upload.clone());
    let video_id = uploader.upload_and_catalog(staged.path(), &metadata).await?;

    Output::success(&format!(
        "Video published: https://www.youtube.com/watch?v={}",
        video_id
    ));
    Output::info(&format!(
        "Playlist: https://www.youtube.com/playlist?list={}",
        settings.upload.playlist_id
    ));

    Ok(())
}
