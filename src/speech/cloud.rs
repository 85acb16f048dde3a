//! Cloud text-to-speech voice.
//!
//! Uses the public Translate TTS endpoint with a fixed regional accent
//! domain. The endpoint caps query length, so the text is split into
//! sentence-boundary chunks, the returned MP3 fragments are concatenated,
//! and ffmpeg decodes the result to WAV.

use super::Synthesizer;
use crate::config::SpeechSettings;
use crate::error::{RasiError, Result};
use crate::language::Language;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument};

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Cloud voice synthesizer.
pub struct CloudSynthesizer {
    client: reqwest::Client,
    accent: String,
    max_chunk_chars: usize,
}

impl CloudSynthesizer {
    pub fn new(settings: &SpeechSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            accent: settings.accent.clone(),
            max_chunk_chars: settings.max_chunk_chars,
        }
    }

    /// Fetch one MP3 fragment for a text chunk.
    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: Language,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>> {
        let base = format!("https://translate.google.{}/translate_tts", self.accent);
        let mut url = url::Url::parse(&base)
            .map_err(|e| RasiError::Speech(format!("bad TTS endpoint: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("ie", "UTF-8")
            .append_pair("client", "tw-ob")
            .append_pair("tl", language.tts_tag())
            .append_pair("q", chunk)
            .append_pair("idx", &idx.to_string())
            .append_pair("total", &total.to_string())
            .append_pair("textlen", &chunk.chars().count().to_string());

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, "Mozilla/5.0")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RasiError::Speech(format!(
                "TTS endpoint returned {} for chunk {}/{}",
                response.status(),
                idx + 1,
                total
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl Synthesizer for CloudSynthesizer {
    #[instrument(skip(self, text), fields(lang = %language))]
    async fn synthesize(&self, text: &str, language: Language, output: &Path) -> Result<()> {
        info!(
            "Synthesizing {} characters with the cloud voice ({})",
            text.chars().count(),
            self.accent
        );

        let chunks = split_for_tts(text, self.max_chunk_chars);
        if chunks.is_empty() {
            return Err(RasiError::Speech("no text to synthesize".to_string()));
        }
        debug!("Split text into {} TTS chunks", chunks.len());

        let mut mp3_bytes: Vec<u8> = Vec::new();
        let total = chunks.len();
        for (idx, chunk) in chunks.iter().enumerate() {
            let fragment = self.fetch_chunk(chunk, language, idx, total).await?;
            mp3_bytes.extend_from_slice(&fragment);
        }
        info!("Fetched {} bytes of encoded audio", mp3_bytes.len());

        // The engine renders to a temporary file; ffmpeg reloads and decodes
        // it into the WAV the rest of the pipeline consumes.
        let mp3_file = tempfile::Builder::new()
            .suffix(".mp3")
            .tempfile()
            .map_err(RasiError::Io)?;
        std::fs::write(mp3_file.path(), &mp3_bytes)?;

        decode_to_wav(mp3_file.path(), output).await
    }
}

/// Decode an encoded audio file to mono 16-bit WAV.
async fn decode_to_wav(source: &Path, dest: &Path) -> Result<()> {
    let result = Command::new("ffmpeg")
        .arg("-i").arg(source)
        .arg("-acodec").arg("pcm_s16le")
        .arg("-ac").arg("1")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(RasiError::Speech(format!("ffmpeg decode failed: {}", err)))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RasiError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(RasiError::Speech(format!("ffmpeg error: {}", e))),
    }
}

/// Split text into chunks no longer than `max_chars`, preferring sentence
/// and line boundaries, then whitespace.
fn split_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for piece in text.split_inclusive(['\n', '.', '!', '?']) {
        let piece = piece.trim_matches('\n');
        if piece.trim().is_empty() {
            continue;
        }

        if !current.is_empty()
            && current.chars().count() + 1 + piece.chars().count() > max_chars
        {
            chunks.push(current.trim().to_string());
            current.clear();
        }

        // A single sentence longer than the cap falls back to word splits.
        if piece.chars().count() > max_chars {
            for word in piece.split_whitespace() {
                if !current.is_empty()
                    && current.chars().count() + 1 + word.chars().count() > max_chars
                {
                    chunks.push(current.trim().to_string());
                    current.clear();
                }
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            }
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(piece.trim());
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_respects_cap() {
        let text = "One sentence here. Another sentence follows! A third one? And more text after that.";
        let chunks = split_for_tts(text, 30);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 30, "too long: {}", chunk);
        }
    }

    #[test]
    fn test_split_keeps_all_words() {
        let text = "Aries: good day. Taurus: fine day. Gemini: busy day.";
        let chunks = split_for_tts(text, 25);
        let rejoined = chunks.join(" ");
        for word in text.split_whitespace() {
            assert!(rejoined.contains(word), "missing: {}", word);
        }
    }

    #[test]
    fn test_oversized_sentence_split_on_words() {
        let text = "word ".repeat(50);
        let chunks = split_for_tts(&text, 20);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 20);
        }
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(split_for_tts("", 100).is_empty());
        assert!(split_for_tts("\n\n", 100).is_empty());
    }
}
