//! Local speech engine (espeak-ng).
//!
//! Enumerates the installed voices and picks one with a male-voice
//! heuristic: prefer a male voice matching the target language, fall back to
//! any male voice, then to the first voice listed. No voices at all is an
//! error.

use super::Synthesizer;
use crate::error::{RasiError, Result};
use crate::language::Language;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Substrings that mark a voice name as male when the engine does not
/// report a gender.
const MALE_NAME_HINTS: [&str; 6] = ["male", "david", "alan", "ravi", "kumar", "raj"];

/// An installed engine voice.
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    /// Identifier passed back to the engine (`-v` argument).
    pub id: String,
    /// Human-readable voice name.
    pub name: String,
    /// Gender reported by the engine, if any ('M' / 'F').
    pub gender: Option<char>,
    /// Language column of the voice listing.
    pub language: String,
}

impl Voice {
    fn is_male(&self) -> bool {
        if self.gender == Some('M') {
            return true;
        }
        let name = self.name.to_lowercase();
        MALE_NAME_HINTS.iter().any(|hint| name.contains(hint))
    }

    fn matches_language(&self, language: Language) -> bool {
        let keywords: [&str; 2] = match language {
            Language::Tamil => ["ta", "tamil"],
            Language::English => ["en", "english"],
            Language::Hindi => ["hi", "hindi"],
        };
        let name = self.name.to_lowercase();
        let lang = self.language.to_lowercase();
        keywords
            .iter()
            .any(|k| lang == *k || lang.starts_with(&format!("{}-", k)) || name.contains(k))
    }
}

/// Local espeak-ng synthesizer.
pub struct LocalSynthesizer;

impl LocalSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// List the engine's installed voices.
    async fn list_voices(&self) -> Result<Vec<Voice>> {
        let result = Command::new("espeak-ng")
            .arg("--voices")
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RasiError::ToolNotFound("espeak-ng".into()));
            }
            Err(e) => return Err(RasiError::Speech(format!("voice listing failed: {}", e))),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RasiError::Speech(format!("voice listing failed: {}", stderr)));
        }

        Ok(parse_voices(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl Default for LocalSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Synthesizer for LocalSynthesizer {
    #[instrument(skip(self, text), fields(lang = %language))]
    async fn synthesize(&self, text: &str, language: Language, output: &Path) -> Result<()> {
        let voices = self.list_voices().await?;
        let voice = select_voice(&voices, language)?;
        info!("Using local voice '{}' for {}", voice.name, language.display_name());

        let mut child = Command::new("espeak-ng")
            .arg("-v").arg(&voice.id)
            .arg("-w").arg(output)
            .arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => RasiError::ToolNotFound("espeak-ng".into()),
                _ => RasiError::Speech(format!("failed to spawn espeak-ng: {}", e)),
            })?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin.write_all(text.as_bytes()).await?;
        }
        drop(child.stdin.take());

        let result = child.wait_with_output().await?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(RasiError::Speech(format!("espeak-ng failed: {}", stderr)));
        }

        debug!("Local engine rendered speech to {}", output.display());
        Ok(())
    }
}

/// Parse `espeak-ng --voices` output.
///
/// Columns: Pty Language Age/Gender VoiceName File Other. The gender is the
/// letter after the slash in the Age/Gender column.
fn parse_voices(listing: &str) -> Vec<Voice> {
    let mut voices = Vec::new();

    for line in listing.lines().skip(1) {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 4 {
            continue;
        }

        let language = cols[1].to_string();
        let gender = cols[2]
            .split('/')
            .nth(1)
            .and_then(|g| g.chars().next())
            .filter(|c| *c == 'M' || *c == 'F');
        let name = cols[3].to_string();

        voices.push(Voice {
            id: language.clone(),
            name,
            gender,
            language,
        });
    }
    voices
}

/// Pick a voice: male+language match, else any male, else the first voice.
fn select_voice(voices: &[Voice], language: Language) -> Result<&Voice> {
    if voices.is_empty() {
        return Err(RasiError::Speech("no installed voices found".to_string()));
    }

    if let Some(v) = voices
        .iter()
        .find(|v| v.is_male() && v.matches_language(language))
    {
        return Ok(v);
    }
    if let Some(v) = voices.iter().find(|v| v.is_male()) {
        return Ok(v);
    }
    Ok(&voices[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(id: &str, name: &str, gender: Option<char>) -> Voice {
        Voice {
            id: id.to_string(),
            name: name.to_string(),
            gender,
            language: id.to_string(),
        }
    }

    #[test]
    fn test_prefers_male_language_match() {
        let voices = vec![
            voice("en", "english-female", Some('F')),
            voice("ta", "tamil", Some('M')),
            voice("en", "english", Some('M')),
        ];
        let picked = select_voice(&voices, Language::Tamil).unwrap();
        assert_eq!(picked.name, "tamil");
    }

    #[test]
    fn test_falls_back_to_any_male() {
        let voices = vec![
            voice("fr", "french-female", Some('F')),
            voice("de", "german", Some('M')),
        ];
        let picked = select_voice(&voices, Language::Hindi).unwrap();
        assert_eq!(picked.name, "german");
    }

    #[test]
    fn test_falls_back_to_first_voice() {
        let voices = vec![
            voice("fr", "french-female", Some('F')),
            voice("de", "german-female", Some('F')),
        ];
        let picked = select_voice(&voices, Language::English).unwrap();
        assert_eq!(picked.name, "french-female");
    }

    #[test]
    fn test_no_voices_is_an_error() {
        assert!(select_voice(&[], Language::Tamil).is_err());
    }

    #[test]
    fn test_male_name_heuristic() {
        let v = voice("hi", "ravi-desktop", None);
        assert!(v.is_male());
        let f = voice("hi", "lekha", None);
        assert!(!f.is_male());
    }

    #[test]
    fn test_parse_voices_listing() {
        let listing = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  ta              --/M      tamil              ta
 2  en-gb           --/M      english            gb
 5  hi              --/F      hindi-f            hi-f";
        let voices = parse_voices(listing);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[0].language, "ta");
        assert_eq!(voices[0].gender, Some('M'));
        assert_eq!(voices[2].gender, Some('F'));
        assert!(voices[0].matches_language(Language::Tamil));
        assert!(voices[1].matches_language(Language::English));
    }
}
