//! Language selection for the horoscope pipeline.
//!
//! The pipeline supports exactly three languages. Everything keyed by
//! language (prompt, voice, output filename) hangs off this enum.

use crate::error::{RasiError, Result};
use serde::{Deserialize, Serialize};

/// One of the three supported horoscope languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Tamil,
    English,
    Hindi,
}

impl Language {
    /// All supported languages, in selector order.
    pub const ALL: [Language; 3] = [Language::Tamil, Language::English, Language::Hindi];

    /// Convert a numeric selector (0..=2) into a language. Out-of-range
    /// selectors fail fast.
    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| RasiError::Language(format!("{} (valid range: 0-2)", index)))
    }

    /// Numeric selector for this language.
    pub fn index(&self) -> usize {
        match self {
            Language::Tamil => 0,
            Language::English => 1,
            Language::Hindi => 2,
        }
    }

    /// BCP-47-ish code used on the CLI and by the speech backends.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Tamil => "ta",
            Language::English => "en-in",
            Language::Hindi => "hi",
        }
    }

    /// Language tag the cloud TTS endpoint expects.
    pub fn tts_tag(&self) -> &'static str {
        match self {
            Language::Tamil => "ta",
            Language::English => "en",
            Language::Hindi => "hi",
        }
    }

    /// Display name used in prompts and log output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Tamil => "Tamil",
            Language::English => "English",
            Language::Hindi => "Hindi",
        }
    }

    /// Filename of the rendered video for this language.
    ///
    /// These names are the on-disk contract between the `render` and
    /// `upload` invocations.
    pub fn output_filename(&self) -> &'static str {
        match self {
            Language::Tamil => "output_video.mp4",
            Language::English => "output_video_1.mp4",
            Language::Hindi => "output_video_2.mp4",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = RasiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ta" | "tamil" => Ok(Language::Tamil),
            "en-in" | "en" | "english" => Ok(Language::English),
            "hi" | "hindi" => Ok(Language::Hindi),
            other => Err(RasiError::Language(format!(
                "{} (expected one of: ta, en-in, hi)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_index(lang.index()).unwrap(), lang);
        }
    }

    #[test]
    fn test_out_of_range_index_fails() {
        assert!(Language::from_index(3).is_err());
        assert!(Language::from_index(usize::MAX).is_err());
    }

    #[test]
    fn test_code_parsing() {
        assert_eq!("ta".parse::<Language>().unwrap(), Language::Tamil);
        assert_eq!("en-in".parse::<Language>().unwrap(), Language::English);
        assert_eq!("hi".parse::<Language>().unwrap(), Language::Hindi);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_output_filenames_are_distinct() {
        let names: Vec<_> = Language::ALL.iter().map(|l| l.output_filename()).collect();
        assert_eq!(names.len(), 3);
        assert_ne!(names[0], names[1]);
        assert_ne!(names[1], names[2]);
    }
}
