//! Horoscope text generation.
//!
//! Sends the per-language prompt to the Gemini backend and reformats the
//! response into the line-oriented layout the narration expects. Generation
//! failures are recoverable: callers substitute [`fallback_text`].

pub mod format;

pub use format::format_response;

use crate::config::Prompts;
use crate::error::Result;
use crate::gemini::GeminiClient;
use crate::language::Language;
use tracing::{debug, info};

/// Generator for the daily horoscope copy.
pub struct TextGenerator<'a> {
    client: &'a GeminiClient,
    prompts: &'a Prompts,
}

impl<'a> TextGenerator<'a> {
    pub fn new(client: &'a GeminiClient, prompts: &'a Prompts) -> Self {
        Self { client, prompts }
    }

    /// Generate and format today's horoscope text for a language.
    ///
    /// One backend call, no retries.
    pub async fn generate(&self, language: Language) -> Result<String> {
        info!("Generating horoscope text in {}", language.display_name());

        let prompt = self.prompts.horoscope.for_language(language);
        let raw = self.client.generate(prompt).await?;

        let formatted = format_response(&raw);
        debug!(
            "Formatted horoscope text: {} -> {} characters",
            raw.len(),
            formatted.len()
        );
        Ok(formatted)
    }
}

/// Fixed default horoscope copy used when generation fails.
///
/// Keeps the title and closing lines the rest of the pipeline expects, with
/// a neutral all-signs body in between.
pub fn fallback_text(language: Language) -> String {
    match language {
        Language::Tamil => "இன்றைய ராசி பலன்கள்:\n\
             பொது பலன்:\n  \
             அனைத்து ராசிகளுக்கும் இன்று நல்ல நாள். புதிய முயற்சிகளுக்கு ஏற்ற நேரம்.\n\
             இது போல தினசரி ராசி பலன்கள் தெரிந்துகொள்ள like, share, subscribe மற்றும் comment செய்யுங்கள்."
            .to_string(),
        Language::English => "Today's horoscope results:\n\
             General outlook:\n  \
             A favorable day for all zodiac signs. A good time for new beginnings and\n  \
             steady progress in ongoing work.\n\
             To know daily horoscope results do like, share, subscribe and comment."
            .to_string(),
        Language::Hindi => "आज का राशिफल परिणाम:\n\
             सामान्य फल:\n  \
             सभी राशियों के लिए आज का दिन शुभ है. नए कार्यों की शुरुआत के लिए अच्छा समय.\n\
             ऐसे जानें दैनिक राशिफल परिणाम like, share, subscribe और comment इसे करें."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_carries_markers() {
        for lang in Language::ALL {
            let text = fallback_text(lang);
            let lines: Vec<&str> = text.lines().collect();
            assert!(format::is_title_line(lines[0]), "bad title for {:?}", lang);
            assert!(
                format::is_closing_line(lines[lines.len() - 1]),
                "bad closing for {:?}",
                lang
            );
        }
    }
}
