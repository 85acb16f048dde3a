//! Prompt templates for Rasi.
//!
//! Prompts can be customized by placing TOML files in the custom prompts
//! directory. The horoscope prompts encode the output layout rules as
//! natural-language instructions to the backend, so the title and closing
//! lines here must stay in sync with the formatter's markers.

use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub horoscope: HoroscopePrompt,
    pub metadata: MetadataPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Per-language prompts for the daily horoscope text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoroscopePrompt {
    pub tamil: String,
    pub english: String,
    pub hindi: String,
}

impl HoroscopePrompt {
    /// The prompt for a given language.
    pub fn for_language(&self, language: Language) -> &str {
        match language {
            Language::Tamil => &self.tamil,
            Language::English => &self.english,
            Language::Hindi => &self.hindi,
        }
    }
}

fn horoscope_prompt(language_name: &str, title_line: &str, closing_line: &str) -> String {
    format!(
        r#"TL;DR: Generate today's Zodiac Result summaries in {language_name} language.

Requirements and rules:
1. Always the first line will be '{title_line}'
2. Generate each zodiac sign summary with a suitable title then : followed by the respective zodiac sign summary
3. Do not use commas in numbers (e.g., use ₹14588 instead of ₹14,588)
4. Generate in plain text without any special characters (**, ##, etc.)
5. Collect maximum possible astragalomancy
6. Start generating astragalomancy immediately without explanations
7. Must end each line with appropriate punctuation (. or , or :)
8. Always the last line will be '{closing_line}'
9. Do not use any other text or comments before or after the Zodiac Result summaries.
10. Generate 5 most important and priority Zodiac Results for each zodiac sign.

Please proceed with generating the Zodiac Result summaries."#
    )
}

impl Default for HoroscopePrompt {
    fn default() -> Self {
        Self {
            tamil: horoscope_prompt(
                "Tamil",
                "இன்றைய ராசி பலன்கள்:",
                "இது போல தினசரி ராசி பலன்கள் தெரிந்துகொள்ள like, share, subscribe மற்றும் comment செய்யுங்கள்.",
            ),
            english: horoscope_prompt(
                "English",
                "Today's horoscope results:",
                "To know daily horoscope results do like, share, subscribe and comment.",
            ),
            hindi: horoscope_prompt(
                "Hindi",
                "आज का राशिफल परिणाम:",
                "ऐसे जानें दैनिक राशिफल परिणाम like, share, subscribe और comment इसे करें.",
            ),
        }
    }
}

/// Prompts for upload metadata generation (title, description, tags).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataPrompts {
    pub title: String,
    pub description: String,
    pub tags: String,
}

impl Default for MetadataPrompts {
    fn default() -> Self {
        Self {
            title: "Give one best catchy attractive youtube title on today's Zodiac Results in {{language}}. Give only one title content no extra text. Include emojis.".to_string(),

            description: r#"Give a best catchy attractive formatted with oneline space youtube description,
with 50 trending # tags in description like #tag1,... , for {{title}}. Use my channel link {{channel_url}} and the playlist link {{playlist_url}}"#.to_string(),

            tags: r#"Give a best trending viral youtube tags formatted like ["tag1", "tag2", ...] for {{title}}.
Give only tags content no extra text. Note that the sum of all tag length that is len(tag1)+len(tag2)+...etc. should be less than 500"#.to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let horoscope_path = custom_path.join("horoscope.toml");
            if horoscope_path.exists() {
                let content = std::fs::read_to_string(&horoscope_path)?;
                prompts.horoscope = toml::from_str(&content)?;
            }

            let metadata_path = custom_path.join("metadata.toml");
            if metadata_path.exists() {
                let content = std::fs::read_to_string(&metadata_path)?;
                prompts.metadata = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.horoscope.tamil.is_empty());
        assert!(!prompts.metadata.title.is_empty());
        // The prompt must pin the title line the formatter recognizes.
        assert!(prompts
            .horoscope
            .english
            .contains("Today's horoscope results:"));
    }

    #[test]
    fn test_prompt_per_language() {
        let prompts = Prompts::default();
        for lang in Language::ALL {
            let p = prompts.horoscope.for_language(lang);
            assert!(p.contains(lang.display_name()));
        }
    }

    #[test]
    fn test_render_template() {
        let template = "Title for {{title}} in {{language}}.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("title".to_string(), "Daily Zodiac".to_string());
        vars.insert("language".to_string(), "Tamil".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Title for Daily Zodiac in Tamil.");
    }
}
