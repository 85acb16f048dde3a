//! Upload metadata generation (title, description, tags).
//!
//! Three backend calls per run. Any failure downgrades all three fields to a
//! fixed default set, so the upload can still proceed.

use crate::config::{Prompts, UploadSettings};
use crate::error::{RasiError, Result};
use crate::gemini::GeminiClient;
use crate::language::Language;
use std::collections::HashMap;
use tracing::{info, warn};

/// Hosting platform's cumulative tag character budget.
pub const TAG_CHAR_BUDGET: usize = 499;

/// Candidate tags longer than this are discarded outright.
pub const MAX_TAG_CHARS: usize = 10;

/// Metadata attached to an uploaded video.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Generator for upload metadata.
pub struct MetadataGenerator<'a> {
    client: &'a GeminiClient,
    prompts: &'a Prompts,
    upload: &'a UploadSettings,
}

impl<'a> MetadataGenerator<'a> {
    pub fn new(client: &'a GeminiClient, prompts: &'a Prompts, upload: &'a UploadSettings) -> Self {
        Self {
            client,
            prompts,
            upload,
        }
    }

    /// Generate title, description and tags for a run.
    ///
    /// Backend failures are recoverable: the fixed default set is returned
    /// instead. The tag budget is enforced in both paths.
    pub async fn generate(&self, language: Language) -> UploadMetadata {
        let mut metadata = match self.try_generate(language).await {
            Ok(m) => m,
            Err(e) => {
                warn!("Metadata generation failed ({}), using defaults", e);
                fallback_metadata()
            }
        };

        metadata.tags = tags_within_limit(&metadata.tags, TAG_CHAR_BUDGET);
        info!(
            "Upload metadata ready: '{}' with {} tags",
            metadata.title,
            metadata.tags.len()
        );
        metadata
    }

    async fn try_generate(&self, language: Language) -> Result<UploadMetadata> {
        let mut vars = HashMap::new();
        vars.insert("language".to_string(), language.display_name().to_string());
        vars.insert("channel_url".to_string(), self.upload.channel_url.clone());
        vars.insert("playlist_url".to_string(), self.upload.playlist_url.clone());

        let title_prompt = self.prompts.render_with_custom(&self.prompts.metadata.title, &vars);
        let title = self
            .client
            .generate(&title_prompt)
            .await
            .map_err(|e| RasiError::Metadata(e.to_string()))?
            .trim()
            .to_string();
        info!("Generated title: {}", title);

        vars.insert("title".to_string(), title.clone());

        let description_prompt =
            self.prompts.render_with_custom(&self.prompts.metadata.description, &vars);
        let description = self
            .client
            .generate(&description_prompt)
            .await
            .map_err(|e| RasiError::Metadata(e.to_string()))?
            .trim()
            .to_string();
        info!("Generated description: {} characters", description.len());

        let tags_prompt = self.prompts.render_with_custom(&self.prompts.metadata.tags, &vars);
        let tags_text = self
            .client
            .generate(&tags_prompt)
            .await
            .map_err(|e| RasiError::Metadata(e.to_string()))?;
        let tags = parse_tag_list(&tags_text);
        info!("Generated {} candidate tags", tags.len());

        Ok(UploadMetadata {
            title,
            description,
            tags,
        })
    }
}

/// Fixed default metadata for zodiac content.
pub fn fallback_metadata() -> UploadMetadata {
    UploadMetadata {
        title: "Today's Zodiac Horoscope Results - Daily Astrology Predictions".to_string(),
        description: "Get your daily zodiac horoscope predictions and astrology insights. \
                      #Zodiac #Horoscope #Astrology #Daily #Predictions"
            .to_string(),
        tags: vec![
            "Zodiac".to_string(),
            "Horoscope".to_string(),
            "Astrology".to_string(),
            "Daily".to_string(),
            "Predictions".to_string(),
            "Rashifal".to_string(),
        ],
    }
}

/// Parse a textual `["tag1", "tag2", ...]` list out of a backend response.
///
/// Falls back to comma-splitting when the response isn't valid JSON.
pub fn parse_tag_list(text: &str) -> Vec<String> {
    let trimmed = text.trim();

    // Prefer the bracketed slice: models often wrap the list in prose or
    // code fences.
    if let (Some(start), Some(end)) = (trimmed.find('['), trimmed.rfind(']')) {
        if start < end {
            let slice = &trimmed[start..=end];
            if let Ok(tags) = serde_json::from_str::<Vec<String>>(slice) {
                return tags;
            }
        }
    }

    trimmed
        .split(',')
        .map(|s| s.trim_matches(|c: char| c.is_whitespace() || "[]\"'`".contains(c)))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keep the longest prefix of candidates that fits the character budget.
///
/// Tags longer than [`MAX_TAG_CHARS`] are skipped; acceptance stops at the
/// first tag that would push the running total past the budget. Greedy
/// prefix only, no reordering.
pub fn tags_within_limit(candidates: &[String], max_chars: usize) -> Vec<String> {
    let mut accepted = Vec::new();
    let mut current_count = 0;

    for tag in candidates {
        let tag = tag.trim();
        let len = tag.chars().count();
        if tag.is_empty() || len > MAX_TAG_CHARS {
            continue;
        }
        if current_count + len <= max_chars {
            accepted.push(tag.to_string());
            current_count += len;
        } else {
            break;
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_tag_list() {
        let text = r#"["zodiac", "daily", "rashifal"]"#;
        assert_eq!(parse_tag_list(text), vec!["zodiac", "daily", "rashifal"]);
    }

    #[test]
    fn test_parse_tag_list_with_surrounding_prose() {
        let text = "Here are your tags:\n[\"astro\", \"luck\"]\nEnjoy!";
        assert_eq!(parse_tag_list(text), vec!["astro", "luck"]);
    }

    #[test]
    fn test_parse_tag_list_comma_fallback() {
        let text = "zodiac, daily, stars";
        assert_eq!(parse_tag_list(text), vec!["zodiac", "daily", "stars"]);
    }

    #[test]
    fn test_long_tags_discarded() {
        let candidates = vec![
            "short".to_string(),
            "waytoolongtag".to_string(),
            "ok".to_string(),
        ];
        assert_eq!(tags_within_limit(&candidates, 499), vec!["short", "ok"]);
    }

    #[test]
    fn test_budget_is_greedy_prefix() {
        // Budget of 10: "abcd" (4) + "efgh" (4) fit; "ijk" (3) would
        // overflow, and acceptance stops there even though "zz" would fit.
        let candidates = vec![
            "abcd".to_string(),
            "efgh".to_string(),
            "ijk".to_string(),
            "zz".to_string(),
        ];
        assert_eq!(tags_within_limit(&candidates, 10), vec!["abcd", "efgh"]);
    }

    #[test]
    fn test_budget_never_exceeded() {
        let candidates: Vec<String> = (0..200).map(|i| format!("tag{:04}", i)).collect();
        let accepted = tags_within_limit(&candidates, TAG_CHAR_BUDGET);
        let total: usize = accepted.iter().map(|t| t.chars().count()).sum();
        assert!(total <= TAG_CHAR_BUDGET);
        assert!(!accepted.is_empty());
        // Longest achievable prefix: one more tag would overflow.
        let next = &candidates[accepted.len()];
        assert!(total + next.chars().count() > TAG_CHAR_BUDGET);
    }

    #[test]
    fn test_fallback_tags_respect_budget_filter() {
        let metadata = fallback_metadata();
        let trimmed = tags_within_limit(&metadata.tags, TAG_CHAR_BUDGET);
        // "Predictions" is 11 chars and gets filtered out.
        assert!(!trimmed.contains(&"Predictions".to_string()));
        assert!(trimmed.contains(&"Rashifal".to_string()));
    }
}
