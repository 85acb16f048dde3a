//! Line-oriented reformatting of the raw backend response.
//!
//! The backend is instructed to emit a title line, one "sign: summary" line
//! per zodiac sign, and a closing call-to-action line. This module re-lays
//! that out for narration: labels on their own line, bodies wrapped and
//! indented. Purely textual, no error conditions.

/// Title lines the prompt pins for each language.
const TITLE_MARKERS: [&str; 3] = [
    "இன்றைய ராசி பலன்கள்:",
    "Today's horoscope results:",
    "आज का राशिफल परिणाम:",
];

/// Closing call-to-action markers for each language.
const CLOSING_MARKERS: [&str; 3] = [
    "இது போல தினசரி ராசி பலன்கள்",
    "To know daily horoscope results",
    "ऐसे जानें दैनिक राशिफल",
];

/// Wrap column for sign bodies, counting the indent.
const WRAP_WIDTH: usize = 75;

/// Indent prefixed to wrapped body lines.
const BODY_INDENT: &str = "  ";

/// True if the line is one of the known per-language title lines.
pub fn is_title_line(line: &str) -> bool {
    TITLE_MARKERS.iter().any(|m| line.starts_with(m))
}

/// True if the line is one of the known closing call-to-action lines.
pub fn is_closing_line(line: &str) -> bool {
    CLOSING_MARKERS.iter().any(|m| line.contains(m))
}

/// Reformat a raw backend response into the narration layout.
///
/// Title and closing lines pass through unchanged. Lines with an interior
/// colon are split on the first colon into a `label:` line and an indented,
/// wrapped body. Colon-free lines pass through. Blank lines are dropped.
pub fn format_response(text: &str) -> String {
    let mut formatted_lines: Vec<String> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if is_title_line(line) || is_closing_line(line) {
            formatted_lines.push(line.to_string());
            continue;
        }

        // Split only on the first colon to preserve colons in the body.
        match line.split_once(':') {
            Some((label, body)) if !line.trim().ends_with(':') => {
                formatted_lines.push(format!("{}:", label.trim()));
                formatted_lines.extend(wrap_indented(body.trim(), WRAP_WIDTH, BODY_INDENT));
            }
            _ => formatted_lines.push(line.to_string()),
        }
    }

    formatted_lines.join("\n")
}

/// Greedy word wrap with a fixed indent, counting the indent in the width.
fn wrap_indented(text: &str, width: usize, indent: &str) -> Vec<String> {
    let content_width = width.saturating_sub(indent.chars().count());
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();

        if !current.is_empty() && current_len + 1 + word_len > content_width {
            lines.push(format!("{}{}", indent, current));
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(format!("{}{}", indent, current));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_lines_pass_through() {
        for marker in TITLE_MARKERS {
            let out = format_response(marker);
            assert_eq!(out, marker);
        }
    }

    #[test]
    fn test_closing_lines_pass_through() {
        let line = "To know daily horoscope results do like, share, subscribe and comment.";
        assert_eq!(format_response(line), line);
    }

    #[test]
    fn test_sign_line_split_and_wrapped() {
        let input = "Aries: A strong day for finances. Expect gains around ₹14588 and avoid major purchases after sunset.";
        let out = format_response(input);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Aries:");
        assert!(lines.len() >= 2);
        for body in &lines[1..] {
            assert!(body.starts_with("  "));
            assert!(body.chars().count() <= 75, "line too long: {}", body);
        }
        // Only the first colon splits; content colons survive.
        let rejoined: String = lines[1..].join(" ");
        assert!(rejoined.contains("₹14588"));
    }

    #[test]
    fn test_first_colon_only() {
        let input = "Leo: Lucky time: 10:30 AM onwards.";
        let out = format_response(input);
        assert!(out.starts_with("Leo:\n"));
        assert!(out.contains("10:30"));
    }

    #[test]
    fn test_colon_at_line_end_passes_through() {
        let input = "Some heading:";
        assert_eq!(format_response(input), "Some heading:");
    }

    #[test]
    fn test_blank_lines_dropped() {
        let input = "Today's horoscope results:\n\n\nVirgo: Calm day.\n\n";
        let out = format_response(input);
        assert!(!out.contains("\n\n"));
    }

    #[test]
    fn test_no_colon_line_passes_through() {
        let input = "A plain remark without structure";
        assert_eq!(format_response(input), input);
    }

    #[test]
    fn test_no_line_silently_dropped() {
        // Every non-blank input line must surface as a title, closing, label,
        // wrapped body, or passthrough line.
        let input = "Today's horoscope results:\nAries: Good day ahead.\nno colon here\nTo know daily horoscope results do like, share, subscribe and comment.";
        let out = format_response(input);
        assert!(out.contains("Today's horoscope results:"));
        assert!(out.contains("Aries:"));
        assert!(out.contains("Good day ahead."));
        assert!(out.contains("no colon here"));
        assert!(out.contains("To know daily horoscope results"));
    }

    #[test]
    fn test_all_languages_markers_recognized() {
        for marker in TITLE_MARKERS {
            assert!(is_title_line(marker));
        }
        for marker in CLOSING_MARKERS {
            assert!(is_closing_line(&format!("{} extra", marker)));
        }
    }

    #[test]
    fn test_wrap_indented_width() {
        let text = "word ".repeat(40);
        let lines = wrap_indented(&text, 75, "  ");
        for line in &lines {
            assert!(line.chars().count() <= 75);
            assert!(line.starts_with("  "));
        }
    }
}
