//! Defensive parsing of style-direction labels.
//!
//! Phase one of the pipeline asks the model for a JSON array of three style
//! names. Models wrap such output in prose or fences often enough that the
//! fallback path here is a first-class, tested branch, not an edge case.

use crate::session::ARTIFACTS_PER_SESSION;

/// Labels used when the model's output cannot be parsed at all.
pub const FALLBACK_STYLES: [&str; ARTIFACTS_PER_SESSION] =
    ["Researcher Alpha", "The Security Node", "The Infinite Roadmap"];

/// Label used to pad a parsed array with fewer than three entries.
pub const DEFAULT_LABEL: &str = "My Portfolio View";

/// Parse the model's style-direction output into exactly three labels.
///
/// Extraction is best-effort: take the first `[` through the last `]` and
/// parse that substring as a JSON array of strings. A successful parse is
/// truncated/padded to three entries (padding with [`DEFAULT_LABEL`]); any
/// failure yields [`FALLBACK_STYLES`].
#[must_use]
pub fn parse_style_labels(raw: &str) -> Vec<String> {
    match extract_json_array(raw) {
        Some(mut labels) => {
            labels.truncate(ARTIFACTS_PER_SESSION);
            while labels.len() < ARTIFACTS_PER_SESSION {
                labels.push(DEFAULT_LABEL.to_string());
            }
            labels
        }
        None => FALLBACK_STYLES.iter().map(ToString::to_string).collect(),
    }
}

/// Extract and parse the first bracketed JSON array substring.
fn extract_json_array(raw: &str) -> Option<Vec<String>> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end < start {
        return None;
    }
    serde_json::from_str::<Vec<String>>(&raw[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_array_parses_exactly() {
        let labels = parse_style_labels(r#"["A","B","C"]"#);
        assert_eq!(labels, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_array_embedded_in_prose_is_extracted() {
        let raw = "Sure! Here are your directions:\n```json\n[\"Neon\", \"Mono\", \"Terminal\"]\n```\nEnjoy.";
        let labels = parse_style_labels(raw);
        assert_eq!(labels, vec!["Neon", "Mono", "Terminal"]);
    }

    #[test]
    fn test_malformed_output_falls_back() {
        let labels = parse_style_labels("I refuse to answer in JSON.");
        assert_eq!(labels, FALLBACK_STYLES.map(String::from).to_vec());

        let labels = parse_style_labels("[not, valid, json]");
        assert_eq!(labels, FALLBACK_STYLES.map(String::from).to_vec());

        let labels = parse_style_labels("");
        assert_eq!(labels, FALLBACK_STYLES.map(String::from).to_vec());
    }

    #[test]
    fn test_non_string_elements_fall_back() {
        let labels = parse_style_labels("[1, 2, 3]");
        assert_eq!(labels, FALLBACK_STYLES.map(String::from).to_vec());
    }

    #[test]
    fn test_short_array_is_padded() {
        let labels = parse_style_labels(r#"["Only One"]"#);
        assert_eq!(labels, vec!["Only One", DEFAULT_LABEL, DEFAULT_LABEL]);

        let labels = parse_style_labels("[]");
        assert_eq!(labels, vec![DEFAULT_LABEL; 3]);
    }

    #[test]
    fn test_long_array_is_truncated() {
        let labels = parse_style_labels(r#"["A","B","C","D","E"]"#);
        assert_eq!(labels, vec!["A", "B", "C"]);
    }
}
