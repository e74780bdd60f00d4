//! Prompt templates for text inference

use crate::types::InferenceMode;

/// Prompt prefix for a mode
pub fn template(mode: InferenceMode) -> &'static str {
    match mode {
        InferenceMode::Basic => "Analyze the following data: ",
        InferenceMode::Advanced => "Perform advanced analysis: ",
    }
}

/// Build the prompt from at most `char_limit` characters of `text`
pub fn build_prompt(mode: InferenceMode, text: &str, char_limit: usize) -> String {
    let excerpt: String = text.chars().take(char_limit).collect();
    format!("{}{}", template(mode), excerpt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates() {
        assert_eq!(
            build_prompt(InferenceMode::Basic, "sales rose", 500),
            "Analyze the following data: sales rose"
        );
        assert_eq!(
            build_prompt(InferenceMode::Advanced, "sales rose", 500),
            "Perform advanced analysis: sales rose"
        );
    }

    #[test]
    fn test_excerpt_limited_by_chars() {
        let text = "ä".repeat(600);
        let prompt = build_prompt(InferenceMode::Basic, &text, 500);
        assert_eq!(prompt.chars().count(), template(InferenceMode::Basic).len() + 500);
    }
}
