//! Canonical persisted form of a raw answer.

use crate::features::forms::models::Question;

/// Format `raw` for storage according to the question's type.
///
/// Choice questions, and any question carrying options, store a JSON array
/// of the matched option ids in the order the tokens appear in `raw`. When
/// no token matches an option the raw answer is stored unchanged. Other
/// questions store the raw text.
pub fn format_answer(question: &Question, raw: Option<&str>) -> String {
    let raw = raw.unwrap_or("");

    if !question.kind().is_choice() && question.options.is_empty() {
        return raw.to_string();
    }

    let matched: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter_map(|token| {
            question
                .options
                .iter()
                .find(|option| option.value == token)
                .map(|option| option.id.as_str())
        })
        .collect();

    if matched.is_empty() {
        return raw.to_string();
    }

    // Serializing a list of strings cannot fail
    serde_json::to_string(&matched).unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::forms::models::QuestionOption;

    fn question(question_type: &str, options: &[(&str, &str)]) -> Question {
        Question {
            id: "q1".to_string(),
            text: "Pick".to_string(),
            question_type: question_type.to_string(),
            required: false,
            options: options
                .iter()
                .map(|(id, value)| QuestionOption {
                    id: id.to_string(),
                    value: value.to_string(),
                })
                .collect(),
            description: None,
            description_enabled: false,
        }
    }

    fn three_options(question_type: &str) -> Question {
        question(
            question_type,
            &[
                ("opt1", "Option 1"),
                ("opt2", "Option 2"),
                ("opt3", "Option 3"),
            ],
        )
    }

    #[test]
    fn test_text_answer_is_unchanged() {
        let q = question("text", &[]);
        assert_eq!(format_answer(&q, Some("  hello, world ")), "  hello, world ");
        assert_eq!(format_answer(&q, None), "");
    }

    #[test]
    fn test_unrecognized_type_without_options_is_unchanged() {
        let q = question("rating", &[]);
        assert_eq!(format_answer(&q, Some("5")), "5");
    }

    #[test]
    fn test_checkbox_matches_option_ids() {
        let q = three_options("checkbox");
        assert_eq!(
            format_answer(&q, Some("Option 1, Option 2")),
            r#"["opt1","opt2"]"#
        );
    }

    #[test]
    fn test_order_follows_raw_answer() {
        let q = three_options("checkbox");
        assert_eq!(
            format_answer(&q, Some("Option 3,Option 1")),
            r#"["opt3","opt1"]"#
        );
    }

    #[test]
    fn test_unmatched_tokens_are_skipped() {
        let q = three_options("checkbox");
        assert_eq!(
            format_answer(&q, Some("Option 2, Nope")),
            r#"["opt2"]"#
        );
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let q = three_options("radio");
        assert_eq!(format_answer(&q, Some("option 1")), "option 1");
    }

    #[test]
    fn test_radio_without_match_falls_back_to_raw() {
        let q = question("radio", &[("opt1", "Option 1")]);
        assert_eq!(format_answer(&q, Some("Unknown Option")), "Unknown Option");
    }

    #[test]
    fn test_lone_comma_falls_back_to_raw() {
        let q = three_options("checkbox");
        assert_eq!(format_answer(&q, Some(",")), ",");
    }

    #[test]
    fn test_any_question_with_options_is_formatted() {
        let q = question("text", &[("yes", "Yes"), ("no", "No")]);
        assert_eq!(format_answer(&q, Some("No")), r#"["no"]"#);
    }

    #[test]
    fn test_option_without_id_contributes_empty_string() {
        let q = question("checkbox", &[("", "Blank id"), ("opt2", "Option 2")]);
        assert_eq!(
            format_answer(&q, Some("Blank id, Option 2")),
            r#"["","opt2"]"#
        );
    }

    #[test]
    fn test_formatting_is_repeatable() {
        let q = three_options("checkbox");
        let first = format_answer(&q, Some("Option 2, Option 1"));
        let second = format_answer(&q, Some("Option 2, Option 1"));
        assert_eq!(first, second);
    }
}
