//! Tolerant decoding of model output into survey questions.
//!
//! Models wrap JSON in code fences, prepend chatter, or drop fields. The parser
//! locates the JSON span, requires a non-empty `questions` array, then fills in
//! whatever each item is missing.

use serde_json::Value;
use thiserror::Error;

use crate::models::survey::SurveyQuestion;

pub const DEFAULT_CATEGORY: &str = "general";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid response format: missing questions array")]
    MissingQuestions,
}

/// Decodes raw model output into a normalized, non-empty question list.
pub fn parse_questions(raw: &str) -> Result<Vec<SurveyQuestion>, ParseError> {
    let value: Value = serde_json::from_str(extract_json_span(raw))?;

    let items = value
        .get("questions")
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .ok_or(ParseError::MissingQuestions)?;

    Ok(normalize_questions(items))
}

/// Picks the JSON candidate out of free-form text. First match wins:
/// a ```` ```json ```` fence, a bare ```` ``` ```` fence, the outermost `{...}`
/// span, and finally the text unchanged.
pub fn extract_json_span(raw: &str) -> &str {
    fenced_block(raw, "```json\n")
        .or_else(|| fenced_block(raw, "```\n"))
        .or_else(|| brace_span(raw))
        .unwrap_or(raw)
}

/// Returns the body between `opener` and the next line that starts with a fence.
fn fenced_block<'a>(text: &'a str, opener: &str) -> Option<&'a str> {
    let start = text.find(opener)? + opener.len();
    let rest = &text[start..];
    let end = rest.find("\n```")?;
    Some(&rest[..end])
}

/// First `{` through last `}`, inclusive.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Fills missing fields: id → 1-based position, question → "Question N",
/// category → "general".
pub fn normalize_questions(items: &[Value]) -> Vec<SurveyQuestion> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let position = index as u32 + 1;
            SurveyQuestion {
                id: item.get("id").and_then(positive_id).unwrap_or(position),
                question: non_empty_str(item.get("question"))
                    .unwrap_or_else(|| format!("Question {position}")),
                category: non_empty_str(item.get("category"))
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            }
        })
        .collect()
}

/// Accepts positive integers and numeric strings; zero counts as missing.
fn positive_id(value: &Value) -> Option<u32> {
    let id = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(id).ok().filter(|id| *id > 0)
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"questions": [
        {"id": 1, "question": "Which services will this hire own?", "category": "skills"},
        {"id": 2, "question": "How is on-call shared?", "category": "culture"}
    ]}"#;

    fn expected() -> Vec<SurveyQuestion> {
        vec![
            SurveyQuestion {
                id: 1,
                question: "Which services will this hire own?".to_string(),
                category: "skills".to_string(),
            },
            SurveyQuestion {
                id: 2,
                question: "How is on-call shared?".to_string(),
                category: "culture".to_string(),
            },
        ]
    }

    #[test]
    fn test_fenced_with_language_tag() {
        let raw = format!("Here you go:\n```json\n{BODY}\n```\nGood luck!");
        assert_eq!(parse_questions(&raw).unwrap(), expected());
    }

    #[test]
    fn test_fenced_without_language_tag() {
        let raw = format!("```\n{BODY}\n```");
        assert_eq!(parse_questions(&raw).unwrap(), expected());
    }

    #[test]
    fn test_bare_json_object() {
        assert_eq!(parse_questions(BODY).unwrap(), expected());
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let raw = format!("Sure! {BODY} Let me know if you need more.");
        assert_eq!(parse_questions(&raw).unwrap(), expected());
    }

    #[test]
    fn test_tagged_fence_wins_over_earlier_braces() {
        let raw = format!("Schema is {{id, question}}.\n```json\n{BODY}\n```");
        assert_eq!(extract_json_span(&raw), BODY);
    }

    #[test]
    fn test_missing_category_defaults_to_general() {
        let raw = r#"{"questions": [{"id": 1, "question": "Remote policy?"}]}"#;
        let questions = parse_questions(raw).unwrap();
        assert_eq!(questions[0].category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_missing_id_defaults_to_position() {
        let raw = r#"{"questions": [
            {"question": "a", "category": "skills"},
            {"question": "b", "category": "team"},
            {"id": 0, "question": "c", "category": "team"}
        ]}"#;
        let ids: Vec<u32> = parse_questions(raw).unwrap().iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_numeric_string_id_is_kept() {
        let raw = r#"{"questions": [{"id": "7", "question": "a", "category": "skills"}]}"#;
        assert_eq!(parse_questions(raw).unwrap()[0].id, 7);
    }

    #[test]
    fn test_missing_question_text_gets_placeholder() {
        let raw = r#"{"questions": [{"id": 1, "category": "skills"}, {"question": "  "}]}"#;
        let questions = parse_questions(raw).unwrap();
        assert_eq!(questions[0].question, "Question 1");
        assert_eq!(questions[1].question, "Question 2");
    }

    #[test]
    fn test_empty_questions_array_is_format_error() {
        assert!(matches!(
            parse_questions(r#"{"questions": []}"#),
            Err(ParseError::MissingQuestions)
        ));
    }

    #[test]
    fn test_missing_questions_key_is_format_error() {
        assert!(matches!(
            parse_questions(r#"{"items": [{"question": "a"}]}"#),
            Err(ParseError::MissingQuestions)
        ));
    }

    #[test]
    fn test_prose_without_json_is_invalid() {
        assert!(matches!(
            parse_questions("I'm sorry, I can't help with that."),
            Err(ParseError::InvalidJson(_))
        ));
    }
}
