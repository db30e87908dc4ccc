// src/grading/comparator.rs

use serde_json::Number;

use crate::models::question::Answer;

/// Compares one submitted answer against the correct answer.
///
/// The shape of the *correct* answer picks the rule:
/// * multi-select: the submission must be a multi-select with the same
///   elements, order ignored (duplicates count);
/// * text: the submission is coerced to text, then compared trimmed and
///   case-insensitively;
/// * boolean / number: exact equality after normalizing the submission to
///   the same type;
/// * no correct answer, or an answer of an unknown shape: never correct.
pub fn compare(submitted: Option<&Answer>, correct: Option<&Answer>) -> bool {
    let (Some(submitted), Some(correct)) = (submitted, correct) else {
        return false;
    };

    match correct {
        Answer::MultiSelect(expected) => match submitted {
            Answer::MultiSelect(given) => same_elements(given, expected),
            _ => false,
        },
        Answer::Text(expected) => submitted
            .as_text()
            .is_some_and(|given| normalize_text(&given) == normalize_text(expected)),
        Answer::Bool(expected) => as_bool(submitted) == Some(*expected),
        Answer::Number(expected) => match (as_f64(submitted), expected.as_f64()) {
            (Some(given), Some(expected)) => given == expected,
            _ => false,
        },
        Answer::Other(_) => false,
    }
}

fn same_elements(given: &[String], expected: &[String]) -> bool {
    if given.len() != expected.len() {
        return false;
    }
    let mut given: Vec<&str> = given.iter().map(String::as_str).collect();
    let mut expected: Vec<&str> = expected.iter().map(String::as_str).collect();
    given.sort_unstable();
    expected.sort_unstable();
    given == expected
}

fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}

fn as_bool(answer: &Answer) -> Option<bool> {
    match answer {
        Answer::Bool(b) => Some(*b),
        Answer::Text(s) => match normalize_text(s).as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_f64(answer: &Answer) -> Option<f64> {
    match answer {
        Answer::Number(n) => n.as_f64(),
        Answer::Text(s) => s.trim().parse::<Number>().ok()?.as_f64(),
        _ => None,
    }
}
