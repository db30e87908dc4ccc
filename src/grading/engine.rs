// src/grading/engine.rs

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::comparator::compare;
use crate::models::question::{Answer, Question};

/// Minimum score ratio required to pass when nothing else is configured.
pub const DEFAULT_PASSING_THRESHOLD: f64 = 0.7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GradeError {
    #[error("cannot grade a test with no questions")]
    NoQuestions,
}

/// One submitted answer, kept verbatim for the attempt record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: String,
    #[serde(default)]
    pub answer: Option<Answer>,
}

/// Outcome for one submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeDetail {
    pub question_id: String,
    pub correct: bool,
    pub user_answer: Option<Answer>,
    /// Only revealed for mistakes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<Answer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeResult {
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub passed: bool,
    pub detailed_results: Vec<GradeDetail>,
}

/// Grades `submitted` against `questions`.
///
/// Only submitted answers produce detail rows, in submission order. Answers
/// for unknown question ids are graded as incorrect rather than rejected, and
/// each question is credited at most once, so `score <= max_score` holds for
/// any submission.
pub fn grade(
    submitted: &[SubmittedAnswer],
    questions: &[Question],
    passing_threshold: f64,
) -> Result<GradeResult, GradeError> {
    if questions.is_empty() {
        return Err(GradeError::NoQuestions);
    }
    let max_score = u32::try_from(questions.len()).map_err(|_| GradeError::NoQuestions)?;

    let correct_lookup: HashMap<&str, Option<&Answer>> = questions
        .iter()
        .map(|q| (q.question_id.as_str(), q.correct_answer.as_ref()))
        .collect();

    let mut credited: HashSet<&str> = HashSet::new();
    let mut score = 0u32;
    let mut detailed_results = Vec::with_capacity(submitted.len());

    for answer in submitted {
        let correct_answer = correct_lookup
            .get(answer.question_id.as_str())
            .copied()
            .flatten();

        let is_correct = compare(answer.answer.as_ref(), correct_answer)
            && credited.insert(answer.question_id.as_str());

        if is_correct {
            score += 1;
        }

        detailed_results.push(GradeDetail {
            question_id: answer.question_id.clone(),
            correct: is_correct,
            user_answer: answer.answer.clone(),
            correct_answer: if is_correct {
                None
            } else {
                correct_answer.cloned()
            },
        });
    }

    let ratio = f64::from(score) / f64::from(max_score);

    Ok(GradeResult {
        score,
        max_score,
        percentage: score * 100 / max_score,
        passed: ratio >= passing_threshold,
        detailed_results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn question(id: &str, correct: Option<Answer>) -> Question {
        Question {
            question_id: id.to_string(),
            correct_answer: correct,
            prompt: Map::new(),
        }
    }

    fn text_questions(n: usize) -> Vec<Question> {
        (1..=n)
            .map(|i| question(&format!("q{i}"), Some(Answer::Text("A".into()))))
            .collect()
    }

    fn answer(id: &str, value: &str) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id: id.to_string(),
            answer: Some(Answer::Text(value.to_string())),
        }
    }

    #[test]
    fn empty_question_set_is_rejected() {
        let result = grade(&[answer("q1", "A")], &[], DEFAULT_PASSING_THRESHOLD);
        assert_eq!(result, Err(GradeError::NoQuestions));
    }

    #[test]
    fn passes_exactly_at_threshold() {
        let questions = text_questions(10);
        let submitted: Vec<_> = (1..=10)
            .map(|i| answer(&format!("q{i}"), if i <= 7 { "A" } else { "B" }))
            .collect();

        let result = grade(&submitted, &questions, 0.7).unwrap();
        assert_eq!(result.score, 7);
        assert_eq!(result.max_score, 10);
        assert_eq!(result.percentage, 70);
        assert!(result.passed);
    }

    #[test]
    fn fails_just_below_threshold() {
        let questions = text_questions(10);
        let submitted: Vec<_> = (1..=6).map(|i| answer(&format!("q{i}"), "A")).collect();

        let result = grade(&submitted, &questions, 0.7).unwrap();
        assert_eq!(result.score, 6);
        assert!(!result.passed);
    }

    #[test]
    fn percentage_truncates() {
        let questions = text_questions(3);
        let submitted = vec![answer("q1", "A"), answer("q2", "A"), answer("q3", "B")];

        let result = grade(&submitted, &questions, 0.7).unwrap();
        assert_eq!(result.percentage, 66);
        assert!(!result.passed);
    }

    #[test]
    fn details_reveal_correct_answer_only_for_mistakes() {
        let questions = text_questions(2);
        let submitted = vec![answer("q1", "a"), answer("q2", "B")];

        let result = grade(&submitted, &questions, 0.7).unwrap();
        assert_eq!(result.detailed_results.len(), 2);

        let right = &result.detailed_results[0];
        assert!(right.correct);
        assert!(right.correct_answer.is_none());

        let wrong = &result.detailed_results[1];
        assert!(!wrong.correct);
        assert_eq!(wrong.correct_answer, Some(Answer::Text("A".into())));
        assert_eq!(wrong.user_answer, Some(Answer::Text("B".into())));
    }

    #[test]
    fn unknown_question_ids_are_graded_incorrect() {
        let questions = text_questions(2);
        let submitted = vec![answer("q1", "A"), answer("nope", "A")];

        let result = grade(&submitted, &questions, 0.7).unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(result.detailed_results[1].question_id, "nope");
        assert!(!result.detailed_results[1].correct);
        assert!(result.detailed_results[1].correct_answer.is_none());
    }

    #[test]
    fn unanswered_questions_produce_no_detail_rows() {
        let questions = text_questions(4);
        let result = grade(&[answer("q2", "A")], &questions, 0.7).unwrap();

        assert_eq!(result.score, 1);
        assert_eq!(result.max_score, 4);
        assert_eq!(result.percentage, 25);
        assert_eq!(result.detailed_results.len(), 1);
    }

    #[test]
    fn repeated_question_is_credited_once() {
        let questions = text_questions(2);
        let submitted = vec![answer("q1", "A"), answer("q1", "A"), answer("q1", "A")];

        let result = grade(&submitted, &questions, 0.7).unwrap();
        assert_eq!(result.score, 1);
        assert!(result.score <= result.max_score);
        assert!(result.detailed_results[0].correct);
        assert!(!result.detailed_results[1].correct);
        assert!(!result.detailed_results[2].correct);
    }

    #[test]
    fn details_follow_submission_order() {
        let questions = text_questions(3);
        let submitted = vec![answer("q3", "A"), answer("q1", "A")];

        let result = grade(&submitted, &questions, 0.7).unwrap();
        let ids: Vec<_> = result
            .detailed_results
            .iter()
            .map(|d| d.question_id.as_str())
            .collect();
        assert_eq!(ids, ["q3", "q1"]);
    }

    #[test]
    fn score_and_percentage_invariants_hold() {
        let questions = text_questions(7);
        for correct in 0..=7 {
            let submitted: Vec<_> = (1..=7)
                .map(|i| answer(&format!("q{i}"), if i <= correct { "A" } else { "x" }))
                .collect();
            let result = grade(&submitted, &questions, 0.7).unwrap();
            assert!(result.score <= result.max_score);
            assert_eq!(result.percentage, 100 * result.score / result.max_score);
            assert_eq!(
                result.passed,
                f64::from(result.score) / f64::from(result.max_score) >= 0.7
            );
        }
    }
}
