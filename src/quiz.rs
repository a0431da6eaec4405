use crate::api::ValidationIssue;
use crate::config::DEFAULT_QUIZ_QUESTION_COUNT;
use crate::models::QuizQuestion;
use serde::{Deserialize, Serialize};

pub const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizRules {
    pub question_count: usize,
}

impl Default for QuizRules {
    fn default() -> Self {
        Self {
            question_count: DEFAULT_QUIZ_QUESTION_COUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDraft {
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

impl QuizDraft {
    /// Trimmed copy with blank options dropped, as sent to the server.
    pub fn normalized(&self) -> QuizDraft {
        QuizDraft {
            course: self.course.trim().to_string(),
            duration: self.duration,
            questions: self
                .questions
                .iter()
                .map(|q| QuizQuestion {
                    question: q.question.trim().to_string(),
                    options: q
                        .options
                        .iter()
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect(),
                    correct_answer: q.correct_answer.trim().to_string(),
                })
                .collect(),
        }
    }
}

/// Collects every problem with a draft; an empty result means it can be sent.
pub fn validate_quiz(draft: &QuizDraft, rules: QuizRules) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if draft.course.trim().is_empty() {
        issues.push(ValidationIssue::new("course", "course is required"));
    }
    if draft.duration == 0 {
        issues.push(ValidationIssue::new(
            "duration",
            "duration must be greater than 0",
        ));
    }
    if draft.questions.len() != rules.question_count {
        issues.push(ValidationIssue::new(
            "questions",
            format!(
                "exactly {} questions are required, got {}",
                rules.question_count,
                draft.questions.len()
            ),
        ));
    }

    for (i, q) in draft.questions.iter().enumerate() {
        if q.question.trim().is_empty() {
            issues.push(ValidationIssue::new(
                format!("questions.{i}.question"),
                "question text is required",
            ));
        }
        let filled: Vec<&str> = q
            .options
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .collect();
        if filled.len() < MIN_OPTIONS {
            issues.push(ValidationIssue::new(
                format!("questions.{i}.options"),
                format!("at least {MIN_OPTIONS} non-empty options are required"),
            ));
        }
        let answer = q.correct_answer.trim();
        if answer.is_empty() || !filled.contains(&answer) {
            issues.push(ValidationIssue::new(
                format!("questions.{i}.correctAnswer"),
                "correct answer must match one of the options",
            ));
        }
    }

    issues
}
