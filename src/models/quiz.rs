use crate::models::question::Question;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Faculty dashboard row: a quiz plus class completion counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub course_id: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub total_students: i64,
    #[serde(default)]
    pub completed_students: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizSchedule {
    #[serde(default)]
    pub scheduled_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scheduled_end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_limit_minutes: Option<i64>,
    #[serde(default)]
    pub is_scheduled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDetail {
    pub id: i64,
    pub title: String,
    pub course_id: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub questions_per_student: u32,
    #[serde(default)]
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub total_students: i64,
    #[serde(default)]
    pub completed_students: i64,
    #[serde(flatten)]
    pub schedule: QuizSchedule,
}

/// Student dashboard row: assigned quiz with the caller's own progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentQuizSummary {
    pub id: i64,
    pub title: String,
    pub course_id: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
    pub total_questions: u32,
    pub completed_questions: u32,
    pub is_completed: bool,
}

/// One question as assigned to the calling student. The answer and score are
/// only present once the assignment is completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedQuestion {
    pub assignment_id: i64,
    pub question_text: String,
    pub is_completed: bool,
    #[serde(default)]
    pub student_answer: Option<String>,
    #[serde(default)]
    pub score: Option<Decimal>,
}

/// Per-student, per-question result row in the faculty results view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResultRow {
    pub student_roll_no: String,
    pub student_name: String,
    pub question_text: String,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    pub is_completed: bool,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub score: Option<Decimal>,
}
