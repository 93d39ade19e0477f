use crate::models::performance::RankingRow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizPerformanceEntry {
    pub quiz_id: i64,
    pub quiz_title: Option<String>,
    pub score: Decimal,
    pub max_score: Decimal,
    pub rank: Option<i64>,
    pub percentile: Option<Decimal>,
    pub topic: Option<String>,
    pub course_id: Option<String>,
    pub time_taken: Option<i64>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl From<&RankingRow> for QuizPerformanceEntry {
    fn from(row: &RankingRow) -> Self {
        Self {
            quiz_id: row.quiz,
            quiz_title: row.quiz_title.clone(),
            score: row.total_score,
            max_score: row.max_possible_score,
            rank: row.rank,
            percentile: row.percentile,
            topic: row.topic.clone(),
            course_id: row.course_id.clone(),
            time_taken: row.time_taken,
            submitted_at: row.created_at,
        }
    }
}

/// Aggregated view of one student's quiz history, computed on the client
/// from ranking rows (the backend only serves per-quiz rows).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentPerformanceReport {
    pub student_id: Uuid,
    pub student_name: Option<String>,
    pub student_roll_no: Option<String>,
    pub quiz_performances: Vec<QuizPerformanceEntry>,
    pub total_quizzes: usize,
    pub average_score: Decimal,
    pub highest_score: Decimal,
    pub lowest_score: Decimal,
    pub rank: Option<i64>,
    pub percentile: Option<Decimal>,
}

impl StudentPerformanceReport {
    /// Fold the given rankings down to the rows belonging to `student_id`.
    /// An empty report (all zeros) is returned when the student has no rows,
    /// matching how the dashboard renders a student with no attempts yet.
    pub fn from_rankings(student_id: Uuid, rankings: &[RankingRow]) -> Self {
        let rows: Vec<&RankingRow> = rankings.iter().filter(|r| r.student == student_id).collect();

        let entries: Vec<QuizPerformanceEntry> =
            rows.iter().map(|row| QuizPerformanceEntry::from(*row)).collect();

        let scores: Vec<Decimal> = entries.iter().map(|e| e.score).collect();
        let total = scores.len();
        let average = if total == 0 {
            Decimal::ZERO
        } else {
            scores.iter().copied().sum::<Decimal>() / Decimal::from(total as u64)
        };

        let latest = rows
            .iter()
            .max_by_key(|row| row.created_at.unwrap_or(DateTime::<Utc>::MIN_UTC));

        Self {
            student_id,
            student_name: latest.and_then(|row| row.student_name.clone()),
            student_roll_no: latest.and_then(|row| row.student_roll_no.clone()),
            total_quizzes: total,
            average_score: average.round_dp(2),
            highest_score: scores.iter().copied().max().unwrap_or(Decimal::ZERO),
            lowest_score: scores.iter().copied().min().unwrap_or(Decimal::ZERO),
            rank: latest.and_then(|row| row.rank),
            percentile: latest.and_then(|row| row.percentile),
            quiz_performances: entries,
        }
    }
}
