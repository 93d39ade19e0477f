use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One scored row from the rankings endpoint. Produced by the backend,
/// read-only on the client; scores arrive as decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingRow {
    pub id: i64,
    pub student: Uuid,
    pub quiz: i64,
    pub total_score: Decimal,
    pub max_possible_score: Decimal,
    #[serde(default)]
    pub rank: Option<i64>,
    #[serde(default)]
    pub percentile: Option<Decimal>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub student_roll_no: Option<String>,
    #[serde(default)]
    pub quiz_title: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub time_taken: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Class-wide aggregates for one quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassPerformance {
    pub quiz: i64,
    pub average_score: Decimal,
    pub highest_score: Decimal,
    pub lowest_score: Decimal,
    pub total_students: i64,
    pub completed_students: i64,
}
