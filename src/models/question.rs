use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: Option<i64>,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    pub correct_answer: Vec<String>,
    #[serde(default = "default_max_score")]
    pub max_score: Decimal,
    /// Media URL served by the backend; uploads travel as separate multipart
    /// parts, never inline here.
    #[serde(default)]
    pub image: Option<String>,
}

fn default_max_score() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    ShortAnswer,
    TrueFalse,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::TrueFalse => "true_false",
        }
    }
}
