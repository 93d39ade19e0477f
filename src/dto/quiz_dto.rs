use crate::models::question::QuestionType;
use crate::models::quiz::{Difficulty, QuizSchedule};
use crate::utils::validation::field_error;
use bytes::Bytes;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// Image attached to a question at creation time. Travels as its own
/// multipart part; the question JSON never embeds the bytes.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub data: Bytes,
}

impl ImageUpload {
    pub async fn from_path(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        let data = tokio::fs::read(path).await?;
        Ok(Self {
            file_name,
            data: Bytes::from(data),
        })
    }

    /// Infer the mime type from the file extension; the backend only stores
    /// common web image formats.
    pub fn content_type(&self) -> &'static str {
        match self
            .file_name
            .rsplit('.')
            .next()
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "application/octet-stream",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewQuestion {
    #[validate(length(min = 1, message = "Question text is required"))]
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: Vec<String>,
    pub max_score: Decimal,
    #[serde(skip)]
    pub image: Option<ImageUpload>,
}

impl NewQuestion {
    /// Cross-field consistency the backend serializer enforces: MCQ answers
    /// must come from the options list, true/false must be exactly one of
    /// "True"/"False".
    fn validate_answers(&self, index: usize) -> Result<(), ValidationErrors> {
        match self.question_type {
            QuestionType::Mcq => {
                let options = self.options.as_deref().unwrap_or_default();
                if options.len() < 2 {
                    return Err(field_error(
                        "questions",
                        "options",
                        &format!("Question {}: MCQ needs at least two options", index + 1),
                    ));
                }
                if self.correct_answer.is_empty() {
                    return Err(field_error(
                        "questions",
                        "correct_answer",
                        &format!("Question {}: correct answer is required", index + 1),
                    ));
                }
                for answer in &self.correct_answer {
                    if !options.contains(answer) {
                        return Err(field_error(
                            "questions",
                            "correct_answer",
                            &format!(
                                "Question {}: correct answer '{}' must be one of the options",
                                index + 1,
                                answer
                            ),
                        ));
                    }
                }
            }
            QuestionType::TrueFalse => {
                if self.correct_answer.len() != 1
                    || !matches!(self.correct_answer[0].as_str(), "True" | "False")
                {
                    return Err(field_error(
                        "questions",
                        "correct_answer",
                        &format!(
                            "Question {}: true/false answer must be exactly 'True' or 'False'",
                            index + 1
                        ),
                    ));
                }
            }
            QuestionType::ShortAnswer => {
                if self.correct_answer.is_empty() {
                    return Err(field_error(
                        "questions",
                        "correct_answer",
                        &format!("Question {}: correct answer is required", index + 1),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Create/update payload for a quiz. Serialized field by field into the
/// multipart form; `questions` goes out as a JSON string.
#[derive(Debug, Clone, Validate)]
pub struct QuizPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 20))]
    pub course_id: String,
    #[validate(length(min = 1, max = 100))]
    pub topic: String,
    pub difficulty: Difficulty,
    #[validate(range(min = 1))]
    pub questions_per_student: u32,
    pub questions: Vec<NewQuestion>,
    pub schedule: Option<QuizSchedule>,
}

impl QuizPayload {
    /// Full local validation before anything is uploaded.
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        if self.questions.is_empty() {
            return Err(field_error(
                "questions",
                "questions",
                "At least one question is required",
            ));
        }
        if self.questions.len() < self.questions_per_student as usize {
            return Err(field_error(
                "questions",
                "questions",
                &format!(
                    "Not enough questions provided. Need at least {} questions.",
                    self.questions_per_student
                ),
            ));
        }
        for (index, question) in self.questions.iter().enumerate() {
            question.validate()?;
            question.validate_answers(index)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, message = "Answer is required"))]
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub message: String,
    pub assignment_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateQuizResponse {
    pub success: bool,
    pub quiz_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoreUpdateRequest {
    #[validate(range(min = 0.0))]
    pub score: f64,
}
