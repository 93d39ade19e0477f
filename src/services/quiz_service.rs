use crate::dto::quiz_dto::{
    QuizPayload, ScoreUpdateRequest, SubmitAnswerRequest, SubmitAnswerResponse, UpdateQuizResponse,
};
use crate::error::Result;
use crate::http::{AuthHttp, FilePart, FormPayload};
use crate::models::quiz::{AssignedQuestion, QuizDetail, QuizResultRow, QuizSummary, StudentQuizSummary};
use crate::utils::validation::validate;

#[derive(Clone)]
pub struct QuizService {
    http: AuthHttp,
}

impl QuizService {
    pub fn new(http: AuthHttp) -> Self {
        Self { http }
    }

    // ── Faculty operations ──

    /// Create a quiz. Questions travel as a JSON string field and images as
    /// separate `images` parts, in question order.
    pub async fn create_quiz(&self, payload: &QuizPayload) -> Result<QuizSummary> {
        payload.validate_all()?;
        tracing::info!(title = %payload.title, course_id = %payload.course_id, "creating quiz");
        let form = build_quiz_form(payload)?;
        self.http.post_form("/quiz/create/", form).await
    }

    pub async fn faculty_quizzes(&self) -> Result<Vec<QuizSummary>> {
        self.http.get_json("/quiz/faculty/quizzes/").await
    }

    pub async fn quiz_detail(&self, quiz_id: i64) -> Result<QuizDetail> {
        self.http
            .get_json(&format!("/quiz/quiz/{}/", quiz_id))
            .await
    }

    pub async fn update_quiz(
        &self,
        quiz_id: i64,
        payload: &QuizPayload,
    ) -> Result<UpdateQuizResponse> {
        payload.validate_all()?;
        tracing::info!(quiz_id, "updating quiz");
        let form = build_quiz_form(payload)?;
        self.http
            .put_form(&format!("/quiz/quiz/{}/", quiz_id), form)
            .await
    }

    pub async fn delete_quiz(&self, quiz_id: i64) -> Result<()> {
        tracing::info!(quiz_id, "deleting quiz");
        self.http
            .delete(&format!("/quiz/quiz/{}/delete/", quiz_id))
            .await
    }

    /// Per-student, per-question results for a quiz the caller created.
    /// Students get only their own rows back from the same endpoint.
    pub async fn quiz_results(&self, quiz_id: i64) -> Result<Vec<QuizResultRow>> {
        self.http
            .get_json(&format!("/quiz/quiz/{}/results/", quiz_id))
            .await
    }

    /// Manually score one answered assignment (short answers have no
    /// auto-grading).
    pub async fn update_question_score(&self, assignment_id: i64, score: f64) -> Result<()> {
        let payload = ScoreUpdateRequest { score };
        validate(&payload)?;
        let _: serde_json::Value = self
            .http
            .put_json(&format!("/quiz/assignment/{}/score/", assignment_id), &payload)
            .await?;
        Ok(())
    }

    // ── Student operations ──

    pub async fn student_quizzes(&self) -> Result<Vec<StudentQuizSummary>> {
        self.http.get_json("/quiz/student/quizzes/").await
    }

    /// The questions assigned to the calling student for one quiz.
    pub async fn quiz_questions(&self, quiz_id: i64) -> Result<Vec<AssignedQuestion>> {
        self.http
            .get_json(&format!("/quiz/student/quiz/{}/questions/", quiz_id))
            .await
    }

    /// Submit the answer for one assigned question. The backend rejects a
    /// second submission for the same assignment.
    pub async fn submit_answer(
        &self,
        assignment_id: i64,
        answer: &str,
    ) -> Result<SubmitAnswerResponse> {
        let payload = SubmitAnswerRequest {
            answer: answer.to_string(),
        };
        validate(&payload)?;
        self.http
            .post_json(
                &format!("/quiz/student/assignment/{}/submit/", assignment_id),
                &payload,
            )
            .await
    }
}

fn build_quiz_form(payload: &QuizPayload) -> Result<FormPayload> {
    let mut form = FormPayload::default()
        .text("title", payload.title.clone())
        .text("course_id", payload.course_id.clone())
        .text("topic", payload.topic.clone())
        .text("difficulty", payload.difficulty.as_str())
        .text(
            "questions_per_student",
            payload.questions_per_student.to_string(),
        )
        .text("questions", serde_json::to_string(&payload.questions)?);

    if let Some(schedule) = &payload.schedule {
        if let Some(start) = schedule.scheduled_start_time {
            form = form.text("scheduled_start_time", start.to_rfc3339());
        }
        if let Some(end) = schedule.scheduled_end_time {
            form = form.text("scheduled_end_time", end.to_rfc3339());
        }
        if let Some(limit) = schedule.time_limit_minutes {
            form = form.text("time_limit_minutes", limit.to_string());
        }
        form = form.text("is_scheduled", schedule.is_scheduled.to_string());
    }

    for question in &payload.questions {
        if let Some(image) = &question.image {
            form = form.file(FilePart {
                field: "images".to_string(),
                file_name: image.file_name.clone(),
                content_type: image.content_type().to_string(),
                data: image.data.clone(),
            });
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::quiz_dto::{ImageUpload, NewQuestion};
    use crate::models::question::QuestionType;
    use crate::models::quiz::Difficulty;
    use bytes::Bytes;
    use rust_decimal::Decimal;

    #[test]
    fn quiz_form_carries_questions_as_json_and_images_as_parts() {
        let payload = QuizPayload {
            title: "Unit 1".into(),
            course_id: "CS101".into(),
            topic: "Ownership".into(),
            difficulty: Difficulty::Medium,
            questions_per_student: 1,
            questions: vec![NewQuestion {
                text: "What does Drop do?".into(),
                question_type: QuestionType::ShortAnswer,
                options: None,
                correct_answer: vec!["runs destructors".into()],
                max_score: Decimal::from(2),
                image: Some(ImageUpload {
                    file_name: "diagram.png".into(),
                    data: Bytes::from_static(b"\x89PNG"),
                }),
            }],
            schedule: None,
        };

        let form = build_quiz_form(&payload).expect("form");

        let questions_json = form
            .fields
            .iter()
            .find(|(name, _)| name == "questions")
            .map(|(_, value)| value.clone())
            .expect("questions field");
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&questions_json).expect("json");
        assert_eq!(parsed[0]["type"], "short_answer");
        assert!(parsed[0].get("image").is_none());

        assert_eq!(form.files.len(), 1);
        assert_eq!(form.files[0].field, "images");
        assert_eq!(form.files[0].content_type, "image/png");
    }
}
