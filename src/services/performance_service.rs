use crate::dto::performance_dto::StudentPerformanceReport;
use crate::error::Result;
use crate::http::AuthHttp;
use crate::models::performance::{ClassPerformance, RankingRow};
use uuid::Uuid;

#[derive(Clone)]
pub struct PerformanceService {
    http: AuthHttp,
}

impl PerformanceService {
    pub fn new(http: AuthHttp) -> Self {
        Self { http }
    }

    /// Scored rows for a quiz, ordered highest score first by the backend.
    pub async fn quiz_rankings(&self, quiz_id: i64) -> Result<Vec<RankingRow>> {
        self.http
            .get_json(&format!("/quiz/quiz/{}/rankings/", quiz_id))
            .await
    }

    pub async fn class_performance(&self, quiz_id: i64) -> Result<ClassPerformance> {
        self.http
            .get_json(&format!("/quiz/quiz/{}/class-performance/", quiz_id))
            .await
    }

    /// The calling student's own performance rows, optionally narrowed to
    /// one quiz.
    pub async fn student_performance(&self, quiz_id: Option<i64>) -> Result<Vec<RankingRow>> {
        let path = match quiz_id {
            Some(id) => format!("/quiz/student/performance/{}/", id),
            None => "/quiz/student/performance/".to_string(),
        };
        self.http.get_json(&path).await
    }

    /// Aggregate one student's rows from a quiz's rankings into the report
    /// the performance detail view shows.
    pub async fn student_report(
        &self,
        quiz_id: i64,
        student_id: Uuid,
    ) -> Result<StudentPerformanceReport> {
        let rankings = self.quiz_rankings(quiz_id).await?;
        Ok(StudentPerformanceReport::from_rankings(student_id, &rankings))
    }
}
