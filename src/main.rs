use lms_client::config::Config;
use lms_client::session::UserType;
use lms_client::LmsClient;
use std::env;
use tracing::info;

/// Smoke client: log in with the credentials from the environment and print
/// the caller's quiz list. Useful for checking connectivity against a
/// running backend.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let client = LmsClient::new(&config)?;

    let roll_no = env::var("LMS_ROLL_NO")
        .map_err(|_| anyhow::anyhow!("LMS_ROLL_NO is required"))?;
    let password = env::var("LMS_PASSWORD")
        .map_err(|_| anyhow::anyhow!("LMS_PASSWORD is required"))?;

    let user_type = client.auth().login(&roll_no, &password).await?;
    info!(user_type = user_type.as_str(), "logged in");

    match user_type {
        UserType::Faculty => {
            let quizzes = client.quizzes().faculty_quizzes().await?;
            println!("{} quizzes created", quizzes.len());
            for quiz in quizzes {
                println!(
                    "#{:<5} {:<40} {:<8} {}/{} completed",
                    quiz.id,
                    quiz.title,
                    quiz.difficulty.as_str(),
                    quiz.completed_students,
                    quiz.total_students
                );
            }
        }
        UserType::Student => {
            let quizzes = client.quizzes().student_quizzes().await?;
            println!("{} quizzes assigned", quizzes.len());
            for quiz in quizzes {
                let status = if quiz.is_completed { "done" } else { "open" };
                println!(
                    "#{:<5} {:<40} {:<8} {}/{} questions ({})",
                    quiz.id,
                    quiz.title,
                    quiz.difficulty.as_str(),
                    quiz.completed_questions,
                    quiz.total_questions,
                    status
                );
            }
        }
    }

    Ok(())
}
