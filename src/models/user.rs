use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account details as the backend returns them from the details and student
/// listing endpoints. `branch` arrives as the expanded display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    #[serde(default)]
    pub username: Option<String>,
    pub roll_no: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub branch: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

impl UserAccount {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
