pub mod performance;
pub mod question;
pub mod quiz;
pub mod user;
