pub mod auth_service;
pub mod export_service;
pub mod performance_service;
pub mod quiz_service;
