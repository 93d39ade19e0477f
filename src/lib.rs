pub mod config;
pub mod dto;
pub mod error;
pub mod http;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::http::{AuthHttp, ReqwestTransport, Transport};
use crate::services::{
    auth_service::AuthService, performance_service::PerformanceService, quiz_service::QuizService,
};
use crate::session::{FileTokenStore, SessionGuard, TokenStore};
use std::sync::Arc;

/// Entry point wiring the token store, session guard, transport and the
/// per-area services together. Clone-cheap; all parts are shared.
#[derive(Clone)]
pub struct LmsClient {
    guard: Arc<SessionGuard>,
    auth_service: AuthService,
    quiz_service: QuizService,
    performance_service: PerformanceService,
}

impl LmsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::open(&config.token_file));
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(
            config.base_url.clone(),
            config.request_timeout_secs,
        )?);
        Ok(Self::with_parts(store, transport))
    }

    /// Assemble a client from injected parts; tests use this to substitute
    /// stores and transports.
    pub fn with_parts(store: Arc<dyn TokenStore>, transport: Arc<dyn Transport>) -> Self {
        let guard = Arc::new(SessionGuard::new(store, transport.clone()));
        let http = AuthHttp::new(transport, guard.clone());

        Self {
            guard: guard.clone(),
            auth_service: AuthService::new(http.clone()),
            quiz_service: QuizService::new(http.clone()),
            performance_service: PerformanceService::new(http),
        }
    }

    pub fn session(&self) -> &Arc<SessionGuard> {
        &self.guard
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth_service
    }

    pub fn quizzes(&self) -> &QuizService {
        &self.quiz_service
    }

    pub fn performance(&self) -> &PerformanceService {
        &self.performance_service
    }
}
