use crate::dto::auth_dto::{RefreshRequest, RefreshResponse};
use crate::error::{Error, Result};
use crate::http::{ApiRequest, Transport};
use crate::session::store::{StoredSession, TokenStore, UserType};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

const REFRESH_PATH: &str = "/auth/token/refresh/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Authenticated,
    Refreshing,
    Expired,
}

/// Owns the session lifecycle around the token pair: attaching state for
/// outgoing requests, the single-flight refresh on 401, and the expired flag
/// that forces re-authentication.
///
/// Refresh failure is terminal. The guard never retries the refresh call;
/// callers see [`Error::SessionExpired`] until `establish` runs again.
pub struct SessionGuard {
    store: Arc<dyn TokenStore>,
    transport: Arc<dyn Transport>,
    expired: AtomicBool,
    refreshing: AtomicBool,
    refresh_lock: Mutex<()>,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn TokenStore>, transport: Arc<dyn Transport>) -> Self {
        Self {
            store,
            transport,
            expired: AtomicBool::new(false),
            refreshing: AtomicBool::new(false),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.expired.load(Ordering::SeqCst) {
            SessionState::Expired
        } else if self.refreshing.load(Ordering::SeqCst) {
            SessionState::Refreshing
        } else {
            SessionState::Authenticated
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    pub fn user_type(&self) -> Option<UserType> {
        self.store.user_type()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.is_expired() && self.store.access_token().is_some()
    }

    /// Store a fresh token pair after login, leaving the `Expired` state.
    pub fn establish(&self, access: &str, refresh: &str, user_type: UserType) -> Result<()> {
        self.store.set_session(StoredSession {
            access_token: Some(access.to_string()),
            refresh_token: Some(refresh.to_string()),
            user_type: Some(user_type),
        })?;
        self.expired.store(false, Ordering::SeqCst);
        tracing::info!(user_type = user_type.as_str(), "session established");
        Ok(())
    }

    /// Drop the stored tokens without entering the expired state.
    pub fn logout(&self) -> Result<()> {
        self.store.clear()?;
        self.expired.store(false, Ordering::SeqCst);
        tracing::info!("session cleared");
        Ok(())
    }

    /// Pre-flight check for an authenticated request. An expired session, or
    /// one with no tokens at all, is rejected here so nothing reaches the
    /// network until the user logs in again.
    pub fn token_for_request(&self) -> Result<Option<String>> {
        if self.is_expired() {
            return Err(Error::SessionExpired);
        }
        let access = self.store.access_token();
        if access.is_none() && self.store.refresh_token().is_none() {
            self.expire();
            return Err(Error::SessionExpired);
        }
        Ok(access)
    }

    /// Exchange the refresh token for a new access token after a request came
    /// back 401. At most one refresh is in flight at a time: concurrent
    /// callers queue on the lock and reuse the rotated token instead of
    /// issuing their own refresh.
    ///
    /// `failed_token` is the access token the 401'd request was sent with.
    pub async fn refresh_after_unauthorized(&self, failed_token: Option<&str>) -> Result<String> {
        if self.is_expired() {
            return Err(Error::SessionExpired);
        }

        let _flight = self.refresh_lock.lock().await;

        // Queued callers whose peer's refresh already failed bail out
        // uniformly instead of kicking off another exchange.
        if self.is_expired() {
            return Err(Error::SessionExpired);
        }

        // The token rotated while we waited on the lock: another caller
        // finished the refresh, so replay with its result.
        if let Some(current) = self.store.access_token() {
            if failed_token != Some(current.as_str()) {
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.store.refresh_token() else {
            tracing::warn!("401 with no refresh token stored; session expired");
            self.expire();
            return Err(Error::SessionExpired);
        };

        self.refreshing.store(true, Ordering::SeqCst);
        let outcome = self.exchange(&refresh_token).await;
        self.refreshing.store(false, Ordering::SeqCst);

        match outcome {
            Ok(tokens) => {
                self.store.set_access_token(&tokens.access)?;
                if let Some(rotated) = &tokens.refresh {
                    self.store.set_refresh_token(rotated)?;
                }
                tracing::debug!("access token refreshed");
                Ok(tokens.access)
            }
            Err(error) => {
                tracing::warn!(%error, "token refresh failed; session expired");
                self.expire();
                Err(Error::SessionExpired)
            }
        }
    }

    async fn exchange(&self, refresh_token: &str) -> Result<RefreshResponse> {
        let body = serde_json::to_value(RefreshRequest {
            refresh: refresh_token.to_string(),
        })?;
        let request = ApiRequest::post_json(REFRESH_PATH, body).public();
        let response = self.transport.execute(&request).await?;
        if !response.is_success() {
            return Err(Error::from_response(response.status, &response.body));
        }
        response.json()
    }

    fn expire(&self) {
        self.expired.store(true, Ordering::SeqCst);
        if let Err(error) = self.store.clear() {
            tracing::warn!(%error, "failed to clear token store on expiry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ApiResponse;
    use crate::session::store::MemoryTokenStore;
    use async_trait::async_trait;
    use bytes::Bytes;

    struct NoNetwork;

    #[async_trait]
    impl Transport for NoNetwork {
        async fn execute(&self, _request: &ApiRequest) -> Result<ApiResponse> {
            panic!("no request should reach the transport");
        }
    }

    fn guard(session: StoredSession) -> SessionGuard {
        SessionGuard::new(
            Arc::new(MemoryTokenStore::with_session(session)),
            Arc::new(NoNetwork),
        )
    }

    #[tokio::test]
    async fn empty_session_expires_locally() {
        let guard = guard(StoredSession::default());
        assert!(matches!(
            guard.token_for_request(),
            Err(Error::SessionExpired)
        ));
        assert_eq!(guard.state(), SessionState::Expired);
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_is_terminal() {
        let guard = guard(StoredSession {
            access_token: Some("stale".into()),
            refresh_token: None,
            user_type: Some(UserType::Student),
        });
        let result = guard.refresh_after_unauthorized(Some("stale")).await;
        assert!(matches!(result, Err(Error::SessionExpired)));
        assert_eq!(guard.state(), SessionState::Expired);
    }

    #[tokio::test]
    async fn establish_recovers_from_expired() {
        let guard = guard(StoredSession::default());
        let _ = guard.token_for_request();
        assert_eq!(guard.state(), SessionState::Expired);

        guard
            .establish("acc-2", "ref-2", UserType::Student)
            .expect("establish");
        assert_eq!(guard.state(), SessionState::Authenticated);
        assert_eq!(
            guard.token_for_request().expect("token").as_deref(),
            Some("acc-2")
        );
    }

    struct RefreshOk {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl Transport for RefreshOk {
        async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
            assert_eq!(request.path, REFRESH_PATH);
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ApiResponse {
                status: 200,
                body: Bytes::from_static(b"{\"access\":\"fresh\"}"),
            })
        }
    }

    #[tokio::test]
    async fn rotated_token_is_reused_without_second_refresh() {
        let store = Arc::new(MemoryTokenStore::with_session(StoredSession {
            access_token: Some("old".into()),
            refresh_token: Some("ref".into()),
            user_type: None,
        }));
        let transport = Arc::new(RefreshOk {
            calls: std::sync::atomic::AtomicUsize::new(0),
        });
        let guard = SessionGuard::new(store.clone(), transport.clone());

        let first = guard
            .refresh_after_unauthorized(Some("old"))
            .await
            .expect("refresh");
        assert_eq!(first, "fresh");

        // A caller still holding the pre-refresh token gets the rotated one
        // back without another exchange.
        let second = guard
            .refresh_after_unauthorized(Some("old"))
            .await
            .expect("reuse");
        assert_eq!(second, "fresh");
        assert_eq!(store.access_token().as_deref(), Some("fresh"));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }
}
