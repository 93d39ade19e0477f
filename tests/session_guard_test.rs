use async_trait::async_trait;
use bytes::Bytes;
use lms_client::error::{Error, Result};
use lms_client::http::{ApiRequest, ApiResponse, AuthHttp, Transport};
use lms_client::session::{
    MemoryTokenStore, SessionGuard, SessionState, StoredSession, TokenStore, UserType,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const REFRESH_PATH: &str = "/auth/token/refresh/";
const DATA_PATH: &str = "/quiz/faculty/quizzes/";

/// Scripted backend: data requests succeed only with the refreshed token,
/// and the refresh endpoint either rotates the token or rejects.
struct ScriptedBackend {
    refresh_succeeds: bool,
    refresh_calls: AtomicUsize,
    data_calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new(refresh_succeeds: bool) -> Self {
        Self {
            refresh_succeeds,
            refresh_calls: AtomicUsize::new(0),
            data_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Transport for ScriptedBackend {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        if request.path == REFRESH_PATH {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            // Hold the refresh open long enough for concurrent 401ers to
            // queue up behind the in-flight exchange.
            tokio::time::sleep(Duration::from_millis(30)).await;
            return if self.refresh_succeeds {
                Ok(ApiResponse {
                    status: 200,
                    body: Bytes::from_static(b"{\"access\":\"fresh\"}"),
                })
            } else {
                Ok(ApiResponse {
                    status: 401,
                    body: Bytes::from_static(b"{\"detail\":\"Token is invalid or expired\"}"),
                })
            };
        }

        self.data_calls.fetch_add(1, Ordering::SeqCst);
        match request.bearer.as_deref() {
            Some("fresh") => Ok(ApiResponse {
                status: 200,
                body: Bytes::from_static(b"{\"ok\":true}"),
            }),
            _ => Ok(ApiResponse {
                status: 401,
                body: Bytes::from_static(b"{\"detail\":\"Given token not valid\"}"),
            }),
        }
    }
}

fn client_with(
    session: StoredSession,
    backend: Arc<ScriptedBackend>,
) -> (AuthHttp, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::with_session(session));
    let guard = Arc::new(SessionGuard::new(
        store.clone(),
        backend.clone() as Arc<dyn Transport>,
    ));
    (AuthHttp::new(backend, guard), store)
}

fn stale_session() -> StoredSession {
    StoredSession {
        access_token: Some("stale".into()),
        refresh_token: Some("refresh-1".into()),
        user_type: Some(UserType::Faculty),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let backend = Arc::new(ScriptedBackend::new(true));
    let (http, store) = client_with(stale_session(), backend.clone());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let http = http.clone();
        handles.push(tokio::spawn(async move {
            http.send(ApiRequest::get(DATA_PATH)).await
        }));
    }
    for handle in handles {
        let response = handle.await.expect("task").expect("replayed request");
        assert_eq!(response.status, 200);
    }

    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.access_token().as_deref(), Some("fresh"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_fail_uniformly_when_refresh_fails() {
    let backend = Arc::new(ScriptedBackend::new(false));
    let (http, store) = client_with(stale_session(), backend.clone());

    let mut handles = Vec::new();
    for _ in 0..6 {
        let http = http.clone();
        handles.push(tokio::spawn(async move {
            http.send(ApiRequest::get(DATA_PATH)).await
        }));
    }
    for handle in handles {
        let result = handle.await.expect("task");
        assert!(matches!(result, Err(Error::SessionExpired)));
    }

    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
    assert!(store.access_token().is_none());
    assert!(store.refresh_token().is_none());
}

#[tokio::test]
async fn missing_refresh_token_expires_without_a_refresh_call() {
    let backend = Arc::new(ScriptedBackend::new(true));
    let (http, _store) = client_with(
        StoredSession {
            access_token: Some("stale".into()),
            refresh_token: None,
            user_type: Some(UserType::Student),
        },
        backend.clone(),
    );

    let result = http.send(ApiRequest::get(DATA_PATH)).await;
    assert!(matches!(result, Err(Error::SessionExpired)));
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.data_calls.load(Ordering::SeqCst), 1);
    assert_eq!(http.guard().state(), SessionState::Expired);
}

#[tokio::test]
async fn refreshed_token_is_persisted_and_reused() {
    let backend = Arc::new(ScriptedBackend::new(true));
    let (http, store) = client_with(stale_session(), backend.clone());

    http.send(ApiRequest::get(DATA_PATH)).await.expect("first");
    assert_eq!(store.access_token().as_deref(), Some("fresh"));

    // The next request goes straight through with the stored token.
    http.send(ApiRequest::get(DATA_PATH)).await.expect("second");
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.data_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn expired_session_rejects_requests_before_the_network() {
    let backend = Arc::new(ScriptedBackend::new(false));
    let (http, _store) = client_with(stale_session(), backend.clone());

    let first = http.send(ApiRequest::get(DATA_PATH)).await;
    assert!(matches!(first, Err(Error::SessionExpired)));

    let calls_after_expiry = backend.data_calls.load(Ordering::SeqCst);
    for _ in 0..3 {
        let result = http.send(ApiRequest::get(DATA_PATH)).await;
        assert!(matches!(result, Err(Error::SessionExpired)));
    }
    assert_eq!(backend.data_calls.load(Ordering::SeqCst), calls_after_expiry);
}

#[tokio::test]
async fn absent_access_token_is_recovered_via_refresh() {
    let backend = Arc::new(ScriptedBackend::new(true));
    let (http, _store) = client_with(
        StoredSession {
            access_token: None,
            refresh_token: Some("refresh-1".into()),
            user_type: Some(UserType::Student),
        },
        backend.clone(),
    );

    let response = http.send(ApiRequest::get(DATA_PATH)).await.expect("replayed");
    assert_eq!(response.status, 200);
    assert_eq!(response.body.as_ref(), b"{\"ok\":true}");
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
    // One bearer-less attempt plus one replay with the fresh token.
    assert_eq!(backend.data_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_session_makes_no_network_calls() {
    let backend = Arc::new(ScriptedBackend::new(true));
    let (http, _store) = client_with(StoredSession::default(), backend.clone());

    let result = http.send(ApiRequest::get(DATA_PATH)).await;
    assert!(matches!(result, Err(Error::SessionExpired)));
    assert_eq!(backend.data_calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 0);
    assert_eq!(http.guard().state(), SessionState::Expired);
}

#[tokio::test]
async fn re_authentication_recovers_an_expired_session() {
    let backend = Arc::new(ScriptedBackend::new(false));
    let (http, _store) = client_with(stale_session(), backend.clone());

    let _ = http.send(ApiRequest::get(DATA_PATH)).await;
    assert_eq!(http.guard().state(), SessionState::Expired);

    http.guard()
        .establish("fresh", "refresh-2", UserType::Faculty)
        .expect("establish");
    assert_eq!(http.guard().state(), SessionState::Authenticated);

    let response = http.send(ApiRequest::get(DATA_PATH)).await.expect("ok");
    assert_eq!(response.status, 200);
}
