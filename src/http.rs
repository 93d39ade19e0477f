use crate::error::{Error, Result};
use crate::session::SessionGuard;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// One part of a multipart upload, held as owned bytes so the request can be
/// rebuilt when it is replayed after a token refresh.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct FormPayload {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl FormPayload {
    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Form(FormPayload),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
    pub auth: bool,
    /// Filled in by [`AuthHttp`] right before the request goes out; service
    /// code never sets this directly.
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: &str, body: RequestBody) -> Self {
        Self {
            method,
            path: path.to_string(),
            body,
            auth: true,
            bearer: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path, RequestBody::Empty)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path, RequestBody::Empty)
    }

    pub fn post_json(path: &str, body: Value) -> Self {
        Self::new(Method::POST, path, RequestBody::Json(body))
    }

    pub fn put_json(path: &str, body: Value) -> Self {
        Self::new(Method::PUT, path, RequestBody::Json(body))
    }

    pub fn post_form(path: &str, form: FormPayload) -> Self {
        Self::new(Method::POST, path, RequestBody::Form(form))
    }

    pub fn put_form(path: &str, form: FormPayload) -> Self {
        Self::new(Method::PUT, path, RequestBody::Form(form))
    }

    /// Mark the request as unauthenticated (login, signup, OTP, refresh).
    pub fn public(mut self) -> Self {
        self.auth = false;
        self
    }

    fn with_bearer(&self, token: Option<String>) -> Self {
        let mut attempt = self.clone();
        attempt.bearer = token;
        attempt
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// The seam between request/replay logic and the wire. Production code uses
/// [`ReqwestTransport`]; tests substitute scripted implementations.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(base_url: Url, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| Error::Internal(format!("Invalid request path {}: {}", path, e)))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.endpoint(&request.path)?;
        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(form) => builder.multipart(build_form(form)?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(ApiResponse { status, body })
    }
}

fn build_form(payload: &FormPayload) -> Result<multipart::Form> {
    let mut form = multipart::Form::new();
    for (name, value) in &payload.fields {
        form = form.text(name.clone(), value.clone());
    }
    for file in &payload.files {
        let part = multipart::Part::bytes(file.data.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| {
                Error::Internal(format!("Invalid content type {}: {}", file.content_type, e))
            })?;
        form = form.part(file.field.clone(), part);
    }
    Ok(form)
}

/// HTTP wrapper that attaches the bearer token to outgoing requests and, on a
/// 401, performs a single refresh through the session guard before replaying
/// the original request once.
#[derive(Clone)]
pub struct AuthHttp {
    transport: Arc<dyn Transport>,
    guard: Arc<SessionGuard>,
}

impl AuthHttp {
    pub fn new(transport: Arc<dyn Transport>, guard: Arc<SessionGuard>) -> Self {
        Self { transport, guard }
    }

    pub fn guard(&self) -> &Arc<SessionGuard> {
        &self.guard
    }

    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        check(self.send_raw(request).await?)
    }

    /// Like [`send`](Self::send) but hands back non-2xx responses instead of
    /// mapping them to errors, for callers that inspect failure bodies. The
    /// 401 refresh-and-replay behavior still applies.
    pub async fn send_raw(&self, request: ApiRequest) -> Result<ApiResponse> {
        if !request.auth {
            return self.transport.execute(&request).await;
        }

        let token = self.guard.token_for_request()?;
        let response = self
            .transport
            .execute(&request.with_bearer(token.clone()))
            .await?;
        if response.status != 401 {
            return Ok(response);
        }

        tracing::debug!(path = %request.path, "request unauthorized, refreshing session");
        let refreshed = self.guard.refresh_after_unauthorized(token.as_deref()).await?;
        self.transport
            .execute(&request.with_bearer(Some(refreshed)))
            .await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(ApiRequest::post_json(path, serde_json::to_value(body)?))
            .await?
            .json()
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(ApiRequest::put_json(path, serde_json::to_value(body)?))
            .await?
            .json()
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    pub async fn post_form<T: DeserializeOwned>(&self, path: &str, form: FormPayload) -> Result<T> {
        self.send(ApiRequest::post_form(path, form)).await?.json()
    }

    pub async fn put_form<T: DeserializeOwned>(&self, path: &str, form: FormPayload) -> Result<T> {
        self.send(ApiRequest::put_form(path, form)).await?.json()
    }

    pub async fn post_public<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(ApiRequest::post_json(path, serde_json::to_value(body)?).public())
            .await?
            .json()
    }
}

fn check(response: ApiResponse) -> Result<ApiResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(Error::from_response(response.status, &response.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryTokenStore, SessionGuard, StoredSession, UserType};

    mockall::mock! {
        pub Wire {}

        #[async_trait]
        impl Transport for Wire {
            async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse>;
        }
    }

    fn guard_with(session: StoredSession, transport: Arc<dyn Transport>) -> Arc<SessionGuard> {
        let store = Arc::new(MemoryTokenStore::with_session(session));
        Arc::new(SessionGuard::new(store, transport))
    }

    #[tokio::test]
    async fn bearer_token_is_attached_to_authenticated_requests() {
        let mut wire = MockWire::new();
        wire.expect_execute()
            .withf(|request| {
                request.path == "/quiz/faculty/quizzes/"
                    && request.bearer.as_deref() == Some("tok-1")
            })
            .times(1)
            .returning(|_| {
                Ok(ApiResponse {
                    status: 200,
                    body: Bytes::from_static(b"[]"),
                })
            });
        let transport: Arc<dyn Transport> = Arc::new(wire);

        let guard = guard_with(
            StoredSession {
                access_token: Some("tok-1".into()),
                refresh_token: Some("ref-1".into()),
                user_type: Some(UserType::Faculty),
            },
            transport.clone(),
        );
        let http = AuthHttp::new(transport, guard);

        let quizzes: Vec<serde_json::Value> =
            http.get_json("/quiz/faculty/quizzes/").await.expect("ok");
        assert!(quizzes.is_empty());
    }

    #[tokio::test]
    async fn public_requests_carry_no_bearer() {
        let mut wire = MockWire::new();
        wire.expect_execute()
            .withf(|request| !request.auth && request.bearer.is_none())
            .times(1)
            .returning(|_| {
                Ok(ApiResponse {
                    status: 200,
                    body: Bytes::from_static(b"{\"message\":\"ok\"}"),
                })
            });
        let transport: Arc<dyn Transport> = Arc::new(wire);

        let guard = guard_with(StoredSession::default(), transport.clone());
        let http = AuthHttp::new(transport, guard);

        let body: serde_json::Value = http
            .post_public("/auth/otp/generate/", &serde_json::json!({"email": "a@b.c"}))
            .await
            .expect("ok");
        assert_eq!(body["message"], "ok");
    }

    #[test]
    fn endpoint_join_keeps_base_path() {
        let transport =
            ReqwestTransport::new(Url::parse("http://localhost:8000/api").expect("url"), 5)
                .expect("transport");
        let url = transport.endpoint("/auth/login/").expect("join");
        assert_eq!(url.as_str(), "http://localhost:8000/api/auth/login/");
    }
}
