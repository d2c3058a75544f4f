use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;

/// Raw response handed back to the caller. Status interpretation is the
/// caller's policy; the dispatcher never errors on a non-2xx status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            ClientError::request_failed(self.status, format!("unexpected response body: {}", e))
        })
    }

    /// Best-effort human-readable error text: the backend's `detail` or
    /// `message` field when the body is JSON, the raw body otherwise.
    pub fn error_text(&self) -> String {
        if let Ok(v) = serde_json::from_str::<serde_json::Value>(&self.body) {
            for key in ["detail", "message"] {
                if let Some(s) = v.get(key).and_then(|d| d.as_str()) {
                    return s.to_string();
                }
            }
        }
        if self.body.trim().is_empty() {
            format!("HTTP {}", self.status)
        } else {
            self.body.trim().to_string()
        }
    }
}

/// How to send one request: method, optional JSON or form body, and any
/// caller-supplied headers.
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub json: Option<serde_json::Value>,
    pub form: Option<Vec<(String, String)>>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self { method: Method::GET, ..Default::default() }
    }

    pub fn delete() -> Self {
        Self { method: Method::DELETE, ..Default::default() }
    }

    pub fn post_empty() -> Self {
        Self { method: Method::POST, ..Default::default() }
    }

    pub fn post_json(body: serde_json::Value) -> Self {
        Self { method: Method::POST, json: Some(body), ..Default::default() }
    }

    pub fn put_json(body: serde_json::Value) -> Self {
        Self { method: Method::PUT, json: Some(body), ..Default::default() }
    }

    pub fn post_form(pairs: Vec<(String, String)>) -> Self {
        Self { method: Method::POST, form: Some(pairs), ..Default::default() }
    }
}

/// Attaches the current credential to outgoing requests. Refuses to send an
/// authorized request without a session, and drops the session when the
/// backend answers 401/403: a revoked credential equals no session.
pub struct Dispatcher {
    base: Url,
    http: reqwest::Client,
    session: Arc<SessionStore>,
}

impl Dispatcher {
    pub fn new(base: Url, session: Arc<SessionStore>, timeout: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { base, http, session })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Send an authorized request. Fails with `NoActiveSession` before any
    /// network activity when no credential is held.
    pub async fn send(&self, path: &str, opts: RequestOptions) -> ClientResult<ApiResponse> {
        let Some(credential) = self.session.credential() else {
            return Err(ClientError::no_session(format!("cannot request {}", path)));
        };
        let resp = self.dispatch(path, opts, Some(&credential)).await?;
        if resp.status == 401 || resp.status == 403 {
            warn!(target: "taskdash::client", "{} answered HTTP {}, dropping session", path, resp.status);
            self.session.logout();
        }
        Ok(resp)
    }

    /// Send an unauthenticated request (login, register).
    pub async fn send_public(&self, path: &str, opts: RequestOptions) -> ClientResult<ApiResponse> {
        self.dispatch(path, opts, None).await
    }

    async fn dispatch(
        &self,
        path: &str,
        opts: RequestOptions,
        bearer: Option<&str>,
    ) -> ClientResult<ApiResponse> {
        let url = self
            .base
            .join(path)
            .map_err(|e| ClientError::network(format!("invalid request target {}: {}", path, e)))?;
        let mut headers = opts.headers;
        if bearer.is_some() {
            // The auth header is owned by the dispatcher; a caller-supplied
            // value is discarded, never merged alongside the credential.
            headers.remove(reqwest::header::AUTHORIZATION);
        }
        let mut req = self.http.request(opts.method.clone(), url).headers(headers);
        if let Some(form) = &opts.form {
            req = req.form(form);
        }
        if let Some(body) = &opts.json {
            req = req.json(body);
        }
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        debug!(target: "taskdash::client", "{} {} -> HTTP {}", opts.method, path, status);
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_text_prefers_backend_detail() {
        let resp = ApiResponse {
            status: 400,
            body: r#"{"detail":"Incorrect Username or Password"}"#.to_string(),
        };
        assert_eq!(resp.error_text(), "Incorrect Username or Password");

        let resp = ApiResponse { status: 404, body: r#"{"message":"User not found"}"#.to_string() };
        assert_eq!(resp.error_text(), "User not found");

        let resp = ApiResponse { status: 502, body: "".to_string() };
        assert_eq!(resp.error_text(), "HTTP 502");
    }

    #[test]
    fn success_band() {
        assert!(ApiResponse { status: 200, body: String::new() }.is_success());
        assert!(ApiResponse { status: 204, body: String::new() }.is_success());
        assert!(!ApiResponse { status: 301, body: String::new() }.is_success());
        assert!(!ApiResponse { status: 401, body: String::new() }.is_success());
    }
}
