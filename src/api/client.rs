use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::payloads::{LoginRequest, LoginResponse, User};
use super::session::Session;
use crate::config::{ApiConfig, TimeoutConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Anonymous,
    Authenticated,
}

/// One addressed call against the backend.
#[derive(Debug)]
struct Envelope {
    name: &'static str,
    method: Method,
    path: String,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
    timeout: Duration,
}

impl Envelope {
    fn new(name: &'static str, method: Method, path: &str, timeout: Duration) -> Self {
        Self {
            name,
            method,
            path: path.to_string(),
            segments: Vec::new(),
            query: Vec::new(),
            body: None,
            timeout,
        }
    }

    /// Flatten a serializable query struct into key/value pairs. Null
    /// values are dropped so optional keys are never sent.
    fn with_query<Q: Serialize + ?Sized>(mut self, query: &Q) -> ApiResult<Self> {
        let value = serde_json::to_value(query).map_err(|e| {
            ApiError::validation(format!("Could not encode query for {}: {}", self.name, e))
        })?;

        if let Value::Object(map) = value {
            for (key, value) in map {
                let rendered = match value {
                    Value::Null => continue,
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                self.query.push((key, rendered));
            }
        }

        Ok(self)
    }

    /// Append a caller-supplied value as one percent-encoded path segment.
    fn with_segment(mut self, segment: &str) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    fn with_body<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| {
            ApiError::validation(format!("Could not encode payload for {}: {}", self.name, e))
        })?;
        self.body = Some(value);
        Ok(self)
    }
}

/// HTTP client bound to a single session against the trucking backend.
///
/// Each logical user (conversation) gets its own `SessionClient`; use
/// [`SessionClient::fork`] to open another session over the same
/// connection pool.
pub struct SessionClient {
    http: reqwest::Client,
    base_url: String,
    timeouts: TimeoutConfig,
    session: RwLock<Session>,
}

impl SessionClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_http(http, config.base_url.clone(), config.timeouts.clone()))
    }

    fn with_http(http: reqwest::Client, base_url: String, timeouts: TimeoutConfig) -> Self {
        let session = Session::new();
        log::info!("Opened session {} against {}", session.id(), base_url);

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeouts,
            session: RwLock::new(session),
        }
    }

    /// A new client with an empty session, sharing this client's connection pool.
    pub fn fork(&self) -> Self {
        Self::with_http(self.http.clone(), self.base_url.clone(), self.timeouts.clone())
    }

    pub fn timeouts(&self) -> &TimeoutConfig {
        &self.timeouts
    }

    pub fn session_id(&self) -> Uuid {
        self.read_session().id()
    }

    pub fn is_logged_in(&self) -> bool {
        self.read_session().token().is_some()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read_session().user().cloned()
    }

    pub fn logout(&self) {
        self.write_session().clear();
        log::info!("Session {} logged out", self.session_id());
    }

    /// Log in and keep the returned token for later authenticated calls.
    ///
    /// Any failure clears the stored credential, including a previously
    /// valid one.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult {
        let outcome = self
            .anonymous_post("login", "/auth/login", &LoginRequest { email, password }, self.timeouts.login())
            .await
            .and_then(Self::read_login);

        match outcome {
            Ok((token, user_value)) => {
                let user = user_value
                    .clone()
                    .and_then(|u| serde_json::from_value::<User>(u).ok());
                let mut session = self.write_session();
                session.sign_in(token, user);
                log::info!("Login successful. Auth token stored for session {}", session.id());

                Ok(json!({
                    "success": true,
                    "message": "Login successful.",
                    "user": user_value,
                }))
            }
            Err(err) => {
                let mut session = self.write_session();
                session.clear();
                log::warn!("Login failed for session {}: {}", session.id(), err);
                Err(err)
            }
        }
    }

    fn read_login(body: Value) -> ApiResult<(String, Option<Value>)> {
        let parsed = serde_json::from_value::<LoginResponse>(body.clone()).ok();
        match parsed {
            Some(LoginResponse { token: Some(token), user }) if !token.is_empty() => Ok((token, user)),
            _ => {
                log::warn!("Login response did not contain a '_token'. Response: {}", body);
                Err(ApiError::Protocol {
                    message: "Login successful, but no authentication token was received.".to_string(),
                    details: None,
                })
            }
        }
    }

    pub async fn authenticated_get<Q: Serialize + ?Sized>(
        &self,
        name: &'static str,
        path: &str,
        query: &Q,
        timeout: Duration,
    ) -> ApiResult {
        let envelope = Envelope::new(name, Method::GET, path, timeout).with_query(query)?;
        self.dispatch(envelope, Access::Authenticated).await
    }

    pub async fn authenticated_post<B: Serialize + ?Sized>(
        &self,
        name: &'static str,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> ApiResult {
        let envelope = Envelope::new(name, Method::POST, path, timeout).with_body(body)?;
        self.dispatch(envelope, Access::Authenticated).await
    }

    pub async fn anonymous_get<Q: Serialize + ?Sized>(
        &self,
        name: &'static str,
        path: &str,
        query: &Q,
        timeout: Duration,
    ) -> ApiResult {
        let envelope = Envelope::new(name, Method::GET, path, timeout).with_query(query)?;
        self.dispatch(envelope, Access::Anonymous).await
    }

    /// GET `{path}/{item}` where `item` is encoded as a single segment.
    pub async fn anonymous_get_item(
        &self,
        name: &'static str,
        path: &str,
        item: &str,
        timeout: Duration,
    ) -> ApiResult {
        let envelope = Envelope::new(name, Method::GET, path, timeout).with_segment(item);
        self.dispatch(envelope, Access::Anonymous).await
    }

    pub async fn anonymous_post<B: Serialize + ?Sized>(
        &self,
        name: &'static str,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> ApiResult {
        let envelope = Envelope::new(name, Method::POST, path, timeout).with_body(body)?;
        self.dispatch(envelope, Access::Anonymous).await
    }

    async fn dispatch(&self, envelope: Envelope, access: Access) -> ApiResult {
        let token = match access {
            Access::Anonymous => None,
            Access::Authenticated => {
                // Copy the token out so the lock is not held across the request.
                let token = self.read_session().token().map(str::to_string);
                if token.is_none() {
                    log::warn!("{} requires a login; no token stored", envelope.name);
                    return Err(ApiError::AuthRequired);
                }
                token
            }
        };

        self.execute(envelope, token.as_deref()).await
    }

    async fn execute(&self, envelope: Envelope, token: Option<&str>) -> ApiResult {
        let url = self.url_for(&envelope)?;
        log::info!("Calling API: {} {} ({})", envelope.method, url, envelope.name);
        if !envelope.query.is_empty() {
            log::debug!("{} query: {:?}", envelope.name, envelope.query);
        }

        let mut request = self
            .http
            .request(envelope.method, url)
            .timeout(envelope.timeout);

        if !envelope.query.is_empty() {
            request = request.query(&envelope.query);
        }
        if let Some(token) = token {
            // The backend expects the raw token, no "Bearer" scheme.
            request = request.header(AUTHORIZATION, token);
        }
        if let Some(body) = &envelope.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| network_error(envelope.name, &e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| network_error(envelope.name, &e))?;

        normalize(envelope.name, status, &text)
    }

    fn url_for(&self, envelope: &Envelope) -> ApiResult<Url> {
        let invalid = |reason: String| {
            log::error!("Could not build URL for {}: {}", envelope.name, reason);
            ApiError::Network(format!("Invalid API URL for {}.", envelope.name))
        };

        let mut url = Url::parse(&format!("{}{}", self.base_url, envelope.path))
            .map_err(|e| invalid(e.to_string()))?;
        if !envelope.segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| invalid("base URL cannot carry a path".to_string()))?
                .pop_if_empty()
                .extend(&envelope.segments);
        }
        Ok(url)
    }

    fn read_session(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_session(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn network_error(name: &str, err: &reqwest::Error) -> ApiError {
    if err.is_timeout() {
        log::error!("Timeout calling {}", name);
        ApiError::Network(format!("API request timed out for {}.", name))
    } else {
        log::error!("Request exception occurred calling {}: {}", name, err);
        ApiError::Network(format!("Request failed for {}: {}", name, err))
    }
}

/// Map a raw HTTP outcome onto the success/failure shape.
fn normalize(name: &str, status: StatusCode, body: &str) -> ApiResult {
    if status.is_client_error() || status.is_server_error() {
        log::error!("HTTP error occurred calling {}: {} - Response: {}", name, status, body);
        let details = if body.is_empty() {
            None
        } else {
            Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
        };
        return Err(ApiError::Http {
            status: status.as_u16(),
            message: format!("API request failed for {}: {}", name, status),
            details,
        });
    }

    if body.is_empty() {
        log::warn!("Empty response from {} with status {}", name, status);
        return Err(ApiError::Protocol {
            message: format!("Empty response from API for {}.", name),
            details: None,
        });
    }

    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to decode JSON response from {}: {} - Response: {}", name, e, body);
        ApiError::Protocol {
            message: format!("Invalid JSON response from API for {}.", name),
            details: Some(Value::String(body.to_string())),
        }
    })
}
