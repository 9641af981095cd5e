//! Authenticated HTTP client wrapper.
//!
//! Implements the call -> on 401 refresh once -> retry -> else re-login
//! discipline for downstream consumers of protected resources. At most
//! one rotation happens per logical request, and concurrent 401s coalesce
//! into a single in-flight refresh so a burst of rejected calls cannot
//! trigger a refresh storm.

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

/// Cookie-carrying client for the gatehouse API.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: Url,
    /// Bumped after every successful refresh. Callers that observed the
    /// current generation before their 401 skip their own refresh when a
    /// coalesced one already ran.
    refresh_generation: Mutex<u64>,
}

/// Terminal outcomes of a wrapped request.
#[derive(Debug)]
pub enum ClientError {
    /// Transport-level failure
    Http(reqwest::Error),
    /// The path did not join onto the base URL
    InvalidUrl(url::ParseError),
    /// Login rejected the supplied credentials
    InvalidCredentials,
    /// Refresh failed or the retry was rejected again; the caller must
    /// send the user back through login
    SessionExpired,
    /// A status outside the wrapper's protocol (e.g. 400 on login)
    Unexpected(StatusCode),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Http(e) => write!(f, "HTTP error: {}", e),
            ClientError::InvalidUrl(e) => write!(f, "Invalid request URL: {}", e),
            ClientError::InvalidCredentials => write!(f, "Invalid credentials"),
            ClientError::SessionExpired => write!(f, "Session expired; re-login required"),
            ClientError::Unexpected(status) => write!(f, "Unexpected status: {}", status),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl AuthClient {
    /// Create a client against the given base URL (e.g. the
    /// `API_BASE_URL` setting). Cookies are stored across calls.
    pub fn new(base_url: Url) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(ClientError::Http)?;
        Ok(Self {
            http,
            base_url,
            refresh_generation: Mutex::new(0),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url.join(path).map_err(ClientError::InvalidUrl)
    }

    /// Authenticate and store the session cookies.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginTokens, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/login")?)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(ClientError::InvalidCredentials),
            status => Err(ClientError::Unexpected(status)),
        }
    }

    /// End the session; always clears server-side cookies.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let response = self.http.post(self.url("/api/auth/logout")?).send().await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(ClientError::Unexpected(status)),
        }
    }

    /// Perform an authenticated request with the refresh-once discipline.
    ///
    /// A 401 triggers exactly one rotation attempt and one retry; a second
    /// 401 is terminal and surfaces as `SessionExpired`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.url(path)?;

        let observed = *self.refresh_generation.lock().await;
        let response = self.http.request(method.clone(), url.clone()).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(%url, "Received 401, attempting token refresh");
        self.refresh_once(observed).await?;

        let retry = self.http.request(method, url).send().await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::SessionExpired);
        }
        Ok(retry)
    }

    /// GET an authenticated resource.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response, ClientError> {
        self.request(Method::GET, path).await
    }

    /// Single-flight refresh. The first 401 holder performs the rotation;
    /// callers queued behind it observe the bumped generation and return
    /// without issuing their own refresh call.
    async fn refresh_once(&self, observed: u64) -> Result<(), ClientError> {
        let mut generation = self.refresh_generation.lock().await;
        if *generation > observed {
            debug!("Refresh already performed by a concurrent request");
            return Ok(());
        }

        let response = self.http.post(self.url("/api/auth/refresh")?).send().await?;
        if !response.status().is_success() {
            debug!(status = %response.status(), "Token refresh rejected");
            return Err(ClientError::SessionExpired);
        }

        *generation += 1;
        Ok(())
    }
}
