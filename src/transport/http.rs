use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::traits::Transport;
use super::types::{ApiRequest, Method};
use crate::app::ApiConfig;
use crate::utils::WidgetError;

/// Username/password pair sent as HTTP basic auth on every call
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// reqwest-backed transport with a hard per-call deadline
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    credentials: Credentials,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, WidgetError> {
        let client = Client::builder()
            .build()
            .map_err(|e| WidgetError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            timeout,
        })
    }

    /// Create a transport from the `[api]` configuration section
    pub fn from_config(config: &ApiConfig) -> Result<Self, WidgetError> {
        Self::new(
            config.base_url.clone(),
            Credentials {
                username: config.username.clone(),
                password: config.password.clone(),
            },
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Caller headers first, minus the ones this transport owns
    fn caller_headers(request: &ApiRequest) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) else {
                debug!("Skipping invalid header {}", name);
                continue;
            };
            if name == AUTHORIZATION || name == CONTENT_TYPE {
                continue;
            }
            headers.append(name, value);
        }
        headers
    }

    async fn send(&self, request: ApiRequest) -> Result<Value, WidgetError> {
        let url = format!("{}{}", self.base_url, request.path);

        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };

        let mut builder = builder
            .headers(Self::caller_headers(&request))
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(CONTENT_TYPE, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| WidgetError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WidgetError::http(status.as_u16(), body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WidgetError::Network(e.to_string()))?;

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value, WidgetError> {
        debug!("{} {}{}", request.method.as_str(), self.base_url, request.path);

        // Dropping the send future on expiry aborts the connection
        match tokio::time::timeout(self.timeout, self.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(WidgetError::Timeout {
                after: self.timeout,
            }),
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
