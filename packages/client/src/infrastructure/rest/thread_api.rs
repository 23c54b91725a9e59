//! REST client for thread metadata and connection tokens.

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::{
    config::ApiConfig,
    domain::{
        ConnectionToken, ConnectionTokenProvider, GatewayError, Thread, ThreadId,
        ThreadInfoLoader,
    },
    infrastructure::dto::http::{ThreadResponse, TokenResponse},
};

/// reqwest implementation of both REST collaborators
#[derive(Debug, Clone)]
pub struct HttpThreadApi {
    client: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl HttpThreadApi {
    pub fn new(config: &ApiConfig) -> Result<Self, GatewayError> {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &ApiConfig) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| GatewayError::Request(format!("invalid API base URL: {}", e)))?;
        Ok(Self {
            client,
            base_url,
            auth_token: config.auth_token.clone(),
        })
    }

    /// `<base>/threads/<id>/<suffix...>/`
    fn thread_endpoint(&self, thread_id: &ThreadId, suffix: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Request("API base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("threads")
            .push(thread_id.as_str())
            .extend(suffix)
            .push("");
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let auth_token = self
            .auth_token
            .as_deref()
            .ok_or(GatewayError::Unauthenticated)?;

        let response = request
            .bearer_auth(auth_token)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GatewayError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ThreadInfoLoader for HttpThreadApi {
    async fn load_thread(&self, thread_id: &ThreadId) -> Result<Thread, GatewayError> {
        let url = self.thread_endpoint(thread_id, &[])?;
        let body: ThreadResponse = self.fetch(self.client.get(url)).await?;
        Thread::try_from(body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ConnectionTokenProvider for HttpThreadApi {
    fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    async fn issue_token(&self, thread_id: &ThreadId) -> Result<ConnectionToken, GatewayError> {
        let url = self.thread_endpoint(thread_id, &["connection-token"])?;
        let body: TokenResponse = self.fetch(self.client.post(url)).await?;
        tracing::debug!("Issued connection token for thread '{}'", thread_id);
        Ok(body.into())
    }
}
