//! HTTP client for backend work nodes.

use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use reqwest::StatusCode;
use serde_json::Value;

use crate::{PeerError, WorkGenerateMessage, WorkPeer};

/// Default total timeout for one work_generate call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A backend node reached over HTTP.
///
/// Peers built from the same [`reqwest::Client`] share its connection pool.
#[derive(Clone)]
pub struct HttpWorkPeer {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpWorkPeer {
    /// Build the client every peer should share.
    pub fn build_client(
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<reqwest::Client, PeerError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| PeerError::Client(e.to_string()))
    }

    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Create a peer with its own client and default timeouts.
    pub fn with_defaults(endpoint: impl Into<String>) -> Result<Self, PeerError> {
        let http = Self::build_client(DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)?;
        Ok(Self::new(http, endpoint))
    }
}

impl WorkPeer for HttpWorkPeer {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn work_generate(
        &self,
        message: &WorkGenerateMessage,
    ) -> BoxFuture<'static, Result<Value, PeerError>> {
        let http = self.http.clone();
        let endpoint = self.endpoint.clone();
        let body = message.clone();

        async move {
            let response = http.post(&endpoint).json(&body).send().await?;

            if response.status() != StatusCode::OK {
                return Err(PeerError::Status(response.status().as_u16()));
            }

            let json: Value = response
                .json()
                .await
                .map_err(|e| PeerError::InvalidResponse(e.to_string()))?;
            Ok(json)
        }
        .boxed()
    }
}
