//! Real HTTP client for the map rendering server
//!
//! Talks JSON to the `/api/*` endpoints with `reqwest`. Every network or
//! decoding failure is mapped onto a [`ControllerError`] so callers never
//! see a raw `reqwest::Error`.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ControllerError, ControllerResult};
use crate::traits::MapApi;
use shared::{
    component_debug, AckResponse, ApiErrorBody, Component, Configuration, GenerationRequest,
    HistoryEntry, JobStatus,
};

/// Real map server API implementation
pub struct RealMapApi {
    base_url: Url,
    client: Client,
}

impl RealMapApi {
    /// Create a client for the configured server and timeout
    pub fn new(config: &ClientConfig) -> ControllerResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ControllerError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.server_url.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL; each segment is percent-encoded on its own
    fn endpoint(&self, segments: &[&str]) -> ControllerResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ControllerError::config(format!("Server URL cannot have a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, segments: &[&str]) -> ControllerResult<Response> {
        let url = self.endpoint(segments)?;
        component_debug!(Component::Controller, "GET {}", url.path());
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ControllerError::transport(url.path(), e))?;
        ensure_success(url.path(), response)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> ControllerResult<T> {
        let url = self.endpoint(segments)?;
        let response = self.get(segments).await?;
        decode(url.path(), response).await
    }

    /// POST a JSON body to an endpoint that answers with `{success}`
    ///
    /// A refusal, either `success: false` or an error body, is turned into
    /// an error with `rejected`.
    async fn post_acknowledged<B>(
        &self,
        segments: &[&str],
        body: &B,
        rejected: fn(String) -> ControllerError,
    ) -> ControllerResult<()>
    where
        B: serde::Serialize + Sync,
    {
        let url = self.endpoint(segments)?;
        component_debug!(Component::Controller, "POST {}", url.path());
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| ControllerError::transport(url.path(), e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let text = response
                .text()
                .await
                .map_err(|e| ControllerError::transport(url.path(), e))?;
            return Err(rejection(url.path(), status, &text, rejected));
        }

        let ack: AckResponse = decode(url.path(), response).await?;
        if ack.success {
            Ok(())
        } else {
            Err(rejected(ack.reason()))
        }
    }
}

fn ensure_success(endpoint: &str, response: Response) -> ControllerResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ControllerError::HttpStatus {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        })
    }
}

async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> ControllerResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| ControllerError::transport(endpoint, format!("invalid response body: {e}")))
}

/// Turn an error response into the most specific error available
fn rejection(
    endpoint: &str,
    status: StatusCode,
    body: &str,
    rejected: fn(String) -> ControllerError,
) -> ControllerError {
    if let Ok(ApiErrorBody { error }) = serde_json::from_str::<ApiErrorBody>(body) {
        return rejected(error);
    }
    if let Ok(ack) = serde_json::from_str::<AckResponse>(body) {
        if ack.error.is_some() || ack.message.is_some() {
            return rejected(ack.reason());
        }
    }
    ControllerError::HttpStatus {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
    }
}

#[async_trait]
impl MapApi for RealMapApi {
    async fn fetch_config(&self) -> ControllerResult<Configuration> {
        self.get_json(&["api", "config"]).await
    }

    async fn save_config(&self, config: &Configuration) -> ControllerResult<()> {
        self.post_acknowledged(&["api", "config"], config, |reason| ControllerError::ConfigRejected { reason })
            .await
    }

    async fn submit_generation(&self, request: &GenerationRequest) -> ControllerResult<()> {
        self.post_acknowledged(&["api", "generate"], request, |reason| {
            ControllerError::SubmissionRejected { reason }
        })
        .await
    }

    async fn fetch_status(&self) -> ControllerResult<JobStatus> {
        self.get_json(&["api", "status"]).await
    }

    async fn fetch_history(&self) -> ControllerResult<Vec<HistoryEntry>> {
        self.get_json(&["api", "history"]).await
    }

    async fn fetch_image(&self, filename: &str) -> ControllerResult<Vec<u8>> {
        let url = self.endpoint(&["api", "image", filename])?;
        let response = self.get(&["api", "image", filename]).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ControllerError::transport(url.path(), e))?;
        Ok(bytes.to_vec())
    }
}
