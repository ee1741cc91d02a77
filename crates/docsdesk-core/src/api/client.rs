use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{AskRequest, AskResponse, IngestResponse};
use crate::config::Config;
use crate::error::{ApiError, Result};

const ASK_PATH: &str = "get-answer";
const INGEST_PATH: &str = "ingest-data";

/// HTTP client for the question-answering and ingestion backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// `timeout` of `None` leaves reqwest's default in place.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: normalize_base(base_url)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(&config.backend_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /get-answer` with `{ "query": ... }`
    pub async fn ask(&self, query: &str) -> Result<AskResponse> {
        let url = self.endpoint(ASK_PATH)?;
        let request = AskRequest {
            query: query.to_string(),
        };

        tracing::debug!(%url, "asking question");
        let response = self.client.post(url).json(&request).send().await?;
        decode(response).await
    }

    /// `GET /ingest-data`
    pub async fn ingest(&self) -> Result<IngestResponse> {
        let url = self.endpoint(INGEST_PATH)?;

        tracing::debug!(%url, "requesting ingestion");
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }
}

/// Ensure the base path ends with `/` so relative joins append instead of
/// replacing the last segment (`http://host/api` + `get-answer` -> `/api/get-answer`).
fn normalize_base(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}
