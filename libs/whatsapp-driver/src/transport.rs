use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use serde_json::Value;

/// A single POST handed to the transport.
#[derive(Clone, Debug)]
pub struct TransportRequest {
    pub url: String,
    pub url_parameters: Value,
    pub body: Value,
    pub headers: HeaderMap,
    /// Send `body` as JSON when set, form-encoded otherwise.
    pub encode_as_json: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    status: StatusCode,
    body: String,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// HTTP collaborator used by the dispatcher. Implementations perform exactly one
/// attempt and report any HTTP status as a response, never as an error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError>;
}

#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .post(&request.url)
            .headers(request.headers.clone());

        let query = form_pairs(&request.url_parameters);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        builder = if request.encode_as_json {
            builder.json(&request.body)
        } else {
            builder.form(&form_pairs(&request.body))
        };

        let response = builder
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: request.url.clone(),
                source,
            })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Body {
                url: request.url.clone(),
                source,
            })?;
        Ok(TransportResponse::new(status, body))
    }
}

/// Flattens a JSON object into key/value pairs; nested values are sent as
/// compact JSON.
pub fn form_pairs(value: &Value) -> Vec<(String, String)> {
    let Some(map) = value.as_object() else {
        return Vec::new();
    };
    map.iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}
