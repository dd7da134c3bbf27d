use std::sync::Arc;

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};
use serde_json::{Map, Value, json};
use tracing::{Instrument, warn};

use crate::config::{DEFAULT_ENDPOINT, WhatsAppConfig};
use crate::error::{ConnectionError, DriverError};
use crate::json::merge_recursive;
use crate::telemetry;
use crate::transport::{Transport, TransportRequest, TransportResponse};
use crate::types::IncomingMessage;

/// Sends compiled payloads to the Cloud API.
///
/// In strict mode (`throw_http_exceptions`) a non-success response becomes a
/// [`DriverError::Connection`] carrying the full request context; in lenient
/// mode the response is returned as-is and the caller inspects the status.
/// Every call is a single attempt.
pub struct Dispatcher<T> {
    config: Arc<WhatsAppConfig>,
    transport: T,
}

impl<T> Dispatcher<T>
where
    T: Transport,
{
    pub fn new(config: Arc<WhatsAppConfig>, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &WhatsAppConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Posts a fully built payload to the default `messages` endpoint.
    pub async fn send_payload(&self, payload: &Value) -> Result<TransportResponse, DriverError> {
        self.post(
            self.config.api_url(DEFAULT_ENDPOINT),
            json!({}),
            payload.clone(),
        )
        .await
    }

    /// Posts `parameters` to an arbitrary endpoint, defaulting `to` to the
    /// matching message's recipient. Caller parameters win on conflict.
    pub async fn send_request(
        &self,
        endpoint: &str,
        parameters: &Value,
        matching: &IncomingMessage,
    ) -> Result<TransportResponse, DriverError> {
        let mut body = Map::new();
        body.insert("to".into(), json!(matching.recipient()));
        if let Value::Object(parameters) = parameters {
            merge_recursive(&mut body, parameters);
        }
        self.post(self.config.api_url(endpoint), json!({}), Value::Object(body))
            .await
    }

    pub fn auth_headers(&self) -> Result<HeaderMap, DriverError> {
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.config.token()))
            .map_err(DriverError::InvalidHeader)?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn post(
        &self,
        url: String,
        url_parameters: Value,
        body: Value,
    ) -> Result<TransportResponse, DriverError> {
        let strict = self.config.throw_http_exceptions();
        let request = TransportRequest {
            url,
            url_parameters,
            body,
            headers: self.auth_headers()?,
            encode_as_json: true,
        };
        let span = telemetry::dispatch_span(&request.url, strict);

        let response = self
            .transport
            .post(&request)
            .instrument(span)
            .await
            .map_err(|err| {
                telemetry::record_dispatch_error("transport");
                DriverError::from(err)
            })?;

        let status = response.status();
        telemetry::record_dispatch(status.as_u16());
        if response.is_success() {
            return Ok(response);
        }
        if !strict {
            warn!(
                url = %request.url,
                status = status.as_u16(),
                "whatsapp request failed; returning raw response"
            );
            return Ok(response);
        }

        telemetry::record_dispatch_error("remote");
        Err(ConnectionError::from_response(
            status.as_u16(),
            response.body(),
            &request.url,
            &request.url_parameters,
            &request.body,
            &request.headers,
        )
        .into())
    }
}
