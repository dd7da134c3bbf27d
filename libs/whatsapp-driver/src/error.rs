use std::fmt::{self, Display, Formatter};

use http::HeaderMap;
use http::header::AUTHORIZATION;
use serde_json::Value;

use crate::transport::TransportError;

/// Stands in for a missing `errors.title` (the "Description" line).
pub const NO_VENDOR_DESCRIPTION: &str = "No description from Vendor";
/// Stands in for a missing `errors.code` (the "Error Code" line).
pub const NO_VENDOR_CODE: &str = "No error code from Vendor";

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("WhatsappDriver does not support more than three buttons (got {0})")]
    TooManyButtons(usize),
    #[error("whatsapp connection error\n{0}")]
    Connection(Box<ConnectionError>),
    #[error("whatsapp transport error")]
    Transport(#[from] TransportError),
    #[error("whatsapp token cannot be used as a header value")]
    InvalidHeader(#[source] http::header::InvalidHeaderValue),
}

impl DriverError {
    /// Diagnostic details when the provider rejected a request in strict mode.
    pub fn connection(&self) -> Option<&ConnectionError> {
        match self {
            DriverError::Connection(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<ConnectionError> for DriverError {
    fn from(err: ConnectionError) -> Self {
        DriverError::Connection(Box::new(err))
    }
}

/// Provider rejection captured with the full request context.
#[derive(Debug, Clone)]
pub struct ConnectionError {
    pub status: u16,
    pub title: String,
    pub code: String,
    pub url: String,
    pub url_parameters: Value,
    pub post_parameters: Value,
    pub headers: HeaderMap,
}

impl ConnectionError {
    /// Builds the error from a non-success response body.
    ///
    /// `errors.title` and `errors.code` are optional; a body that is not JSON or
    /// lacks them falls back to fixed placeholders.
    pub fn from_response(
        status: u16,
        body: &str,
        url: &str,
        url_parameters: &Value,
        post_parameters: &Value,
        headers: &HeaderMap,
    ) -> Self {
        let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        let errors = parsed.get("errors");
        let field = |name: &str, fallback: &str| {
            errors
                .and_then(|errors| errors.get(name))
                .filter(|value| !value.is_null())
                .map(render_value)
                .unwrap_or_else(|| fallback.to_string())
        };
        Self {
            status,
            title: field("title", NO_VENDOR_DESCRIPTION),
            code: field("code", NO_VENDOR_CODE),
            url: url.to_string(),
            url_parameters: url_parameters.clone(),
            post_parameters: post_parameters.clone(),
            headers: headers.clone(),
        }
    }
}

impl Display for ConnectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status Code: {}", self.status)?;
        writeln!(f, "Description: {}", self.title)?;
        writeln!(f, "Error Code: {}", self.code)?;
        writeln!(f, "URL: {}", self.url)?;
        writeln!(f, "URL Parameters: {}", pretty(&self.url_parameters))?;
        writeln!(f, "Post Parameters: {}", pretty(&self.post_parameters))?;
        write!(f, "Headers: {}", render_headers(&self.headers))
    }
}

impl std::error::Error for ConnectionError {}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn render_headers(headers: &HeaderMap) -> String {
    let lines: Vec<String> = headers
        .iter()
        .map(|(name, value)| {
            let value = if *name == AUTHORIZATION {
                "Bearer ***".to_string()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            format!("{name}: {value}")
        })
        .collect();
    lines.join(", ")
}
