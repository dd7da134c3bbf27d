use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::json::Node;

pub const DEFAULT_ENDPOINT: &str = "messages";

const ENV_URL: &str = "WHATSAPP_URL";
const ENV_TOKEN: &str = "WHATSAPP_TOKEN";
const ENV_THROW_HTTP_EXCEPTIONS: &str = "WHATSAPP_THROW_HTTP_EXCEPTIONS";

/// Static driver configuration, loaded once and shared read-only afterwards.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(from = "Value")]
pub struct WhatsAppConfig {
    url: String,
    token: String,
    throw_http_exceptions: bool,
}

impl From<Value> for WhatsAppConfig {
    fn from(section: Value) -> Self {
        Self::from_value(&section)
    }
}

impl WhatsAppConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            throw_http_exceptions: false,
        }
    }

    /// Switches the dispatcher between strict (`true`) and lenient mode.
    pub fn with_throw_http_exceptions(mut self, enabled: bool) -> Self {
        self.throw_http_exceptions = enabled;
        self
    }

    /// Reads the `whatsapp` section handed over by the host configuration.
    ///
    /// Each key is read on its own: unknown keys are ignored, missing keys fall
    /// back to their defaults and scalars are accepted in string form, so one
    /// badly typed entry never discards the rest of the section. A section that
    /// is not an object yields an unconfigured driver.
    pub fn from_value(section: &Value) -> Self {
        if !section.is_object() && !section.is_null() {
            warn!("whatsapp config section is not an object; using defaults");
        }
        let section = Node::new(section);
        Self {
            url: section.get("url").text_or_empty(),
            token: section.get("token").text_or_empty(),
            throw_http_exceptions: section
                .get("throw_http_exceptions")
                .text()
                .is_some_and(|value| parse_flag(&value)),
        }
    }

    pub fn from_env() -> Self {
        let url = std::env::var(ENV_URL).unwrap_or_default();
        let token = std::env::var(ENV_TOKEN).unwrap_or_default();
        let throw_http_exceptions = std::env::var(ENV_THROW_HTTP_EXCEPTIONS)
            .map(|value| parse_flag(&value))
            .unwrap_or(false);
        Self {
            url,
            token,
            throw_http_exceptions,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn throw_http_exceptions(&self) -> bool {
        self.throw_http_exceptions
    }

    /// A driver is usable once an API base URL is set; the token is not checked
    /// and the URL is not validated.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }

    pub fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Mutex, OnceLock};

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn restore_env(key: &str, previous: Option<String>) {
        if let Some(value) = previous {
            unsafe {
                std::env::set_var(key, value);
            }
        } else {
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn api_url_joins_endpoint() {
        let config = WhatsAppConfig::new("https://graph.facebook.com/v19.0/123/", "t");
        assert_eq!(
            config.api_url(DEFAULT_ENDPOINT),
            "https://graph.facebook.com/v19.0/123/messages"
        );
        assert_eq!(
            config.api_url("/media"),
            "https://graph.facebook.com/v19.0/123/media"
        );
    }

    #[test]
    fn configured_only_with_url() {
        assert!(!WhatsAppConfig::default().is_configured());
        assert!(!WhatsAppConfig::new("", "token").is_configured());
        assert!(WhatsAppConfig::new("https://example.com", "").is_configured());
        assert!(WhatsAppConfig::new(" ", "").is_configured());
    }

    #[test]
    fn from_value_reads_section() {
        let config = WhatsAppConfig::from_value(&json!({
            "url": "https://example.com/v1",
            "token": "secret",
            "throw_http_exceptions": true,
            "unrelated": 42
        }));
        assert_eq!(config.url(), "https://example.com/v1");
        assert_eq!(config.token(), "secret");
        assert!(config.throw_http_exceptions());
    }

    #[test]
    fn from_value_accepts_string_typed_flags() {
        let config = WhatsAppConfig::from_value(&json!({
            "url": "https://graph.facebook.com/v19.0/123",
            "token": "secret",
            "throw_http_exceptions": "1"
        }));
        assert!(config.is_configured());
        assert_eq!(config.url(), "https://graph.facebook.com/v19.0/123");
        assert_eq!(config.token(), "secret");
        assert!(config.throw_http_exceptions());

        for (flag, expected) in [
            (json!("on"), true),
            (json!("Yes"), true),
            (json!(1), true),
            (json!("false"), false),
            (json!(0), false),
            (json!({ "nested": true }), false),
        ] {
            let config = WhatsAppConfig::from_value(&json!({
                "url": "https://example.com",
                "throw_http_exceptions": flag
            }));
            assert_eq!(config.throw_http_exceptions(), expected, "flag {flag}");
            assert_eq!(config.url(), "https://example.com");
        }
    }

    #[test]
    fn from_value_keeps_valid_keys_beside_bad_ones() {
        let config = WhatsAppConfig::from_value(&json!({
            "url": "https://example.com",
            "token": ["not", "a", "string"]
        }));
        assert!(config.is_configured());
        assert_eq!(config.token(), "");

        let config = WhatsAppConfig::from_value(&json!("https://example.com"));
        assert_eq!(config, WhatsAppConfig::default());

        let config: WhatsAppConfig = serde_json::from_value(json!({
            "url": "https://example.com",
            "throw_http_exceptions": "true"
        }))
        .unwrap();
        assert!(config.is_configured());
        assert!(config.throw_http_exceptions());
    }

    #[test]
    fn from_value_defaults_missing_keys() {
        let config = WhatsAppConfig::from_value(&json!({ "url": "https://example.com" }));
        assert_eq!(config.token(), "");
        assert!(!config.throw_http_exceptions());

        let config = WhatsAppConfig::from_value(&Value::Null);
        assert_eq!(config, WhatsAppConfig::default());
    }

    #[test]
    fn from_env_reads_variables() {
        let _guard = env_lock().lock().unwrap();
        let prev_url = std::env::var(ENV_URL).ok();
        let prev_token = std::env::var(ENV_TOKEN).ok();
        let prev_flag = std::env::var(ENV_THROW_HTTP_EXCEPTIONS).ok();
        unsafe {
            std::env::set_var(ENV_URL, "https://graph.test/v19.0/42");
            std::env::set_var(ENV_TOKEN, "token-123");
            std::env::set_var(ENV_THROW_HTTP_EXCEPTIONS, "TRUE");
        }

        let config = WhatsAppConfig::from_env();
        assert_eq!(config.url(), "https://graph.test/v19.0/42");
        assert_eq!(config.token(), "token-123");
        assert!(config.throw_http_exceptions());

        unsafe {
            std::env::set_var(ENV_THROW_HTTP_EXCEPTIONS, "0");
        }
        assert!(!WhatsAppConfig::from_env().throw_http_exceptions());

        restore_env(ENV_URL, prev_url);
        restore_env(ENV_TOKEN, prev_token);
        restore_env(ENV_THROW_HTTP_EXCEPTIONS, prev_flag);
    }
}
