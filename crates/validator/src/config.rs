//! Dispatcher configuration
//!
//! Every field has a default, so an empty JSON object or an empty
//! environment yields [`FlowConfig::default`].

use serde::{Deserialize, Serialize};

/// Settings shared by every [`FlowDispatcher`](crate::flow::FlowDispatcher)
/// of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// View template used by `on_error_use_page_of` when the route has no
    /// explicit view. `{handler}` and `{method}` are substituted.
    pub view_pattern: String,

    /// Status emitted by `on_error_send_bad_request`.
    pub bad_request_status: u16,

    /// Seconds a flash carrier waits for its single read before expiring.
    pub flash_ttl_secs: u64,

    /// Name the error-only view is exposed under.
    pub errors_name: String,

    /// Name the all-severities view is exposed under.
    pub messages_name: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            view_pattern: "{handler}/{method}".to_string(),
            bad_request_status: 400,
            flash_ttl_secs: 300,
            errors_name: "errors".to_string(),
            messages_name: "vmessages".to_string(),
        }
    }
}

impl FlowConfig {
    /// Reads `VIGIL_VIEW_PATTERN`, `VIGIL_BAD_REQUEST_STATUS` and
    /// `VIGIL_FLASH_TTL_SECS`, keeping defaults for anything unset or
    /// unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// [`from_env`](Self::from_env) over an arbitrary variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(pattern) = lookup("VIGIL_VIEW_PATTERN") {
            config.view_pattern = pattern;
        }

        if let Some(status) = lookup("VIGIL_BAD_REQUEST_STATUS") {
            match status.parse::<u16>() {
                Ok(code) if http::StatusCode::from_u16(code).is_ok() => {
                    config.bad_request_status = code;
                }
                _ => tracing::warn!(value = %status, "ignoring invalid VIGIL_BAD_REQUEST_STATUS"),
            }
        }

        if let Some(ttl) = lookup("VIGIL_FLASH_TTL_SECS") {
            match ttl.parse() {
                Ok(secs) => config.flash_ttl_secs = secs,
                Err(_) => tracing::warn!(value = %ttl, "ignoring invalid VIGIL_FLASH_TTL_SECS"),
            }
        }

        config
    }

    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The configured bad-request status, falling back to 400 when the
    /// number is not a valid HTTP status.
    #[must_use]
    pub fn bad_request_status(&self) -> http::StatusCode {
        http::StatusCode::from_u16(self.bad_request_status).unwrap_or(http::StatusCode::BAD_REQUEST)
    }

    /// Expands [`view_pattern`](Self::view_pattern) for a handler method.
    #[must_use]
    pub fn view_for(&self, handler: &str, method: &str) -> String {
        self.view_pattern
            .replace("{handler}", handler)
            .replace("{method}", method)
    }

    pub(crate) fn flash_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.flash_ttl_secs)
    }
}
