//! Provider configuration
//!
//! Every attribute in the provider block falls back to an environment
//! variable when left out of the configuration.

use std::time::Duration;
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use crate::api::client::DEFAULT_TIMEOUT;

pub const SERVER_URL_ENV: &str = "NETBOX_SERVER_URL";
pub const API_TOKEN_ENV: &str = "NETBOX_API_TOKEN";
pub const ALLOW_INSECURE_HTTPS_ENV: &str = "NETBOX_ALLOW_INSECURE_HTTPS";
pub const REQUEST_TIMEOUT_ENV: &str = "NETBOX_REQUEST_TIMEOUT";

/// Resolved provider settings
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub server_url: String,
    pub api_token: String,
    pub allow_insecure_https: bool,
    pub request_timeout: Duration,
}

impl ProviderConfig {
    /// Collects every problem before giving up so the user sees them all at once
    pub fn from_config(config: &DynamicValue) -> Result<Self, Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();

        let server_url = required_string(config, "server_url", SERVER_URL_ENV, &mut diagnostics);
        let api_token = required_string(config, "api_token", API_TOKEN_ENV, &mut diagnostics);

        let allow_insecure_https = match config
            .get_optional_bool(&AttributePath::new("allow_insecure_https"))
        {
            Ok(Some(value)) => value,
            Ok(None) => match std::env::var(ALLOW_INSECURE_HTTPS_ENV) {
                Ok(raw) => match raw.trim().parse::<bool>() {
                    Ok(value) => value,
                    Err(_) => {
                        diagnostics.push(invalid(
                            "allow_insecure_https",
                            format!("{} must be true or false, got {:?}", ALLOW_INSECURE_HTTPS_ENV, raw),
                        ));
                        false
                    }
                },
                Err(_) => false,
            },
            Err(e) => {
                diagnostics.push(invalid("allow_insecure_https", e.to_string()));
                false
            }
        };

        let timeout_secs = match config.get_optional_i64(&AttributePath::new("request_timeout")) {
            Ok(Some(value)) => Some(value),
            Ok(None) => match std::env::var(REQUEST_TIMEOUT_ENV) {
                Ok(raw) => match raw.trim().parse::<i64>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        diagnostics.push(invalid(
                            "request_timeout",
                            format!("{} must be a whole number of seconds, got {:?}", REQUEST_TIMEOUT_ENV, raw),
                        ));
                        None
                    }
                },
                Err(_) => None,
            },
            Err(e) => {
                diagnostics.push(invalid("request_timeout", e.to_string()));
                None
            }
        };
        let request_timeout = match timeout_secs {
            Some(secs) if secs < 1 => {
                diagnostics.push(invalid(
                    "request_timeout",
                    format!("request_timeout must be at least 1 second, got {}", secs),
                ));
                DEFAULT_TIMEOUT
            }
            Some(secs) => Duration::from_secs(secs as u64),
            None => DEFAULT_TIMEOUT,
        };

        match (server_url, api_token) {
            (Some(server_url), Some(api_token)) if diagnostics.is_empty() => Ok(Self {
                server_url,
                api_token,
                allow_insecure_https,
                request_timeout,
            }),
            _ => Err(diagnostics),
        }
    }
}

fn required_string(
    config: &DynamicValue,
    attribute: &'static str,
    env: &'static str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    let configured = match config.get_optional_string(&AttributePath::new(attribute)) {
        Ok(value) => value,
        Err(e) => {
            diagnostics.push(invalid(attribute, e.to_string()));
            return None;
        }
    };

    let value = configured
        .or_else(|| std::env::var(env).ok())
        .filter(|v| !v.trim().is_empty());
    if value.is_none() {
        diagnostics.push(
            Diagnostic::error(
                format!("Missing {}", attribute),
                format!(
                    "{} is required (set it in the provider block or the {} environment variable)",
                    attribute, env
                ),
            )
            .with_attribute(AttributePath::new(attribute)),
        );
    }
    value
}

fn invalid(attribute: &'static str, detail: String) -> Diagnostic {
    Diagnostic::error(format!("Invalid {}", attribute), detail)
        .with_attribute(AttributePath::new(attribute))
}
