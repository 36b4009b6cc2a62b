//! Configuration management for the client.

use roster_engine::ScreenConfig;
use std::env;
use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the admin API, without a trailing slash
    pub api_url: String,
    /// Bearer token to start the session with
    pub api_token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Overrides every screen's page size
    pub page_size: Option<usize>,
    /// Quiet period before a search term is applied
    pub search_debounce_ms: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("ROSTER_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingApiUrl)?;
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError::InvalidApiUrl(api_url));
        }

        let api_token = lookup("ROSTER_API_TOKEN").filter(|token| !token.trim().is_empty());

        let timeout_ms = parse_var(&lookup, "ROSTER_TIMEOUT_MS")?.unwrap_or(DEFAULT_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "ROSTER_TIMEOUT_MS",
                value: "0".into(),
            });
        }

        let page_size: Option<usize> = parse_var(&lookup, "ROSTER_PAGE_SIZE")?;
        if page_size == Some(0) {
            return Err(ConfigError::Invalid {
                name: "ROSTER_PAGE_SIZE",
                value: "0".into(),
            });
        }

        let search_debounce_ms = parse_var(&lookup, "ROSTER_SEARCH_DEBOUNCE_MS")?
            .unwrap_or(roster_engine::DEFAULT_DEBOUNCE_MS);

        Ok(Self {
            api_url,
            api_token,
            timeout: Duration::from_millis(timeout_ms),
            page_size,
            search_debounce_ms,
        })
    }

    /// Apply the overrides to a screen preset.
    pub fn apply(&self, screen: ScreenConfig) -> ScreenConfig {
        let screen = screen.with_debounce_ms(self.search_debounce_ms);
        match self.page_size {
            Some(size) => screen.with_page_size(size),
            None => screen,
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ROSTER_API_URL environment variable is required")]
    MissingApiUrl,

    #[error("ROSTER_API_URL must be an http(s) URL, got {0:?}")]
    InvalidApiUrl(String),

    #[error("Invalid {name} value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config =
            ClientConfig::from_lookup(lookup(&[("ROSTER_API_URL", "http://localhost:8080/api/")]))
                .unwrap();
        assert_eq!(config.api_url, "http://localhost:8080/api");
        assert_eq!(config.api_token, None);
        assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert_eq!(config.page_size, None);
        assert_eq!(config.search_debounce_ms, 500);
    }

    #[test]
    fn missing_url() {
        assert_eq!(
            ClientConfig::from_lookup(lookup(&[])),
            Err(ConfigError::MissingApiUrl)
        );
    }

    #[test]
    fn non_http_url() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("ROSTER_API_URL", "ftp://x")])),
            Err(ConfigError::InvalidApiUrl(_))
        ));
    }

    #[test]
    fn invalid_numbers() {
        let result = ClientConfig::from_lookup(lookup(&[
            ("ROSTER_API_URL", "https://api.example.com"),
            ("ROSTER_PAGE_SIZE", "ten"),
        ]));
        assert_eq!(
            result,
            Err(ConfigError::Invalid {
                name: "ROSTER_PAGE_SIZE",
                value: "ten".into()
            })
        );

        let result = ClientConfig::from_lookup(lookup(&[
            ("ROSTER_API_URL", "https://api.example.com"),
            ("ROSTER_TIMEOUT_MS", "0"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { name: "ROSTER_TIMEOUT_MS", .. })));
    }

    #[test]
    fn overrides_apply_to_presets() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ROSTER_API_URL", "https://api.example.com"),
            ("ROSTER_API_TOKEN", "secret"),
            ("ROSTER_PAGE_SIZE", "25"),
            ("ROSTER_SEARCH_DEBOUNCE_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.api_token.as_deref(), Some("secret"));

        let screen = config.apply(roster_engine::presets::products());
        assert_eq!(screen.page_size, 25);
        assert_eq!(screen.debounce_ms, 250);
    }
}
