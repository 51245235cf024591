//! Open-data portal configuration.

/// Environment variable holding the portal application token.
pub const APP_TOKEN_ENV: &str = "NYC_OPEN_DATA_APP_TOKEN";

/// Environment variable overriding the portal base URL.
pub const BASE_URL_ENV: &str = "NYC_OPEN_DATA_BASE_URL";

/// Production portal.
pub const DEFAULT_BASE_URL: &str = "https://data.cityofnewyork.us";

/// Configuration errors, raised before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No application token was provided.
    #[error("{APP_TOKEN_ENV} is not set")]
    MissingAppToken,
}

/// Credentials and endpoint for the open-data portal.
#[derive(Clone, PartialEq, Eq)]
pub struct OpenDataConfig {
    /// Application token sent with every request.
    pub app_token: String,
    /// Portal root without a trailing slash.
    pub base_url: String,
}

impl std::fmt::Debug for OpenDataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenDataConfig")
            .field("app_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenDataConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingAppToken`] if `app_token` is blank.
    pub fn new(
        app_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let app_token = app_token.into();
        if app_token.trim().is_empty() {
            return Err(ConfigError::MissingAppToken);
        }
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            app_token,
            base_url,
        })
    }

    /// Reads [`APP_TOKEN_ENV`] and, optionally, [`BASE_URL_ENV`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingAppToken`] if the token is unset or
    /// empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingAppToken`] if the token is unset or
    /// empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let app_token = lookup(APP_TOKEN_ENV).ok_or(ConfigError::MissingAppToken)?;
        let base_url = lookup(BASE_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(app_token, base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn missing_token_is_an_error() {
        assert_eq!(
            OpenDataConfig::from_lookup(env(&[])),
            Err(ConfigError::MissingAppToken)
        );
    }

    #[test]
    fn blank_token_is_an_error() {
        assert_eq!(
            OpenDataConfig::from_lookup(env(&[(APP_TOKEN_ENV, "  ")])),
            Err(ConfigError::MissingAppToken)
        );
    }

    #[test]
    fn defaults_base_url() {
        let config = OpenDataConfig::from_lookup(env(&[(APP_TOKEN_ENV, "tok")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.app_token, "tok");
    }

    #[test]
    fn trims_trailing_slash_from_override() {
        let config = OpenDataConfig::from_lookup(env(&[
            (APP_TOKEN_ENV, "tok"),
            (BASE_URL_ENV, "http://127.0.0.1:1234/"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:1234");
    }

    #[test]
    fn debug_output_hides_token() {
        let config = OpenDataConfig::new("secret", DEFAULT_BASE_URL).unwrap();
        assert!(!format!("{config:?}").contains("secret"));
    }
}
