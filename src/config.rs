use std::fmt;

use crate::error::InsightError;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Keys shorter than this are rejected before any request is made.
pub const MIN_API_KEY_LEN: usize = 10;

/// Credential for the generative-language service. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First four characters plus the length, safe for logs.
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(4).collect();
        format!("{prefix}\u{2026}({} chars)", self.0.chars().count())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self.redacted())
    }
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<ApiKey>,
    pub endpoint: String,
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Config {
    /// Load `.env` (if present) and read the `GEMINI_*` variables.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::info!("Loaded environment from {:?}", path),
            Err(e) if e.not_found() => tracing::debug!("No .env file found"),
            Err(e) => tracing::warn!("Failed to read .env file: {e}"),
        }

        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let config = Self {
            api_key: non_empty("GEMINI_API_KEY").map(|k| ApiKey::new(k.trim())),
            endpoint: non_empty("GEMINI_ENDPOINT")
                .map(|e| e.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        };

        match &config.api_key {
            Some(key) => tracing::info!("GEMINI_API_KEY present ({})", key.redacted()),
            None => tracing::warn!("GEMINI_API_KEY is not set; AI insights are unavailable"),
        }
        config
    }

    /// The credential, if it is present and plausibly long enough.
    pub fn validated_api_key(&self) -> Result<&ApiKey, InsightError> {
        let key = self.api_key.as_ref().ok_or_else(|| {
            InsightError::Credential(
                "API key not found. Please set GEMINI_API_KEY in your environment or .env file."
                    .to_string(),
            )
        })?;
        if key.expose().chars().count() < MIN_API_KEY_LEN {
            return Err(InsightError::Credential(
                "API key appears to be invalid. Please check your .env file.".to_string(),
            ));
        }
        Ok(key)
    }

    /// Full `generateContent` URL without the key parameter.
    pub fn generate_url(&self) -> String {
        format!("{}/{}:generateContent", self.endpoint, self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_a_credential_error() {
        let config = Config::default();
        let err = config.validated_api_key().unwrap_err();
        assert!(matches!(err, InsightError::Credential(ref m) if m.starts_with("API key not found")));
    }

    #[test]
    fn short_key_is_rejected() {
        let config = Config { api_key: Some(ApiKey::new("abc")), ..Config::default() };
        let err = config.validated_api_key().unwrap_err();
        assert!(matches!(err, InsightError::Credential(ref m) if m.contains("appears to be invalid")));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let key = ApiKey::new("AIzaSyDUMMYDUMMYDUMMY");
        let printed = format!("{key:?}");
        assert!(!printed.contains("DUMMY"));
        assert!(printed.contains("AIza"));
    }

    #[test]
    fn generate_url_joins_endpoint_and_model() {
        let config = Config::default();
        assert_eq!(
            config.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
