use thiserror::Error;
use url::Url;

use crate::shared::constants::{SPEECH_ENDPOINT_VAR, SPEECH_KEY_VAR, SPEECH_REGION_VAR};
use crate::translation::domain::translation_recognizer::RecognitionRequest;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {0} is empty")]
    Empty(&'static str),
    #[error("invalid speech endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

/// Credentials and endpoint for the speech translation service.
#[derive(Clone, PartialEq, Eq)]
pub struct SpeechConfig {
    subscription_key: String,
    region: String,
    endpoint: Option<String>,
}

impl std::fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("subscription_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl SpeechConfig {
    pub fn new(subscription_key: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            subscription_key: subscription_key.into(),
            region: region.into(),
            endpoint: None,
        }
    }

    /// Replace the region-derived WebSocket endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Read `SPEECH_KEY`, `SPEECH_REGION` and the optional `SPEECH_ENDPOINT`.
    pub fn from_env() -> Result<Self, SpeechConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SpeechConfigError> {
        let required = |name: &'static str| -> Result<String, SpeechConfigError> {
            let value = lookup(name).ok_or(SpeechConfigError::Missing(name))?;
            let value = value.trim().to_string();
            if value.is_empty() {
                return Err(SpeechConfigError::Empty(name));
            }
            Ok(value)
        };

        let mut config = Self::new(required(SPEECH_KEY_VAR)?, required(SPEECH_REGION_VAR)?);
        if let Some(endpoint) = lookup(SPEECH_ENDPOINT_VAR) {
            let endpoint = endpoint.trim();
            if !endpoint.is_empty() {
                config = config.with_endpoint(endpoint);
            }
        }
        Ok(config)
    }

    pub fn subscription_key(&self) -> &str {
        &self.subscription_key
    }

    fn base_endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "wss://{}.stt.speech.microsoft.com/speech/translation/cognitiveservices/v1",
                self.region
            ),
        }
    }

    /// Full WebSocket URL for one recognition request.
    pub fn endpoint_url(&self, request: &RecognitionRequest) -> Result<Url, SpeechConfigError> {
        let base = self.base_endpoint();
        let mut url = Url::parse(&base).map_err(|e| SpeechConfigError::InvalidEndpoint {
            endpoint: base.clone(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "wss" && url.scheme() != "ws" {
            return Err(SpeechConfigError::InvalidEndpoint {
                endpoint: base,
                reason: "scheme must be ws or wss".to_string(),
            });
        }
        url.query_pairs_mut()
            .append_pair("from", &request.source_language)
            .append_pair("to", request.target_language.code())
            .append_pair("format", "detailed");
        Ok(url)
    }
}
