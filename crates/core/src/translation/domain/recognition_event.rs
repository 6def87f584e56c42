use std::collections::HashMap;
use std::fmt;

/// Outcome classification of one recognition result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultReason {
    /// Speech was recognized and translated.
    TranslatedSpeech,
    /// Speech was recognized but the translation step failed.
    RecognizedSpeech,
    /// Nothing recognizable in the utterance.
    NoMatch,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatchReason {
    NotRecognized,
    InitialSilenceTimeout,
    InitialBabbleTimeout,
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoMatchReason::NotRecognized => write!(f, "speech not recognized"),
            NoMatchReason::InitialSilenceTimeout => write!(f, "initial silence timeout"),
            NoMatchReason::InitialBabbleTimeout => write!(f, "initial babble timeout"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    Error,
    EndOfStream,
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancellationReason::Error => write!(f, "Error"),
            CancellationReason::EndOfStream => write!(f, "EndOfStream"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationErrorCode {
    NoError,
    AuthenticationFailure,
    BadRequest,
    ConnectionFailure,
    ServiceError,
    RuntimeError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationDetails {
    pub reason: CancellationReason,
    pub error_code: CancellationErrorCode,
    pub error_details: String,
}

impl CancellationDetails {
    pub fn error(error_code: CancellationErrorCode, details: impl Into<String>) -> Self {
        Self {
            reason: CancellationReason::Error,
            error_code,
            error_details: details.into(),
        }
    }

    pub fn end_of_stream() -> Self {
        Self {
            reason: CancellationReason::EndOfStream,
            error_code: CancellationErrorCode::NoError,
            error_details: String::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.reason == CancellationReason::Error
    }
}

/// One final result from the recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    pub reason: ResultReason,
    /// Source-language transcript.
    pub text: String,
    /// Translations keyed by language code.
    pub translations: HashMap<String, String>,
    pub no_match_reason: Option<NoMatchReason>,
    pub cancellation: Option<CancellationDetails>,
}

impl RecognitionResult {
    pub fn translated(text: impl Into<String>, translations: HashMap<String, String>) -> Self {
        Self {
            reason: ResultReason::TranslatedSpeech,
            text: text.into(),
            translations,
            no_match_reason: None,
            cancellation: None,
        }
    }

    pub fn no_match(reason: NoMatchReason) -> Self {
        Self {
            reason: ResultReason::NoMatch,
            text: String::new(),
            translations: HashMap::new(),
            no_match_reason: Some(reason),
            cancellation: None,
        }
    }

    pub fn canceled(details: CancellationDetails) -> Self {
        Self {
            reason: ResultReason::Canceled,
            text: String::new(),
            translations: HashMap::new(),
            no_match_reason: None,
            cancellation: Some(details),
        }
    }

    /// Translation for `code`, matched case-insensitively.
    pub fn translation_for(&self, code: &str) -> Option<&str> {
        self.translations
            .iter()
            .find(|(lang, _)| lang.eq_ignore_ascii_case(code))
            .map(|(_, text)| text.as_str())
    }
}

/// Events a recognizer delivers during continuous recognition.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    SessionStarted,
    Recognized(RecognitionResult),
    Canceled(CancellationDetails),
    SessionStopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_for_ignores_case() {
        let mut translations = HashMap::new();
        translations.insert("EN".to_string(), "Hello".to_string());
        let result = RecognitionResult::translated("你好", translations);
        assert_eq!(result.translation_for("en"), Some("Hello"));
        assert_eq!(result.translation_for("de"), None);
    }

    #[test]
    fn test_cancellation_details_error() {
        let details =
            CancellationDetails::error(CancellationErrorCode::AuthenticationFailure, "401");
        assert!(details.is_error());
        assert_eq!(details.reason.to_string(), "Error");
    }

    #[test]
    fn test_end_of_stream_is_not_error() {
        assert!(!CancellationDetails::end_of_stream().is_error());
    }

    #[test]
    fn test_no_match_result_has_no_translations() {
        let result = RecognitionResult::no_match(NoMatchReason::InitialSilenceTimeout);
        assert_eq!(result.reason, ResultReason::NoMatch);
        assert!(result.translations.is_empty());
        assert_eq!(
            result.no_match_reason.unwrap().to_string(),
            "initial silence timeout"
        );
    }
}
