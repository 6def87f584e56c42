use super::recognition_event::{CancellationDetails, RecognitionEvent, ResultReason};
use super::target_language::TargetLanguage;
use super::translation_segment::TranslationSegment;

/// How a recognition session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The recognizer reported session-stopped (end of audio), or went away.
    Stopped,
    Canceled(CancellationDetails),
}

impl SessionEnd {
    pub fn is_error(&self) -> bool {
        matches!(self, SessionEnd::Canceled(details) if details.is_error())
    }
}

/// Accumulated output of one session, in recognition order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub segments: Vec<TranslationSegment>,
    pub end: SessionEnd,
    pub no_match_count: usize,
}

/// Per-session state fed with recognizer events on the caller's thread.
///
/// Only `TranslatedSpeech` results carrying the target language contribute
/// segments. The first `SessionStopped` or `Canceled` event finishes the
/// session; later events are ignored.
#[derive(Debug)]
pub struct TranslationSession {
    target: TargetLanguage,
    segments: Vec<TranslationSegment>,
    no_match_count: usize,
    end: Option<SessionEnd>,
}

impl TranslationSession {
    pub fn new(target: TargetLanguage) -> Self {
        Self {
            target,
            segments: Vec::new(),
            no_match_count: 0,
            end: None,
        }
    }

    /// Apply one event. Returns true once the session has finished.
    pub fn handle(&mut self, event: RecognitionEvent) -> bool {
        if self.end.is_some() {
            return true;
        }

        match event {
            RecognitionEvent::SessionStarted => {
                log::info!("Translation session started");
            }
            RecognitionEvent::Recognized(result) => match result.reason {
                ResultReason::TranslatedSpeech => {
                    let code = self.target.code();
                    match result.translation_for(code) {
                        Some(translated) => {
                            log::info!("Recognized: {}", result.text);
                            log::info!("Translated into '{code}': {translated}");
                            self.segments
                                .push(TranslationSegment::new(result.text.clone(), translated));
                        }
                        None => {
                            log::warn!("Recognized '{}' without a '{code}' translation", result.text)
                        }
                    }
                }
                ResultReason::RecognizedSpeech => {
                    log::warn!("Recognized but not translated: {}", result.text);
                }
                ResultReason::NoMatch => {
                    self.no_match_count += 1;
                    match result.no_match_reason {
                        Some(reason) => log::info!("No speech could be recognized: {reason}"),
                        None => log::info!("No speech could be recognized"),
                    }
                }
                ResultReason::Canceled => match result.cancellation {
                    Some(details) => log_cancellation(&details),
                    None => log::warn!("Speech recognition canceled"),
                },
            },
            RecognitionEvent::Canceled(details) => {
                log_cancellation(&details);
                log::info!("Closing session on cancellation ({})", details.reason);
                self.end = Some(SessionEnd::Canceled(details));
            }
            RecognitionEvent::SessionStopped => {
                log::info!("Closing session on session stopped");
                self.end = Some(SessionEnd::Stopped);
            }
        }

        self.end.is_some()
    }

    /// Consume the session. A session that never saw a stop or cancel event
    /// (the recognizer hung up) counts as stopped.
    pub fn finish(self) -> TranslationResult {
        TranslationResult {
            segments: self.segments,
            end: self.end.unwrap_or(SessionEnd::Stopped),
            no_match_count: self.no_match_count,
        }
    }
}

fn log_cancellation(details: &CancellationDetails) {
    log::warn!("Speech recognition canceled: {}", details.reason);
    if details.is_error() {
        log::error!("Error details: {}", details.error_details);
        log::error!("Did you set the speech resource key and region values?");
    } else {
        log::info!("Recognition canceled but not due to an error.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::domain::recognition_event::{
        CancellationErrorCode, NoMatchReason, RecognitionResult,
    };
    use std::collections::HashMap;

    fn translated(source: &str, lang: &str, text: &str) -> RecognitionEvent {
        let mut translations = HashMap::new();
        translations.insert(lang.to_string(), text.to_string());
        RecognitionEvent::Recognized(RecognitionResult::translated(source, translations))
    }

    #[test]
    fn test_appends_translations_in_order() {
        let mut session = TranslationSession::new(TargetLanguage::En);
        assert!(!session.handle(RecognitionEvent::SessionStarted));
        assert!(!session.handle(translated("你好", "en", "Hello")));
        assert!(!session.handle(translated("再见", "en", "Goodbye")));
        assert!(session.handle(RecognitionEvent::SessionStopped));

        let result = session.finish();
        assert_eq!(
            result.segments,
            vec![
                TranslationSegment::new("你好", "Hello"),
                TranslationSegment::new("再见", "Goodbye"),
            ]
        );
        assert_eq!(result.end, SessionEnd::Stopped);
    }

    #[test]
    fn test_picks_requested_language() {
        let mut translations = HashMap::new();
        translations.insert("en".to_string(), "Hello".to_string());
        translations.insert("fr".to_string(), "Bonjour".to_string());
        let mut session = TranslationSession::new(TargetLanguage::Fr);
        session.handle(RecognitionEvent::Recognized(RecognitionResult::translated(
            "你好",
            translations,
        )));
        assert_eq!(session.finish().segments[0].translated_text, "Bonjour");
    }

    #[test]
    fn test_missing_target_translation_is_skipped() {
        let mut session = TranslationSession::new(TargetLanguage::De);
        session.handle(translated("你好", "en", "Hello"));
        assert!(session.finish().segments.is_empty());
    }

    #[test]
    fn test_no_match_contributes_nothing() {
        let mut session = TranslationSession::new(TargetLanguage::En);
        session.handle(translated("一", "en", "One"));
        session.handle(RecognitionEvent::Recognized(RecognitionResult::no_match(
            NoMatchReason::NotRecognized,
        )));
        session.handle(translated("二", "en", "Two"));
        session.handle(RecognitionEvent::SessionStopped);

        let result = session.finish();
        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.no_match_count, 1);
    }

    #[test]
    fn test_canceled_result_contributes_nothing_and_keeps_streaming() {
        let mut session = TranslationSession::new(TargetLanguage::En);
        let finished = session.handle(RecognitionEvent::Recognized(RecognitionResult::canceled(
            CancellationDetails::error(CancellationErrorCode::ServiceError, "boom"),
        )));
        assert!(!finished);
        assert!(session.finish().segments.is_empty());
    }

    #[test]
    fn test_cancel_event_finishes_session() {
        let mut session = TranslationSession::new(TargetLanguage::En);
        let details =
            CancellationDetails::error(CancellationErrorCode::AuthenticationFailure, "HTTP 401");
        assert!(session.handle(RecognitionEvent::Canceled(details.clone())));

        let result = session.finish();
        assert!(result.segments.is_empty());
        assert!(result.end.is_error());
        assert_eq!(result.end, SessionEnd::Canceled(details));
    }

    #[test]
    fn test_events_after_finish_are_ignored() {
        let mut session = TranslationSession::new(TargetLanguage::En);
        session.handle(RecognitionEvent::SessionStopped);
        assert!(session.handle(translated("迟", "en", "Late")));
        assert!(session.handle(RecognitionEvent::Canceled(
            CancellationDetails::end_of_stream()
        )));

        let result = session.finish();
        assert!(result.segments.is_empty());
        assert_eq!(result.end, SessionEnd::Stopped);
    }

    #[test]
    fn test_unfinished_session_counts_as_stopped() {
        let mut session = TranslationSession::new(TargetLanguage::Es);
        assert!(!session.handle(translated("你好", "es", "Hola")));
        let result = session.finish();
        assert_eq!(result.end, SessionEnd::Stopped);
        assert_eq!(result.segments.len(), 1);
    }

    #[test]
    fn test_end_of_stream_cancel_is_not_error() {
        let end = SessionEnd::Canceled(CancellationDetails::end_of_stream());
        assert!(!end.is_error());
        assert!(!SessionEnd::Stopped.is_error());
    }
}
