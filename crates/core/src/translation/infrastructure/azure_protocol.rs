//! Framing and payloads of the Speech service WebSocket protocol.
//!
//! Every message is a block of `Name: value` header lines followed by a body.
//! Text messages separate the two with a blank line; binary messages prefix
//! the header block with its length as a big-endian u16.

use std::collections::HashMap;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use crate::translation::domain::recognition_event::{
    CancellationDetails, CancellationErrorCode, NoMatchReason, RecognitionResult, ResultReason,
};

pub const PATH_SPEECH_CONFIG: &str = "speech.config";
pub const PATH_AUDIO: &str = "audio";
pub const PATH_TURN_START: &str = "turn.start";
pub const PATH_TURN_END: &str = "turn.end";
pub const PATH_TRANSLATION_PHRASE: &str = "translation.phrase";

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("message has no header terminator")]
    MissingHeaderTerminator,
    #[error("message has no Path header")]
    MissingPath,
    #[error("binary message too short ({0} bytes)")]
    TruncatedBinary(usize),
    #[error("header block is not valid UTF-8")]
    InvalidHeaderEncoding,
    #[error("header block too long ({0} bytes)")]
    HeaderTooLong(usize),
    #[error("malformed {path} body: {source}")]
    InvalidBody {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A message received from the service, with header names lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMessage {
    headers: HashMap<String, String>,
    body: String,
}

impl ServiceMessage {
    pub fn parse_text(raw: &str) -> Result<Self, ProtocolError> {
        let (header_block, body) = raw
            .split_once("\r\n\r\n")
            .ok_or(ProtocolError::MissingHeaderTerminator)?;
        let headers = parse_headers(header_block);
        if !headers.contains_key("path") {
            return Err(ProtocolError::MissingPath);
        }
        Ok(Self {
            headers,
            body: body.to_string(),
        })
    }

    pub fn parse_binary(raw: &[u8]) -> Result<Self, ProtocolError> {
        if raw.len() < 2 {
            return Err(ProtocolError::TruncatedBinary(raw.len()));
        }
        let header_len = u16::from_be_bytes([raw[0], raw[1]]) as usize;
        if 2 + header_len > raw.len() {
            return Err(ProtocolError::TruncatedBinary(raw.len()));
        }
        let header_block = std::str::from_utf8(&raw[2..2 + header_len])
            .map_err(|_| ProtocolError::InvalidHeaderEncoding)?;
        let headers = parse_headers(header_block);
        if !headers.contains_key("path") {
            return Err(ProtocolError::MissingPath);
        }
        Ok(Self {
            headers,
            body: String::new(),
        })
    }

    pub fn path(&self) -> &str {
        self.headers.get("path").map(String::as_str).unwrap_or_default()
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

fn parse_headers(block: &str) -> HashMap<String, String> {
    block
        .lines()
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

/// Timestamp in the form the service expects (`2024-01-01T00:00:00.000Z`).
pub fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// A UUID without dashes, used for connection and request ids.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// The `speech.config` text message announcing the client and a file source.
pub fn speech_config_message(request_id: &str, timestamp: &str) -> String {
    let body = serde_json::json!({
        "context": {
            "system": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
            "os": {
                "platform": std::env::consts::OS,
                "name": std::env::consts::FAMILY,
                "version": std::env::consts::ARCH,
            },
            "audio": {
                "source": { "type": "File" }
            }
        }
    });
    format!(
        "Path: {PATH_SPEECH_CONFIG}\r\nX-RequestId: {request_id}\r\nX-Timestamp: {timestamp}\r\nContent-Type: application/json; charset=utf-8\r\n\r\n{body}"
    )
}

/// A binary `audio` message. An empty payload marks the end of the stream.
pub fn audio_message(
    request_id: &str,
    timestamp: &str,
    payload: &[u8],
) -> Result<Vec<u8>, ProtocolError> {
    let headers = format!(
        "Path: {PATH_AUDIO}\r\nX-RequestId: {request_id}\r\nX-Timestamp: {timestamp}\r\nContent-Type: audio/x-wav\r\n"
    );
    let header_len =
        u16::try_from(headers.len()).map_err(|_| ProtocolError::HeaderTooLong(headers.len()))?;

    let mut message = Vec::with_capacity(2 + headers.len() + payload.len());
    message.extend_from_slice(&header_len.to_be_bytes());
    message.extend_from_slice(headers.as_bytes());
    message.extend_from_slice(payload);
    Ok(message)
}

/// One parsed `translation.phrase` message.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationPhrase {
    /// `None` for `EndOfDictation`, which only marks the end of the audio
    /// and carries no utterance.
    pub result: Option<RecognitionResult>,
    /// End of the phrase in 100 ns ticks, counted from the start of the
    /// audio sent on this connection.
    pub audio_end: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PhraseBody {
    recognition_status: String,
    #[serde(default)]
    offset: u64,
    #[serde(default)]
    duration: u64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    translation: Option<TranslationBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TranslationBody {
    #[serde(default)]
    translation_status: Option<String>,
    #[serde(default)]
    failure_reason: Option<String>,
    #[serde(default)]
    translations: Vec<TranslationEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TranslationEntry {
    language: String,
    text: String,
}

/// Map a `translation.phrase` body to a recognition result and the audio
/// position it covers.
pub fn parse_translation_phrase(body: &str) -> Result<TranslationPhrase, ProtocolError> {
    let phrase: PhraseBody =
        serde_json::from_str(body).map_err(|source| ProtocolError::InvalidBody {
            path: PATH_TRANSLATION_PHRASE.to_string(),
            source,
        })?;
    let audio_end = phrase.offset.saturating_add(phrase.duration);

    let result = match phrase.recognition_status.as_str() {
        "Success" => {
            let translation = phrase.translation.unwrap_or(TranslationBody {
                translation_status: None,
                failure_reason: None,
                translations: Vec::new(),
            });
            let translations: HashMap<String, String> = translation
                .translations
                .into_iter()
                .map(|entry| (entry.language, entry.text))
                .collect();
            let translation_ok = translation
                .translation_status
                .as_deref()
                .map_or(true, |status| status == "Success");

            let mut result = RecognitionResult::translated(phrase.text, translations);
            if !translation_ok {
                log::warn!(
                    "Translation failed: {}",
                    translation.failure_reason.as_deref().unwrap_or("unknown reason")
                );
                result.reason = ResultReason::RecognizedSpeech;
            }
            result
        }
        "NoMatch" => RecognitionResult::no_match(NoMatchReason::NotRecognized),
        "InitialSilenceTimeout" => RecognitionResult::no_match(NoMatchReason::InitialSilenceTimeout),
        "BabbleTimeout" => RecognitionResult::no_match(NoMatchReason::InitialBabbleTimeout),
        "EndOfDictation" => {
            return Ok(TranslationPhrase {
                result: None,
                audio_end,
            })
        }
        "BadRequest" => RecognitionResult::canceled(CancellationDetails::error(
            CancellationErrorCode::BadRequest,
            "service rejected the request (BadRequest)",
        )),
        "Forbidden" | "Unauthorized" => RecognitionResult::canceled(CancellationDetails::error(
            CancellationErrorCode::AuthenticationFailure,
            format!("service rejected the credentials ({})", phrase.recognition_status),
        )),
        other => RecognitionResult::canceled(CancellationDetails::error(
            CancellationErrorCode::ServiceError,
            format!("recognition failed with status {other}"),
        )),
    };
    Ok(TranslationPhrase {
        result: Some(result),
        audio_end,
    })
}
