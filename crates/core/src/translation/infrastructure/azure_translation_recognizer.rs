use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::oneshot;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::tungstenite::Error as WsError;
use url::Url;

use super::azure_protocol::{
    audio_message, new_id, parse_translation_phrase, speech_config_message, timestamp,
    ServiceMessage, PATH_TRANSLATION_PHRASE, PATH_TURN_END, PATH_TURN_START,
};
use super::speech_config::SpeechConfig;
use crate::shared::constants::AUDIO_CHUNK_BYTES;
use crate::translation::domain::recognition_event::{
    CancellationDetails, CancellationErrorCode, RecognitionEvent,
};
use crate::translation::domain::translation_recognizer::{
    RecognitionRequest, TranslationRecognizer,
};

/// Continuous speech translation against the Azure Speech service.
///
/// Each session runs on its own thread with a single-threaded tokio runtime
/// that streams the WAV file over a WebSocket connection. When the service
/// drops the connection before the end of the turn, the session reconnects
/// and resumes after the last audio the service returned a phrase for.
/// Handshake, transport and service failures are reported as `Canceled`
/// events.
pub struct AzureTranslationRecognizer {
    config: SpeechConfig,
    session: Option<RunningSession>,
}

struct RunningSession {
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl AzureTranslationRecognizer {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }
}

impl TranslationRecognizer for AzureTranslationRecognizer {
    fn start_continuous_recognition(
        &mut self,
        request: &RecognitionRequest,
        events: Sender<RecognitionEvent>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.session.is_some() {
            return Err("continuous recognition is already running".into());
        }

        let audio = read_wav_file(&request.audio_path)?;
        let url = self.config.endpoint_url(request)?;
        let key = self.config.subscription_key().to_string();
        let (stop_tx, stop_rx) = oneshot::channel();

        log::info!(
            "Starting continuous recognition of {} ({} -> {})",
            request.audio_path.display(),
            request.source_language,
            request.target_language
        );

        let handle = thread::Builder::new()
            .name("speech-session".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = events.send(RecognitionEvent::Canceled(CancellationDetails::error(
                            CancellationErrorCode::RuntimeError,
                            format!("failed to start async runtime: {e}"),
                        )));
                        return;
                    }
                };
                runtime.block_on(run_session(url, key, audio, events, stop_rx));
            })?;

        self.session = Some(RunningSession {
            stop: Some(stop_tx),
            handle,
        });
        Ok(())
    }

    fn stop_continuous_recognition(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };
        if let Some(stop) = session.stop.take() {
            let _ = stop.send(());
        }
        session
            .handle
            .join()
            .map_err(|_| "speech session thread panicked")?;
        log::info!("Continuous recognition stopped");
        Ok(())
    }
}

impl Drop for AzureTranslationRecognizer {
    fn drop(&mut self) {
        if let Err(e) = self.stop_continuous_recognition() {
            log::warn!("Failed to stop recognition: {e}");
        }
    }
}

/// 100 ns units used by the service for phrase offsets.
const TICKS_PER_SECOND: u128 = 10_000_000;

/// A WAV file held in memory, split at the start of its sample data so a
/// stream can resume part way through.
struct WavAudio {
    bytes: Vec<u8>,
    data_start: usize,
    byte_rate: u64,
    block_align: u64,
}

impl WavAudio {
    fn data_len(&self) -> usize {
        self.bytes.len() - self.data_start
    }

    /// Sample bytes covered by `ticks`, rounded down to whole frames.
    fn bytes_for_ticks(&self, ticks: u64) -> usize {
        let bytes = u128::from(ticks) * u128::from(self.byte_rate) / TICKS_PER_SECOND;
        let bytes = bytes - bytes % u128::from(self.block_align);
        usize::try_from(bytes).unwrap_or(usize::MAX)
    }

    /// The header followed by the sample data from `offset` on.
    fn stream_from(&self, offset: usize) -> Cow<'_, [u8]> {
        if offset == 0 {
            return Cow::Borrowed(&self.bytes);
        }
        let resume_at = self.data_start + offset.min(self.data_len());
        let mut stream = Vec::with_capacity(self.data_start + self.bytes.len() - resume_at);
        stream.extend_from_slice(&self.bytes[..self.data_start]);
        stream.extend_from_slice(&self.bytes[resume_at..]);
        Cow::Owned(stream)
    }
}

/// Read the whole file and locate its sample data.
fn read_wav_file(path: &Path) -> Result<WavAudio, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)
        .map_err(|e| format!("Cannot open audio file {}: {e}", path.display()))?;
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(format!("{} is not a WAV file", path.display()).into());
    }

    let (spec, data_start) = {
        let reader = hound::WavReader::new(Cursor::new(bytes.as_slice()))
            .map_err(|e| format!("Cannot read WAV header of {}: {e}", path.display()))?;
        let spec = reader.spec();
        (spec, reader.into_inner().position())
    };
    let frame_bytes = u64::from(spec.channels) * u64::from(spec.bits_per_sample).div_ceil(8);
    let block_align = frame_bytes.max(1);

    Ok(WavAudio {
        data_start: usize::try_from(data_start)?,
        byte_rate: u64::from(spec.sample_rate) * block_align,
        block_align,
        bytes,
    })
}

async fn run_session(
    url: Url,
    key: String,
    audio: WavAudio,
    events: Sender<RecognitionEvent>,
    stop: oneshot::Receiver<()>,
) {
    let outcome = tokio::select! {
        outcome = stream_session(&url, &key, &audio, &events) => outcome,
        _ = stop => {
            log::info!("Recognition stopped by caller");
            Ok(())
        }
    };

    let event = match outcome {
        Ok(()) => RecognitionEvent::SessionStopped,
        Err(details) => RecognitionEvent::Canceled(details),
    };
    // The caller may have stopped listening already.
    let _ = events.send(event);
}

/// How one connection ended.
enum ConnectionEnd {
    TurnEnded,
    /// The connection went away before `turn.end`. `acknowledged` counts the
    /// sample bytes covered by the phrases received on it.
    Interrupted {
        acknowledged: usize,
        details: CancellationDetails,
    },
}

async fn stream_session(
    url: &Url,
    key: &str,
    audio: &WavAudio,
    events: &Sender<RecognitionEvent>,
) -> Result<(), CancellationDetails> {
    let mut offset = 0;
    let mut first = true;
    loop {
        match stream_connection(url, key, audio, offset, first, events).await? {
            ConnectionEnd::TurnEnded => return Ok(()),
            ConnectionEnd::Interrupted {
                acknowledged,
                details,
            } => {
                if acknowledged == 0 {
                    return Err(details);
                }
                offset = offset.saturating_add(acknowledged);
                if offset >= audio.data_len() {
                    log::info!("Service closed the connection after the last audio");
                    return Err(CancellationDetails::end_of_stream());
                }
                log::warn!(
                    "{}; resuming at byte {offset} of {}",
                    details.error_details,
                    audio.data_len()
                );
                first = false;
            }
        }
    }
}

async fn stream_connection(
    url: &Url,
    key: &str,
    audio: &WavAudio,
    offset: usize,
    first: bool,
    events: &Sender<RecognitionEvent>,
) -> Result<ConnectionEnd, CancellationDetails> {
    let connection_id = new_id();
    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(|e| connection_failure(format!("invalid endpoint {url}: {e}")))?;
    let headers = request.headers_mut();
    headers.insert(
        "ocp-apim-subscription-key",
        HeaderValue::from_str(key).map_err(|_| {
            CancellationDetails::error(
                CancellationErrorCode::BadRequest,
                "subscription key contains invalid characters",
            )
        })?,
    );
    headers.insert(
        "x-connectionid",
        HeaderValue::from_str(&connection_id)
            .map_err(|e| connection_failure(format!("invalid connection id: {e}")))?,
    );

    let (socket, _) = connect_async(request).await.map_err(handshake_failure)?;
    log::info!("Connected to speech service (connection {connection_id})");
    if first {
        let _ = events.send(RecognitionEvent::SessionStarted);
    }

    let (mut write, mut read) = socket.split();
    let request_id = new_id();
    let stream = audio.stream_from(offset);
    let mut acknowledged = 0;

    let send_audio = async {
        write
            .send(Message::Text(speech_config_message(&request_id, &timestamp())))
            .await
            .map_err(|e| connection_failure(format!("failed to send speech config: {e}")))?;

        for chunk in stream.chunks(AUDIO_CHUNK_BYTES) {
            send_audio_message(&mut write, &request_id, chunk).await?;
        }
        send_audio_message(&mut write, &request_id, &[]).await?;
        log::debug!("Sent {} bytes of audio", stream.len());
        Ok::<(), CancellationDetails>(())
    };

    let receive = async {
        while let Some(message) = read.next().await {
            let message =
                message.map_err(|e| connection_failure(format!("WebSocket error: {e}")))?;
            match message {
                Message::Text(raw) => {
                    let message = match ServiceMessage::parse_text(&raw) {
                        Ok(message) => message,
                        Err(e) => {
                            log::warn!("Ignoring malformed service message: {e}");
                            continue;
                        }
                    };
                    match message.path() {
                        PATH_TRANSLATION_PHRASE => match parse_translation_phrase(message.body()) {
                            Ok(phrase) => {
                                acknowledged =
                                    acknowledged.max(audio.bytes_for_ticks(phrase.audio_end));
                                match phrase.result {
                                    Some(result) => {
                                        let _ = events.send(RecognitionEvent::Recognized(result));
                                    }
                                    None => log::debug!("End of dictation"),
                                }
                            }
                            Err(e) => log::warn!("Ignoring service message: {e}"),
                        },
                        PATH_TURN_END => return Ok(()),
                        PATH_TURN_START => log::debug!("Turn started"),
                        other => log::trace!("Service message: {other}"),
                    }
                }
                Message::Binary(data) => match ServiceMessage::parse_binary(&data) {
                    Ok(message) => log::trace!("Binary service message: {}", message.path()),
                    Err(e) => log::warn!("Ignoring malformed binary message: {e}"),
                },
                Message::Close(frame) => {
                    let reason = frame
                        .map(|f| format!("{} {}", u16::from(f.code), f.reason))
                        .unwrap_or_else(|| "no close frame".to_string());
                    return Err(CancellationDetails::error(
                        CancellationErrorCode::ServiceError,
                        format!("connection closed before end of turn: {reason}"),
                    ));
                }
                _ => {}
            }
        }
        Err::<(), CancellationDetails>(connection_failure(
            "connection ended before end of turn".to_string(),
        ))
    };

    let outcome = tokio::try_join!(send_audio, receive);
    match outcome {
        Ok(_) => {
            let _ = write.close().await;
            Ok(ConnectionEnd::TurnEnded)
        }
        Err(details) => Ok(ConnectionEnd::Interrupted {
            acknowledged,
            details,
        }),
    }
}

async fn send_audio_message<S>(
    write: &mut S,
    request_id: &str,
    payload: &[u8],
) -> Result<(), CancellationDetails>
where
    S: Sink<Message, Error = WsError> + Unpin,
{
    let frame = audio_message(request_id, &timestamp(), payload).map_err(|e| {
        CancellationDetails::error(CancellationErrorCode::RuntimeError, e.to_string())
    })?;
    write
        .send(Message::Binary(frame))
        .await
        .map_err(|e| connection_failure(format!("failed to send audio: {e}")))
}

fn connection_failure(details: String) -> CancellationDetails {
    CancellationDetails::error(CancellationErrorCode::ConnectionFailure, details)
}

fn handshake_failure(error: WsError) -> CancellationDetails {
    match error {
        WsError::Http(response) => {
            let status = response.status();
            let code = match status.as_u16() {
                401 | 403 => CancellationErrorCode::AuthenticationFailure,
                400 => CancellationErrorCode::BadRequest,
                _ => CancellationErrorCode::ConnectionFailure,
            };
            CancellationDetails::error(
                code,
                format!("WebSocket upgrade failed with HTTP {status}"),
            )
        }
        other => connection_failure(format!("connection failed: {other}")),
    }
}
