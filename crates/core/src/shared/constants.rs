/// Spoken language of every translation session. `zh-Hans` is not accepted
/// by the recognizer, so the locale form is used.
pub const SOURCE_LANGUAGE: &str = "zh-CN";

pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &["mp3", "mp4"];

pub const WAV_EXTENSION: &str = "wav";
pub const TRANSLATION_FILE_SUFFIX: &str = "_translation.txt";

pub const SPEECH_KEY_VAR: &str = "SPEECH_KEY";
pub const SPEECH_REGION_VAR: &str = "SPEECH_REGION";
pub const SPEECH_ENDPOINT_VAR: &str = "SPEECH_ENDPOINT";

/// 100 ms of 16 kHz 16-bit mono PCM.
pub const AUDIO_CHUNK_BYTES: usize = 3200;
