pub mod convert_audio_use_case;
pub mod pipeline_logger;
pub mod translate_audio_use_case;
