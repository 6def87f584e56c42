pub mod azure_protocol;
pub mod azure_translation_recognizer;
pub mod speech_config;
pub mod text_file_translation_writer;
