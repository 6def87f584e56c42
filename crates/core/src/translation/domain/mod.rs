pub mod recognition_event;
pub mod target_language;
pub mod translation_recognizer;
pub mod translation_segment;
pub mod translation_session;
pub mod translation_writer;
