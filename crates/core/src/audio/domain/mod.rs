pub mod audio_format;
pub mod audio_reader;
pub mod audio_segment;
pub mod audio_writer;
