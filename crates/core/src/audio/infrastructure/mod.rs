pub mod ffmpeg_audio_reader;
pub mod wav_audio_writer;
