use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::Receiver;

use speechbridge_core::audio::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use speechbridge_core::audio::infrastructure::wav_audio_writer::WavAudioWriter;
use speechbridge_core::pipeline::convert_audio_use_case::ConvertAudioUseCase;
use speechbridge_core::pipeline::pipeline_logger::NullPipelineLogger;

use super::WorkerMessage;

/// Spawn a background conversion. The receiver yields exactly one message.
pub fn spawn(input: PathBuf) -> Receiver<WorkerMessage<PathBuf>> {
    let (tx, rx) = crossbeam_channel::bounded(1);

    thread::spawn(move || {
        let message = match run_convert(&input) {
            Ok(output) => WorkerMessage::Complete(output),
            Err(e) => {
                log::error!("Conversion of {} failed: {e}", input.display());
                WorkerMessage::Error(e.to_string())
            }
        };
        let _ = tx.send(message);
    });

    rx
}

fn run_convert(input: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let use_case = ConvertAudioUseCase::new(Box::new(FfmpegAudioReader), Box::new(WavAudioWriter));
    use_case.execute(input, &mut NullPipelineLogger)
}
