use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use speechbridge_core::audio::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use speechbridge_core::audio::infrastructure::wav_audio_writer::WavAudioWriter;
use speechbridge_core::pipeline::convert_audio_use_case::ConvertAudioUseCase;
use speechbridge_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use speechbridge_core::pipeline::translate_audio_use_case::TranslateAudioUseCase;
use speechbridge_core::translation::domain::target_language::TargetLanguage;
use speechbridge_core::translation::domain::translation_session::SessionEnd;
use speechbridge_core::translation::infrastructure::azure_translation_recognizer::AzureTranslationRecognizer;
use speechbridge_core::translation::infrastructure::speech_config::SpeechConfig;
use speechbridge_core::translation::infrastructure::text_file_translation_writer::TextFileTranslationWriter;

/// Convert MP3/MP4 audio to WAV and translate Mandarin speech.
#[derive(Parser)]
#[command(name = "speechbridge", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an .mp3 or .mp4 file to a .wav file beside it.
    Convert {
        /// Input audio or video file.
        input: PathBuf,
    },
    /// Translate Mandarin speech in a .wav file into another language.
    ///
    /// Reads SPEECH_KEY and SPEECH_REGION (and optionally SPEECH_ENDPOINT)
    /// from the environment.
    Translate {
        /// Input WAV file.
        input: PathBuf,

        /// Target language: en, es, fr or de.
        #[arg(long, default_value = "en")]
        to: TargetLanguage,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Convert { input } => run_convert(&input),
        Command::Translate { input, to } => run_translate(&input, to),
    }
}

fn run_convert(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    validate_input(input)?;
    let mut logger = StdoutPipelineLogger::new();

    let use_case = ConvertAudioUseCase::new(Box::new(FfmpegAudioReader), Box::new(WavAudioWriter));
    let output = use_case.execute(input, &mut logger)?;

    logger.summary();
    println!("{}", output.display());
    Ok(())
}

fn run_translate(input: &Path, target: TargetLanguage) -> Result<(), Box<dyn std::error::Error>> {
    validate_input(input)?;
    let config = SpeechConfig::from_env()?;
    log::debug!("Using {config:?}");
    let mut logger = StdoutPipelineLogger::new();

    let mut use_case = TranslateAudioUseCase::new(
        Box::new(AzureTranslationRecognizer::new(config)),
        Box::new(TextFileTranslationWriter),
    );
    let output = use_case.execute(input, target, &mut logger)?;

    logger.summary();
    match &output.end {
        SessionEnd::Canceled(details) if details.is_error() => log::warn!(
            "Translation session canceled ({:?}): {}",
            details.error_code,
            details.error_details
        ),
        SessionEnd::Canceled(details) => {
            log::info!("Translation session canceled: {}", details.reason)
        }
        SessionEnd::Stopped => {}
    }
    println!("{}", output.path.display());
    Ok(())
}

fn validate_input(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file not found: {}", input.display()).into());
    }
    Ok(())
}
