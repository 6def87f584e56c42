use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use iced::widget::{button, column, container, pick_list, row, scrollable, text, Space};
use iced::{Element, Length, Subscription, Task, Theme};

use speechbridge_core::pipeline::translate_audio_use_case::TranslationOutput;
use speechbridge_core::shared::constants::SUPPORTED_INPUT_EXTENSIONS;
use speechbridge_core::translation::domain::target_language::TargetLanguage;
use speechbridge_core::translation::domain::translation_session::SessionEnd;
use speechbridge_core::translation::infrastructure::speech_config::SpeechConfig;

use crate::settings::{Appearance, Settings};
use crate::theme;
use crate::widgets::file_row::file_row;
use crate::widgets::result_row::result_row;
use crate::workers::translate_worker::TranslateParams;
use crate::workers::{convert_worker, translate_worker, WorkerMessage};

const WORKER_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    SelectInput,
    InputSelected(Option<PathBuf>),
    Convert,
    Clear,
    SelectAudio,
    AudioSelected(Option<PathBuf>),
    LanguageSelected(TargetLanguage),
    Translate,
    SaveAs(PathBuf),
    SaveDestinationChosen(PathBuf, Option<PathBuf>),
    ShowInFolder(PathBuf),
    AppearanceChanged(Appearance),
    PollWorkers,
    PollSystemTheme,
}

/// Progress of one action group.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState<T> {
    Idle,
    Running,
    Done(T),
    Failed(String),
}

impl<T> JobState<T> {
    fn is_running(&self) -> bool {
        matches!(self, JobState::Running)
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub settings: Settings,
    pub input_path: Option<PathBuf>,
    pub convert: JobState<PathBuf>,
    convert_rx: Option<Receiver<WorkerMessage<PathBuf>>>,
    pub audio_path: Option<PathBuf>,
    pub translate: JobState<TranslationOutput>,
    translate_rx: Option<Receiver<WorkerMessage<TranslationOutput>>>,
    pub notice: Option<String>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        (Self::with_settings(Settings::load()), Task::none())
    }

    fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            input_path: None,
            convert: JobState::Idle,
            convert_rx: None,
            audio_path: None,
            translate: JobState::Idle,
            translate_rx: None,
            notice: None,
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SelectInput => {
                return Task::perform(
                    pick_file("Select an MP3 or MP4 file", "Audio/Video", SUPPORTED_INPUT_EXTENSIONS),
                    Message::InputSelected,
                );
            }
            Message::InputSelected(Some(path)) => {
                self.input_path = Some(path);
                self.convert = JobState::Idle;
            }
            Message::InputSelected(None) => {}
            Message::Convert => {
                if let (Some(input), false) = (&self.input_path, self.convert.is_running()) {
                    log::info!("Starting conversion of {}", input.display());
                    self.convert_rx = Some(convert_worker::spawn(input.clone()));
                    self.convert = JobState::Running;
                }
            }
            Message::Clear => {
                if !self.convert.is_running() {
                    self.input_path = None;
                    self.convert = JobState::Idle;
                }
            }
            Message::SelectAudio => {
                return Task::perform(
                    pick_file("Select a WAV file", "WAV", &["wav"]),
                    Message::AudioSelected,
                );
            }
            Message::AudioSelected(Some(path)) => {
                self.audio_path = Some(path);
                self.translate = JobState::Idle;
            }
            Message::AudioSelected(None) => {}
            Message::LanguageSelected(language) => {
                self.settings.target_language = language;
                self.settings.save();
            }
            Message::Translate => self.start_translation(),
            Message::SaveAs(source) => {
                let start_dir = source.parent().map(Path::to_path_buf);
                let start_name = source
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string());
                return Task::perform(
                    async move {
                        let mut dialog = rfd::AsyncFileDialog::new().set_title("Save as");
                        if let Some(dir) = start_dir {
                            dialog = dialog.set_directory(dir);
                        }
                        if let Some(name) = start_name {
                            dialog = dialog.set_file_name(name);
                        }
                        let destination = dialog.save_file().await.map(|h| h.path().to_path_buf());
                        (source, destination)
                    },
                    |(source, destination)| Message::SaveDestinationChosen(source, destination),
                );
            }
            Message::SaveDestinationChosen(source, Some(destination)) => {
                self.notice = Some(copy_file(&source, &destination));
            }
            Message::SaveDestinationChosen(_, None) => {}
            Message::ShowInFolder(path) => {
                if let Some(dir) = path.parent() {
                    if let Err(e) = open::that(dir) {
                        log::warn!("Could not open {}: {e}", dir.display());
                    }
                }
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::PollWorkers => self.poll_workers(),
            Message::PollSystemTheme => {
                // Theme is resolved fresh in theme() on every render.
            }
        }
        Task::none()
    }

    fn start_translation(&mut self) {
        if self.translate.is_running() {
            return;
        }
        let Some(audio_path) = self.audio_path.clone() else {
            return;
        };
        match SpeechConfig::from_env() {
            Ok(config) => {
                log::info!(
                    "Starting translation of {} into {}",
                    audio_path.display(),
                    self.settings.target_language
                );
                self.translate_rx = Some(translate_worker::spawn(TranslateParams {
                    audio_path,
                    target: self.settings.target_language,
                    config,
                }));
                self.translate = JobState::Running;
            }
            Err(e) => {
                log::error!("{e}");
                self.translate = JobState::Failed(e.to_string());
            }
        }
    }

    fn poll_workers(&mut self) {
        if let Some(result) = poll(&mut self.convert_rx) {
            self.convert = match result {
                WorkerMessage::Complete(wav) => {
                    if self.audio_path.is_none() {
                        self.audio_path = Some(wav.clone());
                    }
                    JobState::Done(wav)
                }
                WorkerMessage::Error(e) => JobState::Failed(e),
            };
        }
        if let Some(result) = poll(&mut self.translate_rx) {
            self.translate = match result {
                WorkerMessage::Complete(output) => JobState::Done(output),
                WorkerMessage::Error(e) => JobState::Failed(e),
            };
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let theme = self.theme();

        let content = column![
            section_title("Convert to WAV"),
            Space::new().height(8),
            self.convert_group(&theme),
            Space::new().height(32),
            section_title("Translate Mandarin speech"),
            Space::new().height(8),
            self.translate_group(&theme),
        ]
        .width(Length::Fill);

        let mut body = column![scrollable(content).height(Length::Fill)];
        if let Some(notice) = &self.notice {
            body = body.push(text(notice.clone()).size(13));
        }

        let footer = row![
            Space::new().width(Length::Fill),
            text("Appearance").size(13),
            pick_list(
                Appearance::ALL,
                Some(self.settings.appearance),
                Message::AppearanceChanged
            )
            .text_size(13),
        ]
        .spacing(8)
        .align_y(iced::Alignment::Center);

        container(column![body, footer].spacing(8))
            .padding(16)
            .height(Length::Fill)
            .into()
    }

    fn convert_group(&self, theme: &Theme) -> Element<'_, Message> {
        let running = self.convert.is_running();

        let actions = row![
            button(text(if running { "Converting\u{2026}" } else { "Convert" }).size(15))
                .on_press_maybe((!running && self.input_path.is_some()).then_some(Message::Convert))
                .padding([10, 24]),
            button(text("Clear").size(15))
                .on_press_maybe((!running).then_some(Message::Clear))
                .padding([10, 24])
                .style(button::secondary),
        ]
        .spacing(10);

        let mut col = column![
            file_row(
                "MP3 / MP4 file",
                self.input_path.as_deref(),
                "No file selected",
                (!running).then_some(Message::SelectInput),
                theme,
            ),
            Space::new().height(12),
            actions,
        ];

        match &self.convert {
            JobState::Done(wav) => {
                col = col.push(Space::new().height(12)).push(result_row(
                    "WAV file",
                    wav,
                    Message::SaveAs(wav.clone()),
                    Message::ShowInFolder(wav.clone()),
                    theme,
                ));
            }
            JobState::Failed(e) => {
                col = col.push(Space::new().height(12)).push(error_text(e, theme));
            }
            JobState::Idle | JobState::Running => {}
        }
        col.into()
    }

    fn translate_group(&self, theme: &Theme) -> Element<'_, Message> {
        let running = self.translate.is_running();

        let language = row![
            text("Translate into").size(14),
            pick_list(
                TargetLanguage::ALL,
                Some(self.settings.target_language),
                Message::LanguageSelected
            ),
        ]
        .spacing(10)
        .align_y(iced::Alignment::Center);

        let translate_btn =
            button(text(if running { "Translating\u{2026}" } else { "Translate" }).size(15))
                .on_press_maybe((!running && self.audio_path.is_some()).then_some(Message::Translate))
                .padding([10, 24]);

        let mut col = column![
            file_row(
                "WAV file",
                self.audio_path.as_deref(),
                "No file selected",
                (!running).then_some(Message::SelectAudio),
                theme,
            ),
            Space::new().height(12),
            row![language, Space::new().width(Length::Fill), translate_btn]
                .align_y(iced::Alignment::Center),
        ];

        match &self.translate {
            JobState::Done(output) => {
                col = col.push(Space::new().height(12)).push(result_row(
                    "Translation",
                    &output.path,
                    Message::SaveAs(output.path.clone()),
                    Message::ShowInFolder(output.path.clone()),
                    theme,
                ));
                col = col.push(text(translation_summary(output)).size(13));
            }
            JobState::Failed(e) => {
                col = col.push(Space::new().height(12)).push(error_text(e, theme));
            }
            JobState::Idle | JobState::Running => {}
        }
        col.into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let workers = if self.convert.is_running() || self.translate.is_running() {
            iced::time::every(WORKER_POLL_INTERVAL).map(|_| Message::PollWorkers)
        } else {
            Subscription::none()
        };
        let system_theme = if self.settings.appearance == Appearance::System {
            iced::time::every(Duration::from_secs(2)).map(|_| Message::PollSystemTheme)
        } else {
            Subscription::none()
        };
        Subscription::batch([workers, system_theme])
    }
}

/// Take the worker's single result, dropping the receiver once it arrives
/// or the worker goes away.
fn poll<T>(rx: &mut Option<Receiver<WorkerMessage<T>>>) -> Option<WorkerMessage<T>> {
    let result = match rx.as_ref()?.try_recv() {
        Ok(message) => message,
        Err(TryRecvError::Empty) => return None,
        Err(TryRecvError::Disconnected) => {
            WorkerMessage::Error("Worker stopped unexpectedly".to_string())
        }
    };
    *rx = None;
    Some(result)
}

async fn pick_file(
    title: &'static str,
    filter_name: &'static str,
    extensions: &'static [&'static str],
) -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title(title)
        .add_filter(filter_name, extensions)
        .pick_file()
        .await
        .map(|h| h.path().to_path_buf())
}

fn copy_file(source: &Path, destination: &Path) -> String {
    if source == destination {
        return format!("Saved to {}", destination.display());
    }
    match fs::copy(source, destination) {
        Ok(_) => format!("Saved to {}", destination.display()),
        Err(e) => {
            log::error!("Could not copy {} to {}: {e}", source.display(), destination.display());
            format!("Could not save {}: {e}", destination.display())
        }
    }
}

fn translation_summary(output: &TranslationOutput) -> String {
    let lines = match output.segment_count {
        1 => "1 line".to_string(),
        n => format!("{n} lines"),
    };
    match &output.end {
        SessionEnd::Canceled(details) if details.is_error() => {
            format!("{lines} written. Session canceled: {}", details.error_details)
        }
        _ => format!("{lines} written."),
    }
}

fn section_title(title: &str) -> Element<'_, Message> {
    text(title)
        .size(17)
        .font(iced::Font {
            weight: iced::font::Weight::Bold,
            ..iced::Font::DEFAULT
        })
        .into()
}

fn error_text<'a>(error: &str, theme: &Theme) -> Element<'a, Message> {
    text(error.to_owned())
        .size(14)
        .color(theme.palette().danger)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use speechbridge_core::translation::domain::recognition_event::{
        CancellationDetails, CancellationErrorCode,
    };

    fn app() -> App {
        App::with_settings(Settings::default())
    }

    #[test]
    fn test_clear_resets_convert_group() {
        let mut app = app();
        app.input_path = Some(PathBuf::from("/music/song.mp3"));
        app.convert = JobState::Done(PathBuf::from("/music/song.wav"));

        let _ = app.update(Message::Clear);

        assert_eq!(app.input_path, None);
        assert_eq!(app.convert, JobState::Idle);
    }

    #[test]
    fn test_clear_is_ignored_while_converting() {
        let mut app = app();
        app.input_path = Some(PathBuf::from("/music/song.mp3"));
        app.convert = JobState::Running;

        let _ = app.update(Message::Clear);

        assert!(app.input_path.is_some());
        assert_eq!(app.convert, JobState::Running);
    }

    #[test]
    fn test_convert_without_input_does_nothing() {
        let mut app = app();
        let _ = app.update(Message::Convert);
        assert_eq!(app.convert, JobState::Idle);
    }

    #[test]
    fn test_translate_without_audio_does_nothing() {
        let mut app = app();
        let _ = app.update(Message::Translate);
        assert!(matches!(app.translate, JobState::Idle));
    }

    #[test]
    fn test_poll_applies_conversion_result_and_prefills_audio() {
        let mut app = app();
        let (tx, rx) = crossbeam_channel::bounded(1);
        tx.send(WorkerMessage::Complete(PathBuf::from("/music/song.wav")))
            .unwrap();
        app.convert = JobState::Running;
        app.convert_rx = Some(rx);

        let _ = app.update(Message::PollWorkers);

        assert_eq!(app.convert, JobState::Done(PathBuf::from("/music/song.wav")));
        assert_eq!(app.audio_path, Some(PathBuf::from("/music/song.wav")));
        assert!(app.convert_rx.is_none());
    }

    #[test]
    fn test_poll_keeps_waiting_while_worker_runs() {
        let mut app = app();
        let (_tx, rx) = crossbeam_channel::bounded::<WorkerMessage<PathBuf>>(1);
        app.convert = JobState::Running;
        app.convert_rx = Some(rx);

        let _ = app.update(Message::PollWorkers);

        assert_eq!(app.convert, JobState::Running);
        assert!(app.convert_rx.is_some());
    }

    #[test]
    fn test_poll_reports_vanished_worker() {
        let mut app = app();
        let (tx, rx) = crossbeam_channel::bounded::<WorkerMessage<TranslationOutput>>(1);
        drop(tx);
        app.translate = JobState::Running;
        app.translate_rx = Some(rx);

        let _ = app.update(Message::PollWorkers);

        assert!(matches!(app.translate, JobState::Failed(_)));
    }

    #[test]
    fn test_summary_mentions_error_cancellation() {
        let output = TranslationOutput {
            path: PathBuf::from("/a/talk_translation.txt"),
            segment_count: 0,
            end: SessionEnd::Canceled(CancellationDetails::error(
                CancellationErrorCode::AuthenticationFailure,
                "401 Unauthorized",
            )),
        };
        let summary = translation_summary(&output);
        assert!(summary.starts_with("0 lines written."));
        assert!(summary.contains("401 Unauthorized"));
    }

    #[test]
    fn test_summary_for_completed_session() {
        let output = TranslationOutput {
            path: PathBuf::from("/a/talk_translation.txt"),
            segment_count: 1,
            end: SessionEnd::Stopped,
        };
        assert_eq!(translation_summary(&output), "1 line written.");
    }

    #[test]
    fn test_copy_file_copies_contents() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("talk_translation.txt");
        let destination = dir.path().join("copy.txt");
        fs::write(&source, "Hello\n").unwrap();

        let notice = copy_file(&source, &destination);

        assert!(notice.starts_with("Saved to"));
        assert_eq!(fs::read_to_string(&destination).unwrap(), "Hello\n");
    }
}
