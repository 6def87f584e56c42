use std::path::Path;

use iced::widget::{button, row, text};
use iced::{Element, Theme};

use super::file_row::{card, labelled};
use crate::app::Message;

/// A produced file with Save As… and Show in Folder actions.
pub fn result_row<'a>(
    label: &str,
    path: &Path,
    on_save_as: Message,
    on_show: Message,
    theme: &Theme,
) -> Element<'a, Message> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let actions = row![
        button(text("Save As\u{2026}").size(14))
            .on_press(on_save_as)
            .padding([6, 12])
            .style(button::secondary),
        button(text("Show in Folder").size(14))
            .on_press(on_show)
            .padding([6, 12])
            .style(button::secondary),
    ]
    .spacing(6);

    let content = row![labelled(label, text(name).size(15).into(), theme), actions]
        .spacing(8)
        .align_y(iced::Alignment::Center);

    card(content.into(), theme)
}
