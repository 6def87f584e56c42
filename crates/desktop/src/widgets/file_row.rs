use std::path::Path;

use iced::widget::{button, column, container, row, text, Space};
use iced::{Element, Length, Theme};

use crate::app::Message;
use crate::theme::{border_color, surface_color, tertiary_color};

pub(crate) const CORNER_RADIUS: f32 = 12.0;

/// A labelled card showing the chosen file with a browse button.
pub fn file_row<'a>(
    label: &str,
    path: Option<&Path>,
    placeholder: &str,
    on_browse: Option<Message>,
    theme: &Theme,
) -> Element<'a, Message> {
    let tertiary = tertiary_color(theme);

    let display_text: Element<'a, Message> = match path.and_then(|p| p.file_name()) {
        Some(name) => text(name.to_string_lossy().to_string())
            .size(16)
            .font(iced::Font {
                weight: iced::font::Weight::Medium,
                ..iced::Font::DEFAULT
            })
            .into(),
        None => text(placeholder.to_string())
            .size(16)
            .color(tertiary)
            .into(),
    };

    let btn = button(text("Browse\u{2026}").size(14))
        .on_press_maybe(on_browse)
        .padding([6, 14])
        .style(button::secondary);

    let content = row![labelled(label, display_text, theme), btn]
        .spacing(8)
        .align_y(iced::Alignment::Center);

    card(content.into(), theme)
}

/// Small uppercase label above a value.
pub(crate) fn labelled<'a>(
    label: &str,
    value: Element<'a, Message>,
    theme: &Theme,
) -> Element<'a, Message> {
    let label_text = text(label.to_uppercase())
        .size(12)
        .font(iced::Font {
            weight: iced::font::Weight::Semibold,
            ..iced::Font::DEFAULT
        })
        .color(tertiary_color(theme));

    column![label_text, Space::new().height(2), value]
        .width(Length::Fill)
        .into()
}

pub(crate) fn card<'a>(content: Element<'a, Message>, theme: &Theme) -> Element<'a, Message> {
    let surface = surface_color(theme);
    let border = border_color(theme);

    container(content)
        .padding([14, 16])
        .width(Length::Fill)
        .style(move |_theme: &Theme| container::Style {
            background: Some(iced::Background::Color(surface)),
            border: iced::border::Border {
                color: border,
                width: 1.0,
                radius: CORNER_RADIUS.into(),
            },
            ..container::Style::default()
        })
        .into()
}
