use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

use crate::settings::Appearance;

/// Resolve the iced Theme from the appearance setting.
pub fn resolve_theme(appearance: Appearance) -> Theme {
    let is_dark = match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => detect_system_dark_mode(),
    };

    if is_dark {
        Theme::custom("SpeechBridge Dark", dark_palette())
    } else {
        Theme::custom("SpeechBridge Light", light_palette())
    }
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x17, 0x1a, 0x1f),
        text: color!(0xd8, 0xdc, 0xe2),
        primary: color!(0x3f, 0xb4, 0xa6),
        success: color!(0x4c, 0xc9, 0x6b),
        warning: color!(0xf2, 0xb8, 0x3c),
        danger: color!(0xf0, 0x5a, 0x4f),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xf7, 0xf8, 0xfa),
        text: color!(0x1f, 0x23, 0x29),
        primary: color!(0x1d, 0x8a, 0x7e),
        success: color!(0x2e, 0x9e, 0x4f),
        warning: color!(0xc2, 0x7c, 0x0e),
        danger: color!(0xd0, 0x36, 0x2c),
    }
}

/// Card background, slightly lifted from the window background.
pub fn surface_color(theme: &Theme) -> Color {
    let p = theme.palette();
    Color { a: 0.04, ..p.text }
}

/// De-emphasized text such as labels and placeholders.
pub fn tertiary_color(theme: &Theme) -> Color {
    let p = theme.palette();
    Color { a: 0.55, ..p.text }
}

pub fn border_color(theme: &Theme) -> Color {
    let p = theme.palette();
    Color { a: 0.12, ..p.text }
}

fn detect_system_dark_mode() -> bool {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .trim()
                    .eq_ignore_ascii_case("dark")
            })
            .unwrap_or(true)
    }
    #[cfg(target_os = "windows")]
    {
        // AppsUseLightTheme is 0x0 in dark mode.
        std::process::Command::new("reg")
            .args([
                "query",
                r"HKCU\Software\Microsoft\Windows\CurrentVersion\Themes\Personalize",
                "/v",
                "AppsUseLightTheme",
            ])
            .output()
            .map(|o| String::from_utf8_lossy(&o.stdout).contains("0x0"))
            .unwrap_or(true)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        true
    }
}
