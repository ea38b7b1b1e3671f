use crate::bracket::connector::CurveStyle;
use crate::state::toasts::ToastKind;
use tui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeColor {
    Primary,
    Secondary,
    Accent,
    Dim,
    Winner,
    Selected,
    Path,
    Error,
}

pub fn resolve(color: ThemeColor) -> Style {
    match color {
        ThemeColor::Primary => Style::default().fg(Color::Rgb(0, 122, 195)),
        ThemeColor::Secondary => Style::default().fg(Color::Rgb(255, 103, 31)),
        ThemeColor::Accent => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ThemeColor::Dim => Style::default().fg(Color::Indexed(240)),
        ThemeColor::Winner => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ThemeColor::Selected => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ThemeColor::Path => Style::default().fg(Color::Rgb(255, 103, 31)).add_modifier(Modifier::BOLD),
        ThemeColor::Error => Style::default().fg(Color::Red),
    }
}

pub fn curve_style(style: CurveStyle) -> Style {
    match style {
        CurveStyle::Default => resolve(ThemeColor::Dim),
        CurveStyle::Hovered => resolve(ThemeColor::Primary),
        CurveStyle::Highlighted => resolve(ThemeColor::Path),
    }
}

pub fn toast_color(kind: ToastKind) -> Color {
    match kind {
        ToastKind::Info => Color::Blue,
        ToastKind::Success => Color::Green,
        ToastKind::Error => Color::Red,
    }
}
