use iced::widget::text_input as input;
use iced::widget::{button, container, text_editor};
use iced::{Background, Border, Color, Theme};

use crate::review::Severity;

// Color palette
pub(super) const COL_BG: Color = Color {
    r: 0.04,
    g: 0.06,
    b: 0.13,
    a: 1.0,
};
pub(super) const COL_PANEL: Color = Color {
    r: 0.07,
    g: 0.10,
    b: 0.20,
    a: 1.0,
};
pub(super) const COL_EDITOR_BG: Color = Color {
    r: 0.06,
    g: 0.09,
    b: 0.19,
    a: 1.0,
};
pub(super) const COL_TEXT: Color = Color {
    r: 0.91,
    g: 0.93,
    b: 1.0,
    a: 1.0,
};
pub(super) const COL_MUTED: Color = Color {
    r: 0.66,
    g: 0.70,
    b: 0.83,
    a: 1.0,
};
pub(super) const COL_ACCENT: Color = Color {
    r: 0.43,
    g: 0.66,
    b: 1.0,
    a: 1.0,
};
pub(super) const COL_SUCCESS: Color = Color {
    r: 0.49,
    g: 0.91,
    b: 0.53,
    a: 1.0,
};
pub(super) const COL_DANGER: Color = Color {
    r: 1.0,
    g: 0.42,
    b: 0.42,
    a: 1.0,
};
pub(super) const COL_WARNING: Color = Color {
    r: 1.0,
    g: 0.6,
    b: 0.2,
    a: 1.0,
};
pub(super) const COL_INFO: Color = Color {
    r: 1.0,
    g: 0.85,
    b: 0.3,
    a: 1.0,
};

pub(super) fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => COL_DANGER,
        Severity::Warning => COL_WARNING,
        Severity::Info => COL_INFO,
        Severity::Unknown => COL_MUTED,
    }
}

pub(super) fn btn_primary(_theme: &Theme, status: button::Status) -> button::Style {
    let background = match status {
        button::Status::Hovered | button::Status::Pressed => Color {
            a: 0.85,
            ..COL_ACCENT
        },
        button::Status::Disabled => Color {
            a: 0.4,
            ..COL_ACCENT
        },
        _ => COL_ACCENT,
    };

    button::Style {
        background: Some(Background::Color(background)),
        text_color: COL_BG,
        border: Border {
            radius: 8.0.into(),
            ..Default::default()
        },
        ..button::Style::default()
    }
}

pub(super) fn btn_ghost(_theme: &Theme, status: button::Status) -> button::Style {
    let background = match status {
        button::Status::Hovered | button::Status::Pressed => Some(Background::Color(Color {
            a: 0.08,
            ..Color::WHITE
        })),
        _ => None,
    };

    button::Style {
        background,
        text_color: COL_MUTED,
        border: Border {
            radius: 8.0.into(),
            ..Default::default()
        },
        ..button::Style::default()
    }
}

pub(super) fn glass_container(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(COL_PANEL)),
        border: Border {
            color: Color {
                a: 0.08,
                ..Color::WHITE
            },
            width: 1.0,
            radius: 16.0.into(),
        },
        ..Default::default()
    }
}

pub(super) fn score_badge(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color {
            a: 0.15,
            ..COL_ACCENT
        })),
        text_color: Some(COL_ACCENT),
        border: Border {
            color: Color {
                a: 0.4,
                ..COL_ACCENT
            },
            width: 1.0,
            radius: 12.0.into(),
        },
        ..Default::default()
    }
}

pub(super) fn divider(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color {
            a: 0.1,
            ..Color::WHITE
        })),
        ..Default::default()
    }
}

pub(super) fn editor_style(_theme: &Theme, _status: text_editor::Status) -> text_editor::Style {
    text_editor::Style {
        background: Background::Color(COL_EDITOR_BG),
        border: Border {
            color: Color {
                a: 0.1,
                ..Color::WHITE
            },
            width: 1.0,
            radius: 12.0.into(),
        },
        placeholder: COL_MUTED,
        value: COL_TEXT,
        selection: Color {
            a: 0.3,
            ..COL_ACCENT
        },
    }
}

pub(super) fn text_input(_theme: &Theme, _status: input::Status) -> input::Style {
    input::Style {
        background: Background::Color(COL_EDITOR_BG),
        border: Border {
            color: Color {
                a: 0.15,
                ..Color::WHITE
            },
            width: 1.0,
            radius: 8.0.into(),
        },
        icon: COL_MUTED,
        placeholder: COL_MUTED,
        value: COL_TEXT,
        selection: Color {
            a: 0.3,
            ..COL_ACCENT
        },
    }
}
