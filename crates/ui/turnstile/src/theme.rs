//! Semantic color roles for the widget.
//!
//! Widgets request colors by role, never by literal value, so a caller can
//! restyle the whole form by swapping one [`Theme`] (the custom-styles
//! override point).

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Role → color mapping for one theme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleColors {
    pub background: Color,
    pub text: Color,
    pub subtle_text: Color,
    pub primary: Color,
    pub accent: Color,
    pub danger: Color,
    pub info: Color,
    pub muted: Color,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub roles: RoleColors,
}

pub fn default_dark_theme() -> Theme {
    Theme {
        roles: RoleColors {
            background: Color::Rgb(0x22, 0x22, 0x22),
            text: Color::White,
            subtle_text: Color::Gray,
            primary: Color::Rgb(0x24, 0x57, 0xca),
            accent: Color::Cyan,
            danger: Color::Red,
            info: Color::Blue,
            muted: Color::DarkGray,
        },
    }
}

impl Default for Theme {
    fn default() -> Self {
        default_dark_theme()
    }
}
