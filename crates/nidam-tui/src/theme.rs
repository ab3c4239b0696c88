//! Theme for the N.I.D.A.M terminal
//!
//! The original interface is red-on-black throughout; the palette keeps
//! that look with a handful of semantic slots.

use ratatui::style::{Color, Modifier, Style};

/// Red-on-black palette
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    /// Primary accent: borders, labels, user text
    pub primary: Color,
    /// De-emphasized text: timestamps, hints
    pub dim: Color,
    /// Success notices
    pub success: Color,
    /// Warnings (unconfirmed payments)
    pub warning: Color,
    /// Errors
    pub error: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Color::Red,
            dim: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::LightRed,
        }
    }
}

impl Palette {
    pub fn border(&self) -> Style {
        Style::default().fg(self.primary)
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.primary)
    }

    pub fn dim_text(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_text(&self) -> Style {
        Style::default().fg(self.error)
    }
}
