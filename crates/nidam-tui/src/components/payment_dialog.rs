//! Purchase dialog: time package picker with Bitcoin / external-link methods

use crate::theme::Palette;
use crossterm::event::KeyCode;
use nidam_core::catalog::{TimePackage, TIME_PACKAGES};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// How the selected package should be paid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Bitcoin,
    External,
}

/// Choice made inside the dialog
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DialogAction {
    Purchase {
        package: TimePackage,
        method: PaymentMethod,
    },
    Close,
}

/// Modal purchase dialog state
#[derive(Debug)]
pub struct PaymentDialog {
    visible: bool,
    selected: usize,
    method: PaymentMethod,
    processing: bool,
    error: Option<String>,
}

impl Default for PaymentDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentDialog {
    pub fn new() -> Self {
        Self {
            visible: false,
            selected: 0,
            method: PaymentMethod::Bitcoin,
            processing: false,
            error: None,
        }
    }

    pub fn open(&mut self) {
        self.visible = true;
        self.error = None;
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.processing = false;
        self.error = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn set_processing(&mut self) {
        self.processing = true;
        self.error = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.processing = false;
        self.error = Some(message.into());
    }

    pub fn selected_package(&self) -> TimePackage {
        TIME_PACKAGES[self.selected]
    }

    /// Handle key input while visible; returns Some when a choice was made.
    /// Input is ignored while a purchase is in flight, except Esc.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<DialogAction> {
        if !self.visible {
            return None;
        }

        if key == KeyCode::Esc {
            self.close();
            return Some(DialogAction::Close);
        }

        if self.processing {
            return None;
        }

        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(TIME_PACKAGES.len() - 1);
                None
            }
            KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
                self.method = match self.method {
                    PaymentMethod::Bitcoin => PaymentMethod::External,
                    PaymentMethod::External => PaymentMethod::Bitcoin,
                };
                None
            }
            KeyCode::Enter => Some(DialogAction::Purchase {
                package: self.selected_package(),
                method: self.method,
            }),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        if !self.visible {
            return;
        }

        let dialog_width = 46.min(area.width);
        let dialog_height = (TIME_PACKAGES.len() as u16 + 9).min(area.height);
        let dialog_area = Rect {
            x: area.x + area.width.saturating_sub(dialog_width) / 2,
            y: area.y + area.height.saturating_sub(dialog_height) / 2,
            width: dialog_width,
            height: dialog_height,
        };

        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border())
            .title(Span::styled(" Purchase Access Time ", palette.title()));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // method line
                Constraint::Length(1),
                Constraint::Length(TIME_PACKAGES.len() as u16),
                Constraint::Length(1),
                Constraint::Min(1), // status / error / hints
            ])
            .split(inner);

        frame.render_widget(self.method_line(palette), chunks[0]);

        let package_lines: Vec<Line> = TIME_PACKAGES
            .iter()
            .enumerate()
            .map(|(i, p)| self.package_line(i, p, palette))
            .collect();
        frame.render_widget(Paragraph::new(package_lines), chunks[2]);

        let status = if self.processing {
            Paragraph::new(Line::from(Span::styled(
                "Processing payment...",
                palette.dim_text(),
            )))
        } else if let Some(error) = &self.error {
            Paragraph::new(Line::from(Span::styled(
                error.as_str(),
                palette.error_text(),
            )))
        } else {
            Paragraph::new(Line::from(Span::styled(
                "↑/↓ package · Tab method · Enter buy · Esc close",
                palette.dim_text(),
            )))
        };
        frame.render_widget(status.alignment(Alignment::Center), chunks[4]);
    }

    fn method_line(&self, palette: &Palette) -> Paragraph<'_> {
        let bitcoin_style = if self.method == PaymentMethod::Bitcoin {
            palette.selected()
        } else {
            palette.text()
        };
        let external_style = if self.method == PaymentMethod::External {
            palette.selected()
        } else {
            palette.text()
        };

        Paragraph::new(Line::from(vec![
            Span::styled(" Bitcoin ", bitcoin_style),
            Span::raw("  "),
            Span::styled(" PayPal ", external_style),
        ]))
        .alignment(Alignment::Center)
    }

    fn package_line<'a>(&self, index: usize, package: &TimePackage, palette: &Palette) -> Line<'a> {
        let text = format!(
            " {:<7} {:>5} sats  (${:.2}) ",
            package.label, package.price_sats, package.price_usd
        );
        let style = if index == self.selected {
            palette.selected()
        } else {
            palette.text()
        };
        Line::from(Span::styled(text, style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_moves_and_clamps() {
        let mut dialog = PaymentDialog::new();
        dialog.open();

        dialog.handle_key(KeyCode::Up);
        assert_eq!(dialog.selected, 0);

        for _ in 0..10 {
            dialog.handle_key(KeyCode::Down);
        }
        assert_eq!(dialog.selected, TIME_PACKAGES.len() - 1);
    }

    #[test]
    fn test_tab_toggles_method() {
        let mut dialog = PaymentDialog::new();
        dialog.open();
        assert_eq!(dialog.method, PaymentMethod::Bitcoin);
        dialog.handle_key(KeyCode::Tab);
        assert_eq!(dialog.method, PaymentMethod::External);
        dialog.handle_key(KeyCode::Tab);
        assert_eq!(dialog.method, PaymentMethod::Bitcoin);
    }

    #[test]
    fn test_enter_yields_purchase() {
        let mut dialog = PaymentDialog::new();
        dialog.open();
        dialog.handle_key(KeyCode::Down);

        match dialog.handle_key(KeyCode::Enter) {
            Some(DialogAction::Purchase { package, method }) => {
                assert_eq!(package, TIME_PACKAGES[1]);
                assert_eq!(method, PaymentMethod::Bitcoin);
            }
            other => panic!("expected purchase, got {other:?}"),
        }
    }

    #[test]
    fn test_keys_ignored_while_processing() {
        let mut dialog = PaymentDialog::new();
        dialog.open();
        dialog.set_processing();

        assert_eq!(dialog.handle_key(KeyCode::Enter), None);
        // Esc still closes
        assert_eq!(dialog.handle_key(KeyCode::Esc), Some(DialogAction::Close));
        assert!(!dialog.is_visible());
    }

    #[test]
    fn test_error_clears_processing() {
        let mut dialog = PaymentDialog::new();
        dialog.open();
        dialog.set_processing();
        dialog.set_error("payment failed");
        assert!(!dialog.is_processing());
    }
}
