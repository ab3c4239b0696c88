//! System status side panel: countdown, credits, wallet state

use crate::theme::Palette;
use nidam_core::gate::PaymentGate;
use nidam_core::timer::SessionTimer;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    gate: &PaymentGate,
    timer: &SessionTimer,
    palette: &Palette,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border())
        .title(Span::styled(" SYSTEM STATUS ", palette.title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();

    match timer.format_remaining() {
        Some(remaining) => {
            lines.push(Line::from(vec![
                Span::styled("Time Remaining: ", palette.dim_text()),
                Span::styled(remaining, palette.text()),
            ]));
        }
        None => {
            lines.push(Line::from(Span::styled("No session", palette.dim_text())));
        }
    }

    lines.push(Line::from(vec![
        Span::styled("Credits: ", palette.dim_text()),
        Span::styled(gate.balance().to_string(), palette.text()),
    ]));

    let wallet = if gate.wallet_available() {
        Span::styled("● wallet ready", palette.text())
    } else {
        Span::styled("○ no wallet", palette.dim_text())
    };
    lines.push(Line::from(wallet));

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        gate.credit_identity(),
        palette.dim_text(),
    )));

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}
