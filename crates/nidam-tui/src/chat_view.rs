//! Transcript pane, input line, and the locked screen

use crate::components::Spinner;
use crate::theme::Palette;
use nidam_core::chat::{Message, Sender};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Full-screen notice shown while access is locked
pub fn render_locked(frame: &mut Frame, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::default(),
        Line::from(Span::styled("ACCESS LOCKED", palette.title())),
        Line::default(),
        Line::from(Span::styled(
            "Purchase time to continue using N.I.D.A.M",
            palette.text(),
        )),
        Line::default(),
        Line::from(Span::styled("Press Enter to purchase access", palette.dim_text())),
    ];

    let vertical_pad = inner.height.saturating_sub(lines.len() as u16) / 2;
    let centered = Rect {
        x: inner.x,
        y: inner.y + vertical_pad,
        width: inner.width,
        height: inner.height.saturating_sub(vertical_pad),
    };

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered,
    );
}

/// Transcript plus input line while access is unlocked
#[allow(clippy::too_many_arguments)]
pub fn render_chat(
    frame: &mut Frame,
    area: Rect,
    messages: &[Message],
    processing: bool,
    spinner: &Spinner,
    input: &str,
    error: Option<&str>,
    palette: &Palette,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_transcript(frame, chunks[0], messages, processing, spinner, palette);
    render_input(frame, chunks[1], input, processing, palette);

    if let Some(error) = error {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(error, palette.error_text()))),
            chunks[2],
        );
    }
}

fn render_transcript(
    frame: &mut Frame,
    area: Rect,
    messages: &[Message],
    processing: bool,
    spinner: &Spinner,
    palette: &Palette,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border())
        .title(Span::styled(" N.I.D.A.M ", palette.title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    for message in messages {
        let (prefix, alignment) = match message.sender {
            Sender::User => ("> ", Alignment::Right),
            Sender::Assistant => ("", Alignment::Left),
        };

        lines.push(
            Line::from(Span::styled(
                message.timestamp.format("%H:%M:%S").to_string(),
                palette.dim_text(),
            ))
            .alignment(alignment),
        );
        for text_line in message.text.lines() {
            lines.push(
                Line::from(Span::styled(
                    format!("{}{}", prefix, text_line),
                    palette.text(),
                ))
                .alignment(alignment),
            );
        }
        lines.push(Line::default());
    }

    if processing {
        lines.push(Line::from(vec![
            spinner.render(),
            Span::styled(" thinking...", palette.dim_text()),
        ]));
    }

    // Keep the newest lines in view
    let visible = inner.height as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).scroll((scroll, 0)),
        inner,
    );
}

fn render_input(frame: &mut Frame, area: Rect, input: &str, processing: bool, palette: &Palette) {
    let style = if processing {
        palette.dim_text()
    } else {
        palette.text()
    };

    let content = if input.is_empty() && !processing {
        Span::styled(
            "Enter command... (Use /image for image generation)",
            palette.dim_text(),
        )
    } else {
        Span::styled(format!("{}█", input), style)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border());
    frame.render_widget(Paragraph::new(Line::from(content)).block(block), area);
}
