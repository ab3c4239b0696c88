//! Top-level layout: transcript on the left, system status on the right,
//! with the payment dialog and toasts layered on top.

use crate::app::App;
use crate::chat_view;
use crate::components::status_panel;
use crate::theme::Palette;
use ratatui::prelude::*;

const STATUS_PANEL_WIDTH: u16 = 32;

pub fn render(frame: &mut Frame, app: &mut App) {
    let palette = Palette::default();
    let area = frame.area();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(STATUS_PANEL_WIDTH)])
        .split(area);

    if app.is_locked() {
        chat_view::render_locked(frame, columns[0], &palette);
    } else {
        chat_view::render_chat(
            frame,
            columns[0],
            app.session.messages(),
            app.session.is_processing(),
            &app.spinner,
            &app.input,
            app.error.as_deref(),
            &palette,
        );
    }

    status_panel::render(frame, columns[1], &app.gate, &app.timer, &palette);

    app.dialog.render(frame, area, &palette);
    app.toasts.render(frame, area);
}
