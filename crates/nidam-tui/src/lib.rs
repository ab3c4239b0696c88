//! nidam-tui - terminal frontend for N.I.D.A.M using Ratatui

pub mod app;
pub mod chat_view;
pub mod components;
pub mod theme;
pub mod ui;

pub use app::App;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use nidam_core::config::ChatConfig;
use nidam_core::gate::PaymentGate;
use nidam_core::services::{ChatService, ImageService};
use ratatui::prelude::*;
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Run the TUI application
pub async fn run(
    gate: Arc<PaymentGate>,
    chat_service: Arc<dyn ChatService>,
    image_service: Arc<dyn ImageService>,
    chat_config: ChatConfig,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(gate, chat_service, image_service, chat_config);

    let result = run_loop(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    loop {
        app.tick();
        app.poll_events();

        terminal.draw(|f| ui::render(f, app))?;

        // Handle input with timeout so the countdown and spinner keep moving
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
