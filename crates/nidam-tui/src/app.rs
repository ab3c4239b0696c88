//! TUI application state and event handling
//!
//! Owns the payment gate, session timer, and transcript, and bridges the
//! synchronous render loop with the async service and wallet calls via an
//! unbounded channel of [`UiEvent`]s.

use crate::components::{DialogAction, PaymentDialog, PaymentMethod, Spinner, Toast, ToastManager};
use nidam_core::chat::{ChatSession, Sender, SubmitAction};
use nidam_core::config::ChatConfig;
use nidam_core::gate::{PaymentGate, PurchaseOutcome};
use nidam_core::services::{ChatService, ChatTurn, ImageService, Role};
use nidam_core::timer::SessionTimer;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Results of background work, delivered to the render loop
#[derive(Debug)]
pub enum UiEvent {
    ChatReply(Result<String, String>),
    ImageReady {
        prompt: String,
        result: Result<String, String>,
    },
    PurchaseDone(Result<PurchaseOutcome, String>),
}

/// TUI application state
pub struct App {
    pub gate: Arc<PaymentGate>,
    pub timer: SessionTimer,
    pub session: ChatSession,
    chat_service: Arc<dyn ChatService>,
    image_service: Arc<dyn ImageService>,
    chat_config: ChatConfig,

    pub input: String,
    pub error: Option<String>,
    pub dialog: PaymentDialog,
    pub toasts: ToastManager,
    pub spinner: Spinner,
    pub should_quit: bool,

    events_tx: mpsc::UnboundedSender<UiEvent>,
    events_rx: mpsc::UnboundedReceiver<UiEvent>,
    /// Lock state observed on the previous tick, for expiry detection
    was_locked: bool,
}

impl App {
    pub fn new(
        gate: Arc<PaymentGate>,
        chat_service: Arc<dyn ChatService>,
        image_service: Arc<dyn ImageService>,
        chat_config: ChatConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut dialog = PaymentDialog::new();
        // No session yet: lead with the purchase flow
        dialog.open();

        Self {
            gate,
            timer: SessionTimer::new(),
            session: ChatSession::new(),
            chat_service,
            image_service,
            chat_config,
            input: String::new(),
            error: None,
            dialog,
            toasts: ToastManager::new(),
            spinner: Spinner::new(),
            should_quit: false,
            events_tx,
            events_rx,
            was_locked: true,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.timer.is_locked()
    }

    /// Per-frame upkeep: spinner animation and expiry detection.
    pub fn tick(&mut self) {
        self.spinner.tick();

        let locked = self.timer.is_locked();
        if locked && !self.was_locked {
            // Session just expired: re-lock and reopen the purchase flow
            self.dialog.open();
            self.toasts.push(Toast::warning("Session expired"));
        }
        self.was_locked = locked;
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: crossterm::event::KeyCode) {
        use crossterm::event::KeyCode;

        if self.dialog.is_visible() {
            if let Some(action) = self.dialog.handle_key(key) {
                self.on_dialog_action(action);
            }
            return;
        }

        match key {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::F(2) => {
                self.dialog.open();
            }
            KeyCode::Enter => {
                if self.is_locked() {
                    self.dialog.open();
                } else {
                    self.submit();
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                if !self.is_locked() && !self.session.is_processing() {
                    self.input.push(c);
                }
            }
            _ => {}
        }
    }

    /// Drain background events (non-blocking).
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                UiEvent::ChatReply(Ok(text)) => {
                    self.session.complete(text);
                }
                UiEvent::ChatReply(Err(message)) => {
                    self.session.fail();
                    self.error = Some(message);
                }
                UiEvent::ImageReady { prompt, result } => match result {
                    Ok(url) => {
                        self.session
                            .complete(format!("Image ready: {}\nPrompt: {}", url, prompt));
                    }
                    Err(message) => {
                        self.session.fail();
                        self.error = Some(message);
                    }
                },
                UiEvent::PurchaseDone(result) => self.on_purchase_done(result),
            }
        }
    }

    fn on_dialog_action(&mut self, action: DialogAction) {
        match action {
            DialogAction::Close => {}
            DialogAction::Purchase { package, method } => match method {
                PaymentMethod::Bitcoin => {
                    self.dialog.set_processing();
                    let gate = Arc::clone(&self.gate);
                    let tx = self.events_tx.clone();
                    tokio::spawn(async move {
                        let result = gate
                            .purchase_time(&package)
                            .await
                            .map_err(|e| e.user_message());
                        let _ = tx.send(UiEvent::PurchaseDone(result));
                    });
                }
                PaymentMethod::External => {
                    let outcome = self.gate.external_payment(&package);
                    if let PurchaseOutcome::Unconfirmed { link } = &outcome {
                        if let Err(e) = open::that(link) {
                            tracing::warn!(error = %e, "Could not open payment link");
                        }
                    }
                    self.on_purchase_done(Ok(outcome));
                }
            },
        }
    }

    fn on_purchase_done(&mut self, result: Result<PurchaseOutcome, String>) {
        match result {
            Ok(PurchaseOutcome::TimeGranted { duration_secs }) => {
                self.timer.start(duration_secs);
                self.dialog.close();
                self.toasts
                    .push(Toast::success(format!("{}s of access granted", duration_secs)));
            }
            Ok(PurchaseOutcome::CreditsAdded(amount)) => {
                self.dialog.close();
                self.toasts
                    .push(Toast::success(format!("{} credits added", amount)));
            }
            Ok(PurchaseOutcome::Unconfirmed { .. }) => {
                // Out-of-band settlement: nothing is granted until confirmed
                self.toasts.push(Toast::warning(
                    "Complete payment in the browser - access is granted manually",
                ));
            }
            Err(message) => {
                self.dialog.set_error(&message);
                self.toasts.push(Toast::error(message));
            }
        }
    }

    /// Submit the current input line.
    fn submit(&mut self) {
        let input = self.input.trim().to_string();
        if input.is_empty() || self.is_locked() || self.session.is_processing() {
            return;
        }
        self.error = None;

        // Metered mode: with credits on the books, every query is debited
        // up front. Without credits the time-based session alone pays.
        if self.gate.balance() > 0 {
            match self
                .gate
                .spend_for_query(&input, self.chat_config.expected_output_tokens)
            {
                Ok(receipt) => {
                    tracing::debug!(cost = receipt.cost, "Query debited");
                }
                Err(e) => {
                    self.error = Some(e.user_message());
                    return;
                }
            }
        }

        match self.session.submit(&input, false) {
            SubmitAction::Rejected => {}
            SubmitAction::Chat { .. } => {
                self.input.clear();
                self.spawn_chat_request();
            }
            SubmitAction::Image { prompt } => {
                self.input.clear();
                self.spawn_image_request(prompt);
            }
        }
    }

    fn spawn_chat_request(&self) {
        let history: Vec<ChatTurn> = self
            .session
            .history()
            .map(|m| ChatTurn {
                role: match m.sender {
                    Sender::User => Role::User,
                    Sender::Assistant => Role::Assistant,
                },
                content: m.text.clone(),
            })
            .collect();

        let service = Arc::clone(&self.chat_service);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = service
                .complete(&history)
                .await
                .map_err(|e| e.user_message());
            let _ = tx.send(UiEvent::ChatReply(result));
        });
    }

    fn spawn_image_request(&self, prompt: String) {
        let service = Arc::clone(&self.image_service);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = service
                .generate(&prompt)
                .await
                .map_err(|e| e.user_message());
            let _ = tx.send(UiEvent::ImageReady { prompt, result });
        });
    }
}
