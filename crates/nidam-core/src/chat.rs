//! Transcript maintenance and input routing
//!
//! The orchestration layer keeps an append-only message list with
//! monotonically increasing ids, rejects submissions while the input is
//! locked or a request is in flight, and routes `/image` commands to the
//! image path.

use chrono::{DateTime, Local};

/// Literal prefix that routes input to image generation (case-insensitive)
pub const IMAGE_COMMAND_PREFIX: &str = "/image ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

/// One transcript entry
#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

/// Where a submission should be routed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Chat(String),
    Image(String),
}

/// Classify raw input: `/image <prompt>` goes to the image service, all
/// other text to the chat service.
pub fn dispatch(input: &str) -> Dispatch {
    match input.get(..IMAGE_COMMAND_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(IMAGE_COMMAND_PREFIX) => {
            Dispatch::Image(input[IMAGE_COMMAND_PREFIX.len()..].to_string())
        }
        _ => Dispatch::Chat(input.to_string()),
    }
}

/// Result of handing input to [`ChatSession::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    /// Locked, empty, or already processing: dropped silently
    Rejected,
    Chat { prompt: String },
    Image { prompt: String },
}

/// Per-session transcript plus the in-flight latch that prevents duplicate
/// submissions while a request is awaited.
pub struct ChatSession {
    messages: Vec<Message>,
    next_id: u64,
    in_flight: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
            in_flight: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight
    }

    /// Accept raw input. Records the user message, sets the in-flight latch,
    /// and returns where the request should go. Rejections record nothing.
    pub fn submit(&mut self, input: &str, locked: bool) -> SubmitAction {
        let trimmed = input.trim();
        if trimmed.is_empty() || locked || self.in_flight {
            return SubmitAction::Rejected;
        }

        self.in_flight = true;
        self.push(Sender::User, trimmed.to_string());

        match dispatch(trimmed) {
            Dispatch::Chat(prompt) => SubmitAction::Chat { prompt },
            Dispatch::Image(prompt) => SubmitAction::Image { prompt },
        }
    }

    /// Record the assistant reply for the in-flight request and clear the
    /// latch.
    pub fn complete(&mut self, text: String) {
        self.push(Sender::Assistant, text);
        self.in_flight = false;
    }

    /// Clear the latch after a failed request; the error itself is shown
    /// inline by the UI, not recorded in the transcript.
    pub fn fail(&mut self) {
        self.in_flight = false;
    }

    /// Conversation turns for the chat completion request, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    fn push(&mut self, sender: Sender, text: String) {
        self.messages.push(Message {
            id: self.next_id,
            text,
            sender,
            timestamp: Local::now(),
        });
        self.next_id += 1;
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
