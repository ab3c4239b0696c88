//! nidam-core - Core library for N.I.D.A.M
//!
//! Provides the access-metering core (credits, payment gate, session timer),
//! persistence, the Lightning wallet capability, and the chat/image service
//! clients.

pub mod catalog;
pub mod chat;
pub mod config;
pub mod credits;
pub mod error;
pub mod gate;
pub mod services;
pub mod storage;
pub mod timer;
pub mod tokens;
pub mod wallet;

pub use catalog::{TimePackage, TIME_PACKAGES};
pub use chat::{ChatSession, Dispatch, Message, Sender, SubmitAction};
pub use config::AppConfig;
pub use credits::CreditStore;
pub use error::CoreError;
pub use gate::{PaymentGate, PurchaseOutcome, PurchaseState, QueryReceipt};
pub use services::{ChatService, ChatTurn, ImageService, PollinationsChat, PollinationsImage, Role};
pub use storage::{FileStorage, KvStorage, MemoryStorage};
pub use timer::{SessionTimer, TimerState};
pub use tokens::{TokenUsage, MAX_CONTEXT_TOKENS};
pub use wallet::{detect_wallet, Invoice, Wallet};
