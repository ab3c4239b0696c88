//! External AI services
//!
//! Chat completion and image generation are consumed behind async traits so
//! the UI can be driven by mocks in tests. The bundled implementations talk
//! to Pollinations-compatible endpoints.

pub mod chat;
pub mod image;

pub use chat::{ChatService, ChatTurn, PollinationsChat, Role};
pub use image::{ImageService, PollinationsImage};
