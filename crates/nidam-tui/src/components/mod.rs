//! Reusable TUI components

pub mod payment_dialog;
pub mod spinner;
pub mod status_panel;
pub mod toast;

pub use payment_dialog::{DialogAction, PaymentDialog, PaymentMethod};
pub use spinner::Spinner;
pub use toast::{Toast, ToastManager};
