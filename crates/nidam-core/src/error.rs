//! Error types for nidam-core
//!
//! Every purchase or spend failure is recoverable at the call boundary:
//! the caller surfaces a user-visible message and leaves the process alive.

use thiserror::Error;

/// Core error type for nidam operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // Wallet Errors
    // ===================
    #[error("No Lightning wallet is available")]
    WalletUnavailable,

    #[error("Failed to initialize Lightning wallet: {reason}")]
    WalletInitFailed { reason: String },

    #[error("Failed to create invoice for {amount_sats} sats: {reason}")]
    InvoiceFailed { amount_sats: u64, reason: String },

    #[error("Payment failed: {reason}")]
    PaymentFailed { reason: String },

    // ===================
    // Metering Errors
    // ===================
    #[error("Input of {tokens} tokens exceeds the maximum context of {max} tokens")]
    ExceedsMaxContext { tokens: usize, max: usize },

    #[error("Insufficient credits: balance {balance}, cost {cost}")]
    InsufficientCredits { balance: u64, cost: u64 },

    #[error("Memo '{memo}' is not a valid credit identity")]
    InvalidMemo { memo: String },

    #[error("A purchase is already in progress")]
    PurchaseInProgress,

    // ===================
    // Storage Errors
    // ===================
    #[error("Failed to persist store: {message}")]
    Storage { message: String },

    // ===================
    // Service Errors
    // ===================
    #[error("Chat service request failed: {message}")]
    ChatService { message: String },

    #[error("Image service request failed: {message}")]
    ImageService { message: String },
}

impl CoreError {
    /// Short message suitable for inline display in the chat UI.
    ///
    /// The Display impl carries diagnostic detail; this variant reads the
    /// way the paywall talks to the user.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::WalletUnavailable => {
                "No Lightning wallet configured. Set one up to pay with Bitcoin.".to_string()
            }
            CoreError::WalletInitFailed { .. } => {
                "Could not connect to the Lightning wallet.".to_string()
            }
            CoreError::InvoiceFailed { .. } => "Could not create an invoice.".to_string(),
            CoreError::PaymentFailed { reason } => format!("Payment failed: {}", reason),
            CoreError::ExceedsMaxContext { max, .. } => {
                format!("Input exceeds maximum context length of {} tokens", max)
            }
            CoreError::InsufficientCredits { .. } => "Insufficient credits".to_string(),
            CoreError::InvalidMemo { .. } => "That memo is not a NIDAM credit ID".to_string(),
            CoreError::PurchaseInProgress => "A purchase is already in progress".to_string(),
            CoreError::Storage { .. } => "Could not save your balance".to_string(),
            CoreError::ChatService { .. } | CoreError::ImageService { .. } => {
                "Failed to process message".to_string()
            }
        }
    }

    /// True for failures the user can simply retry (all of them, today).
    pub fn is_recoverable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_detail() {
        let err = CoreError::InsufficientCredits {
            balance: 5,
            cost: 12,
        };
        assert_eq!(err.user_message(), "Insufficient credits");
        // Display keeps the numbers for logs
        assert!(err.to_string().contains("balance 5"));
    }

    #[test]
    fn test_max_context_message_names_limit() {
        let err = CoreError::ExceedsMaxContext {
            tokens: 2000,
            max: 1024,
        };
        assert!(err.user_message().contains("1024"));
        assert!(err.is_recoverable());
    }
}
