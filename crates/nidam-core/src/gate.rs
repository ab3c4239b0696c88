//! Payment gate: purchase flows and per-query spending
//!
//! Two economic models coexist and never mix in a single payment: purchased
//! time unlocks the chat input (see [`crate::timer`]), while pre-paid credits
//! meter individual queries against the token cost model.
//!
//! Each purchase attempt moves through `Idle -> Processing -> {Succeeded,
//! Failed}`. `Processing` doubles as the duplicate-submission latch; it is
//! cleared on every exit path.

use crate::catalog::TimePackage;
use crate::credits::CreditStore;
use crate::error::CoreError;
use crate::tokens::{self, TokenUsage, MAX_CONTEXT_TOKENS};
use crate::wallet::Wallet;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// State of the current (or most recent) purchase attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PurchaseState {
    #[default]
    Idle,
    Processing,
    Succeeded,
    Failed,
}

/// What a finished purchase yielded
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    /// Balance was credited by this many units
    CreditsAdded(u64),
    /// A session of this length was bought; the caller starts the timer
    TimeGranted { duration_secs: u64 },
    /// An external payment page was opened; settlement is out-of-band and
    /// cannot be verified, so nothing is granted automatically
    Unconfirmed { link: String },
}

/// Receipt for a successfully metered query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryReceipt {
    pub input_tokens: u64,
    pub cost: u64,
    pub remaining: u64,
}

/// Orchestrates wallet purchases and credit spending over a [`CreditStore`].
pub struct PaymentGate {
    credits: CreditStore,
    wallet: Option<Arc<dyn Wallet>>,
    /// Set once after the first successful `enable`; a failed enable leaves
    /// it unset so a later attempt can retry
    wallet_enabled: AtomicBool,
    state: Mutex<PurchaseState>,
}

impl PaymentGate {
    pub fn new(credits: CreditStore, wallet: Option<Arc<dyn Wallet>>) -> Self {
        Self {
            credits,
            wallet,
            wallet_enabled: AtomicBool::new(false),
            state: Mutex::new(PurchaseState::Idle),
        }
    }

    pub fn state(&self) -> PurchaseState {
        *self.state.lock()
    }

    pub fn wallet_available(&self) -> bool {
        self.wallet.is_some()
    }

    pub fn balance(&self) -> u64 {
        self.credits.load()
    }

    pub fn credit_identity(&self) -> String {
        self.credits.identity()
    }

    pub fn adopt_identity(&self, memo: &str) -> Result<(), CoreError> {
        if self.credits.adopt_identity(memo) {
            Ok(())
        } else {
            Err(CoreError::InvalidMemo {
                memo: memo.to_string(),
            })
        }
    }

    /// Meter one query against the credit balance.
    ///
    /// The max-context check happens before any cost math and never debits.
    /// The debit itself is all-or-nothing and holds no await point between
    /// the balance check and the write, so overlapping calls on the event
    /// loop cannot double-spend.
    pub fn spend_for_query(
        &self,
        input: &str,
        expected_output_tokens: u64,
    ) -> Result<QueryReceipt, CoreError> {
        let input_tokens = tokens::token_count(input);
        if input_tokens > MAX_CONTEXT_TOKENS {
            return Err(CoreError::ExceedsMaxContext {
                tokens: input_tokens,
                max: MAX_CONTEXT_TOKENS,
            });
        }

        let cost = tokens::cost(TokenUsage {
            input: input_tokens as u64,
            output: expected_output_tokens,
        });

        let balance = self.credits.load();
        if balance < cost {
            return Err(CoreError::InsufficientCredits { balance, cost });
        }

        let remaining = balance - cost;
        self.credits.save(remaining)?;
        tracing::debug!(cost, remaining, "Query metered");

        Ok(QueryReceipt {
            input_tokens: input_tokens as u64,
            cost,
            remaining,
        })
    }

    /// Buy credits over the wallet: one sat buys one credit. The balance is
    /// only mutated after settlement confirms; every failure path leaves it
    /// untouched.
    pub async fn purchase_credits(&self, amount_sats: u64) -> Result<PurchaseOutcome, CoreError> {
        self.begin()?;
        let result = self.purchase_credits_inner(amount_sats).await;
        self.finish(result.is_ok());
        result
    }

    async fn purchase_credits_inner(
        &self,
        amount_sats: u64,
    ) -> Result<PurchaseOutcome, CoreError> {
        let wallet = self.ensure_wallet().await?;

        // The identity tags the invoice so the balance can be retrieved later
        let memo = self.credits.identity();
        let invoice = wallet.make_invoice(amount_sats, &memo).await?;
        wallet.send_payment(&invoice.payment_request).await?;

        let balance = self.credits.load() + amount_sats;
        self.credits.save(balance)?;
        tracing::info!(amount_sats, balance, "Credits purchased");

        Ok(PurchaseOutcome::CreditsAdded(amount_sats))
    }

    /// Buy a block of access time over the wallet. Yields a duration and
    /// mutates no credit balance - the two models never share a payment.
    pub async fn purchase_time(&self, package: &TimePackage) -> Result<PurchaseOutcome, CoreError> {
        self.begin()?;
        let result = self.purchase_time_inner(package).await;
        self.finish(result.is_ok());
        result
    }

    async fn purchase_time_inner(
        &self,
        package: &TimePackage,
    ) -> Result<PurchaseOutcome, CoreError> {
        let wallet = self.ensure_wallet().await?;

        let memo = format!("N.I.D.A.M access: {} minutes", package.duration_minutes);
        let invoice = wallet.make_invoice(package.price_sats, &memo).await?;
        wallet.send_payment(&invoice.payment_request).await?;

        tracing::info!(minutes = package.duration_minutes, "Access time purchased");
        Ok(PurchaseOutcome::TimeGranted {
            duration_secs: package.duration_secs(),
        })
    }

    /// The external-link path: the caller opens the page in a browser, and
    /// because no programmatic confirmation exists the outcome is explicitly
    /// unconfirmed - no time or credits are granted here.
    pub fn external_payment(&self, package: &TimePackage) -> PurchaseOutcome {
        PurchaseOutcome::Unconfirmed {
            link: package.external_payment_link.to_string(),
        }
    }

    async fn ensure_wallet(&self) -> Result<Arc<dyn Wallet>, CoreError> {
        let wallet = self.wallet.clone().ok_or(CoreError::WalletUnavailable)?;

        if !self.wallet_enabled.load(Ordering::Acquire) {
            wallet.enable().await?;
            self.wallet_enabled.store(true, Ordering::Release);
        }

        Ok(wallet)
    }

    fn begin(&self) -> Result<(), CoreError> {
        let mut state = self.state.lock();
        if *state == PurchaseState::Processing {
            return Err(CoreError::PurchaseInProgress);
        }
        *state = PurchaseState::Processing;
        Ok(())
    }

    fn finish(&self, success: bool) {
        *self.state.lock() = if success {
            PurchaseState::Succeeded
        } else {
            PurchaseState::Failed
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn gate_with_balance(balance: u64) -> PaymentGate {
        let credits = CreditStore::new(Arc::new(MemoryStorage::new()));
        credits.save(balance).unwrap();
        PaymentGate::new(credits, None)
    }

    #[test]
    fn test_spend_success_debits_exactly() {
        // balance=10, "hi" is 1 token, expected output 1 -> cost 1 + 2 = 3
        let gate = gate_with_balance(10);
        let receipt = gate.spend_for_query("hi", 1).unwrap();
        assert_eq!(receipt.cost, receipt.input_tokens + 2);
        assert_eq!(gate.balance(), 10 - receipt.cost);
        assert_eq!(receipt.remaining, gate.balance());
    }

    #[test]
    fn test_spend_insufficient_leaves_balance() {
        let gate = gate_with_balance(1);
        let err = gate.spend_for_query("hello there", 100).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientCredits { .. }));
        assert_eq!(gate.balance(), 1);
    }

    #[test]
    fn test_spend_zero_balance_rejected_not_clamped() {
        let gate = gate_with_balance(0);
        let err = gate.spend_for_query("hi", 0).unwrap_err();
        match err {
            CoreError::InsufficientCredits { balance, cost } => {
                assert_eq!(balance, 0);
                assert!(cost > 0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(gate.balance(), 0);
    }

    #[test]
    fn test_spend_oversized_input_rejected_before_cost() {
        // Way past 1024 tokens regardless of tokenizer details
        let huge = "word ".repeat(5000);
        let gate = gate_with_balance(u64::MAX);
        let err = gate.spend_for_query(&huge, 0).unwrap_err();
        assert!(matches!(err, CoreError::ExceedsMaxContext { .. }));
        assert_eq!(gate.balance(), u64::MAX);
    }

    #[test]
    fn test_sequential_spends_scenario() {
        // balance=10, a 3-credit query succeeds (balance 7), then a
        // 10-credit query fails and balance stays 7
        let gate = gate_with_balance(10);

        let first = gate.spend_for_query("hi", 1).unwrap();
        assert_eq!(first.cost, 3);
        assert_eq!(gate.balance(), 7);

        let err = gate.spend_for_query("hi hi hi hi", 3).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientCredits { .. }));
        assert_eq!(gate.balance(), 7);
    }

    #[tokio::test]
    async fn test_purchase_without_wallet_fails_cleanly() {
        let gate = gate_with_balance(5);
        let err = gate.purchase_credits(100).await.unwrap_err();
        assert!(matches!(err, CoreError::WalletUnavailable));
        assert_eq!(gate.balance(), 5);
        assert_eq!(gate.state(), PurchaseState::Failed);

        // The gate is re-enterable after a failure
        let err = gate.purchase_credits(100).await.unwrap_err();
        assert!(matches!(err, CoreError::WalletUnavailable));
    }

    #[test]
    fn test_external_payment_is_unconfirmed() {
        let gate = gate_with_balance(0);
        let package = crate::catalog::TIME_PACKAGES[0];
        match gate.external_payment(&package) {
            PurchaseOutcome::Unconfirmed { link } => {
                assert_eq!(link, package.external_payment_link);
            }
            other => panic!("expected Unconfirmed, got {other:?}"),
        }
        // Nothing granted
        assert_eq!(gate.balance(), 0);
    }

    #[test]
    fn test_adopt_identity_invalid_memo() {
        let gate = gate_with_balance(0);
        let err = gate.adopt_identity("free text").unwrap_err();
        assert!(matches!(err, CoreError::InvalidMemo { .. }));
        assert!(gate.adopt_identity("NIDAM-abc123").is_ok());
        assert_eq!(gate.credit_identity(), "NIDAM-abc123");
    }
}
