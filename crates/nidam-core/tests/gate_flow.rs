//! End-to-end purchase flows against a scripted wallet

use async_trait::async_trait;
use nidam_core::credits::CreditStore;
use nidam_core::error::CoreError;
use nidam_core::gate::{PaymentGate, PurchaseOutcome, PurchaseState};
use nidam_core::storage::{KvStorage, MemoryStorage};
use nidam_core::wallet::{Invoice, Wallet};
use nidam_core::TIME_PACKAGES;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Wallet double that records calls and fails on command
#[derive(Default)]
struct ScriptedWallet {
    fail_enable: bool,
    fail_invoice: bool,
    fail_payment: bool,
    enable_calls: AtomicUsize,
    memos: Mutex<Vec<String>>,
}

#[async_trait]
impl Wallet for ScriptedWallet {
    async fn enable(&self) -> Result<(), CoreError> {
        self.enable_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_enable {
            Err(CoreError::WalletInitFailed {
                reason: "scripted".to_string(),
            })
        } else {
            Ok(())
        }
    }

    async fn make_invoice(&self, amount_sats: u64, memo: &str) -> Result<Invoice, CoreError> {
        if self.fail_invoice {
            return Err(CoreError::InvoiceFailed {
                amount_sats,
                reason: "scripted".to_string(),
            });
        }
        self.memos.lock().push(memo.to_string());
        Ok(Invoice {
            payment_request: format!("lnbc{}", amount_sats),
        })
    }

    async fn send_payment(&self, _payment_request: &str) -> Result<(), CoreError> {
        if self.fail_payment {
            Err(CoreError::PaymentFailed {
                reason: "scripted".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

fn gate_with(wallet: ScriptedWallet) -> (PaymentGate, Arc<ScriptedWallet>) {
    let wallet = Arc::new(wallet);
    let storage: Arc<dyn KvStorage> = Arc::new(MemoryStorage::new());
    let gate = PaymentGate::new(
        CreditStore::new(storage),
        Some(wallet.clone() as Arc<dyn Wallet>),
    );
    (gate, wallet)
}

#[tokio::test]
async fn purchase_credits_settles_then_credits() {
    let (gate, wallet) = gate_with(ScriptedWallet::default());

    let outcome = gate.purchase_credits(500).await.unwrap();
    assert_eq!(outcome, PurchaseOutcome::CreditsAdded(500));
    assert_eq!(gate.balance(), 500);
    assert_eq!(gate.state(), PurchaseState::Succeeded);

    // The invoice memo carries the credit identity
    let memos = wallet.memos.lock();
    assert_eq!(memos.len(), 1);
    assert!(memos[0].starts_with("NIDAM-"));
}

#[tokio::test]
async fn purchase_credits_accumulates() {
    let (gate, _wallet) = gate_with(ScriptedWallet::default());
    gate.purchase_credits(100).await.unwrap();
    gate.purchase_credits(250).await.unwrap();
    assert_eq!(gate.balance(), 350);
}

#[tokio::test]
async fn failed_payment_credits_nothing() {
    let (gate, _wallet) = gate_with(ScriptedWallet {
        fail_payment: true,
        ..Default::default()
    });

    let err = gate.purchase_credits(500).await.unwrap_err();
    assert!(matches!(err, CoreError::PaymentFailed { .. }));
    assert_eq!(gate.balance(), 0);
    assert_eq!(gate.state(), PurchaseState::Failed);
}

#[tokio::test]
async fn failed_invoice_credits_nothing() {
    let (gate, _wallet) = gate_with(ScriptedWallet {
        fail_invoice: true,
        ..Default::default()
    });

    assert!(gate.purchase_credits(500).await.is_err());
    assert_eq!(gate.balance(), 0);
}

#[tokio::test]
async fn wallet_enable_runs_once_across_purchases() {
    let (gate, wallet) = gate_with(ScriptedWallet::default());

    gate.purchase_credits(10).await.unwrap();
    gate.purchase_credits(10).await.unwrap();
    gate.purchase_time(&TIME_PACKAGES[0]).await.unwrap();

    assert_eq!(wallet.enable_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_enable_is_not_poisoned() {
    let (gate, wallet) = gate_with(ScriptedWallet {
        fail_enable: true,
        ..Default::default()
    });

    let err = gate.purchase_credits(10).await.unwrap_err();
    assert!(matches!(err, CoreError::WalletInitFailed { .. }));

    // A later attempt retries enable rather than staying broken
    let _ = gate.purchase_credits(10).await;
    assert_eq!(wallet.enable_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn purchase_time_grants_duration_not_credits() {
    let (gate, wallet) = gate_with(ScriptedWallet::default());

    let package = &TIME_PACKAGES[1];
    let outcome = gate.purchase_time(package).await.unwrap();
    assert_eq!(
        outcome,
        PurchaseOutcome::TimeGranted { duration_secs: 300 }
    );
    // Time purchases never touch the credit balance
    assert_eq!(gate.balance(), 0);

    let memos = wallet.memos.lock();
    assert!(memos[0].contains("5 minutes"));
}

#[tokio::test]
async fn spend_after_purchase_round_trip() {
    let (gate, _wallet) = gate_with(ScriptedWallet::default());
    gate.purchase_credits(1000).await.unwrap();

    let receipt = gate.spend_for_query("what is the weather", 100).unwrap();
    assert_eq!(gate.balance(), 1000 - receipt.cost);
    assert_eq!(receipt.remaining, gate.balance());
}
