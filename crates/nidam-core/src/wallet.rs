//! Lightning wallet capability
//!
//! The wallet is an injected, optional capability: when none is configured
//! the payment gate degrades to an explicit `WalletUnavailable` error
//! instead of crashing. The bundled implementation talks to an LNbits
//! instance over its REST API.

use crate::config::WalletConfig;
use crate::error::CoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// A BOLT11 invoice returned by the wallet
#[derive(Debug, Clone)]
pub struct Invoice {
    pub payment_request: String,
}

/// Wallet payment channel: enable once, then create invoices and settle them.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Initialize the wallet connection. Called at most once successfully
    /// per process; a failure leaves the wallet usable for a later attempt.
    async fn enable(&self) -> Result<(), CoreError>;

    /// Create an invoice for `amount_sats`, tagged with `memo`.
    async fn make_invoice(&self, amount_sats: u64, memo: &str) -> Result<Invoice, CoreError>;

    /// Pay a BOLT11 payment request and wait for settlement.
    async fn send_payment(&self, payment_request: &str) -> Result<(), CoreError>;
}

/// Detect a wallet from configuration. Returns `None` when no wallet is
/// configured, which the gate surfaces as `WalletUnavailable`.
pub fn detect_wallet(config: &WalletConfig) -> Option<Arc<dyn Wallet>> {
    match (&config.lnbits_url, &config.lnbits_api_key) {
        (Some(url), Some(key)) => {
            tracing::info!(url = %url, "LNbits wallet configured");
            Some(Arc::new(LnbitsWallet::new(url.clone(), key.clone())))
        }
        _ => {
            tracing::debug!("No Lightning wallet configured");
            None
        }
    }
}

/// Wallet backed by the LNbits REST API (`/api/v1/payments`)
pub struct LnbitsWallet {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct CreateInvoiceRequest<'a> {
    out: bool,
    amount: u64,
    memo: &'a str,
}

#[derive(Deserialize)]
struct CreateInvoiceResponse {
    payment_request: String,
}

#[derive(Serialize)]
struct PayInvoiceRequest<'a> {
    out: bool,
    bolt11: &'a str,
}

impl LnbitsWallet {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn payments_url(&self) -> String {
        format!("{}/api/v1/payments", self.base_url)
    }
}

#[async_trait]
impl Wallet for LnbitsWallet {
    async fn enable(&self) -> Result<(), CoreError> {
        // A wallet lookup doubles as the connectivity/credentials check
        let response = self
            .client
            .get(format!("{}/api/v1/wallet", self.base_url))
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| CoreError::WalletInitFailed {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(CoreError::WalletInitFailed {
                reason: format!("wallet endpoint returned {}", response.status()),
            });
        }

        tracing::info!("Lightning wallet enabled");
        Ok(())
    }

    async fn make_invoice(&self, amount_sats: u64, memo: &str) -> Result<Invoice, CoreError> {
        let body = CreateInvoiceRequest {
            out: false,
            amount: amount_sats,
            memo,
        };

        let response = self
            .client
            .post(self.payments_url())
            .header("X-Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::InvoiceFailed {
                amount_sats,
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(CoreError::InvoiceFailed {
                amount_sats,
                reason: format!("invoice endpoint returned {}", response.status()),
            });
        }

        let parsed: CreateInvoiceResponse =
            response.json().await.map_err(|e| CoreError::InvoiceFailed {
                amount_sats,
                reason: e.to_string(),
            })?;

        Ok(Invoice {
            payment_request: parsed.payment_request,
        })
    }

    async fn send_payment(&self, payment_request: &str) -> Result<(), CoreError> {
        let body = PayInvoiceRequest {
            out: true,
            bolt11: payment_request,
        };

        let response = self
            .client
            .post(self.payments_url())
            .header("X-Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::PaymentFailed {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(CoreError::PaymentFailed {
                reason: format!("payment endpoint returned {}", response.status()),
            });
        }

        tracing::info!("Payment settled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WalletConfig;

    #[test]
    fn test_detect_wallet_absent_without_config() {
        let config = WalletConfig::default();
        assert!(detect_wallet(&config).is_none());
    }

    #[test]
    fn test_detect_wallet_requires_both_fields() {
        let config = WalletConfig {
            lnbits_url: Some("https://lnbits.example".to_string()),
            lnbits_api_key: None,
        };
        assert!(detect_wallet(&config).is_none());
    }

    #[test]
    fn test_detect_wallet_present_with_config() {
        let config = WalletConfig {
            lnbits_url: Some("https://lnbits.example/".to_string()),
            lnbits_api_key: Some("key".to_string()),
        };
        assert!(detect_wallet(&config).is_some());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let wallet = LnbitsWallet::new("https://lnbits.example/".to_string(), "key".to_string());
        assert_eq!(wallet.payments_url(), "https://lnbits.example/api/v1/payments");
    }
}
