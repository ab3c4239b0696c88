//! CLI command handlers for package listing, balances, and purchases

use anyhow::Result;
use comfy_table::{Cell, ContentArrangement, Table};
use nidam_core::{PaymentGate, PurchaseOutcome, TIME_PACKAGES};
use serde_json::json;

/// Render the time package catalog as a table or JSON.
pub fn format_packages(json_output: bool) -> Result<String> {
    if json_output {
        let packages: Vec<_> = TIME_PACKAGES
            .iter()
            .map(|p| {
                json!({
                    "label": p.label,
                    "duration_minutes": p.duration_minutes,
                    "price_sats": p.price_sats,
                    "price_usd": p.price_usd,
                })
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&packages)?);
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Package", "Duration", "Sats", "USD"]);

    for package in TIME_PACKAGES.iter() {
        table.add_row(vec![
            Cell::new(package.label),
            Cell::new(format!("{} min", package.duration_minutes)),
            Cell::new(package.price_sats.to_string()),
            Cell::new(format!("${:.2}", package.price_usd)),
        ]);
    }

    Ok(table.to_string())
}

/// Render the current credit balance.
pub fn format_balance(gate: &PaymentGate, json_output: bool) -> Result<String> {
    let balance = gate.balance();
    if json_output {
        let value = json!({
            "balance": balance,
            "identity": gate.credit_identity(),
            "wallet_available": gate.wallet_available(),
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }
    Ok(format!("{} credits", balance))
}

/// Buy credits over Lightning and report the new balance.
pub async fn run_buy(gate: &PaymentGate, amount_sats: u64) -> Result<()> {
    if !gate.wallet_available() {
        anyhow::bail!(
            "No Lightning wallet configured. Set NIDAM_LNBITS_URL and NIDAM_LNBITS_KEY."
        );
    }

    eprintln!("Paying {} sats...", amount_sats);
    let outcome = gate.purchase_credits(amount_sats).await?;

    match outcome {
        PurchaseOutcome::CreditsAdded(amount) => {
            println!("Added {} credits (balance: {})", amount, gate.balance());
        }
        other => {
            anyhow::bail!("Unexpected purchase outcome: {:?}", other);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nidam_core::{CreditStore, MemoryStorage};
    use std::sync::Arc;

    fn gate() -> PaymentGate {
        PaymentGate::new(CreditStore::new(Arc::new(MemoryStorage::new())), None)
    }

    #[test]
    fn test_packages_table_lists_all() {
        let out = format_packages(false).unwrap();
        for package in TIME_PACKAGES.iter() {
            assert!(out.contains(package.label));
            assert!(out.contains(&package.price_sats.to_string()));
        }
    }

    #[test]
    fn test_packages_json_parses() {
        let out = format_packages(true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value.as_array().unwrap().len(), TIME_PACKAGES.len());
        assert_eq!(value[0]["price_sats"], 573);
    }

    #[test]
    fn test_balance_json_includes_identity() {
        let out = format_balance(&gate(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["balance"], 0);
        assert!(value["identity"].as_str().unwrap().starts_with("NIDAM-"));
        assert_eq!(value["wallet_available"], false);
    }

    #[tokio::test]
    async fn test_buy_without_wallet_fails() {
        let err = run_buy(&gate(), 100).await.unwrap_err();
        assert!(err.to_string().contains("No Lightning wallet"));
    }
}
