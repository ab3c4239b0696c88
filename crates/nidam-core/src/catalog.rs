//! Access-time package catalog
//!
//! Read-only reference data; prices are the original deployment's. All
//! packages currently share one external payment link.

/// One purchasable block of access time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePackage {
    pub duration_minutes: u64,
    pub price_sats: u64,
    pub price_usd: f64,
    pub label: &'static str,
    /// Out-of-band payment page; settlement there is manual and unverified
    pub external_payment_link: &'static str,
}

impl TimePackage {
    /// Session duration granted on successful purchase
    pub fn duration_secs(&self) -> u64 {
        self.duration_minutes * 60
    }
}

const PAYPAL_LINK: &str = "https://www.paypal.com/ncp/payment/XZ3QDHLZLATWS";

/// Catalog of purchasable time packages
pub const TIME_PACKAGES: [TimePackage; 4] = [
    TimePackage {
        duration_minutes: 3,
        price_sats: 573,
        price_usd: 0.25,
        label: "3 min",
        external_payment_link: PAYPAL_LINK,
    },
    TimePackage {
        duration_minutes: 5,
        price_sats: 873,
        price_usd: 0.35,
        label: "5 min",
        external_payment_link: PAYPAL_LINK,
    },
    TimePackage {
        duration_minutes: 10,
        price_sats: 1573,
        price_usd: 0.60,
        label: "10 min",
        external_payment_link: PAYPAL_LINK,
    },
    TimePackage {
        duration_minutes: 30,
        price_sats: 3573,
        price_usd: 1.25,
        label: "30 min",
        external_payment_link: PAYPAL_LINK,
    },
];
