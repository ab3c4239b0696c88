//! Credit balance and credit-identity persistence
//!
//! The balance is a non-negative integer count of compute units. The identity
//! is an opaque `NIDAM-` token that keys the balance across sessions and is
//! attached to Lightning invoices as the memo.

use crate::error::CoreError;
use crate::storage::KvStorage;
use std::sync::Arc;
use uuid::Uuid;

/// Prefix every credit identity carries
pub const CREDIT_ID_PREFIX: &str = "NIDAM-";

const CREDITS_KEY: &str = "nidam_credits";
const CREDIT_ID_KEY: &str = "nidam_credit_id";

/// Length of the random suffix after the prefix
const IDENTITY_SUFFIX_LEN: usize = 13;

/// Persisted credit balance and identity, constructor-injected wherever a
/// session needs it (one instance per session, no global state).
pub struct CreditStore {
    storage: Arc<dyn KvStorage>,
}

impl CreditStore {
    pub fn new(storage: Arc<dyn KvStorage>) -> Self {
        Self { storage }
    }

    /// Read the persisted balance. Absent or non-numeric values are 0.
    pub fn load(&self) -> u64 {
        self.storage
            .get(CREDITS_KEY)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
    }

    /// Persist a new balance.
    pub fn save(&self, balance: u64) -> Result<(), CoreError> {
        self.storage.set(CREDITS_KEY, &balance.to_string())
    }

    pub fn has_credits(&self) -> bool {
        self.load() > 0
    }

    /// Return the credit identity, lazily creating and persisting one on
    /// first use. Repeated calls return the identical string.
    pub fn identity(&self) -> String {
        if let Some(id) = self.storage.get(CREDIT_ID_KEY) {
            return id;
        }

        let id = generate_identity();
        if let Err(e) = self.storage.set(CREDIT_ID_KEY, &id) {
            // Identity stays usable for this session even if it won't survive it
            tracing::warn!(error = %e, "Could not persist credit identity");
        }
        id
    }

    /// Adopt an externally supplied memo as the identity. Only memos carrying
    /// the `NIDAM-` prefix are accepted; anything else leaves the stored
    /// identity untouched.
    pub fn adopt_identity(&self, memo: &str) -> bool {
        if !memo.starts_with(CREDIT_ID_PREFIX) {
            return false;
        }

        match self.storage.set(CREDIT_ID_KEY, memo) {
            Ok(()) => {
                tracing::info!(identity = memo, "Adopted credit identity from memo");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not persist adopted identity");
                false
            }
        }
    }
}

fn generate_identity() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", CREDIT_ID_PREFIX, &suffix[..IDENTITY_SUFFIX_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> CreditStore {
        CreditStore::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_balance_defaults_to_zero() {
        assert_eq!(store().load(), 0);
    }

    #[test]
    fn test_balance_round_trip() {
        let storage: Arc<dyn KvStorage> = Arc::new(MemoryStorage::new());
        CreditStore::new(Arc::clone(&storage)).save(42).unwrap();

        // A fresh store over the same storage reads the same value
        assert_eq!(CreditStore::new(storage).load(), 42);
    }

    #[test]
    fn test_malformed_balance_is_zero() {
        let storage: Arc<dyn KvStorage> = Arc::new(MemoryStorage::new());
        storage.set("nidam_credits", "not a number").unwrap();
        assert_eq!(CreditStore::new(storage).load(), 0);
    }

    #[test]
    fn test_has_credits() {
        let store = store();
        assert!(!store.has_credits());
        store.save(1).unwrap();
        assert!(store.has_credits());
    }

    #[test]
    fn test_identity_created_once() {
        let store = store();
        let first = store.identity();
        assert!(first.starts_with(CREDIT_ID_PREFIX));
        assert!(first.len() > CREDIT_ID_PREFIX.len());
        assert_eq!(store.identity(), first);
    }

    #[test]
    fn test_identity_stable_across_instances() {
        let storage: Arc<dyn KvStorage> = Arc::new(MemoryStorage::new());
        let first = CreditStore::new(Arc::clone(&storage)).identity();
        assert_eq!(CreditStore::new(storage).identity(), first);
    }

    #[test]
    fn test_adopt_identity_requires_prefix() {
        let store = store();
        let original = store.identity();

        assert!(!store.adopt_identity("random"));
        assert_eq!(store.identity(), original);

        assert!(store.adopt_identity("NIDAM-xyz"));
        assert_eq!(store.identity(), "NIDAM-xyz");
    }
}
