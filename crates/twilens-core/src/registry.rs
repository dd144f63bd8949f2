//! Session-level account registry
//!
//! Thin in-memory view over the [`CredentialStore`] that tracks which
//! account the session is working against. The active selection is plain
//! session state passed into operations by the caller; nothing here is
//! global, and all persistence goes through the store.

use crate::credential_store::CredentialStore;
use crate::error::{Result, TwilensError};
use crate::types::Account;

/// Registry of stored accounts plus the session's active selection
#[derive(Debug)]
pub struct AccountRegistry {
    store: CredentialStore,
    active: Option<String>,
}

impl AccountRegistry {
    /// Build a registry over a loaded store; nothing is active yet
    pub fn new(store: CredentialStore) -> Self {
        Self {
            store,
            active: None,
        }
    }

    /// Sorted account names
    pub fn names(&self) -> Vec<&str> {
        self.store.names()
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no accounts are stored
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Fetch an account by name
    ///
    /// An empty name means the caller never made a selection and surfaces
    /// as [`TwilensError::NoAccountSelected`] rather than a lookup miss.
    pub fn get(&self, name: &str) -> Result<Account> {
        if name.is_empty() {
            return Err(TwilensError::NoAccountSelected);
        }
        self.store.get(name)
    }

    /// Select the active account for this session
    pub fn set_active(&mut self, name: &str) -> Result<()> {
        // Validate the name up front so later active() calls cannot dangle
        self.get(name)?;
        self.active = Some(name.to_string());
        Ok(())
    }

    /// The active account
    pub fn active(&self) -> Result<Account> {
        match &self.active {
            Some(name) => self.store.get(name),
            None => Err(TwilensError::NoAccountSelected),
        }
    }

    /// Add an account, delegating persistence to the store
    ///
    /// With `overwrite` false this is create-only and fails on a name
    /// collision.
    pub fn add(&mut self, account: &Account, overwrite: bool) -> Result<()> {
        if overwrite {
            self.store.upsert(account)
        } else {
            self.store.insert(account)
        }
    }

    /// Remove an account; clears the active selection if it pointed there
    pub fn remove(&mut self, name: &str) -> Result<()> {
        self.store.remove(name)?;
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
        Ok(())
    }

    /// The backing store
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountSid, AuthToken};

    fn test_account(name: &str) -> Account {
        Account::new(
            name,
            AccountSid::new(format!("AC{}", "0".repeat(32))),
            AuthToken::new("0123456789abcdef0123456789abcdef"),
        )
    }

    fn temp_registry() -> (tempfile::TempDir, AccountRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::load(dir.path().join("accounts.json")).unwrap();
        (dir, AccountRegistry::new(store))
    }

    #[test]
    fn test_empty_name_is_no_selection() {
        let (_dir, registry) = temp_registry();
        assert!(matches!(
            registry.get("").unwrap_err(),
            TwilensError::NoAccountSelected
        ));
    }

    #[test]
    fn test_active_selection() {
        let (_dir, mut registry) = temp_registry();
        registry.add(&test_account("prod"), false).unwrap();

        assert!(matches!(
            registry.active().unwrap_err(),
            TwilensError::NoAccountSelected
        ));

        registry.set_active("prod").unwrap();
        assert_eq!(registry.active().unwrap().name, "prod");
    }

    #[test]
    fn test_set_active_validates() {
        let (_dir, mut registry) = temp_registry();
        assert!(matches!(
            registry.set_active("nope").unwrap_err(),
            TwilensError::AccountNotFound(_)
        ));
    }

    #[test]
    fn test_remove_clears_active() {
        let (_dir, mut registry) = temp_registry();
        registry.add(&test_account("prod"), false).unwrap();
        registry.set_active("prod").unwrap();
        registry.remove("prod").unwrap();

        assert!(matches!(
            registry.active().unwrap_err(),
            TwilensError::NoAccountSelected
        ));
    }

    #[test]
    fn test_add_create_only() {
        let (_dir, mut registry) = temp_registry();
        registry.add(&test_account("prod"), false).unwrap();
        assert!(registry.add(&test_account("prod"), false).is_err());
        // Overwrite is allowed when requested explicitly
        registry.add(&test_account("prod"), true).unwrap();
    }
}
