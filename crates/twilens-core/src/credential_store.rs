//! Local credential store for named Twilio accounts
//!
//! Accounts persist as a single JSON file mapping account name to SID and
//! auth token. Tokens are base64-encoded at rest; this is a reversible
//! encoding, not encryption, and the tool says so to the user. The file
//! shape (`{name: {"account_sid": ..., "auth_token": <base64>}}`) is kept
//! compatible with earlier versions so existing files load unchanged.
//!
//! Every mutation rewrites the full file through a temp-file-then-rename
//! pattern, so the store on disk is always a complete, consistent snapshot
//! even if the process dies mid-write.
//!
//! # Examples
//!
//! ```no_run
//! use twilens_core::credential_store::CredentialStore;
//! use twilens_core::types::{Account, AccountSid, AuthToken};
//!
//! # fn example() -> twilens_core::Result<()> {
//! let mut store = CredentialStore::load_default()?;
//! store.upsert(&Account::new(
//!     "prod",
//!     AccountSid::new("AC00000000000000000000000000000000"),
//!     AuthToken::new("0123456789abcdef0123456789abcdef"),
//! ))?;
//! let account = store.get("prod")?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, TwilensError};
use crate::types::{Account, AccountSid, AuthToken};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the credential file directory
pub const CONFIG_DIR_ENV: &str = "TWILENS_CONFIG_DIR";

/// File name of the credential store inside the config directory
const STORE_FILE: &str = "accounts.json";

/// Persisted form of one account; the token field is base64-encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredAccount {
    account_sid: String,
    auth_token: String,
}

/// File-backed mapping of account names to credentials
///
/// The store exclusively owns the persisted form; sessions work against an
/// [`crate::registry::AccountRegistry`] built on top of it.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    accounts: BTreeMap<String, StoredAccount>,
}

impl CredentialStore {
    /// Resolve the per-user store path
    ///
    /// `$TWILENS_CONFIG_DIR/accounts.json` when the override is set,
    /// otherwise `~/.twilens/accounts.json`.
    pub fn default_path() -> Result<PathBuf> {
        let dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".twilens")))
            .ok_or(TwilensError::NoHomeDirectory)?;
        Ok(dir.join(STORE_FILE))
    }

    /// Load the store from the default per-user path
    pub fn load_default() -> Result<Self> {
        Self::load(Self::default_path()?)
    }

    /// Load the store from an explicit path
    ///
    /// A missing file yields an empty store. A file that exists but does not
    /// parse into the expected mapping yields [`TwilensError::CorruptStore`].
    pub fn load(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            debug!("no credential store at {}, starting empty", path.display());
            return Ok(Self {
                path,
                accounts: BTreeMap::new(),
            });
        }

        let content = std::fs::read_to_string(&path)?;
        let accounts: BTreeMap<String, StoredAccount> =
            serde_json::from_str(&content).map_err(|e| {
                warn!("credential store {} failed to parse: {e}", path.display());
                TwilensError::CorruptStore { path: path.clone() }
            })?;

        debug!(
            "loaded {} account(s) from {}",
            accounts.len(),
            path.display()
        );
        Ok(Self { path, accounts })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sorted account names
    pub fn names(&self) -> Vec<&str> {
        self.accounts.keys().map(String::as_str).collect()
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the store holds no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Whether an account with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.accounts.contains_key(name)
    }

    /// Fetch an account by name, decoding its token
    ///
    /// A token that is no longer valid base64 means the file was edited by
    /// hand or truncated; that surfaces as [`TwilensError::CorruptStore`]
    /// rather than handing garbage credentials to the API client.
    pub fn get(&self, name: &str) -> Result<Account> {
        let stored = self
            .accounts
            .get(name)
            .ok_or_else(|| TwilensError::AccountNotFound(name.to_string()))?;

        let decoded = BASE64
            .decode(&stored.auth_token)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| TwilensError::CorruptStore {
                path: self.path.clone(),
            })?;

        Ok(Account::new(
            name,
            AccountSid::new(&stored.account_sid),
            AuthToken::new(decoded),
        ))
    }

    /// Insert a new account, failing on a name collision
    pub fn insert(&mut self, account: &Account) -> Result<()> {
        if self.accounts.contains_key(&account.name) {
            return Err(TwilensError::DuplicateAccount(account.name.clone()));
        }
        self.upsert(account)
    }

    /// Insert or replace an account by name and persist the store
    pub fn upsert(&mut self, account: &Account) -> Result<()> {
        self.accounts.insert(
            account.name.clone(),
            StoredAccount {
                account_sid: account.sid.as_str().to_string(),
                auth_token: BASE64.encode(account.token.secret()),
            },
        );
        self.save()
    }

    /// Remove an account by name and persist the store
    pub fn remove(&mut self, name: &str) -> Result<()> {
        if self.accounts.remove(name).is_none() {
            return Err(TwilensError::AccountNotFound(name.to_string()));
        }
        self.save()
    }

    /// Rewrite the full store file atomically
    ///
    /// Serializes the complete mapping, writes it next to the target as
    /// `accounts.json.tmp`, then renames over the target.
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.accounts)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &self.path)?;

        debug!(
            "wrote {} account(s) to {}",
            self.accounts.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_account(name: &str) -> Account {
        Account::new(
            name,
            AccountSid::new(format!("AC{}", "0".repeat(32))),
            AuthToken::new("0123456789abcdef0123456789abcdef"),
        )
    }

    fn temp_store() -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::load(dir.path().join("accounts.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let (_dir, store) = temp_store();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let (dir, mut store) = temp_store();
        store.upsert(&test_account("prod")).unwrap();
        store.upsert(&test_account("staging")).unwrap();

        let reloaded = CredentialStore::load(dir.path().join("accounts.json")).unwrap();
        assert_eq!(reloaded.names(), vec!["prod", "staging"]);
        assert_eq!(reloaded.get("prod").unwrap(), test_account("prod"));
        assert_eq!(reloaded.get("staging").unwrap(), test_account("staging"));
    }

    #[test]
    fn test_token_encoded_at_rest() {
        let (dir, mut store) = temp_store();
        store.upsert(&test_account("prod")).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("accounts.json")).unwrap();
        assert!(!raw.contains("0123456789abcdef0123456789abcdef"));
        assert!(raw.contains(&BASE64.encode("0123456789abcdef0123456789abcdef")));
    }

    #[test]
    fn test_upsert_idempotent() {
        let (dir, mut store) = temp_store();
        store.upsert(&test_account("prod")).unwrap();
        let first = std::fs::read_to_string(dir.path().join("accounts.json")).unwrap();

        store.upsert(&test_account("prod")).unwrap();
        let second = std::fs::read_to_string(dir.path().join("accounts.json")).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let (_dir, mut store) = temp_store();
        store.insert(&test_account("prod")).unwrap();

        let err = store.insert(&test_account("prod")).unwrap_err();
        assert!(matches!(err, TwilensError::DuplicateAccount(name) if name == "prod"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_missing_leaves_store_unchanged() {
        let (dir, mut store) = temp_store();
        store.upsert(&test_account("prod")).unwrap();

        let err = store.remove("nope").unwrap_err();
        assert!(matches!(err, TwilensError::AccountNotFound(name) if name == "nope"));

        let reloaded = CredentialStore::load(dir.path().join("accounts.json")).unwrap();
        assert_eq!(reloaded.names(), vec!["prod"]);
    }

    #[test]
    fn test_remove_persists() {
        let (dir, mut store) = temp_store();
        store.upsert(&test_account("prod")).unwrap();
        store.upsert(&test_account("staging")).unwrap();
        store.remove("prod").unwrap();

        let reloaded = CredentialStore::load(dir.path().join("accounts.json")).unwrap();
        assert_eq!(reloaded.names(), vec!["staging"]);
    }

    #[test]
    fn test_corrupt_file_surfaces_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = CredentialStore::load(path).unwrap_err();
        assert!(matches!(err, TwilensError::CorruptStore { .. }));
    }

    #[test]
    fn test_corrupt_token_surfaces_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        std::fs::write(
            &path,
            r#"{"prod": {"account_sid": "AC0", "auth_token": "!!not-base64!!"}}"#,
        )
        .unwrap();

        let store = CredentialStore::load(path).unwrap();
        let err = store.get("prod").unwrap_err();
        assert!(matches!(err, TwilensError::CorruptStore { .. }));
    }

    #[test]
    fn test_no_tmp_residue_after_save() {
        let (dir, mut store) = temp_store();
        store.upsert(&test_account("prod")).unwrap();
        assert!(!dir.path().join("accounts.json.tmp").exists());
        assert!(dir.path().join("accounts.json").exists());
    }

    #[test]
    fn test_reads_legacy_file_shape() {
        // Files written by earlier versions carry exactly these field names
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        let token_b64 = BASE64.encode("0123456789abcdef0123456789abcdef");
        std::fs::write(
            &path,
            format!(
                r#"{{"legacy": {{"account_sid": "AC{}", "auth_token": "{token_b64}"}}}}"#,
                "0".repeat(32)
            ),
        )
        .unwrap();

        let store = CredentialStore::load(path).unwrap();
        let account = store.get("legacy").unwrap();
        assert_eq!(account.token.secret(), "0123456789abcdef0123456789abcdef");
    }
}
