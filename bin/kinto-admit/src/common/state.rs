//! Prestate loading for the policy oracle call.

use std::{collections::BTreeMap, path::PathBuf, str::FromStr};

use alloy_primitives::{Address, Bytes, U256};
use clap::Parser;
use kinto_admission::test_utils::MemoryDatabase;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::{AdmitError, Result};

/// Pre-execution state configuration arguments
#[derive(Parser, Debug, Clone, Default)]
#[command(next_help_heading = "State Options")]
pub struct PreStateArgs {
    /// JSON file with the prestate the policy oracle runs against, mapping addresses to
    /// `{ balance, code, storage }`.
    #[arg(long = "prestate", visible_aliases = ["pre-state"])]
    pub prestate: Option<PathBuf>,

    /// Override storage slots. Each entry format: `ADDRESS:SLOT=VALUE`
    /// SLOT and VALUE are U256 (hex or decimal).
    /// Examples: `--storage 0x1234:0x0=0x1`
    #[arg(long = "storage")]
    pub storage: Vec<String>,
}

/// Account state information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrestateAccount {
    /// Account balance
    #[serde(default)]
    pub balance: U256,
    /// Account code (hex string with 0x prefix)
    #[serde(default)]
    pub code: Bytes,
    /// Storage slots
    #[serde(default)]
    pub storage: BTreeMap<U256, U256>,
}

impl PreStateArgs {
    /// Parse storage override entries from CLI arguments.
    ///
    /// Each entry should be in the format `ADDRESS:SLOT=VALUE`.
    pub fn parse_storage(&self) -> Result<Vec<(Address, U256, U256)>> {
        self.storage.iter().map(String::as_str).map(parse_storage_entry).collect()
    }

    /// Loads the prestate file and applies the storage overrides.
    pub fn load(&self) -> Result<MemoryDatabase> {
        let mut db = MemoryDatabase::default();

        if let Some(path) = &self.prestate {
            info!(prestate_path = ?path, "Loading prestate from file");
            let accounts: BTreeMap<Address, PrestateAccount> =
                serde_json::from_str(&std::fs::read_to_string(path)?)?;
            trace!(?accounts, "Prestate loaded from file");
            for (address, account) in accounts {
                insert_account(&mut db, address, account);
            }
        } else {
            debug!("No prestate file provided");
        }

        for (address, slot, value) in self.parse_storage()? {
            info!(%address, %slot, %value, "Overriding storage");
            db.set_storage(address, slot, value);
        }

        Ok(db)
    }
}

fn insert_account(db: &mut MemoryDatabase, address: Address, account: PrestateAccount) {
    db.set_balance(address, account.balance);
    if !account.code.is_empty() {
        db.set_code(address, account.code);
    }
    for (slot, value) in account.storage {
        db.set_storage(address, slot, value);
    }
}

fn parse_storage_entry(entry: &str) -> Result<(Address, U256, U256)> {
    let invalid = |reason: String| {
        AdmitError::InvalidInput(format!("Invalid storage entry '{entry}': {reason}"))
    };
    let (addr_str, rest) =
        entry.split_once(':').ok_or_else(|| invalid("expected 'ADDRESS:SLOT=VALUE'".into()))?;
    let (slot_str, value_str) =
        rest.split_once('=').ok_or_else(|| invalid("expected 'ADDRESS:SLOT=VALUE'".into()))?;

    let address = Address::from_str(addr_str.trim())
        .map_err(|e| invalid(format!("address '{addr_str}': {e}")))?;
    let slot = U256::from_str(slot_str.trim())
        .map_err(|e| invalid(format!("slot '{slot_str}': {e}")))?;
    let value = U256::from_str(value_str.trim())
        .map_err(|e| invalid(format!("value '{value_str}': {e}")))?;
    Ok((address, slot, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use rstest::rstest;

    #[rstest]
    #[case("0x0000000000000000000000000000000000000e05:0x0=0x1", U256::ZERO, U256::from(1))]
    #[case("0x0000000000000000000000000000000000000e05:7=42", U256::from(7), U256::from(42))]
    fn test_parse_storage_entry(#[case] entry: &str, #[case] slot: U256, #[case] value: U256) {
        let address = address!("0000000000000000000000000000000000000e05");
        assert_eq!(parse_storage_entry(entry).unwrap(), (address, slot, value));
    }

    #[rstest]
    #[case("0x0000000000000000000000000000000000000e05=1")]
    #[case("0x0000000000000000000000000000000000000e05:1")]
    #[case("nope:1=1")]
    fn test_parse_storage_entry_invalid(#[case] entry: &str) {
        assert!(matches!(parse_storage_entry(entry), Err(AdmitError::InvalidInput(_))));
    }

    #[test]
    fn test_load_prestate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prestate.json");
        std::fs::write(
            &path,
            r#"{
                "0x0000000000000000000000000000000000000e05": {
                    "balance": "0x10",
                    "code": "0x00",
                    "storage": { "0x1": "0x2" }
                }
            }"#,
        )
        .unwrap();

        let args = PreStateArgs {
            prestate: Some(path),
            storage: vec!["0x0000000000000000000000000000000000000e05:0x3=0x4".to_string()],
        };
        let db = args.load().unwrap();
        let account = address!("0000000000000000000000000000000000000e05");
        let info = db.account_info(account).unwrap();
        assert_eq!(info.balance, U256::from(16));
        assert!(info.code.is_some());
        assert_eq!(db.storage_at(account, U256::from(1)), U256::from(2));
        assert_eq!(db.storage_at(account, U256::from(3)), U256::from(4));
    }
}
