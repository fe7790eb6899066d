//! One-shot replacement of the code at a designated address.
//!
//! Hardfork 5 swapped the runtime code of a deployed contract in place. The swap is not an
//! admission rule: it runs in the block pipeline, before the block's transactions, at exactly one
//! height.

use alloy_primitives::{Address, Bytes};
use revm::{
    database::State,
    state::{Account, Bytecode, EvmState},
    Database,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A code replacement at `address`, applied at `block_number`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BytecodeMigration {
    /// The only height at which the replacement happens.
    pub block_number: u64,
    /// The account whose code is replaced.
    pub address: Address,
    /// The replacement runtime code.
    pub code: Bytes,
}

impl BytecodeMigration {
    /// Returns `true` if the migration is due at `block_number`.
    pub const fn should_apply(&self, block_number: u64) -> bool {
        block_number == self.block_number
    }

    /// Returns the replacement code as revm bytecode.
    pub fn bytecode(&self) -> Bytecode {
        Bytecode::new_raw(self.code.clone())
    }
}

/// Replaces the code at the migration address if the migration is due at `block_number`, and
/// returns the state changes. Balance, nonce and storage of the account are kept.
///
/// The database `db` is not modified in this function. The caller is responsible to commit the
/// changes to database. If the account already holds the replacement code, the account is only
/// marked as read, so replaying the block is harmless.
pub fn transact_bytecode_migration<DB: Database>(
    migration: &BytecodeMigration,
    block_number: u64,
    db: &mut State<DB>,
) -> Result<Option<EvmState>, DB::Error> {
    if !migration.should_apply(block_number) {
        return Ok(None);
    }

    let bytecode = migration.bytecode();
    let code_hash = bytecode.hash_slow();
    let acc = db.load_cache_account(migration.address)?;

    if let Some(account_info) = acc.account_info() {
        if account_info.code_hash == code_hash {
            debug!(
                address = %migration.address,
                block_number,
                "Bytecode migration already applied"
            );
            return Ok(Some(EvmState::from_iter([(
                migration.address,
                Account { info: account_info, ..Default::default() },
            )])));
        }
    }

    let mut acc_info = acc.account_info().unwrap_or_default();
    acc_info.code_hash = code_hash;
    acc_info.code = Some(bytecode);

    let mut revm_acc: Account = acc_info.into();
    revm_acc.mark_touch();

    info!(address = %migration.address, block_number, %code_hash, "Applying bytecode migration");
    Ok(Some(EvmState::from_iter([(migration.address, revm_acc)])))
}
