use core::convert::Infallible;

use alloy_primitives::{Address, Bytes, B256, U256};
use delegate::delegate;
use revm::{
    database::{AccountState, CacheDB, DbAccount, EmptyDB},
    primitives::{StorageKey, StorageValue},
    state::{AccountInfo, Bytecode},
};

/// An in-memory world state for oracle and migration tests.
#[derive(Debug, Default, Clone, derive_more::Deref, derive_more::DerefMut)]
pub struct MemoryDatabase {
    #[deref]
    #[deref_mut]
    db: CacheDB<EmptyDB>,
}

impl MemoryDatabase {
    fn account_mut(&mut self, address: Address) -> &mut DbAccount {
        let account = self.db.load_account(address).unwrap();
        account.account_state = AccountState::None;
        account
    }

    /// Deploys `code` at `address`.
    pub fn set_code(&mut self, address: Address, code: Bytes) {
        let bytecode = Bytecode::new_legacy(code);
        let account = self.account_mut(address);
        account.info.code_hash = bytecode.hash_slow();
        account.info.code = Some(bytecode);
    }

    /// Deploys `code` at `address`.
    pub fn with_code(mut self, address: Address, code: Bytes) -> Self {
        self.set_code(address, code);
        self
    }

    /// Sets the balance of `address`.
    pub fn set_balance(&mut self, address: Address, balance: U256) {
        self.account_mut(address).info.balance = balance;
    }

    /// Sets one storage slot of `address`.
    pub fn set_storage(&mut self, address: Address, key: StorageKey, value: StorageValue) {
        self.account_mut(address).storage.insert(key, value);
    }

    /// Returns the account info of `address`, if the account exists.
    pub fn account_info(&self, address: Address) -> Option<AccountInfo> {
        self.db.cache.accounts.get(&address).and_then(|account| account.info())
    }

    /// Returns the storage slot `key` of `address`, zero if unset.
    pub fn storage_at(&self, address: Address, key: StorageKey) -> StorageValue {
        self.db
            .cache
            .accounts
            .get(&address)
            .and_then(|account| account.storage.get(&key).copied())
            .unwrap_or_default()
    }
}

impl revm::Database for MemoryDatabase {
    type Error = Infallible;

    delegate! {
        to self.db {
            fn basic(&mut self, address: Address) -> Result<Option<AccountInfo>, Self::Error>;
            fn code_by_hash(&mut self, code_hash: B256) -> Result<Bytecode, Self::Error>;
            fn storage(
                &mut self,
                address: Address,
                index: StorageKey,
            ) -> Result<StorageValue, Self::Error>;
            fn block_hash(&mut self, number: u64) -> Result<B256, Self::Error>;
        }
    }
}

impl revm::DatabaseCommit for MemoryDatabase {
    delegate! {
        to self.db {
            fn commit(&mut self, changes: revm::primitives::HashMap<Address, revm::state::Account>);
        }
    }
}
