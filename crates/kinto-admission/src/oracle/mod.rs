//! The on-chain policy oracle.
//!
//! From hardfork 6 onward the admission decision is delegated to a contract, the app registry,
//! which answers `isContractCallAllowedFromEOA`. The engine reaches it through the
//! [`PolicyOracle`] port; [`EvmPolicyOracle`] implements the port by encoding the query and
//! issuing a bounded nested call through a [`CallExecutor`].

use core::fmt::Debug;

use alloy_primitives::{Address, Bytes, U256};
use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};

use crate::TransactionMessage;

mod abi;
pub use abi::*;

mod evm;
pub use evm::*;

mod executor;
pub use executor::*;

/// The generation of the oracle interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OracleAbi {
    /// `isContractCallAllowedFromEOA(address from, address to)`
    V1,
    /// `isContractCallAllowedFromEOA(address sender, address to, bytes callData, uint256 value)`
    V2,
}

/// A question put to the policy oracle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleQuery {
    /// The interface generation to encode the question with.
    pub abi: OracleAbi,
    /// The sender of the transaction. The nested call is made on its behalf.
    pub from: Address,
    /// The destination, the zero address for a contract creation.
    pub to: Address,
    /// Call data of the transaction.
    pub call_data: Bytes,
    /// Value of the transaction.
    pub value: U256,
}

impl OracleQuery {
    /// Builds the query for `msg`.
    pub fn new(abi: OracleAbi, msg: &TransactionMessage) -> Self {
        Self {
            abi,
            from: msg.from,
            to: msg.to.unwrap_or_default(),
            call_data: msg.input.clone(),
            value: msg.value,
        }
    }
}

/// Reasons the oracle could not give an answer. None of them is an admission rejection.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// The nested call could not be executed at all.
    #[error("error executing oracle call: {0}")]
    Call(#[from] CallError),
    /// The oracle reverted.
    #[error("oracle call reverted with {output}")]
    Reverted {
        /// Revert data.
        output: Bytes,
    },
    /// The oracle call halted, e.g. by running out of gas.
    #[error("oracle call halted: {reason}")]
    Halted {
        /// The halt reason.
        reason: String,
    },
    /// The oracle returned no data.
    #[error("empty result from oracle call")]
    EmptyResult,
    /// The oracle returned data that does not decode as a boolean.
    #[error("error decoding oracle result: {0}")]
    Decode(String),
}

/// The policy oracle port.
///
/// Implementations are queried at most once per transaction and must not cache answers: the
/// oracle's storage may change between transactions of the same block.
#[auto_impl(&mut, Box)]
pub trait PolicyOracle: Debug {
    /// Asks the oracle contract at `oracle` whether the query's sender may call its destination.
    fn is_contract_call_allowed(
        &mut self,
        oracle: Address,
        query: &OracleQuery,
    ) -> Result<bool, OracleError>;
}

/// An oracle for epochs that never consult one. Every query is an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOracle;

impl PolicyOracle for NoOracle {
    fn is_contract_call_allowed(
        &mut self,
        _oracle: Address,
        _query: &OracleQuery,
    ) -> Result<bool, OracleError> {
        Err(OracleError::Call(CallError::new("no policy oracle available")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};

    #[test]
    fn test_query_for_contract_creation_uses_zero_address() {
        let from = address!("00000000000000000000000000000000000000aa");
        let msg = TransactionMessage::create(from)
            .with_input(bytes!("6080"))
            .with_value(U256::from(7));

        let query = OracleQuery::new(OracleAbi::V2, &msg);
        assert_eq!(query.from, from);
        assert_eq!(query.to, Address::ZERO);
        assert_eq!(query.call_data, bytes!("6080"));
        assert_eq!(query.value, U256::from(7));
    }
}
