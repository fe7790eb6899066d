//! Constants for the Kinto admission policy.
//!
//! It groups the wire constants by the contract they belong to as sub-modules.

/// ABI layout constants used by the narrow call-data decoder.
pub mod abi {
    /// Size of the function selector at the start of call data.
    pub const SELECTOR_SIZE: usize = 4;
    /// Size of a full ABI word.
    pub const WORD_SIZE: usize = 32;
    /// Number of zero-padding bytes before an address inside an ABI word.
    pub const ADDRESS_PADDING: usize = 12;
    /// Size of an address.
    pub const ADDRESS_SIZE: usize = 20;
}

/// Function selectors of the account-abstraction entry point.
pub mod entry_point {
    use alloy_primitives::{hex, FixedBytes};

    /// `withdrawTo(address,uint256)`
    pub const WITHDRAW_TO: FixedBytes<4> = FixedBytes(hex!("205c2878"));
    /// `withdrawStake(address)`
    pub const WITHDRAW_STAKE: FixedBytes<4> = FixedBytes(hex!("c23a5cea"));
    /// `handleOps(UserOperation[],address)` of the first entry point version.
    pub const HANDLE_OPS: FixedBytes<4> = FixedBytes(hex!("1fad948c"));
    /// `handleAggregatedOps(UserOpsPerAggregator[],address)`
    pub const HANDLE_AGGREGATED_OPS: FixedBytes<4> = FixedBytes(hex!("4b1d7cf5"));
    /// `depositTo(address)`
    pub const DEPOSIT_TO: FixedBytes<4> = FixedBytes(hex!("b760faf9"));
    /// `handleOps((address,uint256,bytes,bytes32,uint256,bytes32,bytes,bytes)[],address)` of the
    /// second entry point version, which takes packed user operations.
    pub const HANDLE_OPS_V2: FixedBytes<4> = FixedBytes(hex!("765e827f"));
}

/// Function selectors of the sponsor paymaster.
pub mod paymaster {
    use alloy_primitives::{hex, FixedBytes};

    /// `withdrawTo(address,uint256)`
    pub const WITHDRAW_TO: FixedBytes<4> = FixedBytes(hex!("205c2878"));
    /// `deposit()`
    pub const DEPOSIT: FixedBytes<4> = FixedBytes(hex!("d0e30db0"));
}

/// Constants for the policy oracle call.
pub mod oracle {
    /// Gas budget of the nested oracle call. It is carved from a fixed allowance, not from the
    /// gas remaining in the transaction.
    pub const ORACLE_CALL_GAS_LIMIT: u64 = 100_000;
}
