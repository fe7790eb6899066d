//! Error types of the admission policy.

use alloy_primitives::Address;

use crate::{calldata::Selector, KintoSpecId};

/// A consensus-rule rejection.
///
/// Any of these makes the transaction invalid for the current state: it is dropped before the
/// execution engine runs its call or create, it is never retried, and it never causes partial
/// execution. Every variant carries the sender and the destination for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    /// The transaction has no destination, i.e. it tries to create a contract from an EOA.
    #[error("{from} is trying to create a contract directly")]
    DirectContractCreationDenied {
        /// The sender.
        from: Address,
    },
    /// The destination is not allowed by the active allow-list.
    #[error("transaction from {from} to address {to} is not permitted")]
    DestinationNotPermitted {
        /// The sender.
        from: Address,
        /// The destination.
        to: Address,
    },
    /// An entry point withdrawal names a recipient other than the sender.
    #[error(
        "{from} is trying to withdrawTo/withdrawStake from entry point {to} to {beneficiary}, \
         which is not the sender"
    )]
    WithdrawBeneficiaryMismatch {
        /// The sender.
        from: Address,
        /// The entry point.
        to: Address,
        /// The recipient decoded from the call data.
        beneficiary: Address,
    },
    /// A bundle submitted to the entry point pays a beneficiary other than the sender.
    #[error(
        "{from} is trying to handleOps on entry point {to} with beneficiary {beneficiary}, which \
         is not the sender"
    )]
    HandleOpsBeneficiaryMismatch {
        /// The sender.
        from: Address,
        /// The entry point.
        to: Address,
        /// The beneficiary decoded from the call data.
        beneficiary: Address,
    },
    /// The entry point function is blocked outright.
    #[error(
        "{from} is calling forbidden entry point function {} on {to}",
        DisplaySelector(.selector)
    )]
    ForbiddenEntryPointFunction {
        /// The sender.
        from: Address,
        /// The entry point.
        to: Address,
        /// The blocked selector, `None` for the fallback function.
        selector: Option<Selector>,
    },
    /// The paymaster deposit and withdrawal functions are blocked outright.
    #[error("{from} is calling paymaster {to}: withdrawTo() and deposit() are not allowed")]
    PaymasterFunctionDenied {
        /// The sender.
        from: Address,
        /// The paymaster.
        to: Address,
        /// The blocked selector.
        selector: Selector,
    },
    /// The policy oracle explicitly refused the call.
    #[error("{from} is not allowed to call {to}")]
    OracleDenied {
        /// The sender.
        from: Address,
        /// The destination, the zero address for a contract creation.
        to: Address,
    },
}

impl AdmissionError {
    /// Returns the sender of the rejected transaction.
    pub const fn sender(&self) -> Address {
        match self {
            Self::DirectContractCreationDenied { from } |
            Self::DestinationNotPermitted { from, .. } |
            Self::WithdrawBeneficiaryMismatch { from, .. } |
            Self::HandleOpsBeneficiaryMismatch { from, .. } |
            Self::ForbiddenEntryPointFunction { from, .. } |
            Self::PaymasterFunctionDenied { from, .. } |
            Self::OracleDenied { from, .. } => *from,
        }
    }

    /// Returns a stable, machine-readable name of the rejection kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DirectContractCreationDenied { .. } => "DirectContractCreationDenied",
            Self::DestinationNotPermitted { .. } => "DestinationNotPermitted",
            Self::WithdrawBeneficiaryMismatch { .. } => "WithdrawBeneficiaryMismatch",
            Self::HandleOpsBeneficiaryMismatch { .. } => "HandleOpsBeneficiaryMismatch",
            Self::ForbiddenEntryPointFunction { .. } => "ForbiddenEntryPointFunction",
            Self::PaymasterFunctionDenied { .. } => "PaymasterFunctionDenied",
            Self::OracleDenied { .. } => "OracleDenied",
        }
    }
}

/// Formats an optional selector, using `fallback` for the empty selector.
struct DisplaySelector<'a>(&'a Option<Selector>);

impl core::fmt::Display for DisplaySelector<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            Some(selector) => write!(f, "{selector}"),
            None => f.write_str("fallback"),
        }
    }
}

/// Errors raised while turning a network configuration into an epoch schedule.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Epoch thresholds must be strictly increasing and spec ids must not go backwards.
    #[error(
        "epoch {spec} at block {start_block_exclusive} does not come after epoch {previous_spec} \
         at block {previous_start_block_exclusive}"
    )]
    UnorderedEpochs {
        /// The offending epoch.
        spec: KintoSpecId,
        /// Its threshold.
        start_block_exclusive: u64,
        /// The epoch before it.
        previous_spec: KintoSpecId,
        /// The threshold of the epoch before it.
        previous_start_block_exclusive: u64,
    },
    /// An epoch needs an address role the address book does not define.
    #[error("epoch {spec} requires the `{role}` address, which is not configured")]
    MissingAddress {
        /// The epoch that needs it.
        spec: KintoSpecId,
        /// The missing role.
        role: crate::AddressRole,
    },
    /// Failed to read the configuration file.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration is not valid JSON for [`crate::NetworkConfig`].
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}
