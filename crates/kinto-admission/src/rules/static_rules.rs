use std::collections::BTreeSet;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use super::{AllowList, FieldCheck, SelectorSet};
use crate::{calldata::extract_selector, AdmissionError, TransactionMessage};

/// A group of operator EOAs that may call a group of partner contracts regardless of the
/// allow-list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderExemption {
    /// The exempt senders.
    pub senders: BTreeSet<Address>,
    /// The contracts they may call.
    pub contracts: BTreeSet<Address>,
}

impl SenderExemption {
    /// Returns `true` if `from` may call `to` under this exemption.
    pub fn covers(&self, from: &Address, to: &Address) -> bool {
        self.senders.contains(from) && self.contracts.contains(to)
    }
}

/// How the selector-specific checks of [`StaticRules`] combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BranchMode {
    /// Every check that applies runs, in order.
    #[default]
    Sequential,
    /// Only the first check that applies runs. If it passes, the transaction is admitted.
    FirstMatch,
}

/// The static rules of one epoch: an allow-list plus selector-specific checks on the entry points
/// and the paymaster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticRules {
    /// Permitted destinations.
    pub allow_list: AllowList,
    /// Every entry point version the field checks apply to.
    pub entry_points: Vec<Address>,
    /// The sponsor paymaster, if its functions are restricted.
    pub paymaster: Option<Address>,
    /// Recipient check on the entry point withdrawal functions.
    pub withdraw: Option<FieldCheck>,
    /// Beneficiary check on the entry point bundle functions.
    pub handle_ops: Option<FieldCheck>,
    /// Entry point functions that are rejected outright.
    pub forbidden_entry_point: SelectorSet,
    /// Paymaster functions that are rejected outright.
    pub paymaster_denied: SelectorSet,
    /// Sender-pair exemptions, consulted before anything else.
    pub sender_exemptions: Vec<SenderExemption>,
    /// How the withdraw, bundle and paymaster checks combine.
    pub branches: BranchMode,
}

impl StaticRules {
    /// Creates rules that only check the destination against `allow_list`.
    pub fn allow_list_only(allow_list: AllowList) -> Self {
        Self { allow_list, ..Default::default() }
    }

    /// Returns `true` if `address` is any configured entry point version.
    pub fn is_entry_point(&self, address: &Address) -> bool {
        self.entry_points.contains(address)
    }

    /// Evaluates the rules against `msg`. The first failing rule decides.
    pub fn evaluate(&self, msg: &TransactionMessage) -> Result<(), AdmissionError> {
        let from = msg.from;

        if let Some(to) = &msg.to {
            if self.sender_exemptions.iter().any(|exemption| exemption.covers(&from, to)) {
                return Ok(());
            }
        }

        let Some(to) = msg.to else {
            return Err(AdmissionError::DirectContractCreationDenied { from });
        };

        if !self.allow_list.permits(&to) {
            return Err(AdmissionError::DestinationNotPermitted { from, to });
        }

        let selector = extract_selector(&msg.input);
        let first_match = self.branches == BranchMode::FirstMatch;

        if self.is_entry_point(&to) {
            if let Some(check) = self.withdraw.as_ref().filter(|check| check.applies_to(selector)) {
                if let Some(beneficiary) = check.mismatch(&msg.input, from) {
                    return Err(AdmissionError::WithdrawBeneficiaryMismatch {
                        from,
                        to,
                        beneficiary,
                    });
                }
                if first_match {
                    return Ok(());
                }
            }

            if let Some(check) = self.handle_ops.as_ref().filter(|check| check.applies_to(selector))
            {
                if let Some(beneficiary) = check.mismatch(&msg.input, from) {
                    return Err(AdmissionError::HandleOpsBeneficiaryMismatch {
                        from,
                        to,
                        beneficiary,
                    });
                }
                if first_match {
                    return Ok(());
                }
            }

            if self.forbidden_entry_point.contains(selector) {
                return Err(AdmissionError::ForbiddenEntryPointFunction { from, to, selector });
            }
        }

        if self.paymaster == Some(to) {
            if let Some(selector) = selector.filter(|s| self.paymaster_denied.contains(Some(*s))) {
                return Err(AdmissionError::PaymasterFunctionDenied { from, to, selector });
            }
        }

        Ok(())
    }
}
