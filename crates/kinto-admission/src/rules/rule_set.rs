use alloy_primitives::Address;
use tracing::{debug, warn};

use super::StaticRules;
use crate::{
    AdmissionDecision, AdmissionError, OracleAbi, OracleQuery, PolicyOracle, TransactionMessage,
};

/// The rules one epoch applies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleSet {
    /// Destination allow-list only.
    StaticAllowList(StaticRules),
    /// Allow-list plus the entry point and paymaster checks.
    StaticAllowListWithFieldChecks(StaticRules),
    /// The policy oracle decides.
    OracleDelegating(OracleRules),
}

/// What an oracle epoch does with anything but a clean `true`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OracleDenyPolicy {
    /// A refusal or an oracle failure falls back to the static rules.
    FallBackToStatic(StaticRules),
    /// A refusal rejects; an oracle failure admits the transaction.
    Reject,
}

/// Rules of an epoch that delegates to the on-chain policy oracle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleRules {
    /// The oracle interface generation.
    pub abi: OracleAbi,
    /// Address of the oracle contract.
    pub oracle: Address,
    /// Handling of refusals and failures.
    pub on_deny: OracleDenyPolicy,
}

impl RuleSet {
    /// Returns the static rules the epoch evaluates without the oracle, if any.
    pub fn static_rules(&self) -> Option<&StaticRules> {
        match self {
            Self::StaticAllowList(rules) | Self::StaticAllowListWithFieldChecks(rules) => {
                Some(rules)
            }
            Self::OracleDelegating(OracleRules {
                on_deny: OracleDenyPolicy::FallBackToStatic(rules),
                ..
            }) => Some(rules),
            Self::OracleDelegating(_) => None,
        }
    }

    /// Returns the oracle rules if the epoch delegates to the policy oracle.
    pub const fn oracle_rules(&self) -> Option<&OracleRules> {
        match self {
            Self::OracleDelegating(rules) => Some(rules),
            _ => None,
        }
    }

    /// Evaluates the rules against `msg`, consulting `oracle` if the epoch delegates to it.
    pub fn evaluate<O: PolicyOracle + ?Sized>(
        &self,
        msg: &TransactionMessage,
        oracle: &mut O,
    ) -> AdmissionDecision {
        match self {
            Self::StaticAllowList(rules) | Self::StaticAllowListWithFieldChecks(rules) => {
                rules.evaluate(msg).into()
            }
            Self::OracleDelegating(rules) => rules.evaluate(msg, oracle),
        }
    }
}

impl OracleRules {
    /// Queries the oracle and applies the deny policy to its answer.
    pub fn evaluate<O: PolicyOracle + ?Sized>(
        &self,
        msg: &TransactionMessage,
        oracle: &mut O,
    ) -> AdmissionDecision {
        let query = OracleQuery::new(self.abi, msg);
        let answer = oracle.is_contract_call_allowed(self.oracle, &query);
        debug!(from = %query.from, to = %query.to, ?answer, "Policy oracle answered");

        match (answer, &self.on_deny) {
            (Ok(true), _) => AdmissionDecision::Allow,
            (Ok(false), OracleDenyPolicy::Reject) => {
                AdmissionDecision::Reject(AdmissionError::OracleDenied {
                    from: query.from,
                    to: query.to,
                })
            }
            (Ok(false), OracleDenyPolicy::FallBackToStatic(rules)) => rules.evaluate(msg).into(),
            (Err(err), OracleDenyPolicy::Reject) => {
                warn!(from = %query.from, to = %query.to, %err, "Policy oracle failed, fail-open");
                AdmissionDecision::AllowDegraded(err)
            }
            (Err(err), OracleDenyPolicy::FallBackToStatic(rules)) => {
                warn!(from = %query.from, to = %query.to, %err, "Policy oracle failed, fallback");
                rules.evaluate(msg).into()
            }
        }
    }
}
