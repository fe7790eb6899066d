//! The admission engine.
//!
//! The engine runs once per transaction, before the execution engine runs its top-level call or
//! create. It is pure apart from the policy oracle query: given the same transaction, height and
//! oracle answer, every node reaches the same decision.

use core::{fmt, str::FromStr};

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AdmissionError, ConfigError, EpochSchedule, NetworkConfig, OracleError, PolicyOracle};

/// How the transaction is being executed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// Block building or import: the result is committed.
    #[default]
    Commit,
    /// Gas estimation.
    GasEstimation,
    /// A read-only `eth_call`.
    EthCall,
}

impl ExecutionMode {
    /// All modes.
    pub const ALL: [Self; 3] = [Self::Commit, Self::GasEstimation, Self::EthCall];

    /// Returns the kebab-case name of the mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::GasEstimation => "gas-estimation",
            Self::EthCall => "eth-call",
        }
    }
}

/// Returned when a string names no execution mode.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown execution mode: {0}")]
pub struct UnknownExecutionMode(pub String);

impl FromStr for ExecutionMode {
    type Err = UnknownExecutionMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownExecutionMode(s.to_string()))
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decoded transaction, as far as the admission rules are concerned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionMessage {
    /// The sender.
    pub from: Address,
    /// The destination, `None` for a contract creation.
    pub to: Option<Address>,
    /// Value transferred.
    pub value: U256,
    /// Call data, or init code for a contract creation.
    pub input: Bytes,
    /// How the transaction is being executed.
    pub mode: ExecutionMode,
}

impl TransactionMessage {
    /// A call from `from` to `to` without data or value.
    pub fn call(from: Address, to: Address) -> Self {
        Self { from, to: Some(to), ..Default::default() }
    }

    /// A contract creation from `from` without init code or value.
    pub fn create(from: Address) -> Self {
        Self { from, ..Default::default() }
    }

    /// Sets the call data.
    pub fn with_input(mut self, input: impl Into<Bytes>) -> Self {
        self.input = input.into();
        self
    }

    /// Sets the value.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Sets the execution mode.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }
}

/// The outcome of admission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// The transaction may execute.
    Allow,
    /// The transaction may execute, but only because the policy oracle failed and the epoch
    /// admits on oracle failure.
    AllowDegraded(OracleError),
    /// The transaction is invalid for the current state.
    Reject(AdmissionError),
}

impl AdmissionDecision {
    /// Returns `true` unless the decision is a rejection.
    pub const fn is_allowed(&self) -> bool {
        !matches!(self, Self::Reject(_))
    }

    /// Converts the decision into the result the state-transition path consumes.
    pub fn into_result(self) -> Result<(), AdmissionError> {
        match self {
            Self::Allow | Self::AllowDegraded(_) => Ok(()),
            Self::Reject(err) => Err(err),
        }
    }
}

impl From<Result<(), AdmissionError>> for AdmissionDecision {
    fn from(result: Result<(), AdmissionError>) -> Self {
        match result {
            Ok(()) => Self::Allow,
            Err(err) => Self::Reject(err),
        }
    }
}

impl fmt::Display for AdmissionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("allow"),
            Self::AllowDegraded(err) => write!(f, "allow (degraded: {err})"),
            Self::Reject(err) => write!(f, "reject: {err}"),
        }
    }
}

/// Decides whether transactions may execute, according to the epoch active at their height.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdmissionEngine {
    schedule: EpochSchedule,
}

impl AdmissionEngine {
    /// Creates an engine over `schedule`.
    pub const fn new(schedule: EpochSchedule) -> Self {
        Self { schedule }
    }

    /// Creates an engine from a network configuration.
    pub fn from_config(config: &NetworkConfig) -> Result<Self, ConfigError> {
        config.build_schedule().map(Self::new)
    }

    /// Returns the epoch schedule.
    pub const fn schedule(&self) -> &EpochSchedule {
        &self.schedule
    }

    /// Decides whether `msg` may execute in a block at `block_number`.
    ///
    /// `oracle` is consulted at most once, and only if the active epoch delegates to it.
    pub fn decide<O: PolicyOracle + ?Sized>(
        &self,
        msg: &TransactionMessage,
        block_number: u64,
        oracle: &mut O,
    ) -> AdmissionDecision {
        let Some(epoch) = self.schedule.active_at(block_number) else {
            debug!(block_number, "No admission policy active");
            return AdmissionDecision::Allow;
        };

        if epoch.spec.bypasses(msg.mode) {
            debug!(block_number, spec = %epoch.spec, mode = %msg.mode, "Admission bypassed");
            return AdmissionDecision::Allow;
        }

        let decision = epoch.rules.evaluate(msg, oracle);
        debug!(
            block_number,
            spec = %epoch.spec,
            from = %msg.from,
            to = ?msg.to,
            %decision,
            "Admission decided"
        );
        decision
    }

    /// Like [`AdmissionEngine::decide`], returning only whether the transaction is rejected.
    pub fn check<O: PolicyOracle + ?Sized>(
        &self,
        msg: &TransactionMessage,
        block_number: u64,
        oracle: &mut O,
    ) -> Result<(), AdmissionError> {
        self.decide(msg, block_number, oracle).into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names() {
        for mode in ExecutionMode::ALL {
            assert_eq!(mode.to_string().parse::<ExecutionMode>(), Ok(mode));
            assert_eq!(serde_json::to_string(&mode).unwrap(), format!("\"{mode}\""));
        }
        assert!("estimate".parse::<ExecutionMode>().is_err());
    }

    #[test]
    fn test_decision_into_result() {
        assert_eq!(AdmissionDecision::Allow.into_result(), Ok(()));
        let degraded = AdmissionDecision::AllowDegraded(OracleError::EmptyResult);
        assert!(degraded.is_allowed());
        assert_eq!(degraded.into_result(), Ok(()));

        let err = AdmissionError::DirectContractCreationDenied { from: Address::ZERO };
        let decision = AdmissionDecision::from(Err(err.clone()));
        assert!(!decision.is_allowed());
        assert_eq!(decision.into_result(), Err(err));
    }

    #[test]
    fn test_empty_schedule_allows_everything() {
        let engine = AdmissionEngine::default();
        let msg = TransactionMessage::create(Address::ZERO);
        assert_eq!(engine.decide(&msg, u64::MAX, &mut crate::NoOracle), AdmissionDecision::Allow);
    }
}
