use core::fmt::Debug;

use alloy_primitives::{Address, Bytes, TxKind, U256};
use auto_impl::auto_impl;
use revm::{
    context::{
        result::{ExecutionResult, ResultAndState},
        BlockEnv, TxEnv,
    },
    interpreter::gas::calculate_initial_tx_gas,
    primitives::hardfork::SpecId,
    Context, Database, ExecuteEvm, MainBuilder, MainContext,
};

/// A bounded call into the current world state, issued on behalf of `caller`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NestedCall {
    /// The account the call is made from.
    pub caller: Address,
    /// The called contract.
    pub target: Address,
    /// Call data.
    pub input: Bytes,
    /// Gas available to the called code, not counting the intrinsic cost of the call.
    pub gas_limit: u64,
    /// Value transferred with the call.
    pub value: U256,
}

/// How a nested call ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NestedCallResult {
    /// The call returned normally.
    Success {
        /// Return data.
        output: Bytes,
        /// Gas used by the call.
        gas_used: u64,
    },
    /// The call reverted.
    Revert {
        /// Revert data.
        output: Bytes,
        /// Gas used by the call.
        gas_used: u64,
    },
    /// The call halted exceptionally.
    Halt {
        /// Rendered halt reason.
        reason: String,
        /// Gas used by the call.
        gas_used: u64,
    },
}

impl NestedCallResult {
    /// Gas used by the called code.
    pub const fn gas_used(&self) -> u64 {
        match self {
            Self::Success { gas_used, .. } |
            Self::Revert { gas_used, .. } |
            Self::Halt { gas_used, .. } => *gas_used,
        }
    }
}

/// The nested call could not be executed, e.g. because the database failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CallError(String);

impl CallError {
    /// Creates a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The capability to run a nested call against the current state.
///
/// Any state the call produces must be discarded: the call is read-only in intent and must leave
/// no trace in the outer transaction.
#[auto_impl(&mut, Box)]
pub trait CallExecutor: Debug {
    /// Runs `call` to completion.
    fn call(&mut self, call: NestedCall) -> Result<NestedCallResult, CallError>;
}

/// A [`CallExecutor`] that runs the nested call in a fresh mainnet revm instance.
///
/// The instance shares the host database and block environment. Nonce, balance, base fee and
/// block gas limit checks are disabled, since the call is not a real transaction of the sender.
/// The intrinsic gas of the carrying transaction is added on top of [`NestedCall::gas_limit`], so
/// the called code starts with exactly its budget however long the input is. The resulting state
/// is dropped.
#[derive(Debug)]
pub struct RevmCallExecutor<DB> {
    db: DB,
    block: BlockEnv,
    spec: SpecId,
}

impl<DB> RevmCallExecutor<DB> {
    /// The EVM version nested calls run with unless overridden.
    pub const DEFAULT_SPEC: SpecId = SpecId::CANCUN;

    /// Creates an executor over `db` within `block`.
    pub const fn new(db: DB, block: BlockEnv) -> Self {
        Self { db, block, spec: Self::DEFAULT_SPEC }
    }

    /// Runs nested calls with the EVM version `spec`.
    ///
    /// From Prague on, the EIP-7623 call data floor can exceed budget plus intrinsic gas for
    /// long inputs. The transaction is then raised to the floor and the called code gets more
    /// than its budget.
    pub fn with_spec(mut self, spec: SpecId) -> Self {
        self.spec = spec;
        self
    }

    /// Creates an executor over `db` within an otherwise default block at `number`.
    pub fn at_block(db: DB, number: u64) -> Self {
        Self::new(db, BlockEnv { number: U256::from(number), ..Default::default() })
    }

    /// Returns the underlying database.
    pub fn into_db(self) -> DB {
        self.db
    }
}

impl<DB> CallExecutor for RevmCallExecutor<DB>
where
    DB: Database + Debug,
{
    fn call(&mut self, call: NestedCall) -> Result<NestedCallResult, CallError> {
        let spec = self.spec;
        let intrinsic = calculate_initial_tx_gas(spec, &call.input, false, 0, 0, 0);
        let gas_limit =
            call.gas_limit.saturating_add(intrinsic.initial_gas).max(intrinsic.floor_gas);

        let mut evm = Context::mainnet()
            .with_db(&mut self.db)
            .with_block(self.block.clone())
            .modify_cfg_chained(|cfg| {
                cfg.spec = spec;
                cfg.disable_nonce_check = true;
                cfg.disable_balance_check = true;
                cfg.disable_base_fee = true;
                cfg.disable_block_gas_limit = true;
                cfg.disable_eip3607 = true;
            })
            .build_mainnet();

        let tx = TxEnv {
            caller: call.caller,
            kind: TxKind::Call(call.target),
            data: call.input,
            value: call.value,
            gas_limit,
            gas_price: 0,
            ..Default::default()
        };

        let ResultAndState { result, .. } =
            evm.transact(tx).map_err(|err| CallError::new(err.to_string()))?;

        let execution_gas = |gas_used: u64| gas_used.saturating_sub(intrinsic.initial_gas);
        Ok(match result {
            ExecutionResult::Success { output, gas_used, .. } => NestedCallResult::Success {
                output: output.into_data(),
                gas_used: execution_gas(gas_used),
            },
            ExecutionResult::Revert { output, gas_used, .. } => {
                NestedCallResult::Revert { output, gas_used: execution_gas(gas_used) }
            }
            ExecutionResult::Halt { reason, gas_used, .. } => NestedCallResult::Halt {
                reason: format!("{reason:?}"),
                gas_used: execution_gas(gas_used),
            },
        })
    }
}
