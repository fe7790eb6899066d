use alloy_primitives::{Address, U256};
use tracing::trace;

use super::{
    decode_allowed, CallExecutor, NestedCall, NestedCallResult, OracleError, OracleQuery,
    PolicyOracle,
};
use crate::constants::oracle::ORACLE_CALL_GAS_LIMIT;

/// A [`PolicyOracle`] that asks the oracle contract through a nested EVM call.
///
/// The call is made from the transaction sender with zero value and a fixed gas budget of
/// [`ORACLE_CALL_GAS_LIMIT`].
#[derive(Debug)]
pub struct EvmPolicyOracle<E> {
    executor: E,
    gas_limit: u64,
}

impl<E: CallExecutor> EvmPolicyOracle<E> {
    /// Creates an oracle client issuing its calls through `executor`.
    pub const fn new(executor: E) -> Self {
        Self { executor, gas_limit: ORACLE_CALL_GAS_LIMIT }
    }

    /// Overrides the gas budget of the nested call.
    pub const fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Returns the executor.
    pub fn into_executor(self) -> E {
        self.executor
    }
}

impl<E: CallExecutor> PolicyOracle for EvmPolicyOracle<E> {
    fn is_contract_call_allowed(
        &mut self,
        oracle: Address,
        query: &OracleQuery,
    ) -> Result<bool, OracleError> {
        let call = NestedCall {
            caller: query.from,
            target: oracle,
            input: query.abi_encode(),
            gas_limit: self.gas_limit,
            value: U256::ZERO,
        };

        let result = self.executor.call(call)?;
        trace!(%oracle, gas_used = result.gas_used(), "Oracle call finished");

        match result {
            NestedCallResult::Success { output, .. } => decode_allowed(&output),
            NestedCallResult::Revert { output, .. } => Err(OracleError::Reverted { output }),
            NestedCallResult::Halt { reason, .. } => Err(OracleError::Halted { reason }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{oracle::CallError, OracleAbi};
    use alloy_primitives::{address, bytes, Bytes};

    /// Records the last call and replays a canned result.
    #[derive(Debug)]
    struct Canned {
        result: Result<NestedCallResult, CallError>,
        last_call: Option<NestedCall>,
    }

    impl CallExecutor for Canned {
        fn call(&mut self, call: NestedCall) -> Result<NestedCallResult, CallError> {
            self.last_call = Some(call);
            self.result.clone()
        }
    }

    const ORACLE: Address = address!("0000000000000000000000000000000000000a99");

    fn query() -> OracleQuery {
        OracleQuery {
            abi: OracleAbi::V1,
            from: address!("00000000000000000000000000000000000000aa"),
            to: address!("00000000000000000000000000000000000000bb"),
            call_data: Bytes::new(),
            value: U256::from(5),
        }
    }

    fn ask(result: Result<NestedCallResult, CallError>) -> (Result<bool, OracleError>, NestedCall) {
        let mut oracle = EvmPolicyOracle::new(Canned { result, last_call: None });
        let answer = oracle.is_contract_call_allowed(ORACLE, &query());
        (answer, oracle.into_executor().last_call.unwrap())
    }

    #[test]
    fn test_call_shape() {
        let output = Bytes::from(U256::from(1).to_be_bytes_vec());
        let (answer, call) = ask(Ok(NestedCallResult::Success { output, gas_used: 21_500 }));

        assert_eq!(answer, Ok(true));
        assert_eq!(call.caller, query().from);
        assert_eq!(call.target, ORACLE);
        assert_eq!(call.gas_limit, ORACLE_CALL_GAS_LIMIT);
        // The transaction value is never forwarded.
        assert_eq!(call.value, U256::ZERO);
        assert_eq!(call.input, query().abi_encode());
    }

    #[test]
    fn test_failures_map_to_oracle_errors() {
        let (answer, _) =
            ask(Ok(NestedCallResult::Revert { output: bytes!("08c379a0"), gas_used: 1 }));
        assert_eq!(answer, Err(OracleError::Reverted { output: bytes!("08c379a0") }));

        let (answer, _) = ask(Ok(NestedCallResult::Halt {
            reason: "OutOfGas".to_string(),
            gas_used: ORACLE_CALL_GAS_LIMIT,
        }));
        assert_eq!(answer, Err(OracleError::Halted { reason: "OutOfGas".to_string() }));

        let (answer, _) = ask(Ok(NestedCallResult::Success { output: Bytes::new(), gas_used: 1 }));
        assert_eq!(answer, Err(OracleError::EmptyResult));

        let (answer, _) = ask(Err(CallError::new("database unavailable")));
        assert_eq!(answer, Err(OracleError::Call(CallError::new("database unavailable"))));
    }
}
