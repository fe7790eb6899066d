use alloy_primitives::Address;

use crate::{OracleError, OracleQuery, PolicyOracle};

/// A [`PolicyOracle`] that replays a fixed answer and records every query.
#[derive(Clone, Debug)]
pub struct StaticOracle {
    answer: Result<bool, OracleError>,
    /// The oracle address and query of each call, in order.
    pub queries: Vec<(Address, OracleQuery)>,
}

impl StaticOracle {
    /// Creates an oracle that always answers `answer`.
    pub const fn new(answer: Result<bool, OracleError>) -> Self {
        Self { answer, queries: Vec::new() }
    }

    /// An oracle that allows every call.
    pub const fn allowing() -> Self {
        Self::new(Ok(true))
    }

    /// An oracle that refuses every call.
    pub const fn denying() -> Self {
        Self::new(Ok(false))
    }

    /// An oracle that fails every call with `err`.
    pub const fn failing(err: OracleError) -> Self {
        Self::new(Err(err))
    }
}

impl PolicyOracle for StaticOracle {
    fn is_contract_call_allowed(
        &mut self,
        oracle: Address,
        query: &OracleQuery,
    ) -> Result<bool, OracleError> {
        self.queries.push((oracle, query.clone()));
        self.answer.clone()
    }
}
