use alloy_primitives::Bytes;
use alloy_sol_types::{sol, sol_data, SolCall, SolType};

use super::{OracleAbi, OracleError, OracleQuery};
use crate::constants::abi::WORD_SIZE;

sol! {
    /// The first generation of the app registry policy interface.
    interface IAppRegistryV1 {
        function isContractCallAllowedFromEOA(address from, address to)
            external
            view
            returns (bool);
    }

    /// The app registry policy interface that also sees the call data and value.
    interface IAppRegistry {
        function isContractCallAllowedFromEOA(
            address sender,
            address to,
            bytes callData,
            uint256 value
        ) external view returns (bool);
    }
}

impl OracleQuery {
    /// ABI-encodes the query as call data for the oracle contract.
    pub fn abi_encode(&self) -> Bytes {
        match self.abi {
            OracleAbi::V1 => IAppRegistryV1::isContractCallAllowedFromEOACall {
                from: self.from,
                to: self.to,
            }
            .abi_encode(),
            OracleAbi::V2 => IAppRegistry::isContractCallAllowedFromEOACall {
                sender: self.from,
                to: self.to,
                callData: self.call_data.clone(),
                value: self.value,
            }
            .abi_encode(),
        }
        .into()
    }
}

/// Decodes the oracle's return data as a single `bool`.
///
/// The output must be a whole number of ABI words. Only the first word is read, and it must be
/// exactly `0` or `1`.
pub fn decode_allowed(output: &[u8]) -> Result<bool, OracleError> {
    if output.is_empty() {
        return Err(OracleError::EmptyResult);
    }
    if output.len() % WORD_SIZE != 0 {
        return Err(OracleError::Decode(format!(
            "improperly formatted output of {} bytes",
            output.len()
        )));
    }
    <sol_data::Bool as SolType>::abi_decode_validate(&output[..WORD_SIZE])
        .map_err(|err| OracleError::Decode(err.to_string()))
}
