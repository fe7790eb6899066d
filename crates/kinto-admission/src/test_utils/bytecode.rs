//! Hand-assembled oracle contracts.

use alloy_primitives::{Address, Bytes};
use revm::bytecode::opcode::{
    AND, CALLDATALOAD, CALLER, CALLVALUE, EQ, GAS, ISZERO, JUMP, JUMPDEST, MSTORE, PUSH0,
    RETURN, REVERT, SHR, STOP,
};

use crate::calldata::Selector;

/// A builder for assembling EVM bytecode.
#[derive(Debug, Default)]
pub struct BytecodeBuilder {
    code: Vec<u8>,
}

impl BytecodeBuilder {
    /// Build the bytecode.
    pub fn build(self) -> Bytes {
        self.code.into()
    }

    /// Append a single opcode or byte.
    pub fn append(mut self, opcode: u8) -> Self {
        self.code.push(opcode);
        self
    }

    /// Append a series of opcodes or bytes.
    pub fn append_many(mut self, items: impl IntoIterator<Item = u8>) -> Self {
        self.code.extend(items);
        self
    }

    /// Append a PUSH opcode and the bytes to push.
    pub fn push_bytes(mut self, bytes: impl AsRef<[u8]>) -> Self {
        let bytes = bytes.as_ref();
        assert!(bytes.len() <= 32);
        self.code.push(PUSH0 + bytes.len() as u8);
        self.code.extend_from_slice(bytes);
        self
    }

    /// Append a PUSH opcode and the number to push.
    pub fn push_number(self, number: u64) -> Self {
        let bytes = number.to_be_bytes();
        let skip = bytes.iter().take_while(|byte| **byte == 0).count();
        self.push_bytes(&bytes[skip..])
    }

    /// Push the call data word starting at `offset`.
    pub fn calldata_word(self, offset: u64) -> Self {
        self.push_number(offset).append(CALLDATALOAD)
    }

    /// Return the value on top of the stack as a single word.
    pub fn return_top(self) -> Self {
        self.append_many([PUSH0, MSTORE]).push_number(32).append_many([PUSH0, RETURN])
    }

    /// Append a REVERT opcode with empty return data.
    pub fn revert(self) -> Self {
        self.append_many([PUSH0, PUSH0, REVERT])
    }
}

/// An oracle that answers `allowed` to every query.
pub fn oracle_returning(allowed: bool) -> Bytes {
    oracle_returning_word(u64::from(allowed))
}

/// An oracle that returns `word` as its single output word, whether or not it is a valid bool.
pub fn oracle_returning_word(word: u64) -> Bytes {
    BytecodeBuilder::default().push_number(word).return_top().build()
}

/// An oracle that returns the gas it has left after its first instruction.
pub fn oracle_reporting_gas() -> Bytes {
    BytecodeBuilder::default().append(GAS).return_top().build()
}

/// An oracle that always reverts.
pub fn oracle_reverting() -> Bytes {
    BytecodeBuilder::default().revert().build()
}

/// An oracle that stops without returning data.
pub fn oracle_silent() -> Bytes {
    BytecodeBuilder::default().append(STOP).build()
}

/// An oracle that loops until it runs out of gas.
pub fn oracle_burning_gas() -> Bytes {
    BytecodeBuilder::default().append_many([JUMPDEST, PUSH0, JUMP]).build()
}

/// An oracle that answers `true` iff the query word at `offset` (counted after the selector)
/// holds `expected`.
pub fn oracle_expecting_word(offset: u64, expected: Address) -> Bytes {
    BytecodeBuilder::default()
        .push_bytes(expected)
        .calldata_word(4 + offset)
        .append(EQ)
        .return_top()
        .build()
}

/// An oracle that answers `true` iff the first query word holds the caller of the oracle.
pub fn oracle_expecting_caller() -> Bytes {
    BytecodeBuilder::default().append(CALLER).calldata_word(4).append(EQ).return_top().build()
}

/// An oracle that answers `true` iff it is called with `selector` and no value.
pub fn oracle_expecting_selector(selector: Selector) -> Bytes {
    BytecodeBuilder::default()
        .push_bytes(selector)
        .calldata_word(0)
        .push_number(0xe0)
        .append(SHR)
        .append_many([EQ, CALLVALUE, ISZERO, AND])
        .return_top()
        .build()
}
