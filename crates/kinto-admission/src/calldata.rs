//! Narrow call-data decoding.
//!
//! The admission rules never run a full ABI decoder over untrusted call data. They only need the
//! function selector and, for a handful of entry point functions, one address operand sitting at
//! a fixed position. Every accessor here is bounds-checked and returns `None` when the data is too
//! short, so malformed input degrades to "operand absent" instead of a panic.

use alloy_primitives::{Address, FixedBytes};
use serde::{Deserialize, Serialize};

use crate::constants::abi::{ADDRESS_PADDING, ADDRESS_SIZE, SELECTOR_SIZE, WORD_SIZE};

/// A 4-byte function selector.
pub type Selector = FixedBytes<4>;

/// Returns the function selector of `data`, or `None` if the data is shorter than a selector.
pub fn extract_selector(data: &[u8]) -> Option<Selector> {
    data.get(..SELECTOR_SIZE).map(Selector::from_slice)
}

/// Decodes the address held by the ABI word starting `offset` bytes after the selector.
///
/// The word occupies `[4 + offset, 4 + offset + 32)`; the address is its last 20 bytes. The 12
/// leading padding bytes are not inspected.
pub fn extract_address_at(data: &[u8], offset: usize) -> Option<Address> {
    let start = SELECTOR_SIZE.checked_add(offset)?.checked_add(ADDRESS_PADDING)?;
    let end = start.checked_add(ADDRESS_SIZE)?;
    data.get(start..end).map(Address::from_slice)
}

/// Decodes the address held by the last 32-byte word of `data`.
pub fn extract_trailing_address(data: &[u8]) -> Option<Address> {
    let start = data.len().checked_sub(WORD_SIZE)? + ADDRESS_PADDING;
    data.get(start..).map(Address::from_slice)
}

/// Where an address operand lives inside call data.
///
/// The two strategies were used by different epochs and must not be merged: moving an epoch from
/// one to the other changes which historical transactions were admitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandLocation {
    /// The word starting `offset` bytes after the selector.
    Word {
        /// Byte offset of the word, counted from the end of the selector.
        offset: usize,
    },
    /// The last word of the call data, wherever it ends.
    TrailingWord,
}

impl OperandLocation {
    /// The first word after the selector.
    pub const FIRST_WORD: Self = Self::Word { offset: 0 };
    /// The second word after the selector.
    pub const SECOND_WORD: Self = Self::Word { offset: WORD_SIZE };

    /// Extracts the address operand from `data`, or `None` if the data is too short.
    pub fn extract(&self, data: &[u8]) -> Option<Address> {
        match *self {
            Self::Word { offset } => extract_address_at(data, offset),
            Self::TrailingWord => extract_trailing_address(data),
        }
    }
}

/// Encodes `address` as a left-padded ABI word.
pub fn address_word(address: Address) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[ADDRESS_PADDING..].copy_from_slice(address.as_slice());
    word
}
