//! Address books, configurations and call data for tests.

use alloy_primitives::{Address, Bytes};

use crate::{
    calldata::{address_word, Selector},
    AddressBook, AddressRole, EpochConfig, KintoSpecId, NetworkConfig,
};

/// Returns an address book with a distinct synthetic address for every role.
///
/// Addresses are `0x…0e00` plus the role's position in [`AddressRole::ALL`].
pub fn sample_address_book() -> AddressBook {
    AddressRole::ALL
        .into_iter()
        .enumerate()
        .map(|(index, role)| (role, Address::left_padding_from(&[0x0e, index as u8])))
        .collect()
}

/// Returns a network configuration over [`sample_address_book`] with one epoch per mainline
/// version, the first starting after block 100 and each following one 100 blocks later.
pub fn sample_network_config() -> NetworkConfig {
    NetworkConfig {
        addresses: sample_address_book(),
        epochs: KintoSpecId::MAINLINE
            .into_iter()
            .zip(1..)
            .map(|(spec, index)| EpochConfig::new(spec, index * 100))
            .collect(),
        ..Default::default()
    }
}

/// Assembles call data from a selector and whole ABI words.
pub fn calldata(selector: Selector, words: &[[u8; 32]]) -> Bytes {
    let mut data = selector.to_vec();
    for word in words {
        data.extend_from_slice(word);
    }
    data.into()
}

/// Call data for a single-address-argument function such as `withdrawTo(address,uint256)`,
/// with `address` in the first word.
pub fn calldata_with_address(selector: Selector, address: Address) -> Bytes {
    calldata(selector, &[address_word(address), [0u8; 32]])
}

/// Call data shaped like `handleOps(ops, beneficiary)`: an offset word followed by the
/// beneficiary word, followed by `tail` further words.
pub fn handle_ops_calldata(selector: Selector, beneficiary: Address, tail: usize) -> Bytes {
    let mut words = vec![[0u8; 32], address_word(beneficiary)];
    words.extend(std::iter::repeat_n([0x11u8; 32], tail));
    calldata(selector, &words)
}
