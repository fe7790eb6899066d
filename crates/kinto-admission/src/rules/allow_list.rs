use std::collections::BTreeMap;

use alloy_primitives::Address;

/// Destination allow-list of one epoch.
///
/// Entries are booleans rather than set membership so an epoch can carry the previous table
/// forward and revoke individual destinations with an explicit `false`. Lookups treat a missing
/// entry and a `false` entry the same way.
#[derive(Clone, Debug, Default, PartialEq, Eq, derive_more::Deref)]
pub struct AllowList {
    entries: BTreeMap<Address, bool>,
}

impl AllowList {
    /// Creates an empty allow-list, which permits nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `address` as permitted.
    pub fn allow(&mut self, address: Address) -> &mut Self {
        self.entries.insert(address, true);
        self
    }

    /// Marks `address` as explicitly revoked.
    pub fn revoke(&mut self, address: Address) -> &mut Self {
        self.entries.insert(address, false);
        self
    }

    /// Returns `true` if `address` has an entry set to `true`.
    pub fn permits(&self, address: &Address) -> bool {
        self.entries.get(address).copied().unwrap_or_default()
    }

    /// Returns the permitted destinations in ascending address order.
    pub fn permitted(&self) -> impl Iterator<Item = &Address> {
        self.entries.iter().filter_map(|(address, allowed)| allowed.then_some(address))
    }
}

impl FromIterator<Address> for AllowList {
    fn from_iter<T: IntoIterator<Item = Address>>(iter: T) -> Self {
        Self { entries: iter.into_iter().map(|address| (address, true)).collect() }
    }
}

impl Extend<Address> for AllowList {
    fn extend<T: IntoIterator<Item = Address>>(&mut self, iter: T) {
        self.entries.extend(iter.into_iter().map(|address| (address, true)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const A: Address = address!("000000000000000000000000000000000000000a");
    const B: Address = address!("000000000000000000000000000000000000000b");
    const C: Address = address!("000000000000000000000000000000000000000c");

    #[test]
    fn test_revocation_is_not_permission() {
        let mut list = AllowList::from_iter([A, B]);
        list.revoke(B);

        assert!(list.permits(&A));
        assert!(!list.permits(&B));
        assert!(!list.permits(&C));
        assert_eq!(list.len(), 2);
        assert_eq!(list.permitted().copied().collect::<Vec<_>>(), vec![A]);
    }

    #[test]
    fn test_later_allow_overrides_revocation() {
        let mut list = AllowList::new();
        list.revoke(C).allow(C);
        assert!(list.permits(&C));
    }
}
