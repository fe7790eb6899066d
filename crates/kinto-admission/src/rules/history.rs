//! The rule set each admission version ships with, expressed over address roles.

use super::{
    AllowList, BranchMode, FieldCheck, OracleDenyPolicy, OracleRules, RuleSet, SelectorSet,
    SenderExemption, StaticRules,
};
use crate::{
    calldata::OperandLocation,
    constants::{entry_point, paymaster},
    AddressBook, AddressRole, ConfigError, KintoSpecId,
};

/// Core account-abstraction contracts, permitted since the policy was introduced.
const ORIGINAL_ROLES: &[AddressRole] = &[
    AddressRole::EntryPoint,
    AddressRole::KintoId,
    AddressRole::WalletFactory,
    AddressRole::Paymaster,
];

const HARDFORK1_ROLES: &[AddressRole] = &[AddressRole::AppRegistry];

/// Bridge contracts.
const HARDFORK3_ROLES: &[AddressRole] = &[
    AddressRole::UpgradeExecutor,
    AddressRole::CustomGateway,
    AddressRole::GatewayRouter,
    AddressRole::StandardGateway,
    AddressRole::WethGateway,
];

/// Bundling, retryable tickets, cross-chain messaging and deterministic deployment.
const HARDFORK4_ROLES: &[AddressRole] = &[
    AddressRole::BundleBulker,
    AddressRole::ArbRetryableTx,
    AddressRole::Socket,
    AddressRole::SocketExecutionManager,
    AddressRole::SocketTransmitManager,
    AddressRole::SocketFastSwitchboard,
    AddressRole::SocketOptimisticSwitchboard,
    AddressRole::SocketBatcher,
    AddressRole::SocketSimulator,
    AddressRole::SocketSimulatorUtils,
    AddressRole::SocketSwitchboardSimulator,
    AddressRole::SocketCapacitorSimulator,
    AddressRole::Create2Factory,
];

const HARDFORK6_REVOKED_ROLES: &[AddressRole] = &[
    AddressRole::Socket,
    AddressRole::SocketExecutionManager,
    AddressRole::SocketTransmitManager,
    AddressRole::SocketFastSwitchboard,
    AddressRole::SocketOptimisticSwitchboard,
    AddressRole::SocketBatcher,
    AddressRole::SocketSimulator,
    AddressRole::SocketSimulatorUtils,
    AddressRole::SocketSwitchboardSimulator,
    AddressRole::SocketCapacitorSimulator,
    AddressRole::Create2Factory,
];

const HARDFORK6_ROLES: &[AddressRole] = &[AddressRole::EntryPointV2];

/// Builds the allow-list of `spec` from the roles defined in `book`.
///
/// Roles the book does not define are skipped, which leaves them disallowed.
pub fn allow_list_for(spec: KintoSpecId, book: &AddressBook) -> AllowList {
    let mut list = AllowList::new();
    list.extend(book.resolve(ORIGINAL_ROLES));
    if spec.is_enabled(KintoSpecId::HARDFORK1) {
        list.extend(book.resolve(HARDFORK1_ROLES));
    }
    if spec.is_enabled(KintoSpecId::HARDFORK3) {
        list.extend(book.resolve(HARDFORK3_ROLES));
    }
    if spec.is_enabled(KintoSpecId::HARDFORK4) {
        list.extend(book.resolve(HARDFORK4_ROLES));
    }
    if spec.is_enabled(KintoSpecId::HARDFORK6) {
        for address in book.resolve(HARDFORK6_REVOKED_ROLES) {
            list.revoke(address);
        }
        list.extend(book.resolve(HARDFORK6_ROLES));
    }
    list
}

/// Builds the static rules of `spec`: the allow-list plus the field checks of that version.
pub fn static_rules_for(
    spec: KintoSpecId,
    book: &AddressBook,
    exemptions: &[SenderExemption],
) -> Result<StaticRules, ConfigError> {
    let allow_list = allow_list_for(spec, book);
    if spec == KintoSpecId::PROTOTYPE {
        return prototype_rules(allow_list, book);
    }
    if !spec.has_field_checks() {
        return Ok(StaticRules::allow_list_only(allow_list));
    }

    let mut entry_points = vec![book.require(spec, AddressRole::EntryPoint)?];
    if spec.is_enabled(KintoSpecId::HARDFORK6) {
        entry_points.push(book.require(spec, AddressRole::EntryPointV2)?);
    }

    let handle_ops_family = if spec.is_enabled(KintoSpecId::HARDFORK3) {
        vec![entry_point::HANDLE_OPS]
    } else {
        vec![entry_point::HANDLE_OPS, entry_point::HANDLE_AGGREGATED_OPS]
    };

    let forbidden_entry_point = if spec.is_enabled(KintoSpecId::HARDFORK6) {
        forbidden_entry_point().with(entry_point::HANDLE_OPS_V2)
    } else if spec.is_enabled(KintoSpecId::HARDFORK3) {
        forbidden_entry_point()
    } else {
        SelectorSet::default()
    };

    let sender_exemptions =
        if spec == KintoSpecId::HARDFORK5 { exemptions.to_vec() } else { Vec::new() };

    Ok(StaticRules {
        allow_list,
        entry_points,
        paymaster: Some(book.require(spec, AddressRole::Paymaster)?),
        withdraw: Some(FieldCheck::new(
            [entry_point::WITHDRAW_TO, entry_point::WITHDRAW_STAKE],
            OperandLocation::FIRST_WORD,
        )),
        handle_ops: Some(FieldCheck::new(handle_ops_family, OperandLocation::SECOND_WORD)),
        forbidden_entry_point,
        paymaster_denied: SelectorSet::new([paymaster::WITHDRAW_TO, paymaster::DEPOSIT]),
        sender_exemptions,
        branches: BranchMode::Sequential,
    })
}

/// The first deployment's rules. The withdrawal recipient is the second word, the bundle
/// beneficiary is the last word of the call data, and the first check that applies decides.
fn prototype_rules(allow_list: AllowList, book: &AddressBook) -> Result<StaticRules, ConfigError> {
    let spec = KintoSpecId::PROTOTYPE;
    Ok(StaticRules {
        allow_list,
        entry_points: vec![book.require(spec, AddressRole::EntryPoint)?],
        paymaster: Some(book.require(spec, AddressRole::Paymaster)?),
        withdraw: Some(FieldCheck::new(
            [entry_point::WITHDRAW_TO, entry_point::WITHDRAW_STAKE],
            OperandLocation::SECOND_WORD,
        )),
        handle_ops: Some(FieldCheck::new(
            [entry_point::HANDLE_OPS, entry_point::HANDLE_AGGREGATED_OPS],
            OperandLocation::TrailingWord,
        )),
        forbidden_entry_point: SelectorSet::default(),
        paymaster_denied: SelectorSet::new([paymaster::WITHDRAW_TO, paymaster::DEPOSIT]),
        sender_exemptions: Vec::new(),
        branches: BranchMode::FirstMatch,
    })
}

/// Entry point functions blocked since hardfork 3: the fallback, `depositTo` and
/// `handleAggregatedOps`.
fn forbidden_entry_point() -> SelectorSet {
    SelectorSet::new([entry_point::DEPOSIT_TO, entry_point::HANDLE_AGGREGATED_OPS]).with_fallback()
}

/// Builds the complete rule set of `spec`.
pub fn rules_for(
    spec: KintoSpecId,
    book: &AddressBook,
    exemptions: &[SenderExemption],
) -> Result<RuleSet, ConfigError> {
    adjusted_rules_for(spec, book, exemptions, |_| {})
}

/// Builds the complete rule set of `spec`, passing its static rules through `adjust` first.
///
/// `adjust` is not called for a version without static rules.
pub fn adjusted_rules_for(
    spec: KintoSpecId,
    book: &AddressBook,
    exemptions: &[SenderExemption],
    adjust: impl FnOnce(&mut StaticRules),
) -> Result<RuleSet, ConfigError> {
    let Some(abi) = spec.oracle_abi() else {
        let mut rules = static_rules_for(spec, book, exemptions)?;
        adjust(&mut rules);
        return Ok(if spec.has_field_checks() {
            RuleSet::StaticAllowListWithFieldChecks(rules)
        } else {
            RuleSet::StaticAllowList(rules)
        });
    };

    let on_deny = if spec.is_enabled(KintoSpecId::HARDFORK7) {
        OracleDenyPolicy::Reject
    } else {
        let mut rules = static_rules_for(spec, book, exemptions)?;
        adjust(&mut rules);
        OracleDenyPolicy::FallBackToStatic(rules)
    };

    Ok(RuleSet::OracleDelegating(OracleRules {
        abi,
        oracle: book.require(spec, AddressRole::AppRegistry)?,
        on_deny,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_address_book;

    #[test]
    fn test_allow_list_grows_then_revokes() {
        let book = sample_address_book();
        let original = allow_list_for(KintoSpecId::ORIGINAL, &book);
        let hardfork1 = allow_list_for(KintoSpecId::HARDFORK1, &book);
        let hardfork5 = allow_list_for(KintoSpecId::HARDFORK5, &book);
        let hardfork6 = allow_list_for(KintoSpecId::HARDFORK6, &book);

        assert_eq!(original.permitted().count(), 4);
        assert!(!original.permits(&book[&AddressRole::AppRegistry]));
        assert!(hardfork1.permits(&book[&AddressRole::AppRegistry]));
        assert!(hardfork5.permits(&book[&AddressRole::Socket]));
        assert!(hardfork5.permits(&book[&AddressRole::Create2Factory]));

        assert!(!hardfork6.permits(&book[&AddressRole::Socket]));
        assert!(!hardfork6.permits(&book[&AddressRole::Create2Factory]));
        assert_eq!(hardfork6.get(&book[&AddressRole::Create2Factory]), Some(&false));
        assert!(hardfork6.permits(&book[&AddressRole::EntryPointV2]));
        assert!(hardfork6.permits(&book[&AddressRole::WethGateway]));
    }

    #[test]
    fn test_missing_roles_are_disallowed() {
        let mut book = sample_address_book();
        let weth = book.remove(&AddressRole::WethGateway).unwrap();
        let list = allow_list_for(KintoSpecId::HARDFORK3, &book);
        assert!(!list.permits(&weth));
        assert!(list.permits(&book[&AddressRole::StandardGateway]));
    }

    #[test]
    fn test_required_roles() {
        let mut book = sample_address_book();
        book.remove(&AddressRole::AppRegistry);
        assert!(rules_for(KintoSpecId::HARDFORK5, &book, &[]).is_ok());
        assert!(matches!(
            rules_for(KintoSpecId::HARDFORK7, &book, &[]),
            Err(ConfigError::MissingAddress {
                spec: KintoSpecId::HARDFORK7,
                role: AddressRole::AppRegistry
            })
        ));

        let mut book = sample_address_book();
        book.remove(&AddressRole::EntryPointV2);
        assert!(matches!(
            rules_for(KintoSpecId::HARDFORK6, &book, &[]),
            Err(ConfigError::MissingAddress { role: AddressRole::EntryPointV2, .. })
        ));
    }

    #[test]
    fn test_rule_set_shapes() {
        let book = sample_address_book();
        assert!(matches!(
            rules_for(KintoSpecId::ORIGINAL, &book, &[]),
            Ok(RuleSet::StaticAllowList(_))
        ));
        let hardfork1 = rules_for(KintoSpecId::HARDFORK1, &book, &[]).unwrap();
        let rules = hardfork1.static_rules().unwrap();
        assert!(rules.forbidden_entry_point.is_empty());
        assert_eq!(rules.handle_ops.as_ref().unwrap().selectors.len(), 2);

        let hardfork6 = rules_for(KintoSpecId::HARDFORK6, &book, &[]).unwrap();
        let oracle = hardfork6.oracle_rules().unwrap();
        assert_eq!(oracle.abi, crate::OracleAbi::V1);
        assert_eq!(oracle.oracle, book[&AddressRole::AppRegistry]);
        let fallback = hardfork6.static_rules().unwrap();
        assert_eq!(
            fallback.entry_points,
            vec![book[&AddressRole::EntryPoint], book[&AddressRole::EntryPointV2]]
        );
        assert!(fallback.forbidden_entry_point.contains(Some(entry_point::HANDLE_OPS_V2)));

        let hardfork7 = rules_for(KintoSpecId::HARDFORK7, &book, &[]).unwrap();
        assert_eq!(hardfork7.static_rules(), None);
        assert_eq!(hardfork7.oracle_rules().unwrap().on_deny, OracleDenyPolicy::Reject);
    }

    #[test]
    fn test_prototype_rules() {
        let book = sample_address_book();
        let prototype = rules_for(KintoSpecId::PROTOTYPE, &book, &[]).unwrap();
        assert!(matches!(prototype, RuleSet::StaticAllowListWithFieldChecks(_)));

        let rules = prototype.static_rules().unwrap();
        assert_eq!(rules.allow_list, allow_list_for(KintoSpecId::ORIGINAL, &book));
        assert_eq!(rules.withdraw.as_ref().unwrap().operand, OperandLocation::SECOND_WORD);
        let handle_ops = rules.handle_ops.as_ref().unwrap();
        assert_eq!(handle_ops.operand, OperandLocation::TrailingWord);
        assert!(handle_ops.applies_to(Some(entry_point::HANDLE_AGGREGATED_OPS)));
        assert!(rules.forbidden_entry_point.is_empty());
        assert_eq!(rules.branches, BranchMode::FirstMatch);

        let hardfork1 = rules_for(KintoSpecId::HARDFORK1, &book, &[]).unwrap();
        assert_eq!(hardfork1.static_rules().unwrap().branches, BranchMode::Sequential);
    }

    #[test]
    fn test_adjust_reaches_fallback_rules_only() {
        let book = sample_address_book();
        let mut calls = 0;
        let hardfork6 = adjusted_rules_for(KintoSpecId::HARDFORK6, &book, &[], |rules| {
            calls += 1;
            rules.allow_list.revoke(book[&AddressRole::KintoId]);
        })
        .unwrap();
        assert_eq!(calls, 1);
        let fallback = hardfork6.static_rules().unwrap();
        assert!(!fallback.allow_list.permits(&book[&AddressRole::KintoId]));

        adjusted_rules_for(KintoSpecId::HARDFORK7, &book, &[], |_| calls += 1).unwrap();
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_exemptions_only_in_hardfork5() {
        let book = sample_address_book();
        let exemptions = vec![SenderExemption::default()];
        for spec in KintoSpecId::ALL {
            let Ok(rules) = rules_for(spec, &book, &exemptions) else { panic!("{spec}") };
            let expected = usize::from(spec == KintoSpecId::HARDFORK5);
            assert_eq!(
                rules.static_rules().map_or(0, |rules| rules.sender_exemptions.len()),
                expected,
                "{spec}"
            );
        }
    }
}
