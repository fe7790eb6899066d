//! Network configuration: contract addresses by role and the epoch table.
//!
//! Configuration is plain JSON:
//!
//! ```json
//! {
//!   "addresses": { "entry_point": "0x…", "paymaster": "0x…", "app_registry": "0x…" },
//!   "epochs": [
//!     { "spec": "ORIGINAL", "start_block_exclusive": 100 },
//!     { "spec": "HARDFORK1", "start_block_exclusive": 110, "revoke": ["0x…"] }
//!   ],
//!   "migration": { "block_number": 5000, "address": "0x…", "code": "0x…" },
//!   "sender_exemptions": [{ "senders": ["0x…"], "contracts": ["0x…"] }]
//! }
//! ```

use std::{collections::BTreeMap, fs, path::Path};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    adjusted_rules_for, calldata::OperandLocation, BytecodeMigration, ConfigError, Epoch,
    EpochSchedule, KintoSpecId, RuleSet, SenderExemption,
};

/// The role a contract plays for the admission rules.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum AddressRole {
    /// The account-abstraction entry point.
    #[display("entry_point")]
    EntryPoint,
    /// The second entry point version, accepting packed user operations.
    #[display("entry_point_v2")]
    EntryPointV2,
    /// The identity registry.
    #[display("kinto_id")]
    KintoId,
    #[display("wallet_factory")]
    WalletFactory,
    /// The sponsor paymaster.
    #[display("paymaster")]
    Paymaster,
    /// The app registry, which also serves as the policy oracle.
    #[display("app_registry")]
    AppRegistry,
    #[display("upgrade_executor")]
    UpgradeExecutor,
    #[display("custom_gateway")]
    CustomGateway,
    #[display("gateway_router")]
    GatewayRouter,
    #[display("standard_gateway")]
    StandardGateway,
    #[display("weth_gateway")]
    WethGateway,
    #[display("bundle_bulker")]
    BundleBulker,
    /// The retryable-ticket precompile.
    #[display("arb_retryable_tx")]
    ArbRetryableTx,
    #[display("socket")]
    Socket,
    #[display("socket_execution_manager")]
    SocketExecutionManager,
    #[display("socket_transmit_manager")]
    SocketTransmitManager,
    #[display("socket_fast_switchboard")]
    SocketFastSwitchboard,
    #[display("socket_optimistic_switchboard")]
    SocketOptimisticSwitchboard,
    #[display("socket_batcher")]
    SocketBatcher,
    #[display("socket_simulator")]
    SocketSimulator,
    #[display("socket_simulator_utils")]
    SocketSimulatorUtils,
    #[display("socket_switchboard_simulator")]
    SocketSwitchboardSimulator,
    #[display("socket_capacitor_simulator")]
    SocketCapacitorSimulator,
    /// The deterministic-deployment factory.
    #[display("create2_factory")]
    Create2Factory,
}

impl AddressRole {
    /// All roles.
    pub const ALL: [Self; 24] = [
        Self::EntryPoint,
        Self::EntryPointV2,
        Self::KintoId,
        Self::WalletFactory,
        Self::Paymaster,
        Self::AppRegistry,
        Self::UpgradeExecutor,
        Self::CustomGateway,
        Self::GatewayRouter,
        Self::StandardGateway,
        Self::WethGateway,
        Self::BundleBulker,
        Self::ArbRetryableTx,
        Self::Socket,
        Self::SocketExecutionManager,
        Self::SocketTransmitManager,
        Self::SocketFastSwitchboard,
        Self::SocketOptimisticSwitchboard,
        Self::SocketBatcher,
        Self::SocketSimulator,
        Self::SocketSimulatorUtils,
        Self::SocketSwitchboardSimulator,
        Self::SocketCapacitorSimulator,
        Self::Create2Factory,
    ];
}

/// Contract addresses by role.
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Deref,
    derive_more::DerefMut,
)]
#[serde(transparent)]
pub struct AddressBook(BTreeMap<AddressRole, Address>);

impl AddressBook {
    /// Returns the address of `role`, failing if `spec` needs it and it is not configured.
    pub fn require(&self, spec: KintoSpecId, role: AddressRole) -> Result<Address, ConfigError> {
        self.0.get(&role).copied().ok_or(ConfigError::MissingAddress { spec, role })
    }

    /// Returns the addresses of those `roles` that are configured.
    pub fn resolve<'a>(&'a self, roles: &'a [AddressRole]) -> impl Iterator<Item = Address> + 'a {
        roles.iter().filter_map(|role| self.0.get(role).copied())
    }
}

impl FromIterator<(AddressRole, Address)> for AddressBook {
    fn from_iter<T: IntoIterator<Item = (AddressRole, Address)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One row of the epoch table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochConfig {
    /// The admission version activated by the epoch.
    pub spec: KintoSpecId,
    /// The last height not governed by the epoch.
    pub start_block_exclusive: u64,
    /// Extra destinations to permit on top of the version's allow-list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow: Vec<Address>,
    /// Destinations to revoke, applied after `allow`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub revoke: Vec<Address>,
    /// Overrides where the withdrawal recipient is read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdraw_operand: Option<OperandLocation>,
    /// Overrides where the bundle beneficiary is read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_ops_operand: Option<OperandLocation>,
}

impl EpochConfig {
    /// Creates an epoch row without overrides.
    pub const fn new(spec: KintoSpecId, start_block_exclusive: u64) -> Self {
        Self {
            spec,
            start_block_exclusive,
            allow: Vec::new(),
            revoke: Vec::new(),
            withdraw_operand: None,
            handle_ops_operand: None,
        }
    }

    /// Builds the rule set of the epoch.
    ///
    /// Overrides only touch static rules. An epoch that delegates entirely to the oracle ignores
    /// them.
    pub fn rules(
        &self,
        book: &AddressBook,
        exemptions: &[SenderExemption],
    ) -> Result<RuleSet, ConfigError> {
        adjusted_rules_for(self.spec, book, exemptions, |static_rules| {
            static_rules.allow_list.extend(self.allow.iter().copied());
            for address in &self.revoke {
                static_rules.allow_list.revoke(*address);
            }
            if let Some(operand) = self.withdraw_operand {
                static_rules.withdraw =
                    static_rules.withdraw.take().map(|check| check.with_operand(operand));
            }
            if let Some(operand) = self.handle_ops_operand {
                static_rules.handle_ops =
                    static_rules.handle_ops.take().map(|check| check.with_operand(operand));
            }
        })
    }
}

/// The admission configuration of a network.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Contract addresses by role.
    #[serde(default)]
    pub addresses: AddressBook,
    /// The epoch table, in activation order.
    #[serde(default)]
    pub epochs: Vec<EpochConfig>,
    /// The one-shot bytecode migration, if the network has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration: Option<BytecodeMigration>,
    /// Sender-pair exemptions of hardfork 5.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sender_exemptions: Vec<SenderExemption>,
}

impl NetworkConfig {
    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading network configuration");
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Validates the epoch table and builds the schedule.
    pub fn build_schedule(&self) -> Result<EpochSchedule, ConfigError> {
        let epochs = self
            .epochs
            .iter()
            .map(|epoch| {
                Ok(Epoch {
                    spec: epoch.spec,
                    start_block_exclusive: epoch.start_block_exclusive,
                    rules: epoch.rules(&self.addresses, &self.sender_exemptions)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        EpochSchedule::new(epochs)
    }
}
