use std::path::PathBuf;

use alloy_primitives::{Address, U256};
use clap::Parser;
use kinto_admission::{
    test_utils::MemoryDatabase, transact_bytecode_migration, AdmissionDecision, AdmissionEngine,
    EvmPolicyOracle, ExecutionMode, NetworkConfig, RevmCallExecutor, TransactionMessage,
};
use revm::{database::State, DatabaseCommit};
use tracing::{debug, info};

use super::{load_hex, PreStateArgs, Result};

/// Decide whether a transaction is admitted at a block height
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Network configuration file (JSON)
    #[arg(long = "config")]
    pub config: PathBuf,

    /// Block height the transaction is included at
    #[arg(long = "block", visible_aliases = ["height"])]
    pub block: u64,

    /// The transaction sender
    #[arg(long = "from", visible_aliases = ["sender"])]
    pub from: Address,

    /// The transaction destination. Omit it for a contract creation
    #[arg(long = "to", visible_aliases = ["receiver"])]
    pub to: Option<Address>,

    /// Call data (hex string)
    #[arg(long = "input")]
    pub input: Option<String>,

    /// File containing call data. If '-' is specified, call data is read from stdin
    #[arg(long = "inputfile")]
    pub inputfile: Option<String>,

    /// Value transferred by the transaction
    #[arg(long = "value", default_value = "0")]
    pub value: U256,

    /// Execution mode (commit, gas-estimation, eth-call)
    #[arg(long = "mode", default_value = "commit")]
    pub mode: ExecutionMode,

    /// Print the decision as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Pre-execution state configuration
    #[command(flatten)]
    pub prestate_args: PreStateArgs,
}

impl Cmd {
    /// Execute the check command, printing the decision to stdout
    pub fn run(&self) -> Result<AdmissionDecision> {
        let decision = self.decide()?;
        println!("{}", self.render(&decision)?);
        Ok(decision)
    }

    /// Evaluate the transaction without printing anything
    pub fn decide(&self) -> Result<AdmissionDecision> {
        let config = NetworkConfig::load(&self.config)?;
        let engine = AdmissionEngine::from_config(&config)?;
        let msg = self.message()?;

        let mut db = self.prestate_args.load()?;
        self.apply_migration(&config, &mut db);

        let mut oracle = EvmPolicyOracle::new(RevmCallExecutor::at_block(&mut db, self.block));
        Ok(engine.decide(&msg, self.block, &mut oracle))
    }

    /// Build the transaction message from the arguments
    pub fn message(&self) -> Result<TransactionMessage> {
        let input = load_hex(self.input.as_deref(), self.inputfile.as_deref())?;
        debug!(from = %self.from, to = ?self.to, input_len = input.len(), "Transaction loaded");
        Ok(TransactionMessage {
            from: self.from,
            to: self.to,
            value: self.value,
            input,
            mode: self.mode,
        })
    }

    /// Runs the block's bytecode migration, if one is due, before the transaction is evaluated.
    fn apply_migration(&self, config: &NetworkConfig, db: &mut MemoryDatabase) {
        let Some(migration) = &config.migration else { return };
        let mut state = State::builder().with_database(&mut *db).build();
        // The in-memory database cannot fail.
        let Ok(changes) = transact_bytecode_migration(migration, self.block, &mut state);
        drop(state);
        if let Some(changes) = changes {
            info!(
                block = self.block,
                address = %migration.address,
                "Migration applied to prestate"
            );
            db.commit(changes);
        }
    }

    fn render(&self, decision: &AdmissionDecision) -> Result<String> {
        if !self.json {
            return Ok(decision.to_string());
        }
        let (outcome, error) = match decision {
            AdmissionDecision::Allow => ("allow", None),
            AdmissionDecision::AllowDegraded(err) => ("allow-degraded", Some(err.to_string())),
            AdmissionDecision::Reject(err) => ("reject", Some(err.to_string())),
        };
        let kind = match decision {
            AdmissionDecision::Reject(err) => Some(err.kind()),
            _ => None,
        };
        Ok(serde_json::to_string_pretty(&serde_json::json!({
            "block": self.block,
            "allowed": decision.is_allowed(),
            "decision": outcome,
            "kind": kind,
            "error": error,
        }))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinto_admission::{
        test_utils::{oracle_returning, sample_address_book, sample_network_config},
        AddressRole, BytecodeMigration,
    };
    use crate::common::PrestateAccount;
    use rstest::rstest;
    use std::{collections::BTreeMap, path::Path};

    const KINTO_ID: &str = "0x0000000000000000000000000000000000000e02";

    const UNLISTED: &str = "0x1000000000000000000000000000000000000001";
    const SENDER: &str = "0x2000000000000000000000000000000000000002";

    /// Writes the sample network, with an oracle that refuses everything in the prestate.
    fn write_network(dir: &Path, migration: Option<BytecodeMigration>) -> (String, String) {
        let mut config = sample_network_config();
        config.migration = migration;
        let config_path = dir.join("network.json");
        std::fs::write(&config_path, serde_json::to_string(&config).unwrap()).unwrap();

        let oracle = sample_address_book()[&AddressRole::AppRegistry];
        let prestate = BTreeMap::from([(
            oracle,
            PrestateAccount { code: oracle_returning(false), ..Default::default() },
        )]);
        let prestate_path = dir.join("prestate.json");
        std::fs::write(&prestate_path, serde_json::to_string(&prestate).unwrap()).unwrap();

        (config_path.display().to_string(), prestate_path.display().to_string())
    }

    fn parse(config: &str, prestate: &str, block: u64, to: Option<&str>, mode: &str) -> Cmd {
        let block = block.to_string();
        let mut args = vec![
            "check",
            "--config",
            config,
            "--prestate",
            prestate,
            "--block",
            block.as_str(),
            "--from",
            SENDER,
            "--mode",
            mode,
        ];
        if let Some(to) = to {
            args.extend(["--to", to]);
        }
        Cmd::try_parse_from(args).unwrap()
    }

    #[rstest]
    #[case::before_first_epoch(50, None, "commit", true)]
    #[case::creation_denied(150, None, "commit", false)]
    #[case::creation_in_eth_call(150, None, "eth-call", true)]
    #[case::unlisted_destination(450, Some(UNLISTED), "commit", false)]
    #[case::gas_estimation_bypass(450, Some(UNLISTED), "gas-estimation", true)]
    #[case::oracle_refuses(750, Some(UNLISTED), "commit", false)]
    #[case::hardfork6_fallback(650, Some(KINTO_ID), "commit", true)]
    fn test_check(
        #[case] block: u64,
        #[case] to: Option<&str>,
        #[case] mode: &str,
        #[case] allowed: bool,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let (config, prestate) = write_network(dir.path(), None);
        let decision = parse(&config, &prestate, block, to, mode).decide().unwrap();
        assert_eq!(decision.is_allowed(), allowed, "{decision}");
    }

    #[test]
    fn test_migration_applies_before_admission() {
        let dir = tempfile::tempdir().unwrap();
        let migration = BytecodeMigration {
            block_number: 750,
            address: sample_address_book()[&AddressRole::AppRegistry],
            code: oracle_returning(true),
        };
        let (config, prestate) = write_network(dir.path(), Some(migration));

        let at_migration = parse(&config, &prestate, 750, Some(UNLISTED), "commit");
        assert_eq!(at_migration.decide().unwrap(), AdmissionDecision::Allow);
        let after = parse(&config, &prestate, 751, Some(UNLISTED), "commit");
        assert!(!after.decide().unwrap().is_allowed());
    }

    #[test]
    fn test_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let (config, prestate) = write_network(dir.path(), None);
        let mut cmd = parse(&config, &prestate, 150, None, "commit");
        cmd.json = true;

        let decision = cmd.decide().unwrap();
        let output: serde_json::Value =
            serde_json::from_str(&cmd.render(&decision).unwrap()).unwrap();
        assert_eq!(output["allowed"], false);
        assert_eq!(output["decision"], "reject");
        assert_eq!(output["kind"], "DirectContractCreationDenied");
    }

    #[test]
    fn test_invalid_mode_rejected_by_parser() {
        let result = Cmd::try_parse_from([
            "check",
            "--config",
            "network.json",
            "--block",
            "1",
            "--from",
            SENDER,
            "--mode",
            "estimate",
        ]);
        assert!(result.is_err());
    }
}
