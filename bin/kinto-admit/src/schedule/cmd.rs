use std::{fmt::Write, path::PathBuf};

use clap::Parser;
use kinto_admission::{NetworkConfig, OracleDenyPolicy, RuleSet};

use super::Result;

/// Print the epoch table of a network configuration
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Network configuration file (JSON)
    #[arg(long = "config")]
    pub config: PathBuf,
}

impl Cmd {
    /// Execute the schedule command
    pub fn run(&self) -> Result<()> {
        let config = NetworkConfig::load(&self.config)?;
        print!("{}", render(&config)?);
        Ok(())
    }
}

/// Renders the validated epoch table, one line per epoch, followed by the migration if any.
pub fn render(config: &NetworkConfig) -> Result<String> {
    let schedule = config.build_schedule()?;
    let mut out = String::new();
    for epoch in schedule.iter() {
        let _ = writeln!(
            out,
            "{:<10} after block {:<12} {}",
            epoch.spec,
            epoch.start_block_exclusive,
            describe(&epoch.rules)
        );
    }
    if let Some(migration) = &config.migration {
        let _ = writeln!(
            out,
            "migration  at block    {:<12} {} ({} bytes)",
            migration.block_number,
            migration.address,
            migration.code.len()
        );
    }
    Ok(out)
}

fn describe(rules: &RuleSet) -> String {
    match rules {
        RuleSet::StaticAllowList(rules) => {
            format!("allow-list ({} destinations)", rules.allow_list.permitted().count())
        }
        RuleSet::StaticAllowListWithFieldChecks(rules) => format!(
            "allow-list with field checks ({} destinations, {} exemptions)",
            rules.allow_list.permitted().count(),
            rules.sender_exemptions.len()
        ),
        RuleSet::OracleDelegating(oracle) => {
            let on_deny = match &oracle.on_deny {
                OracleDenyPolicy::FallBackToStatic(_) => "static fallback",
                OracleDenyPolicy::Reject => "reject, fail-open",
            };
            format!("oracle {:?} at {} ({on_deny})", oracle.abi, oracle.oracle)
        }
    }
}
