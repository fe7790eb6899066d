//! Kinto admission CLI.
//!
//! Evaluates a transaction against a network's admission policy at a given block height, running
//! the policy oracle against a local prestate when the active epoch consults it.

use std::process::ExitCode;

use clap::Parser;

mod cmd;
pub use cmd::*;

pub mod check;
pub mod common;
pub mod schedule;

fn main() -> Result<ExitCode, common::AdmitError> {
    set_thread_panic_hook();
    MainCmd::parse().run().inspect_err(|e| eprintln!("{e}"))
}

/// Sets thread panic hook, useful for having tests that panic.
fn set_thread_panic_hook() {
    use std::{
        backtrace::Backtrace,
        panic::{set_hook, take_hook},
        process::exit,
    };
    let orig_hook = take_hook();
    set_hook(Box::new(move |panic_info| {
        eprintln!("Custom backtrace: {}", Backtrace::capture());
        orig_hook(panic_info);
        exit(2);
    }));
}
