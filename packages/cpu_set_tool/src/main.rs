#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

//! Binary entry point for the cpuset tool.
//!
//! This module is excluded from mutation testing because testing process entry/exit behavior
//! is impractical - it requires spawning subprocesses and checking exit codes.

use std::error::Error as _;
use std::io;
use std::process::ExitCode;

use argh::FromArgs;
use cpu_set_tool::{OutputFormat, RunInput, run};
use tracing_subscriber::EnvFilter;

/// Parses CPU lists such as `0-3,8`, merges them in order and prints the resulting set. An empty
/// list clears everything before it.
#[derive(FromArgs)]
struct Args {
    /// start from the processors the current thread may run on
    #[argh(switch)]
    current: bool,

    /// print runs of consecutive IDs as ranges, e.g. `0-3 8`
    #[argh(switch)]
    ranges: bool,

    /// CPU lists to apply in order
    #[argh(positional, greedy)]
    lists: Vec<String>,
}

// Binary entry point - mutations would require subprocess testing which is impractical.
#[cfg_attr(test, mutants::skip)]
fn main() -> ExitCode {
    // Warnings about suspicious CPU lists are shown unless RUST_LOG says otherwise.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args: Args = argh::from_env();

    let input = RunInput {
        current: args.current,
        format: if args.ranges {
            OutputFormat::Ranges
        } else {
            OutputFormat::Ids
        },
        lists: args.lists,
    };

    match run(&input) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");

            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = cause.source();
            }

            ExitCode::FAILURE
        }
    }
}
