#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Command-line tool to parse, merge and render CPU lists.
//!
//! Each CPU list given on the command line extends the set built from the lists before it, with
//! an empty list clearing the set. The result is printed in canonical form.
//!
//! This crate provides the core logic, exposed via the [`run`] function.
//! The binary entry point is in `main.rs`.

mod types;

use cpu_set::{CpuSet, ParseContext};
pub use types::*;

/// Name used as the unit in log events about CPU lists given on the command line.
const UNIT: &str = "cpuset";

/// Core logic of the tool, extracted for testability.
///
/// Returns the text to print on success.
#[doc(hidden)]
pub fn run(input: &RunInput) -> Result<String, RunError> {
    let initial = if input.current {
        let (set, _) = cpu_set::current_thread_affinity().map_err(RunError::Affinity)?;
        set
    } else {
        CpuSet::new()
    };

    run_from(initial, input)
}

fn run_from(mut set: CpuSet, input: &RunInput) -> Result<String, RunError> {
    for (index, list) in input.lists.iter().enumerate() {
        let context = ParseContext::new()
            .with_unit(UNIT)
            .with_field(format!("list #{}", index.saturating_add(1)));

        cpu_set::extend_with_context(&mut set, list, &context).map_err(|source| {
            RunError::InvalidList {
                list: list.clone(),
                source,
            }
        })?;
    }

    Ok(match input.format {
        OutputFormat::Ids => cpu_set::emit(&set),
        OutputFormat::Ranges => cpu_set::emit_ranges(&set),
    })
}
