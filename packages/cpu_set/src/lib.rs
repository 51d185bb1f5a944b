#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Growable CPU affinity masks, plus utilities for parsing, merging and emitting the CPU list
//! strings used in configuration files to say which processors a task may run on.
//!
//! Example CPU list: `0-3 8,10-11`
//!
//! # Format
//!
//! A CPU list is a sequence of zero or more items separated by any mix of whitespace and commas,
//! where each item is either:
//!
//! * a single CPU ID (e.g. `1`)
//! * an inclusive range of CPU IDs (e.g. `2-4`)
//!
//! An item may be wrapped in single or double quotes. CPU IDs are non-negative decimal integers
//! below [`CPU_ID_LIMIT`].
//!
//! An empty or blank CPU list is valid and parses to an unallocated [`CpuSet`]. When used with
//! [`extend()`], it clears the existing set.
//!
//! A range whose start is greater than its end (e.g. `5-3`) is ignored rather than rejected. It
//! still leaves the parsed set allocated, which distinguishes "something was specified but it
//! selected no CPUs" from "nothing was specified".
//!
//! # Example
//!
//! Basic conversion from/to strings:
//!
//! ```
//! let selected_processors = cpu_set::parse("0,2,4-6").unwrap();
//! assert_eq!(
//!     selected_processors.iter().collect::<Vec<_>>(),
//!     vec![0, 2, 4, 5, 6]
//! );
//!
//! assert_eq!(cpu_set::emit(&selected_processors), "0 2 4 5 6");
//! assert_eq!(cpu_set::emit_ranges(&selected_processors), "0 2 4-6");
//! ```
//!
//! Building up a set from several settings, where a later empty setting resets what came before:
//!
//! ```
//! use cpu_set::CpuSet;
//!
//! let mut affinity = CpuSet::new();
//!
//! for setting in ["0-3", "8", "", "1,2"] {
//!     cpu_set::extend(&mut affinity, setting).unwrap();
//! }
//!
//! assert_eq!(affinity.to_string(), "1 2");
//! ```

mod diagnostics;
mod emit;
mod error;
mod mask;
mod pal;
mod parse;
mod query;
mod words;

pub use diagnostics::*;
pub use emit::*;
pub use error::*;
pub use mask::{CPU_ID_LIMIT, CpuIds, CpuSet};
pub use parse::*;
pub use query::*;

pub(crate) type Item = u32;
