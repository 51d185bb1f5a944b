use std::fmt::{self, Display};

use itertools::Itertools;

use crate::CpuSet;

/// Emits the CPU IDs in a set as a [CPU list][crate] in canonical form: ascending decimal IDs
/// separated by single spaces.
///
/// An empty set is emitted as an empty string. The [`Display`] implementation of [`CpuSet`]
/// produces the same text.
///
/// # Example
///
/// ```
/// let set = cpu_set::parse("6,0 4-5").unwrap();
///
/// assert_eq!(cpu_set::emit(&set), "0 4 5 6");
/// ```
#[must_use]
pub fn emit(set: &CpuSet) -> String {
    set.iter().join(" ")
}

/// Emits the CPU IDs in a set as a compact [CPU list][crate], where runs of consecutive IDs are
/// collapsed into `lower-upper` ranges.
///
/// The output can be parsed back into the same set.
///
/// # Example
///
/// ```
/// let set = cpu_set::parse("0 1 2 3 8 10 11").unwrap();
///
/// assert_eq!(cpu_set::emit_ranges(&set), "0-3 8 10-11");
/// ```
#[must_use]
pub fn emit_ranges(set: &CpuSet) -> String {
    set.iter()
        .map(|cpu| (cpu, cpu))
        .coalesce(|(lower, upper), (next_lower, next_upper)| {
            if upper.checked_add(1) == Some(next_lower) {
                Ok((lower, next_upper))
            } else {
                Err(((lower, upper), (next_lower, next_upper)))
            }
        })
        .map(|(lower, upper)| {
            if lower == upper {
                lower.to_string()
            } else {
                format!("{lower}-{upper}")
            }
        })
        .join(" ")
}

impl Display for CpuSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iter().format(" "))
    }
}
