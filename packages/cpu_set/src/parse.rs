use std::str::FromStr;

use crate::words::Words;
use crate::{CpuSet, Error, Item, ParseContext};

/// Parses a [CPU list][crate] into a new [`CpuSet`].
///
/// Empty or blank input is valid and returns an unallocated set. A range whose start is greater
/// than its end is ignored, but still leaves the result allocated so the caller can tell that
/// something was specified.
///
/// See [package-level documentation][crate] for details.
///
/// # Errors
///
/// Returns [`Error::MalformedToken`] if the input does not match the CPU list format,
/// [`Error::OutOfRange`] if any CPU ID is at or above [`CPU_ID_LIMIT`][crate::CPU_ID_LIMIT] and
/// [`Error::AllocationFailure`] if the set could not be allocated. No partially built set is
/// returned in any of these cases.
pub fn parse(cpu_list: &str) -> crate::Result<CpuSet> {
    build(cpu_list, None)
}

/// Parses a [CPU list][crate] like [`parse()`], logging problems with the given context attached.
///
/// Inverted ranges are logged as warnings and any returned error is also logged.
///
/// # Errors
///
/// Same as [`parse()`].
pub fn parse_with_context(cpu_list: &str, context: &ParseContext) -> crate::Result<CpuSet> {
    build(cpu_list, Some(context)).inspect_err(|e| context.report_failure(cpu_list, e))
}

/// Extends `existing` with the CPUs in a [CPU list][crate].
///
/// * If the list is empty, `existing` is reset to the unallocated state. An empty list means
///   "clear".
/// * Otherwise, if `existing` is unallocated, it becomes the parsed set.
/// * Otherwise, the parsed CPUs are added to `existing`.
///
/// # Example
///
/// ```
/// use cpu_set::CpuSet;
///
/// let mut affinity = CpuSet::new();
///
/// cpu_set::extend(&mut affinity, "0-1").unwrap();
/// cpu_set::extend(&mut affinity, "4").unwrap();
/// assert_eq!(affinity.to_string(), "0 1 4");
///
/// cpu_set::extend(&mut affinity, "").unwrap();
/// assert!(!affinity.is_allocated());
/// ```
///
/// # Errors
///
/// Returns the same errors as [`parse()`], in which case `existing` is unchanged. Also returns
/// [`Error::AllocationFailure`] if `existing` could not grow to hold the parsed CPUs, in which
/// case `existing` is also unchanged.
pub fn extend(existing: &mut CpuSet, cpu_list: &str) -> crate::Result<()> {
    let mut parsed = parse(cpu_list)?;
    absorb(existing, &mut parsed)
}

/// Extends `existing` with the CPUs in a [CPU list][crate] like [`extend()`], logging problems
/// with the given context attached.
///
/// # Errors
///
/// Same as [`extend()`].
pub fn extend_with_context(
    existing: &mut CpuSet,
    cpu_list: &str,
    context: &ParseContext,
) -> crate::Result<()> {
    let mut parsed = parse_with_context(cpu_list, context)?;
    absorb(existing, &mut parsed).inspect_err(|e| context.report_failure(cpu_list, e))
}

/// Combines a freshly parsed set with an existing one. `parsed` is left unallocated if it was
/// adopted, and untouched otherwise.
fn absorb(existing: &mut CpuSet, parsed: &mut CpuSet) -> crate::Result<()> {
    match (parsed.is_allocated(), existing.is_allocated()) {
        (false, _) => {
            existing.reset();
            Ok(())
        }
        (true, false) => {
            *existing = parsed.take();
            Ok(())
        }
        (true, true) => existing.add_all(parsed),
    }
}

impl FromStr for CpuSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Inclusive range of CPU IDs from a single token. A single ID is a range with equal bounds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct CpuRange {
    lower: Item,
    upper: Item,
}

fn build(cpu_list: &str, context: Option<&ParseContext>) -> crate::Result<CpuSet> {
    let mut set = CpuSet::new();

    for word in Words::new(cpu_list) {
        let word = word?;
        let CpuRange { lower, upper } = parse_token(&word)?;

        if lower > upper {
            if let Some(context) = context {
                context.warn_inverted_range(&word, lower, upper);
            }

            // Allocated but empty, to tell this apart from an empty list.
            set.grow_to(1)?;
            continue;
        }

        // Highest first, so the only growth happens on the first add.
        for cpu in (lower..=upper).rev() {
            set.add(cpu)?;
        }
    }

    Ok(set)
}

fn parse_token(token: &str) -> crate::Result<CpuRange> {
    if let Some((lower, upper)) = token.split_once('-') {
        Ok(CpuRange {
            lower: parse_id(lower, token, "range start")?,
            upper: parse_id(upper, token, "range end")?,
        })
    } else {
        let cpu = parse_id(token, token, "CPU ID")?;

        Ok(CpuRange {
            lower: cpu,
            upper: cpu,
        })
    }
}

fn parse_id(digits: &str, token: &str, what: &str) -> crate::Result<Item> {
    // `u32::from_str` also accepts a leading `+`, which is not part of the format.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::malformed(
            token,
            format!("{what} is not a non-negative decimal integer"),
        ));
    }

    digits.parse::<Item>().map_err(|inner| {
        Error::caused_by(
            token,
            format!("{what} could not be parsed as an integer"),
            inner,
        )
    })
}
