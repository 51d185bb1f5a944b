use std::io;

use tracing::debug;

use crate::mask::bytes_for;
use crate::pal::{Bindings, BindingsFacade};
use crate::{CPU_ID_LIMIT, CpuSet, Error, Item};

// The kernel rejects masks smaller than its own CPU count, so we start with a generous guess and
// double until the mask fits.
const INITIAL_CPU_COUNT: Item = 1024;
const MAX_CPU_COUNT: Item = 65536;

/// Returns the processors the current thread is allowed to run on, together with the CPU count
/// the operating system mask had to be sized for.
///
/// The returned set has capacity for at least `min(cpu_count, CPU_ID_LIMIT)` CPUs.
///
/// # Errors
///
/// Returns [`Error::OsQueryFailure`] if the operating system could not report the affinity, for
/// example because the platform does not support the query. Returns [`Error::OutOfRange`] if the
/// thread may run on a CPU at or above [`CPU_ID_LIMIT`].
///
/// # Example
///
/// ```
/// match cpu_set::current_thread_affinity() {
///     Ok((set, cpu_count)) => println!("May run on {set} (mask sized for {cpu_count} CPUs)"),
///     Err(e) => println!("Affinity is not available: {e}"),
/// }
/// ```
#[cfg_attr(test, mutants::skip)] // Trivial forwarder, the logic is tested with mock bindings.
pub fn current_thread_affinity() -> crate::Result<(CpuSet, Item)> {
    query_affinity(&BindingsFacade::target())
}

fn query_affinity(bindings: &impl Bindings) -> crate::Result<(CpuSet, Item)> {
    let mut cpu_count = INITIAL_CPU_COUNT;

    loop {
        let mut mask = vec![0_u8; bytes_for(cpu_count)];

        match bindings.sched_getaffinity_current(&mut mask) {
            Ok(()) => {
                let mut set = CpuSet::from_bytes(&mask)?;
                set.grow_to(cpu_count.min(CPU_ID_LIMIT))?;

                return Ok((set, cpu_count));
            }
            Err(error) if error.kind() == io::ErrorKind::InvalidInput => {
                cpu_count = cpu_count
                    .checked_mul(2)
                    .filter(|next| *next <= MAX_CPU_COUNT)
                    .ok_or(Error::OsQueryFailure(error))?;

                debug!(cpu_count, "affinity mask did not fit, retrying with a larger mask");
            }
            Err(error) => return Err(Error::OsQueryFailure(error)),
        }
    }
}
