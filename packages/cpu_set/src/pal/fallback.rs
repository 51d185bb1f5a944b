use std::io;

use crate::pal::Bindings;

/// Bindings for platforms without a way to query thread affinity. Every query reports
/// [`io::ErrorKind::Unsupported`].
#[derive(Debug, Default)]
pub(crate) struct BuildTargetBindings;

#[cfg_attr(coverage_nightly, coverage(off))]
impl Bindings for BuildTargetBindings {
    fn sched_getaffinity_current(&self, _mask: &mut [u8]) -> Result<(), io::Error> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }
}
