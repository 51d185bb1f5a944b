use std::fmt::Debug;
use std::io;

/// Bindings for FFI calls into the operating system.
///
/// All PAL FFI calls must go through this trait, enabling them to be mocked.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Bindings: Debug + Send + Sync + 'static {
    // sched_getaffinity() for the current thread, writing one bit per CPU into `mask`.
    //
    // Fails with `InvalidInput` if the mask of the kernel does not fit into `mask`.
    fn sched_getaffinity_current(&self, mask: &mut [u8]) -> Result<(), io::Error>;
}
