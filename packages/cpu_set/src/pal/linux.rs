use std::io;

use crate::pal::Bindings;

/// FFI bindings that target the real operating system that the build is targeting.
///
/// You would only use different bindings in unit tests that need to use mock bindings.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetBindings;

// Error paths require OS-level failures that are impractical to trigger in tests.
#[cfg_attr(coverage_nightly, coverage(off))]
impl Bindings for BuildTargetBindings {
    #[allow(
        clippy::cast_ptr_alignment,
        reason = "the kernel copies the mask byte by byte and has no alignment requirement"
    )]
    fn sched_getaffinity_current(&self, mask: &mut [u8]) -> Result<(), io::Error> {
        // 0 means current thread.
        // SAFETY: The kernel writes at most `mask.len()` bytes into `mask`. The cast pointer is
        // only handed to the kernel and is never dereferenced as a `cpu_set_t` on the Rust side,
        // so the byte buffer's alignment does not matter.
        let result = unsafe {
            libc::sched_getaffinity(
                0,
                mask.len(),
                mask.as_mut_ptr().cast::<libc::cpu_set_t>(),
            )
        };

        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}
