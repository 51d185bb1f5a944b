//! Platform Abstraction Layer (PAL). All calls into the operating system go through here so they
//! can be replaced with mocks in tests.

mod bindings;
pub(crate) use bindings::*;

mod facade;
pub(crate) use facade::*;

#[cfg(all(target_os = "linux", not(miri)))]
mod linux;
#[cfg(all(target_os = "linux", not(miri)))]
pub(crate) use linux::*;

#[cfg(any(miri, not(target_os = "linux")))]
mod fallback;
#[cfg(any(miri, not(target_os = "linux")))]
pub(crate) use fallback::*;
