//! Pure construction of platform commands.
//!
//! Nothing in here touches the filesystem, the network or the process table:
//! every function maps its arguments to a [`PlatformCommand`](crate::command::PlatformCommand)
//! deterministically. Choosing between tools, validating arguments and
//! running the result is left to [`platform`](crate::platform) and
//! [`controller`](crate::controller).

pub mod linux;
pub mod macos;
pub mod windows;
