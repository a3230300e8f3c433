//! Platform strategies.
//!
//! One [`Platform`] implementation per supported OS turns requests into
//! [`Plan`]s by validating arguments, probing for tools where more than one
//! can do the job and calling the pure [`builder`](crate::builder) functions.
//! The strategy is chosen once, when the controller is created; an unknown OS
//! fails there, before any command can be built.
//!
//! All strategies are compiled on every host so a Linux machine can plan
//! (and test) Windows commands.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::command::Plan;
use crate::config::Config;
use crate::error::Error;
use crate::query::Query;
use crate::request::Operation;
use crate::route::RouteSpec;
use crate::tools::ToolLookup;

mod linux;
mod macos;
mod windows;

pub use linux::LinuxPlatform;
pub use macos::MacOsPlatform;
pub use windows::WindowsPlatform;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    Linux,
    MacOs,
    Windows,
}

impl PlatformKind {
    /// Maps a [`std::env::consts::OS`] value to a supported platform.
    pub fn from_os(os: &str) -> Result<Self, Error> {
        match os {
            "linux" => Ok(PlatformKind::Linux),
            "macos" => Ok(PlatformKind::MacOs),
            "windows" => Ok(PlatformKind::Windows),
            other => Err(Error::UnsupportedPlatform(other.to_string())),
        }
    }

    pub fn current() -> Result<Self, Error> {
        Self::from_os(std::env::consts::OS)
    }
}

impl FromStr for PlatformKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "darwin" => Ok(PlatformKind::MacOs),
            other => Self::from_os(other),
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlatformKind::Linux => "linux",
            PlatformKind::MacOs => "macos",
            PlatformKind::Windows => "windows",
        };
        f.write_str(name)
    }
}

/// Builds plans for one operating system.
///
/// Arguments are validated before any tool is probed. Interface aliases are
/// checked for emptiness by the controller before it calls in here.
pub trait Platform: Send + Sync {
    fn kind(&self) -> PlatformKind;

    fn set_dns(&self, tools: &dyn ToolLookup, interface: &str, dns: IpAddr) -> Result<Plan, Error>;

    fn flush_dns(&self, tools: &dyn ToolLookup) -> Result<Plan, Error>;

    /// Second half of a DNS reset: bring the adapter back to its own resolver
    /// configuration.
    fn restart_adapter(&self, interface: &str) -> Result<Plan, Error>;

    fn add_default_route(&self, gateway: IpAddr) -> Result<Plan, Error>;

    fn add_host_route(&self, route: &RouteSpec) -> Result<Plan, Error>;

    fn delete_host_route(&self, route: &RouteSpec) -> Result<Plan, Error>;

    fn default_gateway(&self) -> Result<Query, Error>;

    fn default_interface(&self) -> Result<Query, Error>;

    fn unsupported(&self, operation: Operation) -> Error {
        Error::UnsupportedOperation {
            operation,
            platform: self.kind(),
        }
    }
}

/// Creates the strategy for `kind`.
pub fn for_kind(kind: PlatformKind, config: &Config) -> Box<dyn Platform> {
    match kind {
        PlatformKind::Linux => Box::new(LinuxPlatform),
        PlatformKind::MacOs => Box::new(MacOsPlatform::new(config.macos.network_service.clone())),
        PlatformKind::Windows => Box::new(WindowsPlatform),
    }
}

/// Creates the strategy for the running OS.
pub fn detect(config: &Config) -> Result<Box<dyn Platform>, Error> {
    let kind = PlatformKind::current()?;
    tracing::debug!(platform = %kind, "detected platform");
    Ok(for_kind(kind, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("linux", PlatformKind::Linux)]
    #[case("macos", PlatformKind::MacOs)]
    #[case("windows", PlatformKind::Windows)]
    fn maps_supported_os(#[case] os: &str, #[case] kind: PlatformKind) -> anyhow::Result<()> {
        assert_eq!(PlatformKind::from_os(os)?, kind);
        Ok(())
    }

    #[rstest]
    #[case("freebsd")]
    #[case("android")]
    #[case("")]
    fn rejects_unknown_os(#[case] os: &str) {
        match PlatformKind::from_os(os) {
            Err(Error::UnsupportedPlatform(name)) => assert_eq!(name, os),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn parses_darwin_alias() -> anyhow::Result<()> {
        assert_eq!("Darwin".parse::<PlatformKind>()?, PlatformKind::MacOs);
        assert_eq!("WINDOWS".parse::<PlatformKind>()?, PlatformKind::Windows);
        Ok(())
    }

    #[test]
    fn for_kind_reports_kind() {
        let config = Config::default();
        for kind in [PlatformKind::Linux, PlatformKind::MacOs, PlatformKind::Windows] {
            assert_eq!(for_kind(kind, &config).kind(), kind);
        }
    }

    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
    #[test]
    fn detect_succeeds_on_supported_hosts() {
        assert!(detect(&Config::default()).is_ok());
    }
}
