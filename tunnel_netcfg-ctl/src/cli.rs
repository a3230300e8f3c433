use clap::{Parser, Subcommand};

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use tunnel_netcfg_lib::{PlatformKind, Request, RouteSpec, config, logging};

/// Tunnel network configuration - DNS and route changes for overlay interfaces
#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file
    #[arg(
        short,
        long,
        env = config::ENV_VAR,
        default_value = config::DEFAULT_PATH
    )]
    pub config_path: PathBuf,

    /// Maximum runtime of each external command, overrides the configuration file (e.g. "30s")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Append logs to this file instead of stderr
    #[arg(long, env = logging::ENV_VAR_LOG_FILE)]
    pub log_file: Option<PathBuf>,

    /// Print the commands that would run without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Plan for another platform (only together with --dry-run)
    #[arg(long, requires = "dry_run")]
    pub platform: Option<PlatformKind>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Point an interface at a DNS server
    SetDns {
        /// Interface alias
        interface: String,
        /// DNS server address
        address: IpAddr,
    },

    /// Flush the resolver cache
    FlushDns,

    /// Flush the resolver cache and restart the interface
    ResetDns {
        /// Interface alias
        interface: String,
    },

    /// Print the current default gateway
    DefaultGateway,

    /// Print the interface carrying default traffic
    DefaultInterface,

    /// Add a default route
    AddDefaultRoute {
        /// Next hop
        gateway: IpAddr,
    },

    /// Pin a host route through a gateway
    AddRoute {
        /// Host address
        destination: IpAddr,
        /// Next hop
        gateway: IpAddr,
    },

    /// Remove a pinned host route
    DeleteRoute {
        /// Host address
        destination: IpAddr,
        /// Next hop (required on Linux)
        gateway: Option<IpAddr>,
    },
}

impl From<Command> for Request {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::SetDns { interface, address } => Request::SetDns { interface, address },
            Command::FlushDns => Request::FlushDns,
            Command::ResetDns { interface } => Request::ResetDns { interface },
            Command::DefaultGateway => Request::QueryDefaultGateway,
            Command::DefaultInterface => Request::QueryDefaultInterface,
            Command::AddDefaultRoute { gateway } => Request::AddDefaultRoute { gateway },
            Command::AddRoute { destination, gateway } => {
                Request::AddFullTunnelRoute(RouteSpec::host(destination, gateway))
            }
            Command::DeleteRoute { destination, gateway } => Request::DeleteFullTunnelRoute(RouteSpec {
                destination: Some(destination),
                gateway,
            }),
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_set_dns() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["tunnel-netcfg", "set-dns", "eth0", "1.1.1.1"])?;
        let request: Request = cli.command.into();
        assert_eq!(
            request,
            Request::SetDns {
                interface: "eth0".into(),
                address: "1.1.1.1".parse()?,
            }
        );
        assert!(!cli.dry_run);
        Ok(())
    }

    #[test]
    fn delete_route_gateway_is_optional() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["tunnel-netcfg", "delete-route", "35.213.7.172"])?;
        let request: Request = cli.command.into();
        assert_eq!(
            request,
            Request::DeleteFullTunnelRoute(RouteSpec::destination_only("35.213.7.172".parse()?))
        );
        Ok(())
    }

    #[test]
    fn parses_timeout() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["tunnel-netcfg", "--timeout", "45s", "flush-dns"])?;
        assert_eq!(cli.timeout, Some(Duration::from_secs(45)));
        Ok(())
    }

    #[test]
    fn platform_requires_dry_run() -> anyhow::Result<()> {
        assert!(Cli::try_parse_from(["tunnel-netcfg", "--platform", "windows", "flush-dns"]).is_err());

        let cli = Cli::try_parse_from(["tunnel-netcfg", "--dry-run", "--platform", "windows", "flush-dns"])?;
        assert_eq!(cli.platform, Some(PlatformKind::Windows));
        Ok(())
    }

    #[test]
    fn rejects_invalid_address() {
        assert!(Cli::try_parse_from(["tunnel-netcfg", "add-route", "not-an-ip", "10.0.0.1"]).is_err());
    }
}
