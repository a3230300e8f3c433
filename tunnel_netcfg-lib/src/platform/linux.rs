use std::net::IpAddr;

use crate::builder::linux::{self, DnsManager, FlushTool};
use crate::command::{Plan, PlannedStep, Step};
use crate::error::Error;
use crate::query::{OutputFormat, Query};
use crate::request::Operation;
use crate::route::RouteSpec;
use crate::tools::{self, ToolLookup};

use super::{Platform, PlatformKind};

/// iproute2 for routes, systemd-resolved or NetworkManager for DNS.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinuxPlatform;

impl Platform for LinuxPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Linux
    }

    fn set_dns(&self, tools: &dyn ToolLookup, interface: &str, dns: IpAddr) -> Result<Plan, Error> {
        let manager = tools::probe(tools, Operation::SetDns, &DnsManager::CANDIDATES, DnsManager::program)?;
        let plan = Plan::single(Step::SetDns, linux::set_dns(manager, interface, dns));

        // NetworkManager only applies a modified profile once it is brought
        // up again, and it overwrites resolvectl's per-link setting whenever
        // it manages the link.
        let commit = match manager {
            DnsManager::Nmcli => true,
            DnsManager::Resolvectl => tools::installed(tools, DnsManager::Nmcli.program()),
        };
        if commit {
            Ok(plan.then(Step::CommitDns, linux::connection_up(interface)))
        } else {
            Ok(plan)
        }
    }

    fn flush_dns(&self, tools: &dyn ToolLookup) -> Result<Plan, Error> {
        let tool = tools::probe(tools, Operation::FlushDns, &FlushTool::CANDIDATES, FlushTool::program)?;
        Ok(Plan::single(Step::FlushDns, linux::flush_dns(tool)))
    }

    fn restart_adapter(&self, interface: &str) -> Result<Plan, Error> {
        Ok(Plan::single(Step::RestartAdapter, linux::link_down(interface))
            .then(Step::RestartAdapter, linux::link_up(interface)))
    }

    fn add_default_route(&self, _gateway: IpAddr) -> Result<Plan, Error> {
        Err(self.unsupported(Operation::AddDefaultRoute))
    }

    fn add_host_route(&self, route: &RouteSpec) -> Result<Plan, Error> {
        let (destination, gateway) = route.require_both(Operation::AddFullTunnelRoute)?;
        Ok(Plan::single(Step::AddHostRoute, linux::add_host_route(destination, gateway)))
    }

    fn delete_host_route(&self, route: &RouteSpec) -> Result<Plan, Error> {
        let (destination, gateway) = route.require_both(Operation::DeleteFullTunnelRoute)?;
        Ok(Plan::single(
            Step::DeleteHostRoute,
            linux::delete_host_route(destination, gateway),
        ))
    }

    fn default_gateway(&self) -> Result<Query, Error> {
        Err(self.unsupported(Operation::QueryDefaultGateway))
    }

    fn default_interface(&self) -> Result<Query, Error> {
        Ok(Query::new(
            PlannedStep {
                step: Step::QueryDefaultInterface,
                command: linux::route_get_probe(),
            },
            OutputFormat::Field("dev"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Precondition;
    use crate::mocks::MockTools;

    fn commands(plan: &Plan) -> Vec<String> {
        plan.commands().map(ToString::to_string).collect()
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn set_dns_prefers_resolvectl_without_networkmanager() -> anyhow::Result<()> {
        let plan = LinuxPlatform.set_dns(&MockTools::with(["resolvectl"]), "eth0", ip("1.1.1.1"))?;
        assert_eq!(commands(&plan), vec!["resolvectl dns eth0 1.1.1.1"]);
        Ok(())
    }

    #[test]
    fn set_dns_with_resolvectl_commits_when_networkmanager_present() -> anyhow::Result<()> {
        let plan = LinuxPlatform.set_dns(&MockTools::with(["resolvectl", "nmcli"]), "eth0", ip("1.1.1.1"))?;
        assert_eq!(
            commands(&plan),
            vec!["resolvectl dns eth0 1.1.1.1", "nmcli connection up eth0"]
        );
        assert_eq!(plan.steps()[1].step, Step::CommitDns);
        Ok(())
    }

    #[test]
    fn set_dns_falls_back_to_nmcli() -> anyhow::Result<()> {
        let plan = LinuxPlatform.set_dns(&MockTools::with(["nmcli"]), "eth0", ip("1.1.1.1"))?;
        assert_eq!(
            commands(&plan),
            vec![
                "nmcli connection modify eth0 ipv4.dns 1.1.1.1 ipv4.ignore-auto-dns yes",
                "nmcli connection up eth0"
            ]
        );
        Ok(())
    }

    #[test]
    fn set_dns_without_manager() {
        let err = LinuxPlatform
            .set_dns(&MockTools::with(["systemd-resolve"]), "eth0", ip("1.1.1.1"))
            .unwrap_err();
        assert!(matches!(err, Error::NoToolFound { operation: Operation::SetDns, ref checked } if checked == &["resolvectl", "nmcli"]));
    }

    #[test]
    fn flush_falls_back_to_systemd_resolve() -> anyhow::Result<()> {
        let plan = LinuxPlatform.flush_dns(&MockTools::with(["systemd-resolve"]))?;
        assert_eq!(commands(&plan), vec!["systemd-resolve --flush-caches"]);

        let err = LinuxPlatform.flush_dns(&MockTools::with(["nmcli"])).unwrap_err();
        assert!(matches!(err, Error::NoToolFound { operation: Operation::FlushDns, .. }));
        Ok(())
    }

    #[test]
    fn restart_adapter_toggles_link() -> anyhow::Result<()> {
        let plan = LinuxPlatform.restart_adapter("eth0")?;
        assert_eq!(commands(&plan), vec!["ip link set eth0 down", "ip link set eth0 up"]);
        Ok(())
    }

    #[test]
    fn unimplemented_paths_are_typed_errors() {
        assert!(matches!(
            LinuxPlatform.add_default_route(ip("10.0.0.1")),
            Err(Error::UnsupportedOperation {
                operation: Operation::AddDefaultRoute,
                platform: PlatformKind::Linux
            })
        ));
        assert!(matches!(
            LinuxPlatform.default_gateway(),
            Err(Error::UnsupportedOperation {
                operation: Operation::QueryDefaultGateway,
                platform: PlatformKind::Linux
            })
        ));
    }

    #[test]
    fn delete_requires_gateway() {
        let err = LinuxPlatform
            .delete_host_route(&RouteSpec::destination_only(ip("35.213.7.172")))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Precondition(Precondition::MissingGateway(Operation::DeleteFullTunnelRoute))
        ));
    }

    #[test]
    fn default_interface_reads_dev_field() -> anyhow::Result<()> {
        let query = LinuxPlatform.default_interface()?;
        assert_eq!(query.planned.command.to_string(), "ip route get 8.8.8.8");
        assert_eq!(query.format, OutputFormat::Field("dev"));
        Ok(())
    }
}
