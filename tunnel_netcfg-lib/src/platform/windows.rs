use std::net::{IpAddr, Ipv4Addr};

use crate::builder::windows;
use crate::command::{Plan, PlannedStep, Step};
use crate::error::Error;
use crate::query::{OutputFormat, Query};
use crate::request::Operation;
use crate::route::RouteSpec;
use crate::tools::ToolLookup;

use super::{Platform, PlatformKind};

/// PowerShell cmdlets and `route.exe`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowsPlatform;

impl WindowsPlatform {
    fn ipv4(&self, operation: Operation, addr: IpAddr) -> Result<Ipv4Addr, Error> {
        match addr {
            IpAddr::V4(v4) => Ok(v4),
            IpAddr::V6(_) => Err(Error::UnsupportedAddressFamily {
                operation,
                platform: self.kind(),
                family: "IPv6",
            }),
        }
    }
}

impl Platform for WindowsPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Windows
    }

    fn set_dns(&self, _tools: &dyn ToolLookup, interface: &str, dns: IpAddr) -> Result<Plan, Error> {
        Ok(Plan::single(Step::SetDns, windows::set_dns(interface, dns)))
    }

    fn flush_dns(&self, _tools: &dyn ToolLookup) -> Result<Plan, Error> {
        Ok(Plan::single(Step::FlushDns, windows::flush_dns()))
    }

    fn restart_adapter(&self, interface: &str) -> Result<Plan, Error> {
        Ok(Plan::single(Step::RestartAdapter, windows::restart_adapter(interface)))
    }

    fn add_default_route(&self, _gateway: IpAddr) -> Result<Plan, Error> {
        Err(self.unsupported(Operation::AddDefaultRoute))
    }

    fn add_host_route(&self, route: &RouteSpec) -> Result<Plan, Error> {
        let operation = Operation::AddFullTunnelRoute;
        let (destination, gateway) = route.require_both(operation)?;
        let destination = self.ipv4(operation, destination)?;
        let gateway = self.ipv4(operation, gateway)?;
        Ok(Plan::single(Step::AddHostRoute, windows::add_host_route(destination, gateway)))
    }

    fn delete_host_route(&self, route: &RouteSpec) -> Result<Plan, Error> {
        let operation = Operation::DeleteFullTunnelRoute;
        let destination = self.ipv4(operation, route.require_destination(operation)?)?;
        Ok(Plan::single(Step::DeleteHostRoute, windows::delete_host_route(destination)))
    }

    fn default_gateway(&self) -> Result<Query, Error> {
        Ok(Query::new(
            PlannedStep {
                step: Step::QueryDefaultGateway,
                command: windows::default_gateway(),
            },
            OutputFormat::Line,
        ))
    }

    fn default_interface(&self) -> Result<Query, Error> {
        Ok(Query::new(
            PlannedStep {
                step: Step::QueryDefaultInterface,
                command: windows::default_interface(),
            },
            OutputFormat::Line,
        ))
    }
}
