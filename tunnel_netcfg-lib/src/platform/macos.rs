use std::net::IpAddr;

use crate::builder::macos;
use crate::command::{Plan, PlannedStep, Step};
use crate::error::Error;
use crate::query::{OutputFormat, Query};
use crate::request::Operation;
use crate::route::RouteSpec;
use crate::tools::ToolLookup;

use super::{Platform, PlatformKind};

/// BSD `route`, `networksetup` and the directory service cache tools.
///
/// DNS settings apply to a network service (for example `Wi-Fi`), not to the
/// interface alias callers pass in.
#[derive(Clone, Debug)]
pub struct MacOsPlatform {
    network_service: String,
}

impl MacOsPlatform {
    pub fn new(network_service: String) -> Self {
        Self { network_service }
    }
}

impl Platform for MacOsPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::MacOs
    }

    fn set_dns(&self, _tools: &dyn ToolLookup, _interface: &str, dns: IpAddr) -> Result<Plan, Error> {
        Ok(Plan::single(Step::SetDns, macos::set_dns(&self.network_service, dns)))
    }

    fn flush_dns(&self, _tools: &dyn ToolLookup) -> Result<Plan, Error> {
        Ok(Plan::single(Step::FlushDns, macos::flush_directory_cache())
            .then(Step::FlushDns, macos::reload_mdns_responder()))
    }

    fn restart_adapter(&self, _interface: &str) -> Result<Plan, Error> {
        Ok(Plan::single(Step::RestartAdapter, macos::clear_dns(&self.network_service)))
    }

    fn add_default_route(&self, gateway: IpAddr) -> Result<Plan, Error> {
        Ok(Plan::single(Step::AddDefaultRoute, macos::add_default_route(gateway)))
    }

    fn add_host_route(&self, route: &RouteSpec) -> Result<Plan, Error> {
        let (destination, gateway) = route.require_both(Operation::AddFullTunnelRoute)?;
        Ok(Plan::single(Step::AddHostRoute, macos::add_host_route(destination, gateway)))
    }

    fn delete_host_route(&self, route: &RouteSpec) -> Result<Plan, Error> {
        let destination = route.require_destination(Operation::DeleteFullTunnelRoute)?;
        Ok(Plan::single(Step::DeleteHostRoute, macos::delete_host_route(destination)))
    }

    fn default_gateway(&self) -> Result<Query, Error> {
        Ok(Query::new(
            PlannedStep {
                step: Step::QueryDefaultGateway,
                command: macos::route_get_default(),
            },
            OutputFormat::Field("gateway:"),
        ))
    }

    fn default_interface(&self) -> Result<Query, Error> {
        Ok(Query::new(
            PlannedStep {
                step: Step::QueryDefaultInterface,
                command: macos::route_get_default(),
            },
            OutputFormat::Field("interface:"),
        ))
    }
}
