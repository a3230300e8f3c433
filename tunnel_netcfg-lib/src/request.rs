use std::fmt;
use std::net::IpAddr;

use crate::route::RouteSpec;

/// What a caller wants done, independent of platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    SetDns,
    FlushDns,
    ResetDns,
    AddDefaultRoute,
    AddFullTunnelRoute,
    DeleteFullTunnelRoute,
    QueryDefaultGateway,
    QueryDefaultInterface,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::SetDns => "set DNS",
            Operation::FlushDns => "flush DNS",
            Operation::ResetDns => "reset DNS",
            Operation::AddDefaultRoute => "add default route",
            Operation::AddFullTunnelRoute => "add full tunnel route",
            Operation::DeleteFullTunnelRoute => "delete full tunnel route",
            Operation::QueryDefaultGateway => "query default gateway",
            Operation::QueryDefaultInterface => "query default interface",
        };
        f.write_str(name)
    }
}

/// An [`Operation`] together with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    SetDns { interface: String, address: IpAddr },
    FlushDns,
    ResetDns { interface: String },
    AddDefaultRoute { gateway: IpAddr },
    AddFullTunnelRoute(RouteSpec),
    DeleteFullTunnelRoute(RouteSpec),
    QueryDefaultGateway,
    QueryDefaultInterface,
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::SetDns { .. } => Operation::SetDns,
            Request::FlushDns => Operation::FlushDns,
            Request::ResetDns { .. } => Operation::ResetDns,
            Request::AddDefaultRoute { .. } => Operation::AddDefaultRoute,
            Request::AddFullTunnelRoute(_) => Operation::AddFullTunnelRoute,
            Request::DeleteFullTunnelRoute(_) => Operation::DeleteFullTunnelRoute,
            Request::QueryDefaultGateway => Operation::QueryDefaultGateway,
            Request::QueryDefaultInterface => Operation::QueryDefaultInterface,
        }
    }

    /// Interface alias argument, for requests that take one.
    pub fn interface(&self) -> Option<&str> {
        match self {
            Request::SetDns { interface, .. } | Request::ResetDns { interface } => Some(interface),
            _ => None,
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::SetDns { interface, address } => write!(f, "set DNS {address} on {interface}"),
            Request::ResetDns { interface } => write!(f, "reset DNS on {interface}"),
            Request::AddDefaultRoute { gateway } => write!(f, "add default route via {gateway}"),
            Request::AddFullTunnelRoute(route) => write!(f, "add full tunnel route {route}"),
            Request::DeleteFullTunnelRoute(route) => write!(f, "delete full tunnel route {route}"),
            other => write!(f, "{}", other.operation()),
        }
    }
}
