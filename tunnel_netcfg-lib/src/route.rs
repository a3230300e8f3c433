use std::fmt;
use std::net::IpAddr;

use crate::error::Precondition;
use crate::request::Operation;

/// Destination and next hop of a host route.
///
/// Both addresses are optional at construction because callers usually derive
/// them from the overlay device, which may not know a gateway yet. The
/// platform strategies decide which of them an operation requires and reject
/// missing ones before any command is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteSpec {
    pub destination: Option<IpAddr>,
    pub gateway: Option<IpAddr>,
}

impl RouteSpec {
    pub fn host(destination: IpAddr, gateway: IpAddr) -> Self {
        Self {
            destination: Some(destination),
            gateway: Some(gateway),
        }
    }

    pub fn destination_only(destination: IpAddr) -> Self {
        Self {
            destination: Some(destination),
            gateway: None,
        }
    }

    pub fn require_destination(&self, operation: Operation) -> Result<IpAddr, Precondition> {
        self.destination.ok_or(Precondition::MissingDestination(operation))
    }

    pub fn require_gateway(&self, operation: Operation) -> Result<IpAddr, Precondition> {
        self.gateway.ok_or(Precondition::MissingGateway(operation))
    }

    /// Requires both addresses and that they belong to the same family.
    pub fn require_both(&self, operation: Operation) -> Result<(IpAddr, IpAddr), Precondition> {
        let destination = self.require_destination(operation)?;
        let gateway = self.require_gateway(operation)?;
        if destination.is_ipv4() != gateway.is_ipv4() {
            return Err(Precondition::AddressFamilyMismatch { destination, gateway });
        }
        Ok((destination, gateway))
    }
}

impl fmt::Display for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.destination, self.gateway) {
            (Some(dest), Some(gw)) => write!(f, "{dest} via {gw}"),
            (Some(dest), None) => write!(f, "{dest}"),
            (None, Some(gw)) => write!(f, "<none> via {gw}"),
            (None, None) => f.write_str("<none>"),
        }
    }
}

/// Result of a route addition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    Added,
    /// The OS reported that an identical route is already installed.
    AlreadyPresent,
}

const ROUTE_EXISTS_MARKERS: [&str; 2] = ["file exists", "object already exists"];

/// Whether the output of a failed route addition means the route was
/// already there (`RTNETLINK answers: File exists`, BSD `route: writing to
/// routing socket: File exists`, Windows `The object already exists`).
pub(crate) fn reports_existing_route(output: &str) -> bool {
    let output = output.to_lowercase();
    ROUTE_EXISTS_MARKERS.iter().any(|marker| output.contains(marker))
}
