//! Helpers for redirecting traffic into an overlay interface and undoing it.
//!
//! [`HostRoutes`] keeps essential endpoints reachable outside the tunnel by
//! pinning host routes to the physical gateway. It tracks which routes it
//! actually installed so that a failure partway through, or a later
//! teardown, removes exactly those and leaves pre-existing routes alone.

use std::net::IpAddr;

use crate::controller::NetworkController;
use crate::error::Error;
use crate::route::{RouteOutcome, RouteSpec};
use crate::runner::CommandRunner;
use crate::tools::ToolLookup;

/// The overlay (tunnel) interface.
pub trait Device {
    /// OS interface alias, as passed to the DNS operations.
    fn name(&self) -> &str;
}

/// A DNS server applied to an overlay device.
pub struct DnsOverride {
    interface: String,
    server: IpAddr,
}

impl DnsOverride {
    pub async fn apply<R, T>(
        controller: &NetworkController<R, T>,
        device: &impl Device,
        server: IpAddr,
    ) -> Result<Self, Error>
    where
        R: CommandRunner,
        T: ToolLookup,
    {
        let interface = device.name().to_string();
        controller.set_dns(&interface, server).await?;
        tracing::info!(%interface, %server, "DNS override applied");
        Ok(Self { interface, server })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn server(&self) -> IpAddr {
        self.server
    }

    /// Flushes the cache and restarts the adapter so it returns to its own
    /// resolvers.
    pub async fn revert<R, T>(self, controller: &NetworkController<R, T>) -> Result<(), Error>
    where
        R: CommandRunner,
        T: ToolLookup,
    {
        controller.reset_dns(&self.interface).await?;
        tracing::info!(interface = %self.interface, "DNS override reverted");
        Ok(())
    }
}

/// Full tunnel host routes for a set of endpoints through one gateway.
pub struct HostRoutes {
    gateway: IpAddr,
    endpoints: Vec<IpAddr>,
    /// Endpoints whose route was installed by us (for rollback)
    added: Vec<IpAddr>,
}

impl HostRoutes {
    pub fn new(gateway: IpAddr, endpoints: Vec<IpAddr>) -> Self {
        Self {
            gateway,
            endpoints,
            added: Vec::new(),
        }
    }

    pub fn added(&self) -> &[IpAddr] {
        &self.added
    }

    /// Adds a route for every endpoint.
    ///
    /// On error, automatically rolls back the routes added so far.
    pub async fn setup<R, T>(&mut self, controller: &NetworkController<R, T>) -> Result<(), Error>
    where
        R: CommandRunner,
        T: ToolLookup,
    {
        for endpoint in self.endpoints.clone() {
            let route = RouteSpec::host(endpoint, self.gateway);
            match controller.add_full_tunnel_route(&route).await {
                Ok(RouteOutcome::Added) => self.added.push(endpoint),
                Ok(RouteOutcome::AlreadyPresent) => {
                    tracing::debug!(%endpoint, "route already present, not taking ownership");
                }
                Err(e) => {
                    self.rollback(controller).await;
                    return Err(e);
                }
            }
        }
        tracing::debug!(count = self.added.len(), "full tunnel host routes added");
        Ok(())
    }

    /// Removes the routes we added in reverse order, warning on failures but
    /// continuing.
    pub async fn rollback<R, T>(&mut self, controller: &NetworkController<R, T>)
    where
        R: CommandRunner,
        T: ToolLookup,
    {
        for endpoint in self.added.drain(..).rev().collect::<Vec<_>>() {
            let route = RouteSpec::host(endpoint, self.gateway);
            if let Err(e) = controller.delete_full_tunnel_route(&route).await {
                tracing::warn!(%e, %endpoint, "failed to roll back host route, continuing anyway");
            }
        }
        tracing::debug!("full tunnel host routes rolled back");
    }

    /// Removes the routes we added, warning on failures but continuing.
    pub async fn teardown<R, T>(&mut self, controller: &NetworkController<R, T>)
    where
        R: CommandRunner,
        T: ToolLookup,
    {
        for endpoint in self.added.drain(..).collect::<Vec<_>>() {
            let route = RouteSpec::host(endpoint, self.gateway);
            if let Err(e) = controller.delete_full_tunnel_route(&route).await {
                tracing::warn!(%e, %endpoint, "failed to delete host route, continuing anyway");
            }
        }
    }
}
