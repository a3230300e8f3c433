//! The platform dispatcher.
//!
//! [`NetworkController`] exposes the public operations. Each call plans the
//! whole operation first (validation, tool discovery, command construction),
//! then runs the planned commands one after another and stops at the first
//! failure. Nothing is retried and nothing is remembered between calls.
//!
//! The controller does not serialise callers. Two concurrent mutations of the
//! same interface race inside the OS tools; callers that share an interface
//! must order their calls themselves.

use tokio_util::sync::CancellationToken;

use std::net::IpAddr;
use std::time::Duration;

use crate::command::{Plan, PlannedStep, Step};
use crate::config::Config;
use crate::error::{Error, Precondition};
use crate::platform::{self, Platform, PlatformKind};
use crate::query::{self, Query};
use crate::request::Request;
use crate::route::{self, RouteOutcome, RouteSpec};
use crate::runner::{CommandRunner, ProcessRunner};
use crate::tools::{SearchPath, ToolLookup};

pub struct NetworkController<R = ProcessRunner, T = SearchPath> {
    platform: Box<dyn Platform>,
    runner: R,
    tools: T,
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl NetworkController {
    /// Controller for the running OS using real processes and `PATH` lookup.
    pub fn detect(config: &Config) -> Result<Self, Error> {
        let platform = platform::detect(config)?;
        Ok(Self::new(platform, ProcessRunner, SearchPath).with_timeout(config.timeout))
    }
}

impl<R: CommandRunner, T: ToolLookup> NetworkController<R, T> {
    pub fn new(platform: Box<dyn Platform>, runner: R, tools: T) -> Self {
        Self {
            platform,
            runner,
            tools,
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Bounds every subprocess; an expired deadline kills the child.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Aborts the running subprocess, and any remaining steps, once `token`
    /// is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn platform(&self) -> PlatformKind {
        self.platform.kind()
    }

    /// Builds the commands `request` would run without running them.
    pub fn plan(&self, request: &Request) -> Result<Plan, Error> {
        if let Some(interface) = request.interface() {
            validate_interface(interface)?;
        }
        let tools: &dyn ToolLookup = &self.tools;
        let plan = match request {
            Request::SetDns { interface, address } => self.platform.set_dns(tools, interface, *address)?,
            Request::FlushDns => self.platform.flush_dns(tools)?,
            Request::ResetDns { interface } => {
                let flush = self.platform.flush_dns(tools)?;
                flush.chain(self.platform.restart_adapter(interface)?)
            }
            Request::AddDefaultRoute { gateway } => self.platform.add_default_route(*gateway)?,
            Request::AddFullTunnelRoute(route) => self.platform.add_host_route(route)?,
            Request::DeleteFullTunnelRoute(route) => self.platform.delete_host_route(route)?,
            Request::QueryDefaultGateway => query_plan(self.platform.default_gateway()?),
            Request::QueryDefaultInterface => query_plan(self.platform.default_interface()?),
        };
        tracing::debug!(%request, steps = plan.steps().len(), "planned");
        Ok(plan)
    }

    pub async fn set_dns(&self, interface: &str, address: IpAddr) -> Result<(), Error> {
        self.apply(&Request::SetDns {
            interface: interface.to_string(),
            address,
        })
        .await
    }

    pub async fn flush_dns(&self) -> Result<(), Error> {
        self.apply(&Request::FlushDns).await
    }

    /// Flushes the resolver cache, then restarts the adapter. A failure of
    /// the restart after a successful flush is reported as
    /// [`Error::PartialFailure`] naming [`Step::RestartAdapter`].
    pub async fn reset_dns(&self, interface: &str) -> Result<(), Error> {
        self.apply(&Request::ResetDns {
            interface: interface.to_string(),
        })
        .await
    }

    pub async fn add_default_route(&self, gateway: IpAddr) -> Result<RouteOutcome, Error> {
        self.apply_route(&Request::AddDefaultRoute { gateway }).await
    }

    pub async fn add_full_tunnel_route(&self, route: &RouteSpec) -> Result<RouteOutcome, Error> {
        self.apply_route(&Request::AddFullTunnelRoute(*route)).await
    }

    pub async fn delete_full_tunnel_route(&self, route: &RouteSpec) -> Result<(), Error> {
        self.apply(&Request::DeleteFullTunnelRoute(*route)).await
    }

    pub async fn default_gateway(&self) -> Result<IpAddr, Error> {
        let query = self.platform.default_gateway()?;
        let output = self.execute(&query.planned).await?;
        let gateway = query::parse_gateway(&output, &query)?;
        tracing::debug!(%gateway, "default gateway");
        Ok(gateway)
    }

    pub async fn default_interface(&self) -> Result<String, Error> {
        let query = self.platform.default_interface()?;
        let output = self.execute(&query.planned).await?;
        let interface = query::parse_interface(&output, &query)?;
        tracing::debug!(%interface, "default interface");
        Ok(interface)
    }

    async fn apply(&self, request: &Request) -> Result<(), Error> {
        let plan = self.plan(request)?;
        self.run_plan(plan).await?;
        tracing::info!(%request, "applied");
        Ok(())
    }

    async fn apply_route(&self, request: &Request) -> Result<RouteOutcome, Error> {
        match self.apply(request).await {
            Ok(()) => Ok(RouteOutcome::Added),
            Err(Error::CommandFailed { ref output, .. }) if route::reports_existing_route(output) => {
                tracing::warn!(%request, %output, "route already present");
                Ok(RouteOutcome::AlreadyPresent)
            }
            Err(e) => Err(e),
        }
    }

    /// Runs the steps in order and stops at the first failure.
    ///
    /// A failure is partial when any earlier step with a different label
    /// completed, even if commands of the failing step ran before it.
    async fn run_plan(&self, plan: Plan) -> Result<(), Error> {
        let mut completed: Vec<Step> = Vec::new();
        for planned in plan {
            if let Err(e) = self.execute(&planned).await {
                let done = completed.iter().rev().find(|done| **done != planned.step);
                return Err(match done {
                    Some(done) => Error::PartialFailure {
                        completed: *done,
                        failed: planned.step,
                        source: Box::new(e),
                    },
                    None => e,
                });
            }
            completed.push(planned.step);
        }
        Ok(())
    }

    /// Runs one command under the controller's deadline and cancellation
    /// token and returns its combined output.
    async fn execute(&self, planned: &PlannedStep) -> Result<String, Error> {
        let PlannedStep { step, command } = planned;
        let step = *step;
        tracing::debug!(%step, cmd = %command, "executing command");

        let run = self.runner.run(command);
        let bounded = async {
            match self.timeout {
                Some(after) => tokio::time::timeout(after, run).await.ok(),
                None => Some(run.await),
            }
        };

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::warn!(%step, cmd = %command, "command cancelled");
                return Err(Error::Cancelled { step, command: command.to_string() });
            }
            res = bounded => res,
        };

        let output = match result {
            None => {
                let after = self.timeout.unwrap_or_default();
                tracing::error!(%step, cmd = %command, ?after, "command timed out");
                return Err(Error::Timeout {
                    step,
                    command: command.to_string(),
                    after,
                });
            }
            Some(Err(source)) => {
                tracing::error!(%step, cmd = %command, error = %source, "unable to run command");
                return Err(Error::Spawn {
                    step,
                    command: command.to_string(),
                    source,
                });
            }
            Some(Ok(output)) => output,
        };

        if output.success {
            return Ok(output.output);
        }
        tracing::error!(%step, cmd = %command, status_code = ?output.status, output = %output.output, "Error executing command");
        Err(Error::CommandFailed {
            step,
            command: command.to_string(),
            status: output.status,
            output: output.output,
        })
    }
}

fn validate_interface(interface: &str) -> Result<(), Precondition> {
    if interface.trim().is_empty() {
        return Err(Precondition::EmptyInterfaceAlias);
    }
    Ok(())
}

fn query_plan(query: Query) -> Plan {
    Plan::single(query.planned.step, query.planned.command)
}
