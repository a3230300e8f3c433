use thiserror::Error;

use std::io;
use std::net::{AddrParseError, IpAddr};
use std::time::Duration;

use crate::command::Step;
use crate::platform::PlatformKind;
use crate::request::Operation;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported OS: {0}")]
    UnsupportedPlatform(String),
    #[error("{operation} is not supported on {platform}")]
    UnsupportedOperation { operation: Operation, platform: PlatformKind },
    #[error("{operation} on {platform} does not support {family} addresses")]
    UnsupportedAddressFamily {
        operation: Operation,
        platform: PlatformKind,
        family: &'static str,
    },
    #[error("No supported tool found for {operation} (checked: {})", .checked.join(", "))]
    NoToolFound {
        operation: Operation,
        checked: Vec<&'static str>,
    },
    #[error("Invalid argument: {0}")]
    Precondition(#[from] Precondition),
    #[error("{step} failed: unable to run `{command}`: {source}")]
    Spawn {
        step: Step,
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{step} failed: `{command}` exited with {}\nOutput: {output}", describe_status(.status))]
    CommandFailed {
        step: Step,
        command: String,
        status: Option<i32>,
        output: String,
    },
    #[error("{step} timed out after {}: `{command}`", describe_duration(.after))]
    Timeout { step: Step, command: String, after: Duration },
    #[error("{step} cancelled: `{command}`")]
    Cancelled { step: Step, command: String },
    #[error("{failed} failed after {completed} succeeded: {source}")]
    PartialFailure {
        completed: Step,
        failed: Step,
        #[source]
        source: Box<Error>,
    },
    #[error("{step} returned no usable output")]
    EmptyOutput { step: Step, output: String },
    #[error("{step} returned an unparseable address {output:?}: {source}")]
    InvalidAddress {
        step: Step,
        output: String,
        #[source]
        source: AddrParseError,
    },
}

/// Argument problems detected before any command is built.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Precondition {
    #[error("interface alias must not be empty")]
    EmptyInterfaceAlias,
    #[error("{0} requires a destination address")]
    MissingDestination(Operation),
    #[error("{0} requires a gateway address")]
    MissingGateway(Operation),
    #[error("destination {destination} and gateway {gateway} belong to different address families")]
    AddressFamilyMismatch { destination: IpAddr, gateway: IpAddr },
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn describe_duration(after: &Duration) -> String {
    humantime::format_duration(*after).to_string()
}

impl Error {
    /// The step whose command failed, if the error came from running one.
    pub fn step(&self) -> Option<Step> {
        match self {
            Error::Spawn { step, .. }
            | Error::CommandFailed { step, .. }
            | Error::Timeout { step, .. }
            | Error::Cancelled { step, .. }
            | Error::EmptyOutput { step, .. }
            | Error::InvalidAddress { step, .. } => Some(*step),
            Error::PartialFailure { failed, .. } => Some(*failed),
            _ => None,
        }
    }

    /// Captured combined output of the failing command.
    pub fn output(&self) -> Option<&str> {
        match self {
            Error::CommandFailed { output, .. }
            | Error::EmptyOutput { output, .. }
            | Error::InvalidAddress { output, .. } => Some(output),
            Error::PartialFailure { source, .. } => source.output(),
            _ => None,
        }
    }

    /// True when nothing was attempted because the platform or operation has
    /// no implementation.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedPlatform(_) | Error::UnsupportedOperation { .. } | Error::UnsupportedAddressFamily { .. }
        )
    }

    /// True when an earlier step of a composite operation already changed the
    /// host.
    pub fn is_partial(&self) -> bool {
        matches!(self, Error::PartialFailure { .. })
    }
}
