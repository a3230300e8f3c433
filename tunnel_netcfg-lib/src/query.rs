//! Read-only lookups of the host's default route.
//!
//! Queries are planned like mutations but their output is parsed into a typed
//! value. Parse failures and empty output are errors; a gateway is never
//! reported as "unknown" silently.

use std::net::IpAddr;

use crate::command::{PlannedStep, Step};
use crate::error::Error;

/// How to read the value out of a query's output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// The whole output, trimmed, is the value.
    Line,
    /// Whitespace separated `key value` pairs; the value follows `key`.
    Field(&'static str),
}

/// A planned query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub planned: PlannedStep,
    pub format: OutputFormat,
}

impl Query {
    pub fn new(planned: PlannedStep, format: OutputFormat) -> Self {
        Self { planned, format }
    }

    pub fn step(&self) -> Step {
        self.planned.step
    }
}

/// Extracts the raw value from `output`.
pub fn extract(output: &str, format: OutputFormat) -> Option<&str> {
    match format {
        OutputFormat::Line => Some(output.trim()).filter(|v| !v.is_empty()),
        OutputFormat::Field(key) => field_value(output, key),
    }
}

/// Finds the token following `key`.
///
/// A value that itself ends in `:` is another key, not a value. macOS prints
/// `gateway: index: 28` when the default route points at an interface rather
/// than an address.
fn field_value<'a>(output: &'a str, key: &str) -> Option<&'a str> {
    let parts: Vec<&str> = output.split_whitespace().collect();
    parts
        .iter()
        .position(|&part| part == key)
        .and_then(|idx| parts.get(idx + 1))
        .copied()
        .filter(|value| !value.ends_with(':'))
}

pub fn parse_gateway(output: &str, query: &Query) -> Result<IpAddr, Error> {
    let step = query.step();
    let value = extract(output, query.format).ok_or_else(|| {
        tracing::error!(%output, %step, "no gateway in query output");
        Error::EmptyOutput {
            step,
            output: output.to_string(),
        }
    })?;
    value.parse().map_err(|source| Error::InvalidAddress {
        step,
        output: output.to_string(),
        source,
    })
}

pub fn parse_interface(output: &str, query: &Query) -> Result<String, Error> {
    let step = query.step();
    extract(output, query.format).map(str::to_string).ok_or_else(|| {
        tracing::error!(%output, %step, "no interface in query output");
        Error::EmptyOutput {
            step,
            output: output.to_string(),
        }
    })
}
