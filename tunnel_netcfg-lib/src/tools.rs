//! Discovery of external tools on the search path.

use std::path::PathBuf;

use crate::error::Error;
use crate::request::Operation;

/// Looks up executables. Production code uses [`SearchPath`]; tests inject a
/// fixed set of installed tools.
pub trait ToolLookup: Send + Sync {
    fn find(&self, tool: &str) -> Option<PathBuf>;
}

/// Resolves tools against `PATH`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchPath;

impl ToolLookup for SearchPath {
    fn find(&self, tool: &str) -> Option<PathBuf> {
        which::which(tool).ok()
    }
}

/// Returns the first candidate whose program is installed.
///
/// Nothing is remembered between calls: every operation probes again, so a
/// tool installed or removed while the process runs is picked up.
pub fn probe<T: Copy>(
    tools: &dyn ToolLookup,
    operation: Operation,
    candidates: &[T],
    program: impl Fn(T) -> &'static str,
) -> Result<T, Error> {
    for &candidate in candidates {
        let name = program(candidate);
        if let Some(path) = tools.find(name) {
            tracing::debug!(%operation, tool = name, path = %path.display(), "selected tool");
            return Ok(candidate);
        }
        tracing::debug!(%operation, tool = name, "tool not found");
    }
    Err(Error::NoToolFound {
        operation,
        checked: candidates.iter().map(|&c| program(c)).collect(),
    })
}

/// Whether `tool` is installed.
pub fn installed(tools: &dyn ToolLookup, tool: &str) -> bool {
    tools.find(tool).is_some()
}
