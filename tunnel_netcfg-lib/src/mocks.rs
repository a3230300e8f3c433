//! Stateful mocks for the runner and tool lookup seams.
//!
//! [`MockRunner`] records every command it is asked to run and answers from
//! per-command tables keyed by the command line, so tests can assert on what
//! would have been executed and in which order.

#![cfg(test)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::command::PlatformCommand;
use crate::runner::{CommandOutput, CommandRunner};
use crate::tools::ToolLookup;

// ============================================================================
// MockRunner
// ============================================================================

#[derive(Debug, Default)]
pub struct RunnerState {
    /// Command lines in execution order.
    pub invocations: Vec<String>,
    /// Command line -> output of a successful run.
    pub outputs: HashMap<String, String>,
    /// Command line -> output of a run exiting with status 1.
    pub fail_on: HashMap<String, String>,
    /// Command lines that never finish.
    pub hang_on: HashSet<String>,
}

#[derive(Clone, Default)]
pub struct MockRunner {
    pub state: Arc<Mutex<RunnerState>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(self, command: &str, output: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .outputs
            .insert(command.into(), output.into());
        self
    }

    pub fn fail(self, command: &str, output: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_on
            .insert(command.into(), output.into());
        self
    }

    pub fn hang(self, command: &str) -> Self {
        self.state.lock().unwrap().hang_on.insert(command.into());
        self
    }

    pub fn invocations(&self) -> Vec<String> {
        self.state.lock().unwrap().invocations.clone()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &PlatformCommand) -> io::Result<CommandOutput> {
        let line = command.to_string();
        let hang = {
            let mut s = self.state.lock().unwrap();
            s.invocations.push(line.clone());
            s.hang_on.contains(&line)
        };
        if hang {
            std::future::pending::<()>().await;
        }

        let s = self.state.lock().unwrap();
        if let Some(output) = s.fail_on.get(&line) {
            return Ok(CommandOutput::failure(1, output.clone()));
        }
        Ok(CommandOutput::success(s.outputs.get(&line).cloned().unwrap_or_default()))
    }
}

// ============================================================================
// MockTools
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct MockTools {
    pub installed: HashSet<&'static str>,
}

impl MockTools {
    pub fn with<I: IntoIterator<Item = &'static str>>(tools: I) -> Self {
        Self {
            installed: tools.into_iter().collect(),
        }
    }
}

impl ToolLookup for MockTools {
    fn find(&self, tool: &str) -> Option<PathBuf> {
        self.installed
            .contains(tool)
            .then(|| PathBuf::from("/usr/bin").join(tool))
    }
}
