//! Executable command descriptions.
//!
//! A [`PlatformCommand`] is a program name plus a discrete argument list. It is
//! built fresh for every invocation and never passed through a shell, so
//! interface names and addresses cannot be reinterpreted as shell syntax.

use std::fmt;

use tokio::process::Command;

/// One concrete invocation of an external tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformCommand {
    program: String,
    args: Vec<String>,
}

impl PlatformCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Converts into a tokio command that is killed if its future is dropped
    /// (deadline expiry or cancellation).
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).kill_on_drop(true);
        cmd
    }
}

impl fmt::Display for PlatformCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Label of a single stage of an operation. Errors name the step that failed
/// so callers can tell the halves of a composite operation apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    SetDns,
    CommitDns,
    FlushDns,
    RestartAdapter,
    AddDefaultRoute,
    AddHostRoute,
    DeleteHostRoute,
    QueryDefaultGateway,
    QueryDefaultInterface,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::SetDns => "DNS set",
            Step::CommitDns => "DNS commit",
            Step::FlushDns => "DNS flush",
            Step::RestartAdapter => "network adapter restart",
            Step::AddDefaultRoute => "default route add",
            Step::AddHostRoute => "host route add",
            Step::DeleteHostRoute => "host route delete",
            Step::QueryDefaultGateway => "default gateway query",
            Step::QueryDefaultInterface => "default interface query",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedStep {
    pub step: Step,
    pub command: PlatformCommand,
}

/// Ordered commands making up one operation. Executed strictly in sequence,
/// aborting on the first failure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<PlannedStep>,
}

impl Plan {
    pub fn single(step: Step, command: PlatformCommand) -> Self {
        Self::default().then(step, command)
    }

    pub fn then(mut self, step: Step, command: PlatformCommand) -> Self {
        self.steps.push(PlannedStep { step, command });
        self
    }

    pub fn chain(mut self, other: Plan) -> Self {
        self.steps.extend(other.steps);
        self
    }

    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }

    pub fn commands(&self) -> impl Iterator<Item = &PlatformCommand> {
        self.steps.iter().map(|s| &s.command)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl IntoIterator for Plan {
    type Item = PlannedStep;
    type IntoIter = std::vec::IntoIter<PlannedStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}
