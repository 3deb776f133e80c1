use std::process::Command;

use tracing::debug;

use crate::error::CollaboratorError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CollaboratorError>;
}

// No timeout: a hung tool hangs the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CollaboratorError> {
        debug!(program, ?args, "invoking collaborator");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| CollaboratorError::Spawn {
                program: program.to_string(),
                source,
            })?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

pub fn require_success(
    program: &str,
    output: CommandOutput,
) -> Result<CommandOutput, CollaboratorError> {
    if output.success() {
        Ok(output)
    } else {
        Err(CollaboratorError::NonZeroExit {
            program: program.to_string(),
            code: output.code,
            stderr: output.stderr,
        })
    }
}
