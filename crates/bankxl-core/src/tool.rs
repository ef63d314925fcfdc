//! Blocking execution of external command-line tools.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tracing::{debug, error};

use crate::error::ToolError;

/// Runs one external program and checks how it exited.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    program: String,
    /// Exit codes other than 0 that still mean success.
    accepted_codes: Vec<i32>,
}

impl ToolRunner {
    /// Create a runner for `program`.
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_string_lossy().into_owned(),
            accepted_codes: Vec::new(),
        }
    }

    /// Treat `code` as a successful exit.
    pub fn accept_exit_code(mut self, code: i32) -> Self {
        self.accepted_codes.push(code);
        self
    }

    /// Run the program to completion and return its output.
    pub fn run<I, S>(&self, args: I) -> Result<Output, ToolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();

        debug!(program = %self.program, args = ?args, "Executing command");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ToolError::Spawn {
                tool: self.program.clone(),
                source,
            })?;

        let code = output.status.code().unwrap_or(-1);
        if !output.status.success() && !self.accepted_codes.contains(&code) {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(program = %self.program, code, stderr = %stderr, "Command failed");
            return Err(ToolError::Failed {
                tool: self.program.clone(),
                code,
                stderr,
            });
        }

        debug!(
            program = %self.program,
            code,
            output_size = output.stdout.len(),
            "Command succeeded"
        );
        Ok(output)
    }
}
