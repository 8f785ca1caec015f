//! External collaborators: the dump generator and the field reorder tool.

use crate::error::{Error, Result};
use std::fmt;
use std::path::Path;
use std::process::Command;

/// A fully spelled-out external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Converts a non-success exit into `Error::ToolFailed`.
    pub fn into_result(self, program: &str) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(Error::ToolFailed {
                program: program.to_string(),
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

pub trait ToolRunner {
    /// Runs to completion. Only a failure to start is an `Err`; exit status is reported
    /// in the output.
    fn run(&mut self, invocation: &Invocation) -> Result<ToolOutput>;
}

/// Runs commands directly, without a shell.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<ToolOutput> {
        tracing::debug!(command = %invocation, "running");
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .output()
            .map_err(|source| Error::ToolSpawn { program: invocation.program.clone(), source })?;

        Ok(ToolOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// `llvm-dwarfdump <binary> -o <output>`
#[derive(Debug, Clone)]
pub struct DumpTool {
    pub program: String,
}

impl DumpTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    pub fn invocation(&self, binary: &Path, output: &Path) -> Invocation {
        Invocation {
            program: self.program.clone(),
            args: vec![
                binary.display().to_string(),
                "-o".to_string(),
                output.display().to_string(),
            ],
        }
    }

    /// Writes the textual dump of `binary` to `output`. Fails fast on a non-zero exit.
    pub fn generate(
        &self,
        runner: &mut dyn ToolRunner,
        binary: &Path,
        output: &Path,
    ) -> Result<()> {
        runner.run(&self.invocation(binary, output))?.into_result(&self.program)?;
        Ok(())
    }
}

/// `clang-reorder-fields --record-name=<R> --fields-order=<a,b> -i <file> --extra-arg=<x>`
#[derive(Debug, Clone)]
pub struct ReorderTool {
    pub program: String,
    pub extra_args: Vec<String>,
}

impl ReorderTool {
    pub fn new(program: impl Into<String>, extra_args: Vec<String>) -> Self {
        Self { program: program.into(), extra_args }
    }

    pub fn invocation(&self, record: &str, fields_order: &str, file: &Path) -> Invocation {
        let mut args = vec![
            format!("--record-name={}", record),
            format!("--fields-order={}", fields_order),
            "-i".to_string(),
            file.display().to_string(),
        ];
        args.extend(self.extra_args.iter().map(|a| format!("--extra-arg={}", a)));
        Invocation { program: self.program.clone(), args }
    }
}
