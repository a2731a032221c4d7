use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use crate::ffmpeg::invocation::Invocation;

#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    #[error("failed to spawn '{}' (is it installed and on PATH?): {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' exited with {status}: {stderr}", .program.display())]
    Failed {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("invocation {index} failed: {reason}")]
    Rejected { index: usize, reason: String },
}

/// Executes external tool invocations, one at a time.
///
/// `run` blocks until the tool has exited and succeeds only on a zero exit status.
pub trait ToolRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<(), ToolError>;
}

/// Runs invocations as child processes, capturing stderr for error reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<(), ToolError> {
        tracing::info!(command = %invocation, "running external tool");
        let out = invocation
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ToolError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            tracing::error!(status = %out.status, stderr = %stderr, "external tool failed");
            return Err(ToolError::Failed {
                program: invocation.program.clone(),
                status: out.status,
                stderr,
            });
        }
        tracing::info!("external tool finished successfully");
        Ok(())
    }
}

/// Records invocations instead of spawning anything; for tests and debugging.
///
/// With [`RecordingRunner::materializing`], each call writes its output file as the bytes of its
/// input file (if any) followed by `+<index>`, so chained calls leave a readable trail.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    invocations: Vec<Invocation>,
    materialize: bool,
    fail_at: Option<usize>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn materializing() -> Self {
        Self {
            materialize: true,
            ..Self::default()
        }
    }

    /// Make the call with 0-based `index` fail (it is still recorded).
    pub fn fail_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    fn write_output(index: usize, invocation: &Invocation) -> std::io::Result<()> {
        let Some(output) = invocation.output_path() else {
            return Ok(());
        };
        let mut bytes = match invocation.input_path() {
            Some(input) if input.is_file() => std::fs::read(input)?,
            _ => Vec::new(),
        };
        bytes.extend_from_slice(format!("+{index}").as_bytes());
        std::fs::write(output, bytes)
    }
}

impl ToolRunner for RecordingRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<(), ToolError> {
        let index = self.invocations.len();
        self.invocations.push(invocation.clone());

        if self.fail_at == Some(index) {
            return Err(ToolError::Rejected {
                index,
                reason: "configured failure".to_string(),
            });
        }
        if self.materialize {
            Self::write_output(index, invocation).map_err(|e| ToolError::Rejected {
                index,
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Return `true` when `program -version` runs successfully.
pub fn is_tool_on_path(program: &Path) -> bool {
    std::process::Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
