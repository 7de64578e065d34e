use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::application::port::{ProcessOutput, ProcessRunner};
use crate::domain::error::ProcessError;

/// 実際に OS のプロセスを起動する実装。
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(program: &str, args: &[&str], cwd: Option<&Path>) -> Command {
        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        command
    }
}

impl Default for SystemProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<ProcessOutput, ProcessError> {
        tracing::debug!(program, ?args, "running command");
        let child = Self::command(program, args, cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program.to_string(),
                source,
            })?;
        let output = child
            .wait_with_output()
            .map_err(|source| ProcessError::Wait {
                program: program.to_string(),
                source,
            })?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        Ok(ProcessOutput {
            success: output.status.success(),
            code: output.status.code(),
            output: combined,
        })
    }

    fn stream(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<ProcessOutput, ProcessError> {
        tracing::debug!(program, ?args, "running command with inherited output");
        let mut child = Self::command(program, args, cwd)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program.to_string(),
                source,
            })?;
        let status = child.wait().map_err(|source| ProcessError::Wait {
            program: program.to_string(),
            source,
        })?;

        Ok(ProcessOutput {
            success: status.success(),
            code: status.code(),
            output: Vec::new(),
        })
    }
}

/// 記録用ランナーに登録する応答。
#[derive(Debug, Clone)]
pub enum CannedResponse {
    Output(ProcessOutput),
    SpawnFailure,
    WaitFailure,
}

/// 呼び出し記録。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub streamed: bool,
}

/// 呼び出しを記録し、登録済みの応答を返す偽のランナー。
///
/// 応答が登録されていないプログラムは出力なしで成功する。
#[derive(Default)]
pub struct RecordingRunner {
    installed: Vec<String>,
    responses: HashMap<String, CannedResponse>,
    calls: RefCell<Vec<Invocation>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// PATH 上に存在するものとして扱うプログラムを追加する。
    pub fn with_installed(mut self, program: &str) -> Self {
        self.installed.push(program.to_string());
        self
    }

    pub fn with_response(mut self, program: &str, response: CannedResponse) -> Self {
        self.responses.insert(program.to_string(), response);
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    fn respond(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        streamed: bool,
    ) -> Result<ProcessOutput, ProcessError> {
        self.calls.borrow_mut().push(Invocation {
            program: program.to_string(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            cwd: cwd.map(Path::to_path_buf),
            streamed,
        });
        match self.responses.get(program) {
            Some(CannedResponse::Output(output)) => Ok(output.clone()),
            Some(CannedResponse::SpawnFailure) => Err(ProcessError::Spawn {
                program: program.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "executable file not found in $PATH",
                ),
            }),
            Some(CannedResponse::WaitFailure) => Err(ProcessError::Wait {
                program: program.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Interrupted, "wait interrupted"),
            }),
            None => Ok(ProcessOutput {
                success: true,
                code: Some(0),
                output: Vec::new(),
            }),
        }
    }
}

impl ProcessRunner for RecordingRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.installed
            .iter()
            .any(|p| p == program)
            .then(|| PathBuf::from("/usr/bin").join(program))
    }

    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<ProcessOutput, ProcessError> {
        self.respond(program, args, cwd, false)
    }

    fn stream(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<ProcessOutput, ProcessError> {
        self.respond(program, args, cwd, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_missing_program_returns_none() {
        let runner = SystemProcessRunner::new();
        assert!(runner.locate("ant-definitely-not-installed-xyz").is_none());
    }

    #[test]
    fn run_missing_program_is_spawn_error() {
        let runner = SystemProcessRunner::new();
        let result = runner.run("ant-definitely-not-installed-xyz", &[], None);
        assert!(matches!(result, Err(ProcessError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn run_captures_stdout_then_stderr() {
        let runner = SystemProcessRunner::new();
        let output = runner
            .run("sh", &["-c", "echo out; echo err 1>&2; exit 3"], None)
            .unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.output_lossy(), "out\nerr\n");
    }

    #[cfg(unix)]
    #[test]
    fn run_uses_working_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let runner = SystemProcessRunner::new();
        let output = runner.run("ls", &[], Some(dir.path())).unwrap();
        assert!(output.output_lossy().contains("marker.txt"));
    }

    #[test]
    fn recording_runner_records_and_responds() {
        let runner = RecordingRunner::new()
            .with_installed("yamllint")
            .with_response("git", CannedResponse::SpawnFailure);
        assert!(runner.locate("yamllint").is_some());
        assert!(runner.locate("ansible-lint").is_none());
        assert!(runner.run("yamllint", &["."], None).unwrap().success);
        assert!(runner.stream("git", &["init"], None).is_err());

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args, vec!["."]);
        assert!(calls[1].streamed);
    }
}
