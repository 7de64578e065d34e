use std::path::Path;

use super::port::{Notice, ProcessRunner, UserPrompt};
use crate::domain::error::LintError;

pub const START_MESSAGE: &str = "Linting. Let's get started!";
pub const CHECKING_MESSAGE: &str = "Checking available linters..";
pub const NO_LINTERS_MESSAGE: &str =
    "No linters found. Please consider installing yamllint and ansible-lint";

/// 外部リンターの定義。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Linter {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

/// 実行順に並べたリンター。
pub const LINTERS: [Linter; 2] = [
    Linter {
        program: "yamllint",
        args: &["."],
    },
    Linter {
        program: "ansible-lint",
        args: &[],
    },
];

/// `lint` の結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintOutcome {
    /// どのリンターも PATH に無かった
    NoLinters,
    /// 実行したリンター
    Ran(Vec<&'static str>),
}

/// PATH 上のリンターをカレントディレクトリで順に実行する。
///
/// 1つのリンターが失敗しても残りは実行し、最後にまとめて失敗を返す。
pub struct LintRunner<'a, P: UserPrompt, R: ProcessRunner> {
    output: &'a P,
    runner: &'a R,
}

impl<'a, P: UserPrompt, R: ProcessRunner> LintRunner<'a, P, R> {
    pub fn new(output: &'a P, runner: &'a R) -> Self {
        Self { output, runner }
    }

    /// # Errors
    /// 実行したリンターのいずれかが起動・待機に失敗した、または非ゼロで終了した場合。
    pub fn execute(&self, dir: &Path) -> Result<LintOutcome, LintError> {
        self.output.notify(Notice::Info, START_MESSAGE);
        self.output.notify(Notice::Info, CHECKING_MESSAGE);

        let available: Vec<Linter> = LINTERS
            .iter()
            .copied()
            .filter(|linter| match self.runner.locate(linter.program) {
                Some(path) => {
                    tracing::debug!(program = linter.program, path = %path.display(), "linter found");
                    true
                }
                None => false,
            })
            .collect();

        if available.is_empty() {
            self.output.notify(Notice::Warning, NO_LINTERS_MESSAGE);
            return Ok(LintOutcome::NoLinters);
        }

        let names: Vec<&'static str> = available.iter().map(|l| l.program).collect();
        self.output
            .notify(Notice::Info, &format!("Found {}", names.join(" ")));
        for linter in LINTERS.iter().filter(|l| !names.contains(&l.program)) {
            self.output.notify(
                Notice::Warning,
                &format!(
                    "{} not found in $PATH. Please consider installing it to use ant lint.",
                    linter.program
                ),
            );
        }

        let mut failed = Vec::new();
        for linter in &available {
            if let Err(message) = self.run_one(linter, dir) {
                self.output.notify(
                    Notice::Error,
                    &format!("Error linting directory with {}: {message}", linter.program),
                );
                failed.push(linter.program.to_string());
            }
        }

        if failed.is_empty() {
            Ok(LintOutcome::Ran(names))
        } else {
            Err(LintError::Failed(failed))
        }
    }

    fn run_one(&self, linter: &Linter, dir: &Path) -> Result<(), String> {
        tracing::info!(program = linter.program, "running linter");
        let output = self
            .runner
            .run(linter.program, linter.args, Some(dir))
            .map_err(|e| e.to_string())?;
        let text = output.output_lossy();
        if !text.is_empty() {
            self.output.notify(Notice::Plain, text.trim_end_matches('\n'));
        }
        if output.success {
            Ok(())
        } else {
            Err(match output.code {
                Some(code) => format!("exit status {code}"),
                None => "terminated by signal".to_string(),
            })
        }
    }
}
