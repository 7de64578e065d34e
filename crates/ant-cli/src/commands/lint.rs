use std::path::Path;

use anyhow::Result;

use ant_core::infrastructure::process::SystemProcessRunner;
use ant_core::LintRunner;

use crate::prompt::InquirePrompt;

/// `ant lint` を実行する。
///
/// # Errors
/// いずれかのリンターが失敗した場合。
pub fn run(workdir: &Path) -> Result<()> {
    let output = InquirePrompt::new();
    let runner = SystemProcessRunner::new();
    let outcome = LintRunner::new(&output, &runner).execute(workdir)?;
    tracing::debug!(?outcome, "lint finished");
    Ok(())
}
