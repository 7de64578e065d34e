use std::path::Path;

use anyhow::Result;

use ant_core::infrastructure::git::GitFetcher;
use ant_core::infrastructure::process::SystemProcessRunner;
use ant_core::{AntConfig, CreateOutcome, CreateRoleUseCase};

use crate::prompt::InquirePrompt;

/// `ant create` を実行する。中断・辞退は成功として返す。
///
/// # Errors
/// ロールの作成に失敗した場合。
pub fn run(config: &AntConfig, workdir: &Path) -> Result<()> {
    let prompt = InquirePrompt::new();
    let runner = SystemProcessRunner::new();
    let fetcher = GitFetcher::new(&runner);

    let outcome = CreateRoleUseCase::new(
        &prompt,
        &runner,
        &fetcher,
        config.template_source(),
        workdir,
    )
    .execute()?;

    match &outcome {
        CreateOutcome::Created { path, summary } => {
            tracing::debug!(
                path = %path.display(),
                files = summary.files,
                "create finished"
            );
        }
        CreateOutcome::Cancelled | CreateOutcome::Declined => {
            tracing::debug!(?outcome, "create ended without changes");
        }
    }
    Ok(())
}
