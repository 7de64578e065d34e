use std::path::Path;

use crate::application::port::{ProcessRunner, RepositoryFetcher};
use crate::domain::error::ScaffoldError;
use crate::domain::model::TemplateSource;

/// `git` コマンドでテンプレートリポジトリを取得する。
///
/// 指定ブランチのみを深さ1でクローンし、進捗は端末にそのまま流す。
pub struct GitFetcher<'a, R: ProcessRunner> {
    runner: &'a R,
}

impl<'a, R: ProcessRunner> GitFetcher<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }
}

/// クローンの引数を組み立てる。
pub fn clone_args<'s>(source: &'s TemplateSource, into: &'s str) -> Vec<&'s str> {
    vec![
        "clone",
        "--progress",
        "--branch",
        source.branch.as_str(),
        "--single-branch",
        "--depth",
        "1",
        source.url.as_str(),
        into,
    ]
}

impl<R: ProcessRunner> RepositoryFetcher for GitFetcher<'_, R> {
    fn fetch(&self, source: &TemplateSource, into: &Path) -> Result<(), ScaffoldError> {
        let target = into.to_string_lossy();
        tracing::info!(url = %source.url, branch = %source.branch, "cloning template repository");
        let output = self
            .runner
            .stream("git", &clone_args(source, &target), None)
            .map_err(|e| ScaffoldError::Clone(e.to_string()))?;
        if !output.success {
            return Err(ScaffoldError::Clone(output.failure_message()));
        }
        Ok(())
    }
}

/// `git init -b main <dir>` で新しいリポジトリを作成する。
///
/// # Errors
/// git の起動・待機に失敗した場合、または終了コードが非ゼロの場合。
pub fn init_repository<R: ProcessRunner>(runner: &R, dir: &Path) -> Result<(), ScaffoldError> {
    let target = dir.to_string_lossy();
    let output = runner
        .run("git", &["init", "-b", "main", &*target], None)
        .map_err(|e| ScaffoldError::GitInit(e.to_string()))?;
    tracing::debug!(output = %output.output_lossy().trim(), "git init finished");
    if !output.success {
        return Err(ScaffoldError::GitInit(output.failure_message()));
    }
    Ok(())
}
