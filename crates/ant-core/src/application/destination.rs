use std::fs;
use std::path::{Path, PathBuf};

use super::port::ProcessRunner;
use crate::domain::error::ScaffoldError;
use crate::domain::model::RoleMetadata;
use crate::infrastructure::git::init_repository;

/// 出力先ディレクトリ `<namespace>.<name>` の確認と作成。
pub struct DestinationInitializer<'a, R: ProcessRunner> {
    runner: &'a R,
    path: PathBuf,
}

impl<'a, R: ProcessRunner> DestinationInitializer<'a, R> {
    pub fn new(runner: &'a R, workdir: &Path, metadata: &RoleMetadata) -> Self {
        Self {
            runner,
            path: workdir.join(metadata.directory_name()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 出力先が存在しないことを確認する。ファイルシステムには触れない。
    ///
    /// # Errors
    /// 出力先が既に存在する場合。
    pub fn ensure_absent(&self) -> Result<(), ScaffoldError> {
        if self.path.symlink_metadata().is_ok() {
            tracing::debug!(path = %self.path.display(), "destination already exists");
            return Err(ScaffoldError::DestinationExists(self.path.clone()));
        }
        Ok(())
    }

    /// 出力先を作成する。`gitinit` なら `git init`、そうでなければ通常のディレクトリ。
    ///
    /// # Errors
    /// git の初期化、またはディレクトリの作成に失敗した場合。
    /// git の初期化に失敗して中途半端なディレクトリが残った場合は削除してから返す。
    pub fn create(&self, gitinit: bool) -> Result<(), ScaffoldError> {
        if gitinit {
            tracing::info!(path = %self.path.display(), "initializing git repository");
            if let Err(e) = init_repository(self.runner, &self.path) {
                self.remove_leftover();
                return Err(e);
            }
            return Ok(());
        }

        tracing::info!(path = %self.path.display(), "creating role directory");
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }
        builder
            .create(&self.path)
            .map_err(|source| ScaffoldError::CreateDir {
                path: self.path.clone(),
                source,
            })
    }

    fn remove_leftover(&self) {
        if !self.path.exists() {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove partial repository");
        }
    }
}
