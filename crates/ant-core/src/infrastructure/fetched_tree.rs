use std::path::Path;

use tempfile::TempDir;

use super::interrupt::INTERRUPT;
use crate::domain::error::ScaffoldError;

/// テンプレートリポジトリを取得する一時ディレクトリ。
///
/// スコープを抜けるとどの経路でも削除される。削除の失敗はログに残すだけで、
/// 呼び出し元のエラーを上書きしない。生存中は [`INTERRUPT`] に登録され、
/// Ctrl+C を受けてもプロセスは即座に終了せず、この値の破棄を待つ。
pub struct FetchedTree {
    dir: Option<TempDir>,
}

pub const TEMP_PREFIX: &str = "ant-";

impl FetchedTree {
    /// `parent` 配下 (未指定ならシステムの一時ディレクトリ) に一意なディレクトリを作成する。
    ///
    /// # Errors
    /// ディレクトリを作成できない場合。
    pub fn create(parent: Option<&Path>) -> Result<Self, ScaffoldError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(ScaffoldError::TempDir)?;
        INTERRUPT.enter();
        tracing::debug!(path = %dir.path().display(), "created temporary directory");
        Ok(Self { dir: Some(dir) })
    }

    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            None => Path::new(""),
        }
    }
}

impl Drop for FetchedTree {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => tracing::debug!(path = %path.display(), "removed temporary directory"),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "cleanup failed");
                }
            }
            INTERRUPT.leave();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_prefixed_directory_in_parent() {
        let root = TempDir::new().unwrap();
        let tree = FetchedTree::create(Some(root.path())).unwrap();
        assert!(tree.path().is_dir());
        assert!(tree.path().starts_with(root.path()));
        let name = tree.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("ant-"));
    }

    #[test]
    fn removed_on_drop_with_contents() {
        let root = TempDir::new().unwrap();
        let path = {
            let tree = FetchedTree::create(Some(root.path())).unwrap();
            std::fs::create_dir_all(tree.path().join(".git/objects")).unwrap();
            std::fs::write(tree.path().join("README.md"), "x").unwrap();
            tree.path().to_path_buf()
        };
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn registered_for_interrupt_while_alive() {
        let root = TempDir::new().unwrap();
        let tree = FetchedTree::create(Some(root.path())).unwrap();
        assert!(INTERRUPT.has_pending_cleanup());
        drop(tree);
    }

    #[test]
    fn create_in_missing_parent_fails() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("missing");
        assert!(matches!(
            FetchedTree::create(Some(&missing)),
            Err(ScaffoldError::TempDir(_))
        ));
    }
}
