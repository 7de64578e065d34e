use std::fs;
use std::io::Write;
use std::path::Path;

use walkdir::WalkDir;

use super::interrupt::{InterruptState, INTERRUPT};
use crate::domain::error::TransformError;
use crate::domain::model::RoleMetadata;
use crate::template::RoleRenderer;

/// テンプレートリポジトリ内でロール名に置き換える文字列。
pub const NAME_TOKEN: &str = "template";

/// コピー対象から除外するバージョン管理ディレクトリ名。
pub const VCS_DIR: &str = ".git";

/// 変換結果の集計。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformSummary {
    pub directories: usize,
    pub files: usize,
}

/// 取得したツリーを出力先にコピーしながら置換とテンプレート描画を行う。
pub struct TreeTransformer {
    replacement: String,
    renderer: RoleRenderer,
    interrupt: &'static InterruptState,
}

impl TreeTransformer {
    /// # Errors
    /// メタデータからレンダリングコンテキストを作成できない場合。
    pub fn new(metadata: &RoleMetadata) -> Result<Self, TransformError> {
        let renderer = RoleRenderer::new(metadata).map_err(|source| TransformError::Template {
            path: Path::new("").to_path_buf(),
            source,
        })?;
        Ok(Self {
            replacement: metadata.name.clone(),
            renderer,
            interrupt: &INTERRUPT,
        })
    }

    /// 中断要求を参照する状態を差し替える。
    #[must_use]
    pub fn with_interrupt(mut self, interrupt: &'static InterruptState) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// `source` 配下を深さ優先・ファイル名順に走査し、`dest` に書き出す。
    ///
    /// `.git` はディレクトリごと読み飛ばす。最初のエラーで走査全体を中断し、
    /// それまでに書き込んだファイルはそのまま残る。Ctrl+C もエントリ単位で確認する。
    ///
    /// # Errors
    /// 読み込み、テンプレートの解析・描画、書き込みのいずれかに失敗した場合。
    /// 中断要求を受けた場合は [`TransformError::Interrupted`]。
    pub fn transform(&self, source: &Path, dest: &Path) -> Result<TransformSummary, TransformError> {
        let mut summary = TransformSummary::default();
        let walker = WalkDir::new(source)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != VCS_DIR);

        for entry in walker {
            if self.interrupt.is_requested() {
                tracing::warn!(copied = summary.files, "transform interrupted");
                return Err(TransformError::Interrupted);
            }
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|e| TransformError::Io {
                    path: entry.path().to_path_buf(),
                    source: std::io::Error::other(e),
                })?;
            let target = dest.join(relative);

            if entry.file_type().is_dir() {
                create_dir(&target)?;
                summary.directories += 1;
            } else {
                let data = fs::read(entry.path()).map_err(|source| TransformError::Io {
                    path: entry.path().to_path_buf(),
                    source,
                })?;
                let rendered = self.apply(&data).map_err(|source| TransformError::Template {
                    path: relative.to_path_buf(),
                    source,
                })?;
                write_file(&target, &rendered)?;
                tracing::debug!(path = %relative.display(), "copied");
                summary.files += 1;
            }
        }

        Ok(summary)
    }

    /// 1ファイル分の変換。UTF-8 でない内容は置換のみ行う。
    fn apply(&self, data: &[u8]) -> Result<Vec<u8>, crate::domain::error::TemplateError> {
        let replaced = replace_bytes(data, NAME_TOKEN.as_bytes(), self.replacement.as_bytes());
        match String::from_utf8(replaced) {
            Ok(text) => Ok(self.renderer.render(&text)?.into_bytes()),
            Err(e) => Ok(e.into_bytes()),
        }
    }
}

/// バイト列中の `from` をすべて `to` に置き換える。単語境界は考慮しない。
pub fn replace_bytes(data: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    if from.is_empty() {
        return data.to_vec();
    }
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        if data[i..].starts_with(from) {
            out.extend_from_slice(to);
            i += from.len();
        } else {
            out.push(data[i]);
            i += 1;
        }
    }
    out
}

/// 中間ディレクトリも含めて作成する (unix ではモード 0755)。
///
/// # Errors
/// 作成に失敗した場合。
pub fn create_dir(path: &Path) -> Result<(), TransformError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(path).map_err(|source| TransformError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), TransformError> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    let io_err = |source| TransformError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = options.open(path).map_err(io_err)?;
    file.write_all(data).map_err(io_err)
}
