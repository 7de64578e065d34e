use std::path::PathBuf;

use thiserror::Error;

/// 対話入力のエラー。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    /// Esc / Ctrl+C による中断。正常終了として扱う。
    #[error("{0}")]
    Cancelled(String),
    #[error("prompt failed: {0}")]
    Io(String),
}

/// 外部プロセスの起動・待機エラー。終了コードが非ゼロの場合はエラーにしない。
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed while waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// `<<` `>>` テンプレートのエラー。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template: line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("template: {0}")]
    Render(String),
}

/// ツリー変換 (コピー・置換・レンダリング) のエラー。最初のエラーで中断する。
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
    #[error("{path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: TemplateError,
    },
    #[error("interrupted")]
    Interrupted,
}

/// `create` の各段階で発生するエラー。表示文字列には失敗した段階を含める。
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error(transparent)]
    Prompt(#[from] PromptError),
    /// パスは表示せず、ログにのみ残す。
    #[error("Error creating role directory: Directory exists.")]
    DestinationExists(PathBuf),
    #[error("Error creating temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("Error cloning repository: {0}")]
    Clone(String),
    #[error("Error initializing new repository: {0}")]
    GitInit(String),
    #[error("Error creating copy directory: {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error copying files: {0}")]
    Transform(#[from] TransformError),
}

/// `lint` のエラー。
#[derive(Debug, Error)]
pub enum LintError {
    #[error("linting failed: {}", .0.join(", "))]
    Failed(Vec<String>),
}
