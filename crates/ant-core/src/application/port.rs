use std::path::{Path, PathBuf};

use crate::domain::error::{ProcessError, PromptError, ScaffoldError};
use crate::domain::model::{License, Platform, TemplateSource};
use crate::domain::question::Question;

/// ユーザーに表示するメッセージの種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Plain,
    Info,
    Warning,
    Error,
    Success,
}

/// 対話入力の境界。端末実装とテスト用のスクリプト実装を差し替える。
pub trait UserPrompt {
    fn input_text(&self, question: Question) -> Result<String, PromptError>;
    fn select_platforms(
        &self,
        question: Question,
        options: &[Platform],
    ) -> Result<Vec<Platform>, PromptError>;
    fn select_license(
        &self,
        question: Question,
        options: &[License],
        default: License,
    ) -> Result<License, PromptError>;
    fn confirm(&self, question: Question) -> Result<bool, PromptError>;
    /// 実行前の再確認として1行読み取る。
    fn read_line(&self, message: &str) -> Result<String, PromptError>;
    fn notify(&self, notice: Notice, message: &str);
}

/// 外部プロセスの実行結果。`output` は標準出力と標準エラー出力を連結したもの。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub output: Vec<u8>,
}

impl ProcessOutput {
    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// 失敗時のメッセージ (終了コードと出力の末尾)。
    pub fn failure_message(&self) -> String {
        let status = match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        };
        let output = self.output_lossy();
        let output = output.trim();
        if output.is_empty() {
            status
        } else {
            format!("{status}: {output}")
        }
    }
}

/// 外部プロセスの境界。
pub trait ProcessRunner {
    /// PATH から実行ファイルを探す。
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// 出力をキャプチャして実行する。
    ///
    /// # Errors
    /// プロセスの起動、または待機に失敗した場合。
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>)
        -> Result<ProcessOutput, ProcessError>;

    /// 出力を端末に流したまま実行する。
    ///
    /// # Errors
    /// プロセスの起動、または待機に失敗した場合。
    fn stream(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<ProcessOutput, ProcessError>;
}

/// テンプレートリポジトリの取得。
pub trait RepositoryFetcher {
    /// `source` を空のディレクトリ `into` に取得する。
    ///
    /// # Errors
    /// 取得に失敗した場合。
    fn fetch(&self, source: &TemplateSource, into: &Path) -> Result<(), ScaffoldError>;
}
