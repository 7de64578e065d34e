//! ant のコアライブラリ。
//!
//! テンプレートリポジトリから Ansible ロールを作成するユースケースと、
//! 外部リンターを実行するユースケースを提供する。
//! 端末入出力と外部プロセスはポート (`application::port`) 越しに扱う。

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod template;

pub use application::create_role::{CreateOutcome, CreateRoleUseCase};
pub use application::lint::{LintOutcome, LintRunner};
pub use application::port::{Notice, ProcessRunner, RepositoryFetcher, UserPrompt};
pub use config::AntConfig;
pub use domain::error::{LintError, PromptError, ScaffoldError};
pub use domain::model::{License, Platform, RoleMetadata, TemplateSource};
