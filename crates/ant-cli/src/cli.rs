use clap::{CommandFactory, Parser, Subcommand};

const LONG_ABOUT: &str = "\
ANT is a CLI for Ansible that empowers ansible role creation.
It clones a role template repository, fills in the role metadata you
provide and wraps yamllint and ansible-lint for checking the result.";

#[derive(Parser, Debug)]
#[command(name = "ant", version, about = "An ansible toolkit", long_about = LONG_ABOUT)]
pub struct Cli {
    /// Help message for toggle
    #[arg(short, long, default_value_t = false)]
    pub toggle: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// create ansible role from template
    #[command(
        long_about = "Create a new ansible role from the template repository.\n\
                      Asks for the role metadata, clones the template and writes\n\
                      the role to <namespace>.<name> in the current directory."
    )]
    Create,
    /// wrapper to yamllint and ansible-lint
    #[command(
        long_about = "Run yamllint and ansible-lint in the current directory.\n\
                      Linters that are not installed are skipped."
    )]
    Lint,
}

/// コマンドテーブルを構築する。
pub fn build_cli() -> clap::Command {
    Cli::command()
}
