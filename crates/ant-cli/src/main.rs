mod cli;
mod commands;
mod logging;
mod prompt;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::FromArgMatches;

use ant_core::config::discover_config;
use ant_core::infrastructure::interrupt::INTERRUPT;
use ant_core::AntConfig;
use cli::{build_cli, Cli, Commands};

/// Ctrl+C で終了したときの終了コード (128 + SIGINT)。
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn main() {
    let matches = build_cli().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let workdir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // 設定ファイルが壊れていてもデフォルト値で続行する
    let (config, config_error) = match discover_config(&workdir) {
        Ok(config) => (config, None),
        Err(e) => (AntConfig::default(), Some(e)),
    };
    logging::init_logger(&config.log_level, &config.log_format);
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "using default configuration");
        ui::print_notice(
            ant_core::Notice::Warning,
            &format!("Failed to load configuration, using defaults: {e}"),
        );
    }

    install_interrupt_handler();

    if let Err(e) = run(cli, &config, workdir) {
        ui::print_error(&e);
        if INTERRUPT.is_requested() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        std::process::exit(1);
    }
}

/// Ctrl+C のグローバルハンドラを設定する。
/// 一時ディレクトリが残っている間は終了せず、子プロセスの失敗経由で後始末させる。
fn install_interrupt_handler() {
    let result = ctrlc::set_handler(|| {
        if !INTERRUPT.request() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
    if let Err(e) = result {
        tracing::warn!(error = %e, "failed to install Ctrl+C handler");
    }
}

fn run(cli: Cli, config: &AntConfig, workdir: PathBuf) -> Result<()> {
    tracing::debug!(toggle = cli.toggle, "parsed arguments");
    match cli.command {
        Some(Commands::Create) => commands::create::run(config, &workdir),
        Some(Commands::Lint) => commands::lint::run(&workdir),
        None => {
            build_cli().print_help().context("failed to print help")?;
            println!();
            Ok(())
        }
    }
}
