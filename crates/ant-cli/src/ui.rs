use ant_core::Notice;
use console::style;

/// 種別に応じて色付けした1行を返す。
pub fn format_notice(notice: Notice, message: &str) -> String {
    match notice {
        Notice::Plain => message.to_string(),
        Notice::Info => style(message).blue().bold().to_string(),
        Notice::Warning => style(message).cyan().bold().to_string(),
        Notice::Error => style(message).red().to_string(),
        Notice::Success => format!("{} {}", style("✓").green(), style(message).green()),
    }
}

/// 表示する。エラーだけは標準エラー出力へ。
pub fn print_notice(notice: Notice, message: &str) {
    let line = format_notice(notice, message);
    match notice {
        Notice::Error => eprintln!("{line}"),
        _ => println!("{line}"),
    }
}

pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", style("error:").red().bold(), style(format!("{err:#}")).red());
}
