use super::port::{Notice, UserPrompt};
use crate::domain::error::PromptError;
use crate::domain::model::{License, Platform, RoleMetadata};
use crate::domain::question::{answer_platforms, answer_text, Question};
use crate::domain::validation::is_affirmative;

pub const PROCEED_MESSAGE: &str = "Do you want to continue with this operation? [y|n]: ";

/// 質問を順に行い、ロールのメタデータを組み立てる。
///
/// バリデーションに失敗した回答はメッセージを表示して同じ質問をやり直す。
///
/// # Errors
/// 入力が中断された、または入力に失敗した場合。
pub fn collect_metadata<P: UserPrompt>(prompt: &P) -> Result<RoleMetadata, PromptError> {
    let name = ask_text(prompt, Question::Name)?;
    let author = ask_text(prompt, Question::Author)?;
    let company = ask_text(prompt, Question::Company)?;
    let namespace = ask_text(prompt, Question::Namespace)?;
    let platforms = ask_platforms(prompt)?;
    let license = prompt.select_license(Question::License, &License::ALL, License::default())?;
    let description = ask_text(prompt, Question::Description)?;
    let gitinit = prompt.confirm(Question::GitInit)?;

    Ok(RoleMetadata {
        name,
        author,
        company,
        namespace,
        description,
        platforms,
        license,
        gitinit,
    })
}

fn ask_text<P: UserPrompt>(prompt: &P, question: Question) -> Result<String, PromptError> {
    loop {
        let input = prompt.input_text(question)?;
        match answer_text(question, &input) {
            Ok(value) => return Ok(value),
            Err(e) => prompt.notify(Notice::Warning, &e.to_string()),
        }
    }
}

fn ask_platforms<P: UserPrompt>(prompt: &P) -> Result<Vec<Platform>, PromptError> {
    loop {
        let selected = prompt.select_platforms(Question::Platforms, &Platform::ALL)?;
        match answer_platforms(&selected) {
            Ok(platforms) => return Ok(platforms),
            Err(e) => prompt.notify(Notice::Warning, &e.to_string()),
        }
    }
}

/// 入力内容の確認用サマリー。
pub fn summary_lines(metadata: &RoleMetadata) -> Vec<String> {
    let platforms: Vec<&str> = metadata.platforms.iter().map(Platform::as_str).collect();
    vec![
        format!("  Name:        {}", metadata.name),
        format!("  Author:      {}", metadata.author),
        format!("  Company:     {}", metadata.company),
        format!("  Namespace:   {}", metadata.namespace),
        format!("  Platforms:   {}", platforms.join(", ")),
        format!("  License:     {}", metadata.license),
        format!("  Description: {}", metadata.description),
        format!(
            "  Git init:    {}",
            if metadata.gitinit { "yes" } else { "no" }
        ),
    ]
}

/// 破壊的な操作の前に明示的な `y` / `yes` を求める。
///
/// 読み取りに失敗した場合も含め、それ以外はすべて中止として扱う。
pub fn confirm_proceed<P: UserPrompt>(prompt: &P) -> bool {
    match prompt.read_line(PROCEED_MESSAGE) {
        Ok(line) => is_affirmative(&line),
        Err(e) => {
            tracing::debug!(error = %e, "confirmation input failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::scripted_prompt::ScriptedPrompt;

    fn answered() -> ScriptedPrompt {
        ScriptedPrompt::new()
            .with_text("nginx")
            .with_text("Alice")
            .with_text("ACME")
            .with_text("web")
            .with_platforms(vec![Platform::Ubuntu2204])
            .with_license(License::Mit)
            .with_text("Installs nginx")
            .with_confirm(false)
    }

    #[test]
    fn collects_all_answers_in_order() {
        let prompt = answered();
        let meta = collect_metadata(&prompt).unwrap();
        assert_eq!(meta.name, "nginx");
        assert_eq!(meta.author, "Alice");
        assert_eq!(meta.company, "ACME");
        assert_eq!(meta.namespace, "web");
        assert_eq!(meta.platforms, vec![Platform::Ubuntu2204]);
        assert_eq!(meta.license, License::Mit);
        assert_eq!(meta.description, "Installs nginx");
        assert!(!meta.gitinit);
        assert_eq!(
            prompt.asked(),
            vec![
                Question::Name,
                Question::Author,
                Question::Company,
                Question::Namespace,
                Question::Platforms,
                Question::License,
                Question::Description,
                Question::GitInit,
            ]
        );
    }

    #[test]
    fn reprompts_empty_text_answer() {
        let prompt = ScriptedPrompt::new()
            .with_text("")
            .with_text("   ")
            .with_text("nginx")
            .with_text("Alice")
            .with_text("ACME")
            .with_text("web")
            .with_platforms(vec![Platform::RockyLinux8])
            .with_license(License::Bsd)
            .with_text("desc")
            .with_confirm(true);
        let meta = collect_metadata(&prompt).unwrap();
        assert_eq!(meta.name, "nginx");
        let asked = prompt.asked();
        assert_eq!(&asked[..3], &[Question::Name, Question::Name, Question::Name]);
        let warnings: Vec<String> = prompt
            .notices()
            .into_iter()
            .filter(|(n, _)| *n == Notice::Warning)
            .map(|(_, m)| m)
            .collect();
        assert_eq!(warnings, vec!["Value is required", "Value is required"]);
    }

    #[test]
    fn reprompts_empty_platform_selection() {
        let prompt = ScriptedPrompt::new()
            .with_text("nginx")
            .with_text("Alice")
            .with_text("ACME")
            .with_text("web")
            .with_platforms(vec![])
            .with_platforms(vec![Platform::Ubuntu2004, Platform::RockyLinux9])
            .with_license(License::Mit)
            .with_text("desc")
            .with_confirm(true);
        let meta = collect_metadata(&prompt).unwrap();
        assert_eq!(
            meta.platforms,
            vec![Platform::Ubuntu2004, Platform::RockyLinux9]
        );
        assert!(meta.gitinit);
    }

    #[test]
    fn cancel_propagates_as_prompt_error() {
        let prompt = ScriptedPrompt::new().with_text("nginx");
        assert!(matches!(
            collect_metadata(&prompt),
            Err(PromptError::Cancelled(_))
        ));
    }

    #[test]
    fn license_defaults_to_mit_when_not_chosen() {
        let prompt = ScriptedPrompt::new()
            .with_text("nginx")
            .with_text("Alice")
            .with_text("ACME")
            .with_text("web")
            .with_platforms(vec![Platform::Ubuntu2204])
            .with_text("desc")
            .with_confirm(false);
        let meta = collect_metadata(&prompt).unwrap();
        assert_eq!(meta.license, License::Mit);
    }

    #[test]
    fn proceed_requires_explicit_yes() {
        assert!(confirm_proceed(&ScriptedPrompt::new().with_line("y")));
        assert!(confirm_proceed(&ScriptedPrompt::new().with_line("Yes")));
        assert!(!confirm_proceed(&ScriptedPrompt::new().with_line("")));
        assert!(!confirm_proceed(&ScriptedPrompt::new().with_line("n")));
        assert!(!confirm_proceed(&ScriptedPrompt::new()));
    }

    #[test]
    fn summary_lists_answers() {
        let meta = collect_metadata(&answered()).unwrap();
        let lines = summary_lines(&meta);
        assert!(lines.iter().any(|l| l.contains("web")));
        assert!(lines.iter().any(|l| l.contains("ubuntu2204")));
        assert!(lines.iter().any(|l| l.ends_with("no")));
    }
}
