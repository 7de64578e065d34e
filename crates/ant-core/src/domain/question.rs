use super::model::Platform;
use super::validation::{validate_path_segment, validate_required, ValidationError};

/// `create` で行う質問。`Question::ORDER` の順に尋ねる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    Name,
    Author,
    Company,
    Namespace,
    Platforms,
    License,
    Description,
    GitInit,
}

/// 質問の入力形式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Text,
    MultiSelect,
    Select,
    Confirm,
}

impl Question {
    pub const ORDER: [Question; 8] = [
        Question::Name,
        Question::Author,
        Question::Company,
        Question::Namespace,
        Question::Platforms,
        Question::License,
        Question::Description,
        Question::GitInit,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Question::Name => "name",
            Question::Author => "author",
            Question::Company => "company",
            Question::Namespace => "namespace",
            Question::Platforms => "platforms",
            Question::License => "license",
            Question::Description => "description",
            Question::GitInit => "gitinit",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Question::Name => "What is your role called?",
            Question::Author => "What is your name?",
            Question::Company => "What is your company?",
            Question::Namespace => "Which namespace controls the role?",
            Question::Platforms => "Choose one or more platform:",
            Question::License => "Choose a license:",
            Question::Description => "Please enter a short role description.",
            Question::GitInit => "Do you want to init the role as git repository?",
        }
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::Platforms => QuestionKind::MultiSelect,
            Question::License => QuestionKind::Select,
            Question::GitInit => QuestionKind::Confirm,
            _ => QuestionKind::Text,
        }
    }
}

/// テキスト質問への回答を検証する。
///
/// 端末入出力から切り離した純粋関数で、`Err` は再質問を意味する。
///
/// # Errors
/// 回答が質問の条件を満たさない場合。
pub fn answer_text(question: Question, input: &str) -> Result<String, ValidationError> {
    match question {
        Question::Name | Question::Namespace => validate_path_segment(input),
        _ => validate_required(input),
    }
}

/// プラットフォーム選択を検証する。重複を除き、選択肢の並び順に揃える。
///
/// # Errors
/// 1つも選択されていない場合。
pub fn answer_platforms(selected: &[Platform]) -> Result<Vec<Platform>, ValidationError> {
    if selected.is_empty() {
        return Err(ValidationError::Required);
    }
    Ok(Platform::ALL
        .into_iter()
        .filter(|p| selected.contains(p))
        .collect())
}
