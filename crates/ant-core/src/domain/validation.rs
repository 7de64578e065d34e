use thiserror::Error;

/// 回答のバリデーションエラー。発生した場合は同じ質問を再度行う。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Value is required")]
    Required,
    #[error("'{0}' must not contain path separators")]
    PathSeparator(String),
}

/// 必須入力のバリデーション。前後の空白を除いた値を返す。
///
/// # Errors
/// 空白のみ、または空の入力の場合。
pub fn validate_required(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required);
    }
    Ok(trimmed.to_string())
}

/// ディレクトリ名の一部になる値のバリデーション (name / namespace)。
///
/// # Errors
/// 空の入力、またはパス区切り文字を含む場合。
pub fn validate_path_segment(input: &str) -> Result<String, ValidationError> {
    let value = validate_required(input)?;
    if value.contains(['/', '\\']) {
        return Err(ValidationError::PathSeparator(value));
    }
    Ok(value)
}

/// 実行前の再確認入力を判定する。`y` / `yes` (大文字小文字無視) のみ続行とみなす。
pub fn is_affirmative(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
