use std::io::{self, BufRead, Write};

use ant_core::domain::question::{answer_text, Question};
use ant_core::{License, Notice, Platform, PromptError, UserPrompt};
use inquire::error::InquireError;
use inquire::list_option::ListOption;
use inquire::validator::Validation;
use inquire::{Confirm, MultiSelect, Select, Text};

use crate::ui;

/// inquire による端末プロンプト。
pub struct InquirePrompt;

impl InquirePrompt {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InquirePrompt {
    fn default() -> Self {
        Self::new()
    }
}

/// Esc / Ctrl+C は中断として扱う。
fn map_error(err: InquireError) -> PromptError {
    match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            PromptError::Cancelled(err.to_string())
        }
        other => PromptError::Io(other.to_string()),
    }
}

impl UserPrompt for InquirePrompt {
    fn input_text(&self, question: Question) -> Result<String, PromptError> {
        Text::new(question.message())
            .with_validator(move |input: &str| {
                Ok(match answer_text(question, input) {
                    Ok(_) => Validation::Valid,
                    Err(e) => Validation::Invalid(e.to_string().into()),
                })
            })
            .prompt()
            .map_err(map_error)
    }

    fn select_platforms(
        &self,
        question: Question,
        options: &[Platform],
    ) -> Result<Vec<Platform>, PromptError> {
        MultiSelect::new(question.message(), options.to_vec())
            .with_validator(|selected: &[ListOption<&Platform>]| {
                Ok(if selected.is_empty() {
                    Validation::Invalid("Value is required".into())
                } else {
                    Validation::Valid
                })
            })
            .prompt()
            .map_err(map_error)
    }

    fn select_license(
        &self,
        question: Question,
        options: &[License],
        default: License,
    ) -> Result<License, PromptError> {
        let cursor = options.iter().position(|l| *l == default).unwrap_or(0);
        Select::new(question.message(), options.to_vec())
            .with_starting_cursor(cursor)
            .prompt()
            .map_err(map_error)
    }

    fn confirm(&self, question: Question) -> Result<bool, PromptError> {
        Confirm::new(question.message())
            .with_default(false)
            .prompt()
            .map_err(map_error)
    }

    fn read_line(&self, message: &str) -> Result<String, PromptError> {
        let mut stdout = io::stdout();
        write!(stdout, "{message}")
            .and_then(|()| stdout.flush())
            .map_err(|e| PromptError::Io(e.to_string()))?;
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| PromptError::Io(e.to_string()))?;
        Ok(line)
    }

    fn notify(&self, notice: Notice, message: &str) {
        ui::print_notice(notice, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_and_interrupt_are_cancellation() {
        assert!(matches!(
            map_error(InquireError::OperationCanceled),
            PromptError::Cancelled(_)
        ));
        assert!(matches!(
            map_error(InquireError::OperationInterrupted),
            PromptError::Cancelled(_)
        ));
    }

    #[test]
    fn other_errors_are_io() {
        assert!(matches!(
            map_error(InquireError::NotTTY),
            PromptError::Io(_)
        ));
    }
}
