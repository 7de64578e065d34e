use std::cell::RefCell;
use std::collections::VecDeque;

use crate::application::port::{Notice, UserPrompt};
use crate::domain::error::PromptError;
use crate::domain::model::{License, Platform};
use crate::domain::question::Question;

/// 事前に用意した回答を順に返すプロンプト。端末なしでユースケースを動かすために使う。
///
/// 回答が尽きた質問は中断 (`PromptError::Cancelled`) として扱う。
/// ライセンスだけは回答が無ければデフォルト値を選んだものとみなす。
#[derive(Default)]
pub struct ScriptedPrompt {
    texts: RefCell<VecDeque<String>>,
    platforms: RefCell<VecDeque<Vec<Platform>>>,
    licenses: RefCell<VecDeque<License>>,
    confirms: RefCell<VecDeque<bool>>,
    lines: RefCell<VecDeque<String>>,
    asked: RefCell<Vec<Question>>,
    notices: RefCell<Vec<(Notice, String)>>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, text: &str) -> Self {
        self.texts.borrow_mut().push_back(text.to_string());
        self
    }

    pub fn with_platforms(self, platforms: Vec<Platform>) -> Self {
        self.platforms.borrow_mut().push_back(platforms);
        self
    }

    pub fn with_license(self, license: License) -> Self {
        self.licenses.borrow_mut().push_back(license);
        self
    }

    pub fn with_confirm(self, answer: bool) -> Self {
        self.confirms.borrow_mut().push_back(answer);
        self
    }

    pub fn with_line(self, line: &str) -> Self {
        self.lines.borrow_mut().push_back(line.to_string());
        self
    }

    /// 尋ねられた質問の履歴。
    pub fn asked(&self) -> Vec<Question> {
        self.asked.borrow().clone()
    }

    /// 表示されたメッセージの履歴。
    pub fn notices(&self) -> Vec<(Notice, String)> {
        self.notices.borrow().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices.borrow().iter().map(|(_, m)| m.clone()).collect()
    }

    fn record(&self, question: Question) {
        self.asked.borrow_mut().push(question);
    }
}

fn interrupted() -> PromptError {
    PromptError::Cancelled("interrupt".to_string())
}

impl UserPrompt for ScriptedPrompt {
    fn input_text(&self, question: Question) -> Result<String, PromptError> {
        self.record(question);
        self.texts.borrow_mut().pop_front().ok_or_else(interrupted)
    }

    fn select_platforms(
        &self,
        question: Question,
        _options: &[Platform],
    ) -> Result<Vec<Platform>, PromptError> {
        self.record(question);
        self.platforms.borrow_mut().pop_front().ok_or_else(interrupted)
    }

    fn select_license(
        &self,
        question: Question,
        _options: &[License],
        default: License,
    ) -> Result<License, PromptError> {
        self.record(question);
        Ok(self.licenses.borrow_mut().pop_front().unwrap_or(default))
    }

    fn confirm(&self, question: Question) -> Result<bool, PromptError> {
        self.record(question);
        self.confirms.borrow_mut().pop_front().ok_or_else(interrupted)
    }

    fn read_line(&self, _message: &str) -> Result<String, PromptError> {
        self.lines
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| PromptError::Io("unexpected end of input".to_string()))
    }

    fn notify(&self, notice: Notice, message: &str) {
        self.notices
            .borrow_mut()
            .push((notice, message.to_string()));
    }
}
