//! In-memory quest state: the loaded questions, progress through them, and the tallies.

use std::collections::HashSet;

use shared::{domain::OptionKey, protocol::QuizQuestionPayload};
use thiserror::Error;

use crate::error::LogicError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub key: OptionKey,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<AnswerOption>,
    correct_key: OptionKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("question has no options")]
    NoOptions,
    #[error("option key '{0}' appears more than once")]
    DuplicateKey(String),
    #[error("correct key '{0}' is not among the options")]
    MissingCorrectKey(String),
}

impl Question {
    pub fn new(
        text: impl Into<String>,
        options: Vec<AnswerOption>,
        correct_key: OptionKey,
    ) -> Result<Self, QuestionError> {
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        let mut seen = HashSet::with_capacity(options.len());
        for option in &options {
            if !seen.insert(option.key.as_str()) {
                return Err(QuestionError::DuplicateKey(option.key.0.clone()));
            }
        }
        if !seen.contains(correct_key.as_str()) {
            return Err(QuestionError::MissingCorrectKey(correct_key.0));
        }
        Ok(Self {
            text: text.into(),
            options,
            correct_key,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    pub fn correct_key(&self) -> &OptionKey {
        &self.correct_key
    }

    pub fn option(&self, key: &OptionKey) -> Option<&AnswerOption> {
        self.options.iter().find(|option| &option.key == key)
    }

    pub fn is_correct(&self, key: &OptionKey) -> bool {
        &self.correct_key == key
    }
}

impl TryFrom<QuizQuestionPayload> for Question {
    type Error = QuestionError;

    fn try_from(payload: QuizQuestionPayload) -> Result<Self, Self::Error> {
        let options = payload
            .options
            .into_iter()
            .map(|(key, text)| AnswerOption { key, text })
            .collect();
        Self::new(payload.question, options, payload.correct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Classic,
    Leveled { current_level: u32, max_level: u32 },
}

impl Mode {
    pub fn is_leveled(&self) -> bool {
        matches!(self, Self::Leveled { .. })
    }

    pub fn current_level(&self) -> Option<u32> {
        match self {
            Self::Classic => None,
            Self::Leveled { current_level, .. } => Some(*current_level),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestSummary {
    pub score: u32,
    pub total: u32,
}

impl QuestSummary {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.score) * 100.0 / f64::from(self.total)
    }

    pub fn percentage_label(&self) -> String {
        format!("{:.1}%", self.percentage())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    questions: Vec<Question>,
    current_index: usize,
    score: u32,
    total_answered: u32,
    hint_count: u32,
    current_answer: Option<OptionKey>,
}

impl Session {
    pub fn new(hint_count: u32) -> Self {
        Self {
            hint_count,
            ..Self::default()
        }
    }

    /// Zeroes the tallies for a new quest; the hint balance carries over.
    pub fn reset(&mut self) {
        self.questions.clear();
        self.current_index = 0;
        self.score = 0;
        self.total_answered = 0;
        self.current_answer = None;
    }

    pub fn load_questions(&mut self, questions: Vec<Question>) {
        self.questions = questions;
        self.current_index = 0;
        self.current_answer = None;
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_answered(&self) -> u32 {
        self.total_answered
    }

    pub fn hint_count(&self) -> u32 {
        self.hint_count
    }

    pub fn set_hint_count(&mut self, hint_count: u32) {
        self.hint_count = hint_count;
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn current_answer(&self) -> Option<&OptionKey> {
        self.current_answer.as_ref()
    }

    pub fn is_current_answered(&self) -> bool {
        self.current_answer.is_some()
    }

    pub fn is_complete(&self) -> bool {
        !self.questions.is_empty() && self.current_index == self.questions.len()
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    pub fn summary(&self) -> QuestSummary {
        QuestSummary {
            score: self.score,
            total: self.questions.len() as u32,
        }
    }

    /// Records the single allowed answer for the current question and returns whether it was right.
    pub fn record_answer(&mut self, key: &OptionKey) -> Result<bool, LogicError> {
        let question = self
            .questions
            .get(self.current_index)
            .ok_or(LogicError::NoCurrentQuestion)?;
        if self.current_answer.is_some() {
            return Err(LogicError::AlreadyAnswered);
        }
        if question.option(key).is_none() {
            return Err(LogicError::UnknownOption(key.0.clone()));
        }

        let correct = question.is_correct(key);
        self.current_answer = Some(key.clone());
        self.total_answered += 1;
        if correct {
            self.score += 1;
        }
        Ok(correct)
    }

    /// Moves past the answered question; returns true once every question is done.
    pub fn advance(&mut self) -> Result<bool, LogicError> {
        if self.current_index >= self.questions.len() {
            return Err(LogicError::NoCurrentQuestion);
        }
        if self.current_answer.is_none() {
            return Err(LogicError::NotAnswered);
        }
        self.current_index += 1;
        self.current_answer = None;
        Ok(self.is_complete())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
