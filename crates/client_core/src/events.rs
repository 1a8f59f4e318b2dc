//! Events published by the session controller for whatever front end renders the game.

use shared::domain::OptionKey;

use crate::{
    controller::{Phase, QuestOutcome},
    error::ErrorKind,
    session::Question,
};

#[derive(Debug, Clone)]
pub enum SessionEvent {
    PhaseChanged(Phase),
    StoryReset,
    StoryChunk(String),
    StoryComplete {
        word_count: usize,
    },
    QuizReady {
        question_count: usize,
    },
    QuestionShown {
        index: usize,
        total: usize,
        question: Question,
    },
    AnswerRecorded {
        key: OptionKey,
        correct: bool,
        correct_key: OptionKey,
        score: u32,
        total_answered: u32,
        via_hint: bool,
    },
    HintsChanged(u32),
    LevelChanged {
        level: u32,
        max_level: u32,
    },
    ReadingTimerStarted {
        total_seconds: u32,
    },
    ReadingTimerTick {
        remaining_seconds: u32,
    },
    ReadingTimerStopped,
    Outcome(QuestOutcome),
    Notice(String),
    Error {
        kind: ErrorKind,
        message: String,
    },
    /// The session is over; the front end should leave for the start page.
    NavigateHome,
}
