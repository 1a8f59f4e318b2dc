//! Error taxonomy for backend calls and session transitions.

use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

use crate::controller::Phase;

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// The message a player should see: the backend's own wording when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.message.clone(),
            Self::Transport(reason) => format!("Could not reach the game server: {reason}"),
            Self::Decode(reason) => format!("The game server sent an unexpected reply: {reason}"),
            Self::InvalidUrl(reason) => format!("Invalid server address: {reason}"),
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Api(err) if err.is_client_error())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The backend refused the request; the player is sent home rather than retried.
    Validation,
    Transport,
    Logic,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogicError {
    #[error("no quiz questions are loaded")]
    NoQuestions,
    #[error("expected {expected:?} phase, session is in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error("this question has already been answered")]
    AlreadyAnswered,
    #[error("answer the current question first")]
    NotAnswered,
    #[error("there is no current question")]
    NoCurrentQuestion,
    #[error("'{0}' is not one of the options")]
    UnknownOption(String),
    #[error("no hints remaining")]
    NoHints,
    #[error("skipping a level needs {required} hints, {available} available")]
    NotEnoughHints { required: u32, available: u32 },
    #[error("skipping is only offered after a failed level")]
    SkipUnavailable,
    #[error("only available in leveled mode")]
    NotLeveled,
    #[error("the session has ended")]
    Terminated,
}

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("story generation failed: {0}")]
    StoryGeneration(ClientError),
    #[error("quiz generation failed: {0}")]
    QuizGeneration(ClientError),
    #[error("hint request failed: {0}")]
    Hint(ClientError),
    #[error("level skip failed: {0}")]
    SkipLevel(ClientError),
    #[error(transparent)]
    Logic(#[from] LogicError),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Logic(_) => ErrorKind::Logic,
            Self::StoryGeneration(err)
            | Self::QuizGeneration(err)
            | Self::Hint(err)
            | Self::SkipLevel(err) => match err {
                ClientError::Api(api) if api.code == ErrorCode::Validation => {
                    ErrorKind::Validation
                }
                ClientError::Api(api) if api.is_client_error() => ErrorKind::Validation,
                _ => ErrorKind::Transport,
            },
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::StoryGeneration(err)
            | Self::QuizGeneration(err)
            | Self::Hint(err)
            | Self::SkipLevel(err) => err.user_message(),
            Self::Logic(err) => err.to_string(),
        }
    }
}
