pub mod api;
pub mod controller;
pub mod error;
pub mod events;
pub mod http;
pub mod launch;
pub mod session;
pub mod timer;

pub use api::{GameApi, StoryStream};
pub use controller::{
    AnswerFeedback, PageConfig, Phase, QuestOutcome, SessionController, HOME_REDIRECT_DELAY,
    SKIP_LEVEL_HINT_COST,
};
pub use error::{ClientError, ErrorKind, LogicError, SessionError};
pub use events::SessionEvent;
pub use http::HttpGameApi;
pub use launch::{launch_game, GameLaunch, DEFAULT_MAX_LEVEL};
pub use session::{AnswerOption, Mode, QuestSummary, Question, Session};
pub use timer::{ReadingTimer, TimerTick};

#[cfg(test)]
#[path = "tests/fake_api.rs"]
pub(crate) mod fake_api;
