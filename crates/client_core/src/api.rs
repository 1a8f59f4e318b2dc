use async_trait::async_trait;
use futures::stream::BoxStream;
use shared::protocol::{
    LevelCheckResponse, QuizQuestionPayload, RecordGameRequest, SkipLevelResponse,
    StartGameRequest, StartGameResponse, SubmitAnswerResponse,
};

use crate::error::ClientError;

/// Story text as it arrives from the backend, already decoded to UTF-8.
pub type StoryStream = BoxStream<'static, Result<String, ClientError>>;

/// Backend contract consumed by the launch flow and the session controller.
#[async_trait]
pub trait GameApi: Send + Sync {
    async fn start_game(&self, request: StartGameRequest)
        -> Result<StartGameResponse, ClientError>;
    async fn stream_story(&self) -> Result<StoryStream, ClientError>;
    async fn generate_quiz(&self, story: &str) -> Result<Vec<QuizQuestionPayload>, ClientError>;
    async fn submit_answer(&self, is_correct: bool) -> Result<SubmitAnswerResponse, ClientError>;
    async fn check_level_up(&self) -> Result<LevelCheckResponse, ClientError>;
    async fn record_game(&self, record: RecordGameRequest) -> Result<(), ClientError>;
    /// Returns the hint count the server holds after granting one.
    async fn use_hint(&self) -> Result<u32, ClientError>;
    async fn skip_level(&self) -> Result<SkipLevelResponse, ClientError>;
}
