//! In-memory backend used by the controller and launch tests.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use shared::{
    domain::OptionKey,
    error::ApiError,
    protocol::{
        LevelCheckResponse, QuizQuestionPayload, RecordGameRequest, SkipLevelResponse,
        StartGameRequest, StartGameResponse, SubmitAnswerResponse,
    },
};
use tokio::sync::Mutex;

use crate::{
    api::{GameApi, StoryStream},
    error::ClientError,
};

#[derive(Debug, Default)]
pub(crate) struct Calls {
    pub start_requests: Vec<StartGameRequest>,
    pub story_streams: u32,
    pub quiz_stories: Vec<String>,
    pub submitted: Vec<bool>,
    pub level_checks: u32,
    pub recorded: Vec<RecordGameRequest>,
    pub hint_requests: u32,
    pub skip_requests: u32,
}

pub(crate) struct FakeGameApi {
    story_chunks: Vec<String>,
    story_error: Option<ClientError>,
    stream_error: Option<ClientError>,
    quiz: Result<Vec<QuizQuestionPayload>, ClientError>,
    level_check: Result<LevelCheckResponse, ClientError>,
    hint: Result<u32, ClientError>,
    skip: Result<SkipLevelResponse, ClientError>,
    start: Result<StartGameResponse, ClientError>,
    fail_submissions: bool,
    pub calls: Arc<Mutex<Calls>>,
}

impl FakeGameApi {
    pub fn new(story: &[&str], questions: Vec<QuizQuestionPayload>) -> Self {
        Self {
            story_chunks: story.iter().map(|chunk| chunk.to_string()).collect(),
            story_error: None,
            stream_error: None,
            quiz: Ok(questions),
            level_check: Ok(LevelCheckResponse {
                success: true,
                ..LevelCheckResponse::default()
            }),
            hint: Err(ApiError::rejected("No hints remaining!").into()),
            skip: Err(ApiError::from_status(400, "Not enough hints to skip level! (Requires 2)").into()),
            start: Err(ApiError::from_status(401, "User not logged in").into()),
            fail_submissions: false,
            calls: Arc::new(Mutex::new(Calls::default())),
        }
    }

    pub fn with_story_error(mut self, err: ClientError) -> Self {
        self.story_error = Some(err);
        self
    }

    pub fn with_stream_error(mut self, err: ClientError) -> Self {
        self.stream_error = Some(err);
        self
    }

    pub fn with_quiz(mut self, quiz: Result<Vec<QuizQuestionPayload>, ClientError>) -> Self {
        self.quiz = quiz;
        self
    }

    pub fn with_level_check(mut self, reply: Result<LevelCheckResponse, ClientError>) -> Self {
        self.level_check = reply;
        self
    }

    pub fn with_hint(mut self, reply: Result<u32, ClientError>) -> Self {
        self.hint = reply;
        self
    }

    pub fn with_skip(mut self, reply: Result<SkipLevelResponse, ClientError>) -> Self {
        self.skip = reply;
        self
    }

    pub fn with_start(mut self, reply: Result<StartGameResponse, ClientError>) -> Self {
        self.start = reply;
        self
    }

    pub fn failing_submissions(mut self) -> Self {
        self.fail_submissions = true;
        self
    }
}

#[async_trait]
impl GameApi for FakeGameApi {
    async fn start_game(
        &self,
        request: StartGameRequest,
    ) -> Result<StartGameResponse, ClientError> {
        self.calls.lock().await.start_requests.push(request);
        self.start.clone()
    }

    async fn stream_story(&self) -> Result<StoryStream, ClientError> {
        self.calls.lock().await.story_streams += 1;
        if let Some(err) = &self.story_error {
            return Err(err.clone());
        }
        let mut items: Vec<Result<String, ClientError>> =
            self.story_chunks.iter().cloned().map(Ok).collect();
        if let Some(err) = &self.stream_error {
            items.push(Err(err.clone()));
        }
        Ok(stream::iter(items).boxed())
    }

    async fn generate_quiz(&self, story: &str) -> Result<Vec<QuizQuestionPayload>, ClientError> {
        self.calls.lock().await.quiz_stories.push(story.to_string());
        self.quiz.clone()
    }

    async fn submit_answer(&self, is_correct: bool) -> Result<SubmitAnswerResponse, ClientError> {
        self.calls.lock().await.submitted.push(is_correct);
        if self.fail_submissions {
            return Err(ClientError::Transport("connection reset".into()));
        }
        Ok(SubmitAnswerResponse {
            success: true,
            ..SubmitAnswerResponse::default()
        })
    }

    async fn check_level_up(&self) -> Result<LevelCheckResponse, ClientError> {
        self.calls.lock().await.level_checks += 1;
        self.level_check.clone()
    }

    async fn record_game(&self, record: RecordGameRequest) -> Result<(), ClientError> {
        self.calls.lock().await.recorded.push(record);
        Ok(())
    }

    async fn use_hint(&self) -> Result<u32, ClientError> {
        self.calls.lock().await.hint_requests += 1;
        self.hint.clone()
    }

    async fn skip_level(&self) -> Result<SkipLevelResponse, ClientError> {
        self.calls.lock().await.skip_requests += 1;
        self.skip.clone()
    }
}

pub(crate) fn question(text: &str, options: &[(&str, &str)], correct: &str) -> QuizQuestionPayload {
    QuizQuestionPayload {
        question: text.to_string(),
        options: options
            .iter()
            .map(|(key, text)| (OptionKey::new(*key), text.to_string()))
            .collect(),
        correct: OptionKey::new(correct),
    }
}

/// Three-option questions whose correct answer is always `B`.
pub(crate) fn sample_questions(count: usize) -> Vec<QuizQuestionPayload> {
    (0..count)
        .map(|i| {
            question(
                &format!("Question {}?", i + 1),
                &[("A", "Lantern"), ("B", "Compass"), ("C", "Scroll")],
                "B",
            )
        })
        .collect()
}
