//! reqwest-backed implementation of [`GameApi`] against the game server's JSON API.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    error::{ApiError, ErrorBody},
    protocol::{
        Acknowledged, GenerateQuizRequest, GenerateQuizResponse, HealthResponse,
        LevelCheckResponse, QuizQuestionPayload, RecordGameRequest, RecordGameResponse,
        ScoreResponse, SkipLevelResponse, StartGameRequest, StartGameResponse,
        SubmitAnswerRequest, SubmitAnswerResponse, UseHintResponse,
    },
};
use tracing::{debug, info};
use url::Url;

use crate::{
    api::{GameApi, StoryStream},
    error::ClientError,
};

pub struct HttpGameApi {
    http: Client,
    base_url: Url,
}

impl HttpGameApi {
    /// Builds a client with its own cookie jar so the login session carries across calls.
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(server_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Form login; the server answers with a redirect and sets the session cookie.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let res = self
            .http
            .post(self.endpoint("login")?)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(read_api_error(res).await.into());
        }
        info!(username, "logged in");
        Ok(())
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let res = self.http.get(self.endpoint("api/health")?).send().await?;
        if !res.status().is_success() {
            return Err(read_api_error(res).await.into());
        }
        Ok(res.json().await?)
    }

    pub async fn score(&self) -> Result<ScoreResponse, ClientError> {
        let res = self.http.get(self.endpoint("api/get-score")?).send().await?;
        acknowledged(res).await
    }

    async fn post<T>(&self, path: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Acknowledged,
    {
        let res = self.http.post(self.endpoint(path)?).send().await?;
        acknowledged(res).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Acknowledged,
    {
        let res = self
            .http
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        acknowledged(res).await
    }
}

#[async_trait]
impl GameApi for HttpGameApi {
    async fn start_game(
        &self,
        request: StartGameRequest,
    ) -> Result<StartGameResponse, ClientError> {
        self.post_json("api/start-game", &request).await
    }

    async fn stream_story(&self) -> Result<StoryStream, ClientError> {
        let res = self
            .http
            .post(self.endpoint("api/generate-story-stream")?)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(read_api_error(res).await.into());
        }

        let bytes = res.bytes_stream().boxed();
        let story = stream::unfold(
            (bytes, Utf8ChunkDecoder::default(), false),
            |(mut bytes, mut decoder, finished)| async move {
                if finished {
                    return None;
                }
                loop {
                    match bytes.next().await {
                        Some(Ok(chunk)) => {
                            let text = decoder.push(&chunk);
                            if !text.is_empty() {
                                return Some((Ok(text), (bytes, decoder, false)));
                            }
                        }
                        Some(Err(err)) => {
                            return Some((Err(ClientError::from(err)), (bytes, decoder, true)));
                        }
                        None => {
                            let tail = decoder.finish();
                            if tail.is_empty() {
                                return None;
                            }
                            return Some((Ok(tail), (bytes, decoder, true)));
                        }
                    }
                }
            },
        );
        Ok(story.boxed())
    }

    async fn generate_quiz(&self, story: &str) -> Result<Vec<QuizQuestionPayload>, ClientError> {
        let reply: GenerateQuizResponse = self
            .post_json(
                "api/generate-quiz",
                &GenerateQuizRequest {
                    story: story.to_string(),
                },
            )
            .await?;
        debug!(count = reply.questions.len(), "quiz questions received");
        Ok(reply.questions)
    }

    async fn submit_answer(&self, is_correct: bool) -> Result<SubmitAnswerResponse, ClientError> {
        self.post_json("api/submit-answer", &SubmitAnswerRequest { is_correct })
            .await
    }

    async fn check_level_up(&self) -> Result<LevelCheckResponse, ClientError> {
        self.post("api/check-level-up").await
    }

    async fn record_game(&self, record: RecordGameRequest) -> Result<(), ClientError> {
        let _: RecordGameResponse = self.post_json("api/record-game", &record).await?;
        Ok(())
    }

    async fn use_hint(&self) -> Result<u32, ClientError> {
        let reply: UseHintResponse = self.post("api/use-hint").await?;
        reply
            .hints_remaining
            .ok_or_else(|| ClientError::Decode("use-hint reply without hints_remaining".into()))
    }

    async fn skip_level(&self) -> Result<SkipLevelResponse, ClientError> {
        self.post("api/skip-level").await
    }
}

/// Decodes a JSON reply and turns `success: false` or a failing status into an error.
async fn acknowledged<T>(res: Response) -> Result<T, ClientError>
where
    T: DeserializeOwned + Acknowledged,
{
    if !res.status().is_success() {
        return Err(read_api_error(res).await.into());
    }
    let body: T = res.json().await?;
    if !body.success() {
        let message = body
            .error_message()
            .unwrap_or("request was not accepted")
            .to_string();
        return Err(ApiError::rejected(message).into());
    }
    Ok(body)
}

async fn read_api_error(res: Response) -> ApiError {
    let status = res.status();
    let raw = res.text().await.unwrap_or_default();
    ApiError::from_status(status.as_u16(), error_message_from_body(status, &raw))
}

fn error_message_from_body(status: StatusCode, raw: &str) -> String {
    if let Ok(body) = serde_json::from_str::<ErrorBody>(raw) {
        return body.error;
    }
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Joins multi-byte characters that the transport split across chunk boundaries.
#[derive(Debug, Default)]
pub(crate) struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub(crate) fn push(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut text = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    text.push_str(valid);
                    self.pending.clear();
                    return text;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    text.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        // Incomplete sequence at the end: keep it for the next chunk.
                        None => {
                            self.pending.drain(..valid);
                            return text;
                        }
                        Some(invalid) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + invalid);
                        }
                    }
                }
            }
        }
    }

    pub(crate) fn finish(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        text
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
