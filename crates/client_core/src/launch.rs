//! Start-page flow: choose genre and mode, ask the server for a game, seed the session.

use shared::{
    domain::{GameMode, Genre},
    error::ApiError,
    protocol::StartGameRequest,
};
use tracing::info;

use crate::{api::GameApi, controller::PageConfig, error::ClientError};

pub const DEFAULT_MAX_LEVEL: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLaunch {
    pub session_id: Option<String>,
    pub game_url: String,
    pub genre: Genre,
    pub game_mode: GameMode,
    pub hints: u32,
}

pub async fn launch_game(
    api: &dyn GameApi,
    genre: Genre,
    game_mode: GameMode,
) -> Result<GameLaunch, ClientError> {
    if genre.as_str().trim().is_empty() {
        return Err(ApiError::validation("Please choose a genre.").into());
    }

    let reply = api
        .start_game(StartGameRequest {
            genre: genre.clone(),
            game_mode,
        })
        .await?;
    let game_url = reply
        .game_url
        .ok_or_else(|| ClientError::Decode("start-game reply without game_url".into()))?;

    info!(%genre, %game_mode, %game_url, "game started");
    Ok(GameLaunch {
        session_id: reply.session_id,
        game_url,
        genre: reply.genre.unwrap_or(genre),
        game_mode: reply.game_mode.unwrap_or(game_mode),
        hints: reply.hints.unwrap_or(0),
    })
}

impl PageConfig {
    pub fn from_launch(launch: &GameLaunch, current_level: u32, max_level: u32) -> Self {
        Self {
            genre: launch.genre.clone(),
            game_mode: launch.game_mode,
            current_level: current_level.max(1),
            max_level,
            hints: launch.hints,
        }
    }
}

#[cfg(test)]
#[path = "tests/launch_tests.rs"]
mod tests;
