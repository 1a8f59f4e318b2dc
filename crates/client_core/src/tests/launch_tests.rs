use super::*;
use crate::fake_api::FakeGameApi;
use shared::protocol::StartGameResponse;

fn started(game_url: Option<&str>) -> StartGameResponse {
    StartGameResponse {
        success: true,
        session_id: Some("9f2c1ab04d3e5f61".to_string()),
        genre: Some(Genre::new("sci-fi")),
        game_mode: Some(GameMode::Levels),
        game_url: game_url.map(str::to_string),
        hints: Some(3),
        message: Some("Game started!".to_string()),
        error: None,
    }
}

#[tokio::test]
async fn launch_returns_game_url_and_seeds_page_config() {
    let api = FakeGameApi::new(&[], Vec::new())
        .with_start(Ok(started(Some("http://localhost:5000/game/9f2c1ab04d3e5f61"))));
    let calls = api.calls.clone();

    let launch = launch_game(&api, Genre::new("sci-fi"), GameMode::Levels)
        .await
        .expect("launch");
    assert_eq!(launch.game_url, "http://localhost:5000/game/9f2c1ab04d3e5f61");
    assert_eq!(launch.hints, 3);

    {
        let calls = calls.lock().await;
        assert_eq!(calls.start_requests.len(), 1);
        assert_eq!(calls.start_requests[0].genre.as_str(), "sci-fi");
        assert_eq!(calls.start_requests[0].game_mode, GameMode::Levels);
    }

    let config = PageConfig::from_launch(&launch, 0, DEFAULT_MAX_LEVEL);
    assert_eq!(config.current_level, 1);
    assert_eq!(config.hints, 3);
    assert_eq!(
        config.mode(),
        crate::session::Mode::Leveled {
            current_level: 1,
            max_level: DEFAULT_MAX_LEVEL
        }
    );
}

#[tokio::test]
async fn launch_requires_a_genre() {
    let api = FakeGameApi::new(&[], Vec::new());
    let calls = api.calls.clone();

    let err = launch_game(&api, Genre::new("  "), GameMode::Classic)
        .await
        .expect_err("blank genre");
    assert_eq!(err.user_message(), "Please choose a genre.");
    assert!(calls.lock().await.start_requests.is_empty());
}

#[tokio::test]
async fn launch_surfaces_server_error() {
    let api = FakeGameApi::new(&[], Vec::new()).with_start(Err(ApiError::from_status(
        503,
        "Cannot connect to the AI service (Ollama). Please ensure it is running.",
    )
    .into()));

    let err = launch_game(&api, Genre::new("fantasy"), GameMode::Classic)
        .await
        .expect_err("unavailable");
    assert!(err.user_message().contains("Ollama"));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn launch_without_game_url_is_malformed() {
    let api = FakeGameApi::new(&[], Vec::new()).with_start(Ok(started(None)));
    let err = launch_game(&api, Genre::new("fantasy"), GameMode::Classic)
        .await
        .expect_err("no url");
    assert!(matches!(err, ClientError::Decode(_)));
}
