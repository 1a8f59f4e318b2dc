use std::collections::HashMap;

use super::*;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_local_server() {
    let settings = Settings::default();
    assert_eq!(settings.server_url, "http://127.0.0.1:5000");
    assert_eq!(settings.game_mode, GameMode::Classic);
    assert_eq!(settings.max_level, 50);
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    let issues = apply_file(
        &mut settings,
        r#"
server_url = "http://quests.local:8080"
genre = "mystery"
game_mode = "levels"
max_level = "10"
"#,
    );
    assert_eq!(settings.server_url, "http://quests.local:8080");
    assert_eq!(settings.genre.as_str(), "mystery");
    assert_eq!(settings.game_mode, GameMode::Levels);
    assert_eq!(settings.max_level, 10);
    assert_eq!(settings.username, "player");
    assert!(issues.is_empty());
}

#[test]
fn invalid_values_keep_previous_layer() {
    let mut settings = Settings::default();
    let issues = apply_file(&mut settings, "game_mode = \"arcade\"\nmax_level = \"zero\"\n");
    assert_eq!(settings.game_mode, GameMode::Classic);
    assert_eq!(settings.max_level, 50);
    assert_eq!(
        issues,
        vec![
            ConfigIssue::UnknownGameMode("arcade".to_string()),
            ConfigIssue::InvalidMaxLevel("zero".to_string()),
        ]
    );

    let issues = apply_file(&mut settings, "this is not toml");
    assert_eq!(settings, Settings::default());
    assert!(matches!(issues.as_slice(), [ConfigIssue::UnreadableFile(_)]));
}

#[test]
fn app_prefixed_env_wins_over_quest_prefix() {
    let mut settings = Settings::default();
    let issues = apply_env(
        &mut settings,
        env_of(&[
            ("QUEST_SERVER_URL", "http://a:1"),
            ("APP__SERVER_URL", "http://b:2"),
            ("QUEST_GAME_MODE", "Leveled"),
            ("QUEST_LOG", "client_core=debug"),
            ("APP__GENRE", "   "),
        ]),
    );
    assert_eq!(settings.server_url, "http://b:2");
    assert_eq!(settings.game_mode, GameMode::Levels);
    assert_eq!(settings.log_filter, "client_core=debug");
    assert_eq!(settings.genre.as_str(), "adventure");
    assert_eq!(issues, vec![ConfigIssue::EmptyGenre]);
}

#[test]
fn bogus_env_game_mode_is_reported() {
    let mut settings = Settings::default();
    let issues = apply_env(&mut settings, env_of(&[("QUEST_GAME_MODE", "bogus")]));
    assert_eq!(settings.game_mode, GameMode::Classic);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].to_string(), "unknown game mode 'bogus'");
}

#[test]
fn missing_file_yields_defaults_plus_env() {
    let path = std::env::temp_dir().join("quest_cli_missing_config.toml");
    let (settings, _) = load_settings(&path);
    assert!(settings.max_level > 0);
    assert!(!settings.server_url.is_empty());
}
