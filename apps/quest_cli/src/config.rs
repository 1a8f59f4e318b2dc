use std::{collections::HashMap, fs, path::Path};

use client_core::DEFAULT_MAX_LEVEL;
use shared::domain::{GameMode, Genre};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_url: String,
    pub username: String,
    pub genre: Genre,
    pub game_mode: GameMode,
    pub max_level: u32,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            username: "player".into(),
            genre: Genre::new("adventure"),
            game_mode: GameMode::Classic,
            max_level: DEFAULT_MAX_LEVEL,
            log_filter: "info".into(),
        }
    }
}

/// A setting that was ignored; the previous layer's value stays in effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("config file is not valid TOML: {0}")]
    UnreadableFile(String),
    #[error("empty genre")]
    EmptyGenre,
    #[error("unknown game mode '{0}'")]
    UnknownGameMode(String),
    #[error("max level must be a positive number, got '{0}'")]
    InvalidMaxLevel(String),
}

/// Defaults, then the TOML file at `path` if it exists, then the environment.
///
/// Logging is not up yet when this runs, so ignored values are returned instead of logged.
pub fn load_settings(path: &Path) -> (Settings, Vec<ConfigIssue>) {
    let mut settings = Settings::default();
    let mut issues = Vec::new();

    if let Ok(raw) = fs::read_to_string(path) {
        issues.extend(apply_file(&mut settings, &raw));
    }
    issues.extend(apply_env(&mut settings, |key| std::env::var(key).ok()));

    (settings, issues)
}

pub fn apply_file(settings: &mut Settings, raw: &str) -> Vec<ConfigIssue> {
    let file_cfg = match toml::from_str::<HashMap<String, String>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => return vec![ConfigIssue::UnreadableFile(err.message().to_string())],
    };

    let mut issues = Vec::new();
    if let Some(v) = file_cfg.get("server_url") {
        settings.server_url = v.clone();
    }
    if let Some(v) = file_cfg.get("username") {
        settings.username = v.clone();
    }
    if let Some(v) = file_cfg.get("genre") {
        issues.extend(set_genre(settings, v).err());
    }
    if let Some(v) = file_cfg.get("game_mode") {
        issues.extend(set_game_mode(settings, v).err());
    }
    if let Some(v) = file_cfg.get("max_level") {
        issues.extend(set_max_level(settings, v).err());
    }
    if let Some(v) = file_cfg.get("log_filter") {
        settings.log_filter = v.clone();
    }
    issues
}

/// `QUEST_*` variables first, then the `APP__*` spelling, which wins when both are set.
pub fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if let Some(v) = var("QUEST_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("QUEST_USERNAME") {
        settings.username = v;
    }
    if let Some(v) = var("APP__USERNAME") {
        settings.username = v;
    }

    if let Some(v) = var("QUEST_GENRE") {
        issues.extend(set_genre(settings, &v).err());
    }
    if let Some(v) = var("APP__GENRE") {
        issues.extend(set_genre(settings, &v).err());
    }

    if let Some(v) = var("QUEST_GAME_MODE") {
        issues.extend(set_game_mode(settings, &v).err());
    }
    if let Some(v) = var("APP__GAME_MODE") {
        issues.extend(set_game_mode(settings, &v).err());
    }

    if let Some(v) = var("QUEST_MAX_LEVEL") {
        issues.extend(set_max_level(settings, &v).err());
    }
    if let Some(v) = var("APP__MAX_LEVEL") {
        issues.extend(set_max_level(settings, &v).err());
    }

    if let Some(v) = var("QUEST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    issues
}

pub fn set_genre(settings: &mut Settings, raw: &str) -> Result<(), ConfigIssue> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigIssue::EmptyGenre);
    }
    settings.genre = Genre::new(raw);
    Ok(())
}

pub fn set_game_mode(settings: &mut Settings, raw: &str) -> Result<(), ConfigIssue> {
    settings.game_mode = raw
        .parse::<GameMode>()
        .map_err(|_| ConfigIssue::UnknownGameMode(raw.to_string()))?;
    Ok(())
}

pub fn set_max_level(settings: &mut Settings, raw: &str) -> Result<(), ConfigIssue> {
    match raw.trim().parse::<u32>() {
        Ok(level) if level > 0 => {
            settings.max_level = level;
            Ok(())
        }
        _ => Err(ConfigIssue::InvalidMaxLevel(raw.to_string())),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
