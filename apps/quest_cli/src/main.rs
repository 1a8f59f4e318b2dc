use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{launch_game, HttpGameApi, PageConfig, SessionController};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod driver;
mod render;

use config::{load_settings, set_game_mode, set_genre, set_max_level, ConfigIssue, Settings};

#[derive(Parser, Debug)]
#[command(about = "Play story quests against a quest server from the terminal")]
struct Args {
    #[arg(long, default_value = "quest.toml")]
    config: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long, default_value = "")]
    password: String,
    #[arg(long)]
    genre: Option<String>,
    /// `classic` or `levels`.
    #[arg(long)]
    mode: Option<String>,
    #[arg(long)]
    max_level: Option<String>,
    #[arg(long)]
    log: Option<String>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if let Some(v) = &self.server_url {
            settings.server_url = v.clone();
        }
        if let Some(v) = &self.username {
            settings.username = v.clone();
        }
        if let Some(v) = &self.genre {
            issues.extend(set_genre(settings, v).err());
        }
        if let Some(v) = &self.mode {
            issues.extend(set_game_mode(settings, v).err());
        }
        if let Some(v) = &self.max_level {
            issues.extend(set_max_level(settings, v).err());
        }
        if let Some(v) = &self.log {
            settings.log_filter = v.clone();
        }
        issues
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (mut settings, mut issues) = load_settings(&args.config);
    issues.extend(args.apply(&mut settings));

    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    for issue in &issues {
        warn!(%issue, "ignoring setting");
    }

    let api = Arc::new(
        HttpGameApi::new(&settings.server_url)
            .with_context(|| format!("invalid server url '{}'", settings.server_url))?,
    );
    match api.health().await {
        Ok(health) => info!(
            status = %health.status,
            active_sessions = health.active_sessions,
            "server reachable"
        ),
        Err(err) => warn!(%err, "health check failed"),
    }

    api.login(&settings.username, &args.password)
        .await
        .with_context(|| format!("login as '{}' failed", settings.username))?;

    let launch = launch_game(api.as_ref(), settings.genre.clone(), settings.game_mode)
        .await
        .context("could not start a game")?;
    println!("Game started: {}", launch.game_url);

    let current_level = if settings.game_mode.is_leveled() {
        match api.score().await {
            Ok(score) => score.level.unwrap_or(1),
            Err(err) => {
                warn!(%err, "could not read the player's level; starting at 1");
                1
            }
        }
    } else {
        1
    };

    let page = PageConfig::from_launch(&launch, current_level, settings.max_level);
    let controller = SessionController::new(api, page);
    driver::run(controller).await
}
