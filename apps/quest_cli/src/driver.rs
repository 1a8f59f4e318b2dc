use anyhow::{Context, Result};
use client_core::{Phase, SessionController, SessionError, SessionEvent};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{debug, info};

use crate::{
    commands::{self, CommandError, PlayerCommand, HELP},
    render,
};

/// Runs the game until the player quits, stdin closes, or the session sends us home.
pub async fn run(mut controller: SessionController) -> Result<()> {
    let mut ticks = controller
        .take_timer_ticks()
        .context("reading timer ticks were already taken")?;
    let mut home = controller.subscribe_events();
    let renderer = render::spawn(controller.subscribe_events());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    println!("\nType 'start' to begin.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    info!("stdin closed");
                    break;
                };
                match commands::parse(&line) {
                    Ok(PlayerCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(err) = dispatch(&mut controller, command).await {
                            debug!(%err, "command refused");
                        }
                    }
                    Err(CommandError::Empty) => {}
                    Err(err) => println!("{err}"),
                }
            }
            Some(tick) = ticks.recv() => {
                if let Err(err) = controller.on_timer_tick(tick) {
                    debug!(%err, "reading timer expiry could not start the quiz");
                }
            }
            event = home.recv() => match event {
                Ok(SessionEvent::NavigateHome) | Err(RecvError::Closed) => break,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "driver skipped events"),
            }
        }
    }

    controller.flush_background().await;
    drop(controller);
    let _ = renderer.await;
    Ok(())
}

async fn dispatch(
    controller: &mut SessionController,
    command: PlayerCommand,
) -> Result<(), SessionError> {
    debug!(?command, phase = ?controller.phase(), "player command");
    match command {
        PlayerCommand::Start if controller.phase() == Phase::StoryReady => controller.start_quiz()?,
        PlayerCommand::Start if controller.phase() != Phase::Idle => {
            println!("A quest is already under way. Use 'new' to start another.");
        }
        PlayerCommand::Start | PlayerCommand::NewQuest => controller.load_new_quest().await?,
        PlayerCommand::SkipStory => controller.skip_story()?,
        PlayerCommand::Answer(key) => {
            let feedback = controller.select_answer(&key)?;
            if feedback.is_last {
                println!("That was the last question. Type 'next' for your results.");
            }
        }
        PlayerCommand::Next => {
            controller.advance().await?;
        }
        PlayerCommand::Hint => {
            controller.use_hint().await?;
        }
        PlayerCommand::SkipLevel => controller.skip_level().await?,
        PlayerCommand::Help => println!("{HELP}"),
        PlayerCommand::Quit => {}
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod tests;
