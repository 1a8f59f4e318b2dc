use std::io::Write;

use client_core::{ErrorKind, Phase, QuestOutcome, SessionEvent};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::debug;

/// Prints controller events to stdout until the controller goes away.
pub fn spawn(mut events: broadcast::Receiver<SessionEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => render(&event),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "renderer fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn render(event: &SessionEvent) {
    match event {
        SessionEvent::PhaseChanged(Phase::StoryLoading) => println!("\nWriting your story..."),
        SessionEvent::PhaseChanged(Phase::Terminated) => {
            println!("This game can't continue. Returning to the start page.")
        }
        SessionEvent::PhaseChanged(_) | SessionEvent::StoryReset => {}
        SessionEvent::StoryChunk(text) => {
            print!("{text}");
            let _ = std::io::stdout().flush();
        }
        SessionEvent::StoryComplete { word_count } => {
            println!("\n\n({word_count} words) Preparing your quiz...")
        }
        SessionEvent::QuizReady { question_count } => {
            println!("{question_count} questions ready. Type 'start' or 'skip' to begin the quiz.")
        }
        SessionEvent::QuestionShown {
            index,
            total,
            question,
        } => {
            println!("\nQuestion {} of {total}: {}", index + 1, question.text());
            for option in question.options() {
                println!("  {}) {}", option.key, option.text);
            }
        }
        SessionEvent::AnswerRecorded {
            correct,
            correct_key,
            score,
            total_answered,
            via_hint,
            ..
        } => {
            let verdict = if *correct { "Correct!" } else { "Not quite." };
            let hint = if *via_hint { " (hint)" } else { "" };
            println!("{verdict}{hint} The answer is {correct_key}. Score: {score}/{total_answered}");
        }
        SessionEvent::HintsChanged(hints) => println!("Hints: {hints}"),
        SessionEvent::LevelChanged { level, max_level } => println!("Level: {level}/{max_level}"),
        SessionEvent::ReadingTimerStarted { total_seconds } => {
            println!("Reading time: {total_seconds}s")
        }
        SessionEvent::ReadingTimerTick { remaining_seconds } => {
            if *remaining_seconds > 0 && remaining_seconds % 10 == 0 {
                println!("{remaining_seconds}s left to read");
            }
        }
        SessionEvent::ReadingTimerStopped => {}
        SessionEvent::Outcome(outcome) => render_outcome(outcome),
        SessionEvent::Notice(message) => println!("{message}"),
        SessionEvent::Error { kind, message } => match kind {
            ErrorKind::Logic => println!("! {message}"),
            ErrorKind::Validation | ErrorKind::Transport => println!("Error: {message}"),
        },
        SessionEvent::NavigateHome => println!("Goodbye."),
    }
}

fn render_outcome(outcome: &QuestOutcome) {
    let summary = outcome.summary();
    println!(
        "\nQuest finished: {}/{} correct ({})",
        summary.score,
        summary.total,
        summary.percentage_label()
    );
    match outcome {
        QuestOutcome::LevelUp {
            message,
            new_level,
            hints,
            top_level,
            ..
        } => {
            println!("{message}");
            if *top_level {
                println!("You have reached the top level!");
            }
            println!("Now at level {new_level} with {hints} hints. Type 'continue'.");
        }
        QuestOutcome::LevelFailed {
            message,
            skip_available,
            ..
        } => {
            println!("{message}");
            if *skip_available {
                println!("Type 'retry' or 'skip-level'.");
            } else {
                println!("Type 'retry'.");
            }
        }
        QuestOutcome::QuestComplete { .. } => println!("Type 'new' for another quest."),
    }
}
