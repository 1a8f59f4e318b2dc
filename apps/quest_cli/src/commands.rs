use shared::domain::OptionKey;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Load the first quest of the session.
    Start,
    /// Stop reading and go straight to the quiz.
    SkipStory,
    Answer(OptionKey),
    Next,
    Hint,
    /// Next quest after results; also how a failed load is retried.
    NewQuest,
    SkipLevel,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (type 'help' for the list)")]
    Unknown(String),
}

pub fn parse(line: &str) -> Result<PlayerCommand, CommandError> {
    let input = line.trim();
    if input.is_empty() {
        return Err(CommandError::Empty);
    }

    let command = match input.to_ascii_lowercase().as_str() {
        "start" => PlayerCommand::Start,
        "skip" => PlayerCommand::SkipStory,
        "next" => PlayerCommand::Next,
        "hint" => PlayerCommand::Hint,
        "new" | "continue" | "retry" => PlayerCommand::NewQuest,
        "skip-level" | "skip_level" => PlayerCommand::SkipLevel,
        "help" | "?" => PlayerCommand::Help,
        "quit" | "exit" => PlayerCommand::Quit,
        other if is_option_letter(other) => PlayerCommand::Answer(OptionKey::normalized(other)),
        _ => return Err(CommandError::Unknown(input.to_string())),
    };
    Ok(command)
}

fn is_option_letter(input: &str) -> bool {
    let mut chars = input.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphabetic())
}

pub const HELP: &str = "\
Commands:
  start        load a quest
  skip         skip the reading time and start the quiz
  a, b, c ...  answer the current question
  next         go to the next question
  hint         spend a hint on the current question
  new          play another quest (also: continue, retry)
  skip-level   spend 2 hints to pass a failed level
  quit         leave the game";

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
