use super::*;

#[test]
fn option_letters_are_normalized() {
    assert_eq!(parse(" b "), Ok(PlayerCommand::Answer(OptionKey::new("B"))));
    assert_eq!(parse("D"), Ok(PlayerCommand::Answer(OptionKey::new("D"))));
}

#[test]
fn words_map_to_commands() {
    assert_eq!(parse("START"), Ok(PlayerCommand::Start));
    assert_eq!(parse("skip"), Ok(PlayerCommand::SkipStory));
    assert_eq!(parse("skip-level"), Ok(PlayerCommand::SkipLevel));
    assert_eq!(parse("retry"), Ok(PlayerCommand::NewQuest));
    assert_eq!(parse("continue"), Ok(PlayerCommand::NewQuest));
    assert_eq!(parse("exit"), Ok(PlayerCommand::Quit));
}

#[test]
fn blank_and_unknown_input_is_rejected() {
    assert_eq!(parse("   "), Err(CommandError::Empty));
    assert_eq!(
        parse("dance"),
        Err(CommandError::Unknown("dance".to_string()))
    );
    assert!(matches!(parse("7"), Err(CommandError::Unknown(_))));
}
