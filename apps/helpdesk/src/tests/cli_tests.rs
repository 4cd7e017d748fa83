use super::*;

#[test]
fn blank_lines_are_ignored() {
    assert_eq!(parse_command("   "), Ok(None));
}

#[test]
fn free_text_arguments_keep_inner_spaces() {
    assert_eq!(
        parse_command("home  Università di Pisa "),
        Ok(Some(Command::Home("Università di Pisa".into())))
    );
    assert_eq!(
        parse_command("dept Computer Engineering"),
        Ok(Some(Command::Department("Computer Engineering".into())))
    );
    assert_eq!(parse_command("home"), Ok(Some(Command::Home(String::new()))));
}

#[test]
fn period_accepts_either_casing() {
    assert_eq!(
        parse_command("period Spring"),
        Ok(Some(Command::Period(Period::Spring)))
    );
    assert_eq!(
        parse_command("period winter"),
        Err(CommandError::Usage("period fall|spring"))
    );
}

#[test]
fn exams_target_is_position_or_id() {
    assert_eq!(
        parse_command("exams 2"),
        Ok(Some(Command::Exams(ExamsTarget::Position(2))))
    );
    assert_eq!(
        parse_command("exams UPC-EETAC"),
        Ok(Some(Command::Exams(ExamsTarget::Id(UniversityId::new(
            "UPC-EETAC"
        )))))
    );
    assert!(parse_command("exams 0").is_err());
    assert!(parse_command("exams").is_err());
}

#[test]
fn reset_defaults_to_first_stage() {
    assert_eq!(parse_command("reset"), Ok(Some(Command::Reset(Stage::Bando))));
    assert_eq!(parse_command("reset 3"), Ok(Some(Command::Reset(Stage::Esami))));
    assert_eq!(
        parse_command("reset 4"),
        Err(CommandError::Usage("reset [1|2|3]"))
    );
}

#[test]
fn api_subcommands() {
    assert_eq!(parse_command("api save"), Ok(Some(Command::ApiSave)));
    assert_eq!(
        parse_command("api http://10.0.0.5:8000"),
        Ok(Some(Command::Api("http://10.0.0.5:8000".into())))
    );
    assert!(parse_command("api").is_err());
}

#[test]
fn mock_toggle_and_unknown_words() {
    assert_eq!(parse_command("MOCK on"), Ok(Some(Command::Mock(true))));
    assert_eq!(parse_command("mock off"), Ok(Some(Command::Mock(false))));
    assert_eq!(
        parse_command("fly"),
        Err(CommandError::Unknown("fly".into()))
    );
}
