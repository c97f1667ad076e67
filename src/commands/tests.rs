use super::*;
use crate::core::config::Config;
use crate::core::conversation::ReplyOutcome;
use crate::utils::logging::LoggingState;
use tempfile::tempdir;

fn create_test_session() -> ChatSession {
    let config = Config {
        api_key: Some("sk-test".to_string()),
        ..Default::default()
    };
    ChatSession::new(
        reqwest::Client::new(),
        config,
        None,
        true,
        LoggingState::new(None).unwrap(),
    )
}

#[test]
fn registry_lists_commands() {
    let commands = all_commands();
    for name in ["help", "clear", "export", "log", "model", "quit"] {
        assert!(commands.iter().any(|cmd| cmd.name == name), "{name}");
    }
    assert!(find_command("HELP").is_some());
}

#[test]
fn plain_text_and_unknown_commands_are_messages() {
    let mut session = create_test_session();
    assert_eq!(
        process_input(&mut session, "  hello there "),
        CommandResult::ProcessAsMessage("hello there".to_string())
    );
    assert_eq!(
        process_input(&mut session, "/usr/bin is a path"),
        CommandResult::ProcessAsMessage("/usr/bin is a path".to_string())
    );
    assert_eq!(
        process_input(&mut session, "/"),
        CommandResult::ProcessAsMessage("/".to_string())
    );
    assert_eq!(process_input(&mut session, "   "), CommandResult::Continue);
}

#[test]
fn quit_and_exit_leave_the_loop() {
    let mut session = create_test_session();
    assert_eq!(process_input(&mut session, "/quit"), CommandResult::Quit);
    assert_eq!(process_input(&mut session, "/exit"), CommandResult::Quit);
}

#[test]
fn help_lists_every_usage() {
    let mut session = create_test_session();
    let CommandResult::Notice(text) = process_input(&mut session, "/help") else {
        panic!("help should produce a notice");
    };
    for command in all_commands() {
        assert!(text.contains(command.usage), "{}", command.usage);
    }
}

#[test]
fn model_command_switches_and_lists() {
    let mut session = create_test_session();

    let result = process_input(&mut session, "/model gpt-4o");
    assert_eq!(
        result,
        CommandResult::Notice("Model set to GPT-4o".to_string())
    );
    assert_eq!(session.model(), "gpt-4o");

    let CommandResult::Notice(listing) = process_input(&mut session, "/model") else {
        panic!("listing expected");
    };
    assert!(listing.contains("* gpt-4o "));
    assert!(listing.ends_with("Current: gpt-4o"));

    process_input(&mut session, "/model local-llama");
    assert_eq!(session.model(), "local-llama");
}

#[test]
fn clear_empties_history() {
    let mut session = create_test_session();
    session.finish_reply(&ReplyOutcome::Completed("hi".to_string()));
    assert!(!session.conversation().is_empty());

    process_input(&mut session, "/clear");
    assert!(session.conversation().is_empty());
}

#[test]
fn export_writes_json_and_refuses_to_overwrite() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("chat.json");
    let path_str = path.to_string_lossy().into_owned();

    let mut session = create_test_session();
    let result = process_input(&mut session, &format!("/export {path_str}"));
    assert!(matches!(result, CommandResult::Notice(ref text) if text.contains("history is empty")));
    assert!(!path.exists());

    session.finish_reply(&ReplyOutcome::Completed("hello".to_string()));
    let result = process_input(&mut session, &format!("/export {path_str}"));
    assert_eq!(result, CommandResult::Notice(format!("Exported: {path_str}")));

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["messages"][0]["content"], "hello");
    assert_eq!(value["model"], session.model());

    let result = process_input(&mut session, &format!("/export {path_str}"));
    assert!(matches!(result, CommandResult::Notice(ref text) if text.contains("already exists")));
}

#[test]
fn log_command_enables_and_toggles() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("transcript.log");
    let path_str = path.to_string_lossy().into_owned();

    let mut session = create_test_session();
    let result = process_input(&mut session, "/log");
    assert!(matches!(result, CommandResult::Notice(ref text) if text.starts_with("Log error")));

    let result = process_input(&mut session, &format!("/log {path_str}"));
    assert_eq!(
        result,
        CommandResult::Notice(format!("Logging enabled to: {path_str}"))
    );
    assert!(session.logging().is_active());

    process_input(&mut session, "/log");
    assert!(!session.logging().is_active());
}
