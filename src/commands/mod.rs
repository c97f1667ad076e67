mod registry;

pub use registry::{all_commands, find_command, CommandInvocation};

use crate::api::models::{find_model, CATALOG};
use crate::core::conversation::export_file_name;
use crate::core::session::ChatSession;
use chrono::Utc;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    Notice(String),
    ProcessAsMessage(String),
    Quit,
}

/// Route one line of input. Unknown `/words` are sent as ordinary messages.
pub fn process_input(session: &mut ChatSession, input: &str) -> CommandResult {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return CommandResult::Continue;
    }

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(trimmed.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(trimmed.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match find_command(command_name) {
        Some(command) => (command.handler)(session, CommandInvocation { args }),
        None => CommandResult::ProcessAsMessage(trimmed.to_string()),
    }
}

pub fn help_text() -> String {
    let mut help = String::from("Commands:\n");
    for command in all_commands() {
        help.push_str(&format!("  {:<20} {}\n", command.usage, command.help));
    }
    help.push_str("\nPress Ctrl+C while a reply is streaming to stop it.");
    help
}

pub(super) fn handle_help(
    _session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Notice(help_text())
}

pub(super) fn handle_clear(
    session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    session.clear();
    CommandResult::Notice("Conversation cleared.".to_string())
}

pub(super) fn handle_quit(
    _session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Quit
}

pub(super) fn handle_log(
    session: &mut ChatSession,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let result = if invocation.args.is_empty() {
        session.logging_mut().toggle_logging()
    } else {
        session
            .logging_mut()
            .set_log_file(invocation.args.to_string())
    };

    match result {
        Ok(message) => CommandResult::Notice(message),
        Err(e) => CommandResult::Notice(format!("Log error: {e}")),
    }
}

pub(super) fn handle_model(
    session: &mut ChatSession,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    if invocation.args.is_empty() {
        let mut listing = String::from("Models:\n");
        for model in CATALOG {
            let marker = if model.id == session.model() { "*" } else { " " };
            listing.push_str(&format!(
                "{marker} {:<16} {} ({})\n",
                model.id, model.display_name, model.description
            ));
        }
        listing.push_str(&format!("Current: {}", session.model()));
        return CommandResult::Notice(listing);
    }

    let id = invocation.args;
    let notice = match find_model(id) {
        Some(model) => {
            session.set_model(model.id);
            format!("Model set to {}", model.display_name)
        }
        None => {
            session.set_model(id);
            format!("Model set to {id} (not in the built-in list)")
        }
    };
    CommandResult::Notice(notice)
}

pub(super) fn handle_export(
    session: &mut ChatSession,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let filename = if invocation.args.is_empty() {
        export_file_name(Utc::now().date_naive())
    } else {
        invocation.args.to_string()
    };

    match export_conversation(session, &filename) {
        Ok(()) => CommandResult::Notice(format!("Exported: {filename}")),
        Err(e) => CommandResult::Notice(format!("Export error: {e}")),
    }
}

pub fn export_conversation(
    session: &ChatSession,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if session.conversation().is_empty() {
        return Err("No conversation to export - the chat history is empty.".into());
    }

    if Path::new(filename).exists() {
        return Err(format!(
            "File '{filename}' already exists. Please specify a different filename with /export <filename>."
        )
        .into());
    }

    let json = session.conversation().export_json(session.model())?;
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(json.as_bytes())?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests;
