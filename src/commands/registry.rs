use super::CommandResult;
use crate::core::session::ChatSession;

pub type CommandHandler = fn(&mut ChatSession, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "clear",
        usage: "/clear",
        help: "Start a new conversation.",
        handler: super::handle_clear,
    },
    Command {
        name: "export",
        usage: "/export [filename]",
        help: "Write the conversation to a JSON file.",
        handler: super::handle_export,
    },
    Command {
        name: "log",
        usage: "/log [filename]",
        help: "Set the transcript file, or pause/resume logging.",
        handler: super::handle_log,
    },
    Command {
        name: "model",
        usage: "/model [id]",
        help: "List models or switch model.",
        handler: super::handle_model,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave the chat.",
        handler: super::handle_quit,
    },
    Command {
        name: "exit",
        usage: "/exit",
        help: "Same as /quit.",
        handler: super::handle_quit,
    },
];
