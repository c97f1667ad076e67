//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod chat;
pub mod model_list;
pub mod say;
pub mod settings;

use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cli::chat::run_chat;
use crate::cli::model_list::list_models;
use crate::cli::say::run_say;
use crate::cli::settings::{apply_set, apply_unset, mutate_config};
use crate::core::config::data::API_KEY_ENV;
use crate::core::config::Config;
use crate::core::session::ChatSession;
use crate::utils::logging::LoggingState;

/// Environment variable holding the diagnostic log filter.
pub const LOG_FILTER_ENV: &str = "PARLEY_LOG";

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "A streaming chat client for OpenAI-compatible APIs")]
#[command(
    long_about = "Parley is a line-oriented chat client that streams replies from an \
OpenAI-compatible chat completions endpoint.\n\n\
Environment Variables (fallback if not configured):\n\
  OPENAI_API_KEY    Your API key\n\
  OPENAI_BASE_URL   Custom API base URL (defaults to https://api.openai.com/v1)\n\
  PARLEY_LOG        Diagnostic log filter, e.g. parley=debug (defaults to warn)\n\n\
Commands in chat:\n\
  /help             Show available commands\n\
  /model [id]       List models or switch model\n\
  /export [file]    Write the conversation to a JSON file\n\
  /log [file]       Set the transcript file, or pause/resume logging\n\
  Ctrl+C            Stop a streaming reply"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for this run
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Enable transcript logging to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<String>,

    /// Request the whole reply at once instead of streaming it
    #[arg(long, global = true)]
    pub no_stream: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive chat (default)
    Chat,
    /// Send one prompt and print the reply
    Say {
        /// Prompt text (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// List the built-in models
    Models,
    /// Set configuration values, or show them when no key is given
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key (can be multiple words for system-prompt)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Reset a configuration value to its default
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let stream = !args.no_stream;

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let config = Config::load()?;
            let logging = LoggingState::new(args.log)?;
            let session =
                ChatSession::new(reqwest::Client::new(), config, args.model, stream, logging);
            run_chat(session).await
        }
        Commands::Say { prompt } => run_say(prompt, args.model, args.log, stream).await,
        Commands::Models => list_models(),
        Commands::Set { key, value } => {
            let Some(key) = key else {
                Config::load()?.print_all();
                return Ok(());
            };
            let value = value.unwrap_or_default();
            report_setting(mutate_config(|config| apply_set(config, &key, &value)))
        }
        Commands::Unset { key } => {
            report_setting(mutate_config(|config| apply_unset(config, &key)))
        }
    }
}

fn report_setting(result: Result<String, settings::SettingError>) -> Result<(), Box<dyn Error>> {
    match result {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(err) => {
            err.print();
            std::process::exit(err.exit_code());
        }
    }
}

/// Shown when a message cannot be sent because no API key is configured.
pub fn missing_credential_help() -> String {
    format!(
        "⚠️  No API key configured.\n\nPlease either:\n  1. Run: parley set api-key <your-api-key>, or\n  2. Set the environment variable: export {API_KEY_ENV}=\"your-api-key-here\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn no_subcommand_defaults_to_chat() {
        let args = Args::try_parse_from(["parley", "-m", "gpt-4o"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.model.as_deref(), Some("gpt-4o"));
        assert!(!args.no_stream);
    }

    #[test]
    fn say_collects_prompt_words_and_global_flags() {
        let args =
            Args::try_parse_from(["parley", "--no-stream", "say", "hello", "-there"]).unwrap();
        assert!(args.no_stream);
        let Some(Commands::Say { prompt }) = args.command else {
            panic!("expected say");
        };
        assert_eq!(prompt, vec!["hello".to_string(), "-there".to_string()]);
    }

    #[test]
    fn set_accepts_multi_word_values_and_bare_invocation() {
        let args =
            Args::try_parse_from(["parley", "set", "system-prompt", "Be", "brief."]).unwrap();
        let Some(Commands::Set { key, value }) = args.command else {
            panic!("expected set");
        };
        assert_eq!(key.as_deref(), Some("system-prompt"));
        assert_eq!(value, Some(vec!["Be".to_string(), "brief.".to_string()]));

        let args = Args::try_parse_from(["parley", "set"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Set { key: None, value: None })
        ));
    }

    #[test]
    fn missing_credential_help_names_both_routes() {
        let help = missing_credential_help();
        assert!(help.contains("parley set api-key"));
        assert!(help.contains(API_KEY_ENV));
    }
}
