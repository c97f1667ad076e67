//! Non-interactive "say" command

use std::error::Error;
use std::io::{self, Write};

use tokio_util::sync::CancellationToken;

use crate::cli::missing_credential_help;
use crate::core::chat_stream::ChatError;
use crate::core::config::Config;
use crate::core::conversation::{collect_reply, ReplyOutcome};
use crate::core::session::ChatSession;
use crate::utils::logging::LoggingState;

pub async fn run_say(
    prompt: Vec<String>,
    model: Option<String>,
    log: Option<String>,
    stream: bool,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: parley say <prompt>");
        std::process::exit(2);
    }

    let config = Config::load()?;
    let logging = LoggingState::new(log)?;
    let mut session = ChatSession::new(reqwest::Client::new(), config, model, stream, logging);

    let cancel_token = CancellationToken::new();
    let reply = match session.begin_reply(&prompt, cancel_token.clone()) {
        Ok(reply) => reply,
        Err(ChatError::MissingCredential) => {
            eprintln!("{}", missing_credential_help());
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    let watcher = tokio::spawn({
        let cancel_token = cancel_token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel_token.cancel();
            }
        }
    });

    let mut stdout = io::stdout();
    let outcome = collect_reply(reply, |delta| {
        print!("{delta}");
        let _ = stdout.flush();
    })
    .await;
    watcher.abort();
    session.finish_reply(&outcome);

    match outcome {
        ReplyOutcome::Completed(_) => {
            println!();
            Ok(())
        }
        ReplyOutcome::Cancelled(_) => {
            println!();
            eprintln!("⏹  Stopped.");
            std::process::exit(130);
        }
        ReplyOutcome::Failed(err) => {
            eprintln!("\n❌ Error: {err}");
            std::process::exit(1);
        }
    }
}
