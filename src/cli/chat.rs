//! Line-oriented interactive chat loop

use std::error::Error;
use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::models::display_name;
use crate::cli::missing_credential_help;
use crate::commands::{process_input, CommandResult};
use crate::core::chat_stream::ChatError;
use crate::core::conversation::{collect_reply, ReplyOutcome};
use crate::core::session::ChatSession;

pub async fn run_chat(mut session: ChatSession) -> Result<(), Box<dyn Error>> {
    eprintln!("🚀 Starting Parley");
    eprintln!("📡 Using model: {}", display_name(session.model()));
    if !session.has_credential() {
        eprintln!("{}", missing_credential_help());
    }
    eprintln!("💡 Type /help for commands, /quit to leave. Ctrl+C stops a streaming reply.");
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match process_input(&mut session, &line) {
            CommandResult::Continue => {}
            CommandResult::Notice(text) => println!("{text}"),
            CommandResult::Quit => break,
            CommandResult::ProcessAsMessage(text) => send_message(&mut session, &text).await?,
        }
    }
    Ok(())
}

fn prompt() -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "You: ")?;
    stdout.flush()
}

async fn send_message(session: &mut ChatSession, text: &str) -> io::Result<()> {
    let cancel_token = CancellationToken::new();
    let reply = match session.begin_reply(text, cancel_token.clone()) {
        Ok(reply) => reply,
        Err(ChatError::MissingCredential) => {
            eprintln!("{}", missing_credential_help());
            return Ok(());
        }
        Err(err) => {
            eprintln!("❌ Error: {err}");
            return Ok(());
        }
    };

    let watcher = tokio::spawn({
        let cancel_token = cancel_token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("interrupt received, cancelling reply");
                cancel_token.cancel();
            }
        }
    });

    let mut stdout = io::stdout();
    let outcome = collect_reply(reply, |delta| {
        let _ = write!(stdout, "{delta}");
        let _ = stdout.flush();
    })
    .await;
    watcher.abort();

    match &outcome {
        ReplyOutcome::Completed(_) => println!(),
        ReplyOutcome::Cancelled(_) => println!("\n⏹  Stopped."),
        ReplyOutcome::Failed(err) => {
            println!();
            eprintln!("❌ Error: {err}");
        }
    }
    session.finish_reply(&outcome);
    Ok(())
}
