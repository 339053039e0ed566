//! Chat command implementation.
//!
//! One-shot with `--message`, otherwise a line-based session on stdin that
//! ends on EOF or `exit`.

use anyhow::{Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};

use pm25_core::{ChatSession, DashboardApi};

use super::connect;
use crate::config::Config;
use crate::format::{FormatOptions, format_chat_message};
use crate::style;

const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

pub async fn cmd_chat(config: &Config, message: Option<&str>, opts: &FormatOptions) -> Result<()> {
    if !config.chat.enabled {
        bail!("Chat is disabled in the configuration ([chat] enabled = false)");
    }
    let client = connect(config)?;
    let mut session = ChatSession::new();

    if let Some(message) = message {
        let Some(exchange) = session.begin(message) else {
            bail!("Nothing to send: the message is empty");
        };
        let outcome = client.chat(exchange.message()).await;
        let answered = matches!(&outcome, Ok(reply) if !reply.trim().is_empty());
        let reply = session.resolve(exchange, outcome);
        if !answered {
            bail!("{}", reply.text);
        }
        print!("{}", format_chat_message(reply, opts));
        return Ok(());
    }

    eprintln!(
        "{}",
        style::dim(
            "Ask about current, past or predicted PM2.5. Type 'exit' or press Ctrl+D to leave.",
            opts.no_color
        )
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if EXIT_WORDS.contains(&line) {
            break;
        }

        let Some(exchange) = session.begin(line) else {
            continue;
        };
        if let Some(placeholder) = session.messages().last() {
            eprint!("{}", format_chat_message(placeholder, opts));
        }
        let outcome = client.chat(exchange.message()).await;
        let reply = session.resolve(exchange, outcome);
        print!("{}", format_chat_message(reply, opts));
    }

    Ok(())
}
