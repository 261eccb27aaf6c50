//! Chat command: one-shot or interactive session
//!
//! The interactive loop keeps its transcript in memory only; `/clear`
//! empties it and EOF ends the session.

use crate::chat::{ChatClient, Transcript};
use crate::error::Result;
use chrono::Local;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

/// Send a single message and return the reply
pub async fn cmd_chat_once(client: &ChatClient, message: &str) -> Result<String> {
    client.send(message).await
}

/// Run an interactive chat session on stdin/stdout
pub async fn cmd_chat_interactive(client: &ChatClient) -> Result<()> {
    println!("🤖 AI Assistant: type a message, /clear to reset, Ctrl-D to exit\n");

    let mut transcript = Transcript::new();
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"you> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if input == "/clear" {
            transcript.clear();
            println!("Chat cleared.");
            continue;
        }
        if input == "/quit" {
            break;
        }

        transcript.push_user(input);
        match client.send(input).await {
            Ok(reply) => {
                let message = transcript.push_assistant(reply);
                println!(
                    "assistant ({}):\n{}\n",
                    message.created_at.with_timezone(&Local).format("%H:%M:%S"),
                    message.content
                );
            }
            Err(e) => {
                warn!("Chat error: {}", e);
                let message =
                    transcript.push_assistant("Sorry, I encountered an error. Please try again.");
                println!(
                    "assistant ({}):\n{}\n",
                    message.created_at.with_timezone(&Local).format("%H:%M:%S"),
                    message.content
                );
            }
        }
    }

    Ok(())
}
