//! Operator console
//!
//! Line-oriented command interface for out-of-band corrections. The
//! blocking stdin read is isolated to its own blocking task; parsed
//! commands are funneled into the app's event channel so all engine
//! mutation stays on the serialized event-processing path.

use crate::error::{CardwatchError, Result};
use crate::feed::FeedEvent;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;
use tracing::debug;

/// Parsed operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Mark the card `offset` steps back in history as missed.
    /// Offset 0 (the card currently on screen) also triggers a dislike.
    MissOffset(usize),
    /// Mark a card as missed by retyped text
    MissText(String),
    Like,
    Dislike,
    /// Stop the process; the only fatal condition in the engine
    Exit,
}

/// Parse one console line. Empty lines are the caller's concern; an
/// unrecognized command is reported, never fatal.
pub fn parse_command(line: &str) -> Result<Option<OperatorCommand>> {
    let mut parts = line.split_whitespace();
    let command = match parts.next() {
        Some(word) => word,
        None => return Ok(None),
    };
    let args: Vec<&str> = parts.collect();

    let parsed = match command {
        "m" | "miss" | "missed" => {
            if args.is_empty() {
                // default lookback: the card before the most recent
                OperatorCommand::MissOffset(1)
            } else {
                let joined = args.join(" ");
                match joined.parse::<usize>() {
                    Ok(offset) => OperatorCommand::MissOffset(offset),
                    // non-numeric argument is a retyped card text
                    Err(_) => OperatorCommand::MissText(joined),
                }
            }
        }
        "like" | "l" | "<3" => OperatorCommand::Like,
        "dislike" | "dis" | "d" => OperatorCommand::Dislike,
        "exit" | "stop" => OperatorCommand::Exit,
        other => return Err(CardwatchError::MalformedCommand(other.to_string())),
    };

    Ok(Some(parsed))
}

/// Read console lines and forward parsed commands into the event
/// channel. Runs on a blocking task; returns when the operator exits or
/// stdin closes.
pub fn run_reader(tx: mpsc::Sender<FeedEvent>) {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(_)) | None => {
                debug!("Console input closed, shutting down");
                let _ = tx.blocking_send(FeedEvent::Shutdown);
                return;
            }
        };

        match parse_command(line.trim()) {
            Ok(Some(OperatorCommand::Exit)) => {
                let _ = tx.blocking_send(FeedEvent::Shutdown);
                return;
            }
            Ok(Some(command)) => {
                if tx.blocking_send(FeedEvent::Operator(command)).is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(_) => println!("Unknown command"),
        }
    }
}
