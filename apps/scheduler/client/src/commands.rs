//! Console command parsing.
//!
//! One command per line, whitespace separated, case-insensitive verb.

use std::num::ParseIntError;

use thiserror::Error;

pub const AVAILABLE_COMMANDS: &str = "MakeEvent, GetEvent, DeleteEvent, GetEvents, Exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MakeEvent {
        sender_id: i64,
        time: i64,
        name: String,
    },
    GetEvent {
        sender_id: i64,
        event_id: i64,
    },
    DeleteEvent {
        sender_id: i64,
        event_id: i64,
    },
    GetEvents {
        sender_id: i64,
        from_time: i64,
        to_time: i64,
    },
    Exit,
}

/// Printed as-is; the loop keeps reading afterwards.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Usage: {verb} {args}")]
    Usage { verb: String, args: &'static str },

    #[error("Error parsing {field}: {source}")]
    InvalidNumber {
        field: &'static str,
        source: ParseIntError,
    },

    #[error("Unknown command. Available commands: {}", AVAILABLE_COMMANDS)]
    Unknown,
}

impl Command {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(verb) = tokens.first() else {
            return Ok(None);
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "makeevent" => {
                expect_args(&tokens, "<sender-id> <event-time> <event-name>")?;
                Command::MakeEvent {
                    sender_id: number(tokens[1], "senderID")?,
                    time: number(tokens[2], "event time")?,
                    name: tokens[3].to_string(),
                }
            }
            "getevent" => {
                expect_args(&tokens, "<sender-id> <event-id>")?;
                Command::GetEvent {
                    sender_id: number(tokens[1], "senderID")?,
                    event_id: number(tokens[2], "eventID")?,
                }
            }
            "deleteevent" => {
                expect_args(&tokens, "<sender-id> <event-id>")?;
                Command::DeleteEvent {
                    sender_id: number(tokens[1], "senderID")?,
                    event_id: number(tokens[2], "eventID")?,
                }
            }
            "getevents" => {
                expect_args(&tokens, "<sender-id> <from-time> <to-time>")?;
                Command::GetEvents {
                    sender_id: number(tokens[1], "senderID")?,
                    from_time: number(tokens[2], "from time")?,
                    to_time: number(tokens[3], "to time")?,
                }
            }
            "exit" => Command::Exit,
            _ => return Err(CommandError::Unknown),
        };

        Ok(Some(command))
    }
}

/// `args` doubles as the usage text; its placeholder count is the arity.
fn expect_args(tokens: &[&str], args: &'static str) -> Result<(), CommandError> {
    let expected = args.split_whitespace().count() + 1;
    if tokens.len() == expected {
        Ok(())
    } else {
        Err(CommandError::Usage {
            verb: tokens[0].to_string(),
            args,
        })
    }
}

fn number(token: &str, field: &'static str) -> Result<i64, CommandError> {
    token
        .parse()
        .map_err(|source| CommandError::InvalidNumber { field, source })
}
