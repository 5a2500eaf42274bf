//! Interactive terminal surface.
//!
//! Each line read is either a slash command or a message. Pressing Enter on
//! a message line is the submit action. The two input fields (message and
//! the optional age) are cleared once a submission completes.

use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use medibot_chat::{ConversationController, RejectReason, Submission, SubmitOutcome};

pub const HELP: &str = "Type your symptoms and press Enter.\n\
Commands: /age <years>, /history, /clear, /help, /quit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Message(String),
    /// Set (or, with no value, unset) the age field.
    SetAge(String),
    History,
    Clear,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        // A lone slash, or one followed by a space, is ordinary text.
        let Some(rest) = trimmed
            .strip_prefix('/')
            .filter(|rest| rest.starts_with(|c: char| !c.is_whitespace()))
        else {
            return Command::Message(line.to_string());
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        match name {
            "age" => Command::SetAge(arg.to_string()),
            "history" => Command::History,
            "clear" => Command::Clear,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Pending contents of the input fields.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputFields {
    pub message: String,
    pub age: String,
}

impl InputFields {
    pub fn to_submission(&self) -> Submission {
        Submission {
            message: self.message.clone(),
            age: (!self.age.trim().is_empty()).then(|| self.age.clone()),
        }
    }

    pub fn clear(&mut self) {
        self.message.clear();
        self.age.clear();
    }
}

/// Print the whole transcript, if there is one.
pub fn print_history<W: Write>(controller: &ConversationController, out: &mut W) -> io::Result<()> {
    let transcript = controller.transcript();
    if transcript.is_empty() {
        writeln!(out, "(no history)")?;
    } else {
        writeln!(out, "{}", transcript.render())?;
    }
    Ok(())
}

/// Read lines from `reader` until EOF or `/quit`, driving `controller`.
pub async fn run<R, W>(controller: &ConversationController, reader: R, out: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut input = InputFields::default();
    let mut lines = reader.lines();

    writeln!(out, "{}", HELP)?;
    out.flush()?;

    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Quit => break,
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::History => print_history(controller, out)?,
            Command::SetAge(age) => {
                if age.is_empty() {
                    writeln!(out, "Age cleared.")?;
                } else {
                    writeln!(out, "Age set to {} for the next message.", age)?;
                }
                input.age = age;
            }
            Command::Clear => match controller.clear() {
                Ok(()) => writeln!(out, "History cleared.")?,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to clear history");
                    writeln!(out, "Could not clear the history right now.")?;
                }
            },
            Command::Unknown(name) => writeln!(out, "Unknown command /{}. Try /help.", name)?,
            Command::Message(text) => {
                input.message = text;
                match controller.submit(&input.to_submission()).await {
                    SubmitOutcome::Rejected(RejectReason::EmptyMessage) => {}
                    SubmitOutcome::Rejected(RejectReason::Busy) => {
                        writeln!(out, "Still waiting for the previous reply.")?;
                    }
                    SubmitOutcome::Replied(text) | SubmitOutcome::FellBack(text) => {
                        writeln!(out, "{}\n", text)?;
                        input.clear();
                    }
                }
            }
        }
        out.flush()?;
    }

    Ok(())
}
