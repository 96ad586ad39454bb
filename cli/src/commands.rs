//! Parsing of the lines typed at the prompt

use eq_core::SessionEvent;

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Digits typed or pasted at the focused box
    Digits(String),
    /// `@<index> <text>`: edit one box; empty text clears it
    Edit { index: usize, text: String },
    /// `<`: backspace at the focused box
    Backspace,
    Submit,
    Resend,
    Retry,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Nothing entered")]
    Empty,

    #[error("Unknown command '{0}'. Type 'help' for the list of commands")]
    Unknown(String),

    #[error("Box index must be a number: '{0}'")]
    BadIndex(String),
}

impl UserCommand {
    /// Session event for this command, `None` for host-only commands
    pub fn into_event(self, focus: usize) -> Option<SessionEvent> {
        match self {
            UserCommand::Digits(text) => Some(SessionEvent::Input { index: focus, text }),
            UserCommand::Edit { index, text } => Some(SessionEvent::Input { index, text }),
            UserCommand::Backspace => Some(SessionEvent::Backspace { index: focus }),
            UserCommand::Submit => Some(SessionEvent::Submit),
            UserCommand::Resend => Some(SessionEvent::Resend),
            UserCommand::Retry => Some(SessionEvent::RetrySubmit),
            UserCommand::Help | UserCommand::Quit => None,
        }
    }
}

/// Parse one input line
pub fn parse_command(line: &str) -> Result<UserCommand, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    if line.chars().all(|c| c.is_ascii_digit()) {
        return Ok(UserCommand::Digits(line.to_string()));
    }

    if let Some(rest) = line.strip_prefix('@') {
        let (index, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let index = index
            .parse::<usize>()
            .map_err(|_| ParseError::BadIndex(index.to_string()))?;
        return Ok(UserCommand::Edit {
            index,
            text: text.trim().to_string(),
        });
    }

    match line.to_lowercase().as_str() {
        "<" | "back" => Ok(UserCommand::Backspace),
        "s" | "submit" | "verify" => Ok(UserCommand::Submit),
        "r" | "resend" => Ok(UserCommand::Resend),
        "retry" => Ok(UserCommand::Retry),
        "?" | "h" | "help" => Ok(UserCommand::Help),
        "q" | "quit" | "exit" => Ok(UserCommand::Quit),
        _ => Err(ParseError::Unknown(line.to_string())),
    }
}

pub const HELP: &str = "\
Commands:
  <digits>         type or paste digits at the focused box
  @<n> <digit>     set box n (0-based); '@<n>' alone clears it
  <                backspace
  submit | s       verify the code and submit the enquiry
  resend | r       request a new code
  retry            resubmit after a failed submission
  quit | q         abandon the enquiry";
