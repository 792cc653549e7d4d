//! Special commands parser for interactive chat mode
//!
//! Special commands control the session rather than being sent to the
//! model. They are prefixed with `/`; the command word is case-insensitive
//! while arguments keep their case (API keys are case-sensitive).

use thiserror::Error;

use crate::ui::QUICK_SUGGESTIONS;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Display help information
    Help,

    /// Clear the conversation back to the greeting
    Reset,

    /// List the canned quick suggestions
    ListSuggestions,

    /// Send quick suggestion `n` (zero-based)
    Suggest(usize),

    /// Open the zenith calculator form
    ///
    /// With a location key the form is pre-filled with that example
    /// location and the current local time.
    Zenith(Option<String>),

    /// Show whether an API key is set
    ShowKey,

    /// Replace the API key (an empty value clears it)
    SetKey(String),

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input is sent to the model as a chat message.
    None,
}

impl SpecialCommand {
    /// False for input that carries a secret and must stay out of the
    /// line editor's history
    pub fn keeps_history(&self) -> bool {
        !matches!(self, SpecialCommand::SetKey(_))
    }
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with `/` but is
/// not a known command, and `CommandError::UnsupportedArgument` for a bad
/// argument.
///
/// # Examples
///
/// ```
/// use stargazer::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/suggest 2").unwrap(), SpecialCommand::Suggest(1));
/// assert_eq!(
///     parse_special_command("/key AbC").unwrap(),
///     SpecialCommand::SetKey("AbC".to_string())
/// );
/// assert_eq!(parse_special_command("Why is Mars red?").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/warp").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (word, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((word, arg)) => (word.to_lowercase(), arg.trim()),
        None => (trimmed.to_lowercase(), ""),
    };

    match word.as_str() {
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/reset" | "/clear" => Ok(SpecialCommand::Reset),

        "/suggest" if arg.is_empty() => Ok(SpecialCommand::ListSuggestions),
        "/suggest" => match arg.parse::<usize>() {
            Ok(n) if (1..=QUICK_SUGGESTIONS.len()).contains(&n) => Ok(SpecialCommand::Suggest(n - 1)),
            _ => Err(CommandError::UnsupportedArgument {
                command: "/suggest".to_string(),
                arg: arg.to_string(),
            }),
        },

        "/zenith" if arg.is_empty() => Ok(SpecialCommand::Zenith(None)),
        "/zenith" => Ok(SpecialCommand::Zenith(Some(arg.to_lowercase()))),

        "/key" if arg.is_empty() => Ok(SpecialCommand::ShowKey),
        "/key" if arg.eq_ignore_ascii_case("--clear") => Ok(SpecialCommand::SetKey(String::new())),
        "/key" => Ok(SpecialCommand::SetKey(arg.to_string())),

        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print help for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands
================

CHAT:
  /suggest         - List quick suggestions
  /suggest <n>     - Ask quick suggestion number n
  /reset           - Start over from the greeting (alias: /clear)

ZENITH CALCULATOR:
  /zenith          - Enter latitude, longitude and time
  /zenith <place>  - Pre-fill an example location (greenwich, maunakea)

API KEY:
  /key             - Show whether a key is set
  /key <value>     - Store a new key
  /key --clear     - Remove the stored key

SESSION:
  /help            - Show this help message
  /exit, /quit     - Leave the session

Anything else is sent to the assistant.
"#
    );
}
