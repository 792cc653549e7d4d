//! Terminal rendering for the chat session
//!
//! Rendering is a pure function of conversation state; the functions here
//! build strings and the command loop prints them.

use colored::Colorize;

use crate::calculator::EXAMPLE_LOCATIONS;
use crate::conversation::ConversationSnapshot;
use crate::providers::{Message, Role};

/// Canned questions offered as quick suggestions
pub const QUICK_SUGGESTIONS: [&str; 5] = [
    "What planets are visible tonight?",
    "Explain black holes in simple terms",
    "How far away is the Andromeda Galaxy?",
    "What causes a solar eclipse?",
    "Tell me about the James Webb Space Telescope",
];

/// Render one message with its role tag
pub fn render_message(message: &Message) -> String {
    let tag = match message.role {
        Role::User => format!("[{}]", "you".cyan().bold()),
        Role::Model => format!("[{}]", "stargazer".purple().bold()),
    };
    format!("{} {}", tag, message.text)
}

/// Render messages from `from` onward, one block per message
pub fn render_history(snapshot: &ConversationSnapshot, from: usize) -> String {
    snapshot
        .messages
        .iter()
        .skip(from)
        .map(render_message)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render the error line, if any
pub fn render_error(snapshot: &ConversationSnapshot) -> Option<String> {
    snapshot
        .error
        .as_ref()
        .map(|e| format!("{} {}", "Error:".red().bold(), e))
}

/// How much of the conversation is already on screen
///
/// The chat loop echoes typed lines itself, so a user message that the
/// session is about to append counts as shown before it lands in a
/// snapshot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptCursor {
    shown: usize,
}

impl TranscriptCursor {
    /// Nothing shown yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages already on screen
    pub fn shown(&self) -> usize {
        self.shown
    }

    /// Count a line the user typed; it is appended only when `will_send`
    pub fn record_echo(&mut self, will_send: bool) {
        self.shown += usize::from(will_send);
    }

    /// Start over after the conversation is reset
    pub fn reset(&mut self) {
        self.shown = 0;
    }

    /// Render unseen messages and the current error, then advance
    pub fn render_update(&mut self, snapshot: &ConversationSnapshot) -> Option<String> {
        let mut blocks = Vec::new();
        if snapshot.messages.len() > self.shown {
            blocks.push(render_history(snapshot, self.shown));
            self.shown = snapshot.messages.len();
        }
        blocks.extend(render_error(snapshot));

        if blocks.is_empty() {
            None
        } else {
            Some(blocks.join("\n\n"))
        }
    }
}

/// Input prompt reflecting the in-flight flag
pub fn render_prompt(snapshot: &ConversationSnapshot) -> String {
    if snapshot.in_flight {
        format!("{} ", "... >>".dimmed())
    } else {
        format!("{} ", ">>".blue().bold())
    }
}

/// Numbered list of quick suggestions
pub fn render_suggestions() -> String {
    QUICK_SUGGESTIONS
        .iter()
        .enumerate()
        .map(|(i, s)| format!("  {}. {}", i + 1, s))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Example locations offered by the calculator form
pub fn render_locations() -> String {
    EXAMPLE_LOCATIONS
        .iter()
        .map(|l| format!("  {:<10} {} ({}, {})", l.key, l.name, l.latitude, l.longitude))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Zenith calculator result block
pub fn render_calculator_result(result: &str) -> String {
    format!("{}\n{}", "Zenith calculator".yellow().bold(), result)
}

/// Print the session banner
pub fn print_welcome_banner(model: &str, has_key: bool) {
    println!("{}", "Stargazer - astronomy assistant".bold());
    println!("Model: {}", model.green());
    if !has_key {
        println!(
            "{}",
            "No API key set. Use /key <value> before sending messages.".yellow()
        );
    }
    println!("Type '/help' for commands, '/suggest' for ideas.\n");
}
