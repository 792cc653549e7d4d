//! Stargazer - astronomy chat assistant library
//!
//! This library provides the pieces behind the `stargazer` binary: a chat
//! session that forwards astronomy questions to a generative-text API, a
//! zenith constellation calculator built on the same API, and a small HTTP
//! proxy for NASA's Astronomy Picture of the Day.
//!
//! # Architecture
//!
//! - `conversation`: observable message history and in-flight guard
//! - `session`: ties the conversation, text generator and API key together
//! - `calculator`: zenith constellation prompt and its own in-flight guard
//! - `providers`: `TextGenerator` trait and the Gemini implementation
//! - `credential`: API key persistence in the OS keyring
//! - `proxy`: axum router forwarding `/api/apod` to NASA
//! - `ui`: terminal rendering
//! - `config`, `cli`, `commands`, `error`: application plumbing
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stargazer::config::Config;
//! use stargazer::credential::MemoryCredentialStore;
//! use stargazer::providers::create_provider;
//! use stargazer::session::ChatSession;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let generator = create_provider(&config.provider)?;
//!     let key = Arc::new(MemoryCredentialStore::with_value("my-key"));
//!     let mut session = ChatSession::new(&config.chat, generator, key);
//!     let outcome = session.send("What is the nearest star?").await;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod calculator;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod credential;
pub mod error;
pub mod providers;
pub mod proxy;
pub mod session;
pub mod ui;

// Re-export commonly used types
pub use config::Config;
pub use conversation::ConversationStore;
pub use error::{Result, StargazerError};
pub use session::{ChatSession, SubmitOutcome};

