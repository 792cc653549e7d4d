//! Base provider trait and common types for Stargazer
//!
//! This module defines the `TextGenerator` trait that generative-text
//! providers implement, along with the conversation message types shared
//! by the conversation store and the providers.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the person using the assistant
    User,
    /// Text produced by the language model
    Model,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// A single conversation turn
///
/// # Examples
///
/// ```
/// use stargazer::providers::{Message, Role};
///
/// let msg = Message::user("What is a pulsar?");
/// assert_eq!(msg.role, Role::User);
/// assert_eq!(msg.text, "What is a pulsar?");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message
    pub role: Role,
    /// Message body
    pub text: String,
}

impl Message {
    /// Creates a new user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Creates a new model message
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }

    /// Returns true when the message was written by the user
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// A generative-text backend
///
/// Implementations issue exactly one outbound request per call and never
/// retry; callers surface any error text to the user as-is.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use stargazer::error::Result;
/// use stargazer::providers::{Message, TextGenerator};
///
/// struct Echo;
///
/// #[async_trait]
/// impl TextGenerator for Echo {
///     async fn generate(
///         &self,
///         _api_key: &str,
///         _system_instruction: Option<&str>,
///         history: &[Message],
///     ) -> Result<String> {
///         Ok(history.last().map(|m| m.text.clone()).unwrap_or_default())
///     }
///
///     fn model(&self) -> String {
///         "echo".to_string()
///     }
/// }
/// ```
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a reply to `history`
    ///
    /// # Arguments
    ///
    /// * `api_key` - Credential used for this request
    /// * `system_instruction` - Optional fixed instruction framing the model
    /// * `history` - Ordered conversation; the last entry is the newest turn
    ///
    /// # Errors
    ///
    /// Returns error on network failure, authorization failure, or an
    /// unusable response
    async fn generate(
        &self,
        api_key: &str,
        system_instruction: Option<&str>,
        history: &[Message],
    ) -> Result<String>;

    /// Model identifier sent with each request
    fn model(&self) -> String;
}
