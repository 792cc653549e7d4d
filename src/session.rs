//! Chat session: conversation store, text generator and credential
//!
//! `ChatSession` is what the terminal front end drives. It checks the
//! credential locally before any network call, runs one generator call per
//! submission, and folds the result back into the conversation store.

use std::sync::Arc;

use crate::calculator::{CalculatorQuery, ZenithCalculator};
use crate::config::ChatConfig;
use crate::conversation::ConversationStore;
use crate::credential::{self, CredentialStore};
use crate::error::{Result, StargazerError};
use crate::providers::TextGenerator;

/// Shown instead of sending when no API key is set
pub const MISSING_KEY_MESSAGE: &str =
    "Please enter your Gemini API key first (use /key <value> or `stargazer key set <value>`).";

/// Recorded as the error when a request is abandoned before it settles
pub const CANCELLED_MESSAGE: &str = "Request cancelled before a reply arrived.";

/// What happened to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to send, or a request is already outstanding
    Ignored,
    /// No API key; nothing was sent
    MissingCredential,
    /// The model replied
    Replied(String),
    /// The call failed; the error text is shown to the user
    Failed(String),
}

/// Interactive chat session
pub struct ChatSession {
    store: ConversationStore,
    calculator: ZenithCalculator,
    generator: Arc<dyn TextGenerator>,
    credentials: Arc<dyn CredentialStore>,
    api_key: String,
    system_instruction: String,
}

impl ChatSession {
    /// Create a session, reading the stored API key
    pub fn new(
        config: &ChatConfig,
        generator: Arc<dyn TextGenerator>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let api_key = credential::load_api_key(credentials.as_ref());
        tracing::info!(
            model = %generator.model(),
            has_key = !api_key.is_empty(),
            "Chat session started"
        );

        Self {
            store: ConversationStore::new(config.greeting.clone()),
            calculator: ZenithCalculator::new(),
            generator,
            credentials,
            api_key,
            system_instruction: config.system_instruction.clone(),
        }
    }

    /// Conversation store
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Mutable conversation store, for editing the pending text or resetting
    pub fn store_mut(&mut self) -> &mut ConversationStore {
        &mut self.store
    }

    /// Zenith calculator state
    pub fn calculator(&self) -> &ZenithCalculator {
        &self.calculator
    }

    /// Model identifier in use
    pub fn model(&self) -> String {
        self.generator.model()
    }

    /// True when sending is enabled
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Current API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Replace the API key and persist it
    ///
    /// The in-memory key changes even when persisting fails, so the
    /// session stays usable; the persistence error is returned.
    pub fn set_api_key(&mut self, value: &str) -> Result<()> {
        self.api_key = value.trim().to_string();
        if self.api_key.is_empty() {
            self.credentials.clear()
        } else {
            self.credentials.save(&self.api_key)
        }
    }

    /// Send the pending text
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.store.in_flight() || self.store.pending().trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        if !self.has_api_key() {
            self.store.set_error(MISSING_KEY_MESSAGE);
            return SubmitOutcome::MissingCredential;
        }

        let Some(text) = self.store.begin_submit() else {
            return SubmitOutcome::Ignored;
        };
        tracing::debug!("Submitting {} chars", text.len());

        let context = self.store.context().to_vec();
        let submission = Submission::new(&mut self.store);
        let result = self
            .generator
            .generate(&self.api_key, Some(&self.system_instruction), &context)
            .await;
        submission.settle(result)
    }

    /// Set the pending text and send it
    pub async fn send(&mut self, text: impl Into<String>) -> SubmitOutcome {
        self.store.set_pending(text);
        self.submit().await
    }

    /// Run the zenith calculator, showing failures as the result text
    pub async fn calculate(&mut self, query: &CalculatorQuery) -> String {
        if query.is_complete() && !self.has_api_key() {
            return MISSING_KEY_MESSAGE.to_string();
        }
        self.calculator
            .calculate(self.generator.as_ref(), &self.api_key, query)
            .await
    }

    /// Run the zenith calculator, returning failures
    ///
    /// # Errors
    ///
    /// Returns `StargazerError::MissingCredentials` when no API key is set,
    /// `StargazerError::InvalidInput` for an incomplete query, or the
    /// generator error
    pub async fn try_calculate(&mut self, query: &CalculatorQuery) -> Result<String> {
        if !self.has_api_key() {
            return Err(StargazerError::MissingCredentials(
                "gemini (run `stargazer key set <value>` or set GEMINI_API_KEY)".to_string(),
            )
            .into());
        }
        self.calculator
            .try_calculate(self.generator.as_ref(), &self.api_key, query)
            .await
    }
}

/// An outstanding chat request
///
/// `settle` records the outcome. Dropping it unsettled, as when the
/// request future is cancelled, records [`CANCELLED_MESSAGE`] so the
/// store does not stay in flight.
struct Submission<'a> {
    store: &'a mut ConversationStore,
    settled: bool,
}

impl<'a> Submission<'a> {
    fn new(store: &'a mut ConversationStore) -> Self {
        Self {
            store,
            settled: false,
        }
    }

    fn settle(mut self, result: Result<String>) -> SubmitOutcome {
        self.settled = true;
        match result {
            Ok(reply) => {
                self.store.complete_success(reply.clone());
                SubmitOutcome::Replied(reply)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!("Chat request failed: {}", message);
                self.store.complete_failure(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Chat request cancelled");
            self.store.complete_failure(CANCELLED_MESSAGE);
        }
    }
}
