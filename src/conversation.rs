//! Conversation state for the chat assistant
//!
//! `ConversationStore` owns the ordered message history, the text the user
//! is composing, the in-flight flag guarding the single outstanding
//! request, and the last error. Every mutation publishes a fresh
//! [`ConversationSnapshot`] on a watch channel so renderers can observe
//! the store without borrowing it.

use tokio::sync::watch;

use crate::providers::Message;

/// Point-in-time copy of the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSnapshot {
    /// Ordered history, greeting first
    pub messages: Vec<Message>,
    /// Text currently being composed
    pub pending: String,
    /// True while a request is outstanding
    pub in_flight: bool,
    /// Error text from the last failed request
    pub error: Option<String>,
}

/// Observable conversation store
///
/// # Examples
///
/// ```
/// use stargazer::conversation::ConversationStore;
///
/// let mut store = ConversationStore::new("Hello, stargazer!");
/// store.set_pending("  What is a quasar?  ");
/// let text = store.begin_submit().unwrap();
/// assert_eq!(text, "What is a quasar?");
/// assert!(store.in_flight());
///
/// store.complete_success("A very bright galactic nucleus.");
/// assert_eq!(store.messages().len(), 3);
/// assert!(!store.in_flight());
/// ```
#[derive(Debug)]
pub struct ConversationStore {
    greeting: String,
    messages: Vec<Message>,
    pending: String,
    in_flight: bool,
    error: Option<String>,
    tx: watch::Sender<ConversationSnapshot>,
}

impl ConversationStore {
    /// Create a store holding only the greeting
    pub fn new(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        let messages = vec![Message::model(greeting.clone())];
        let (tx, _rx) = watch::channel(ConversationSnapshot {
            messages: messages.clone(),
            pending: String::new(),
            in_flight: false,
            error: None,
        });

        Self {
            greeting,
            messages,
            pending: String::new(),
            in_flight: false,
            error: None,
            tx,
        }
    }

    /// Ordered history, greeting first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Text currently being composed
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// True while a request is outstanding
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Error text from the last failed request
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Messages sent to the generator as context
    ///
    /// The synthetic greeting is left out: the generative API expects the
    /// first turn to come from the user.
    pub fn context(&self) -> &[Message] {
        &self.messages[1..]
    }

    /// Receive a snapshot after every mutation
    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        self.tx.subscribe()
    }

    /// Current state as an owned snapshot
    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.messages.clone(),
            pending: self.pending.clone(),
            in_flight: self.in_flight,
            error: self.error.clone(),
        }
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }

    /// Append a message to the history
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.publish();
    }

    /// Drop everything but the greeting
    pub fn reset_to_greeting(&mut self) {
        self.messages = vec![Message::model(self.greeting.clone())];
        self.pending.clear();
        self.in_flight = false;
        self.error = None;
        tracing::debug!("Conversation reset");
        self.publish();
    }

    /// Replace the text being composed
    pub fn set_pending(&mut self, text: impl Into<String>) {
        self.pending = text.into();
        self.publish();
    }

    /// Start a request from the pending text
    ///
    /// Returns `None` without touching the store when the trimmed text is
    /// empty or another request is outstanding. Otherwise appends the user
    /// message, clears the pending text and last error, raises the
    /// in-flight flag, and returns the text to send.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.in_flight {
            tracing::debug!("Submit ignored: request already in flight");
            return None;
        }

        let text = self.pending.trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.messages.push(Message::user(text.clone()));
        self.pending.clear();
        self.error = None;
        self.in_flight = true;
        self.publish();
        Some(text)
    }

    /// Record a reply and release the in-flight flag
    pub fn complete_success(&mut self, reply: impl Into<String>) {
        self.messages.push(Message::model(reply));
        self.in_flight = false;
        self.publish();
    }

    /// Record a failure and release the in-flight flag
    ///
    /// The user message stays in the history.
    pub fn complete_failure(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.in_flight = false;
        self.publish();
    }

    /// Show an error without a request having been made
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.publish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Role;

    fn store() -> ConversationStore {
        ConversationStore::new("Welcome")
    }

    #[test]
    fn test_starts_with_greeting() {
        let store = store();
        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.messages()[0], Message::model("Welcome"));
        assert!(store.context().is_empty());
    }

    #[test]
    fn test_empty_and_whitespace_submissions_are_ignored() {
        let mut store = store();
        assert!(store.begin_submit().is_none());

        store.set_pending("   \n\t ");
        assert!(store.begin_submit().is_none());
        assert_eq!(store.messages().len(), 1);
        assert!(!store.in_flight());
    }

    #[test]
    fn test_submit_while_in_flight_is_noop() {
        let mut store = store();
        store.set_pending("first");
        assert!(store.begin_submit().is_some());

        store.set_pending("second");
        assert!(store.begin_submit().is_none());
        assert_eq!(store.messages().len(), 2);
        assert_eq!(store.pending(), "second");

        store.complete_success("reply");
        assert_eq!(store.begin_submit().as_deref(), Some("second"));
    }

    #[test]
    fn test_success_adds_user_then_model() {
        let mut store = store();
        let before = store.messages().len();
        store.set_pending("How far is the Moon?");
        store.begin_submit();
        store.complete_success("About 384,400 km.");

        assert_eq!(store.messages().len(), before + 2);
        assert_eq!(store.messages()[1].role, Role::User);
        assert_eq!(store.messages()[2].role, Role::Model);
        assert!(store.error().is_none());
    }

    #[test]
    fn test_failure_keeps_only_user_message() {
        let mut store = store();
        let before = store.messages().len();
        store.set_pending("How far is the Moon?");
        store.begin_submit();
        store.complete_failure("network down");

        assert_eq!(store.messages().len(), before + 1);
        assert_eq!(store.error(), Some("network down"));
        assert!(!store.in_flight());
    }

    #[test]
    fn test_new_submit_clears_previous_error() {
        let mut store = store();
        store.set_error("no key");
        store.set_pending("retry");
        store.begin_submit();
        assert!(store.error().is_none());
    }

    #[test]
    fn test_context_excludes_greeting() {
        let mut store = store();
        store.set_pending("hi");
        store.begin_submit();
        assert_eq!(store.context(), &[Message::user("hi")]);
    }

    #[test]
    fn test_reset_to_greeting() {
        let mut store = store();
        store.set_pending("hi");
        store.begin_submit();
        store.set_pending("draft");
        store.reset_to_greeting();

        assert_eq!(store.messages(), &[Message::model("Welcome")]);
        assert_eq!(store.pending(), "");
        assert!(!store.in_flight());
        assert!(store.error().is_none());
    }

    #[test]
    fn test_subscribers_see_mutations() {
        let mut store = store();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.set_pending("Betelgeuse?");
        store.begin_submit();
        assert!(rx.has_changed().unwrap());

        let snapshot = rx.borrow_and_update().clone();
        assert!(snapshot.in_flight);
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot, store.snapshot());
    }
}
