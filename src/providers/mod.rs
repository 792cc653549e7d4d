//! Provider module for Stargazer
//!
//! This module contains the generative-text provider abstraction and the
//! Google Gemini implementation.

pub mod base;
pub mod gemini;

pub use base::{Message, Role, TextGenerator};
pub use gemini::GeminiProvider;

use crate::config::ProviderConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create the configured text generator
///
/// # Errors
///
/// Returns error if provider initialization fails
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn TextGenerator>> {
    Ok(Arc::new(GeminiProvider::new(config.gemini.clone())?))
}
