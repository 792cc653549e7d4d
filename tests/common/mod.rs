use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use stargazer::config::GeminiConfig;

/// Model name used by the mock Gemini server
#[allow(dead_code)]
pub const TEST_MODEL: &str = "gemini-test";

/// Path the Gemini provider posts to for [`TEST_MODEL`]
#[allow(dead_code)]
pub const GENERATE_PATH: &str = "/v1beta/models/gemini-test:generateContent";

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Gemini configuration pointing at a mock server
#[allow(dead_code)]
pub fn gemini_config(api_base: &str) -> GeminiConfig {
    GeminiConfig {
        model: TEST_MODEL.to_string(),
        api_base: api_base.to_string(),
        timeout_seconds: Some(5),
    }
}

/// A `generateContent` success body with a single text part
#[allow(dead_code)]
pub fn gemini_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}
