/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint:

- `chat`: Interactive astronomy chat
- `zenith`: One-off zenith constellation question
- `key`: Stored API key management
- `serve`: APOD proxy server
- `apod`: Fetch the picture of the day directly

The handlers are thin; the work lives in the session, calculator,
credential, and proxy modules.
*/

use std::sync::Arc;

use crate::calculator::{self, CalculatorQuery};
use crate::config::Config;
use crate::credential::{self, CredentialStore, KeyringCredentialStore};
use crate::error::{Result, StargazerError};
use crate::providers::create_provider;
use crate::session::ChatSession;
use crate::ui;

// Special commands parser for the chat loop
pub mod special_commands;

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Builds a `ChatSession` and runs a readline loop. Each line is either
    //! a special command or a chat message; replies are printed as the
    //! conversation store publishes new snapshots.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let generator = create_provider(&config.provider)?;
        let credentials: Arc<dyn CredentialStore> = Arc::new(KeyringCredentialStore);
        let mut session = ChatSession::new(&config.chat, generator, credentials);

        let mut updates = session.store().subscribe();
        let mut transcript = ui::TranscriptCursor::new();

        let mut rl = DefaultEditor::new()?;

        ui::print_welcome_banner(&session.model(), session.has_api_key());
        print_update(&mut transcript, &session.store().snapshot());

        loop {
            let prompt = ui::render_prompt(&session.store().snapshot());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            println!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    if command.keeps_history() {
                        rl.add_history_entry(trimmed)?;
                    }

                    match command {
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::Reset => {
                            session.store_mut().reset_to_greeting();
                            transcript.reset();
                            println!("Conversation cleared.\n");
                        }
                        SpecialCommand::ListSuggestions => {
                            println!("{}\n", ui::render_suggestions());
                        }
                        SpecialCommand::Suggest(index) => {
                            let question = ui::QUICK_SUGGESTIONS[index];
                            println!("{}", ui::render_message(&crate::providers::Message::user(question)));
                            transcript.record_echo(session.has_api_key());
                            ask(&mut session, question).await;
                        }
                        SpecialCommand::Zenith(location) => {
                            run_calculator_form(&mut session, &mut rl, location).await?;
                        }
                        SpecialCommand::ShowKey => {
                            if session.has_api_key() {
                                println!("API key: {}\n", credential::mask(session.api_key()));
                            } else {
                                println!("No API key set.\n");
                            }
                        }
                        SpecialCommand::SetKey(value) => {
                            if let Err(e) = session.set_api_key(&value) {
                                tracing::warn!("Failed to persist API key: {}", e);
                                println!(
                                    "{}",
                                    format!("Key set for this session only: {}", e).yellow()
                                );
                            }
                            if session.has_api_key() {
                                println!("API key updated.\n");
                            } else {
                                println!("API key cleared.\n");
                            }
                        }
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {
                            // The typed line is already on screen
                            transcript.record_echo(session.has_api_key());
                            ask(&mut session, trimmed).await;
                        }
                    }

                    if updates.has_changed().unwrap_or(false) {
                        let snapshot = updates.borrow_and_update().clone();
                        print_update(&mut transcript, &snapshot);
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    tracing::error!("Readline error: {}", e);
                    return Err(e.into());
                }
            }
        }

        println!("Clear skies!");
        Ok(())
    }

    async fn ask(session: &mut ChatSession, text: &str) {
        if session.has_api_key() {
            println!("{}", "Consulting the stars...".dimmed());
        }
        let outcome = session.send(text).await;
        tracing::debug!(?outcome, "Chat submission finished");
    }

    fn print_update(
        transcript: &mut ui::TranscriptCursor,
        snapshot: &crate::conversation::ConversationSnapshot,
    ) {
        if let Some(update) = transcript.render_update(snapshot) {
            println!("{}\n", update);
        }
    }

    async fn run_calculator_form(
        session: &mut ChatSession,
        rl: &mut DefaultEditor,
        location: Option<String>,
    ) -> Result<()> {
        let query = match location {
            Some(key) => match calculator::find_location(&key) {
                Some(location) => {
                    let query = CalculatorQuery::at_location(location, chrono::Local::now());
                    println!(
                        "{}: lat {}, lon {}, time {}",
                        location.name, query.latitude, query.longitude, query.timestamp
                    );
                    query
                }
                None => {
                    println!(
                        "{}\n{}\n",
                        format!("Unknown location: {}", key).red(),
                        ui::render_locations()
                    );
                    return Ok(());
                }
            },
            None => {
                println!("Example locations (/zenith <name>):\n{}", ui::render_locations());
                let latitude = read_field(rl, "Latitude: ")?;
                let longitude = read_field(rl, "Longitude: ")?;
                let timestamp = read_field(
                    rl,
                    &format!(
                        "Date and time (e.g. {}): ",
                        chrono::Local::now().format(calculator::TIMESTAMP_FORMAT)
                    ),
                )?;
                CalculatorQuery::new(latitude, longitude, timestamp)
            }
        };

        if query.is_complete() && session.has_api_key() {
            println!("{}", "Calculating...".dimmed());
        }
        let result = session.calculate(&query).await;
        println!("{}\n", ui::render_calculator_result(&result));
        Ok(())
    }

    fn read_field(rl: &mut DefaultEditor, prompt: &str) -> Result<String> {
        match rl.readline(prompt) {
            Ok(line) => Ok(line.trim().to_string()),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}

// Zenith command handler
pub mod zenith {
    //! Non-interactive zenith calculator.

    use super::*;

    /// Ask which constellation is overhead and print the answer
    ///
    /// `time` defaults to the current local time.
    ///
    /// # Errors
    ///
    /// Returns `StargazerError::MissingCredentials` when no API key is set,
    /// or the generator error
    pub async fn run_zenith(
        config: Config,
        lat: String,
        lon: String,
        time: Option<String>,
    ) -> Result<()> {
        let generator = create_provider(&config.provider)?;
        let credentials: Arc<dyn CredentialStore> = Arc::new(KeyringCredentialStore);
        let mut session = ChatSession::new(&config.chat, generator, credentials);

        let timestamp = time.unwrap_or_else(|| {
            chrono::Local::now()
                .format(calculator::TIMESTAMP_FORMAT)
                .to_string()
        });
        let query = CalculatorQuery::new(lat, lon, timestamp);

        let result = session.try_calculate(&query).await?;
        println!("{}", ui::render_calculator_result(&result));
        Ok(())
    }
}

// Key command handler
pub mod key {
    //! Stored API key management.

    use super::*;
    use crate::cli::KeyCommand;

    /// Run a key subcommand against the OS keyring
    pub fn run_key(command: KeyCommand) -> Result<()> {
        let message = apply(&KeyringCredentialStore, command)?;
        println!("{}", message);
        Ok(())
    }

    /// Apply a key subcommand to `store` and describe the result
    pub fn apply(store: &dyn CredentialStore, command: KeyCommand) -> Result<String> {
        match command {
            KeyCommand::Set { value } => {
                let value = value.trim();
                if value.is_empty() {
                    store.clear()?;
                    return Ok("Empty key given; stored key removed.".to_string());
                }
                store.save(value)?;
                tracing::info!("API key stored");
                Ok("API key stored.".to_string())
            }
            KeyCommand::Show => Ok(match store.load()? {
                Some(value) if !value.is_empty() => format!("API key: {}", credential::mask(&value)),
                _ => "No API key stored.".to_string(),
            }),
            KeyCommand::Clear => {
                store.clear()?;
                tracing::info!("API key removed");
                Ok("API key removed.".to_string())
            }
        }
    }
}

// Serve command handler
pub mod serve {
    //! APOD proxy server handler.

    use super::*;

    /// Run the proxy until interrupted
    pub async fn run_serve(config: Config) -> Result<()> {
        tracing::info!("Starting APOD proxy");
        crate::proxy::serve(&config.proxy).await
    }
}

// APOD command handler
pub mod apod {
    //! Direct picture-of-the-day fetch.

    use super::*;
    use crate::proxy::{ApodClient, ImageOfDayClient};

    /// Fetch and print the picture of the day
    ///
    /// # Errors
    ///
    /// Returns `StargazerError::MissingCredentials` when `NASA_API_KEY` is
    /// not set, or the upstream error
    pub async fn run_apod(config: Config, date: Option<String>) -> Result<()> {
        let api_key = config.proxy.api_key.clone().ok_or_else(|| {
            StargazerError::MissingCredentials("nasa (set NASA_API_KEY)".to_string())
        })?;
        let client = ApodClient::new(&config.proxy)?;
        let body = client.fetch(&api_key, date.as_deref()).await?;
        println!("{}", serde_json::to_string_pretty(&body)?);
        Ok(())
    }
}
