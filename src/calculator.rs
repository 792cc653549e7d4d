//! Zenith constellation calculator
//!
//! The calculator does no astronomy itself. It turns an observer position
//! and local time into a single-turn prompt for the text generator and
//! returns the reply verbatim. It has its own in-flight flag, independent
//! of the chat conversation.

use chrono::{DateTime, Local};

use crate::error::{Result, StargazerError};
use crate::providers::{Message, TextGenerator};

/// Result text when a field is left empty
pub const INCOMPLETE_FIELDS_MESSAGE: &str =
    "Please fill in the latitude, longitude and date/time fields.";

/// Format used for example-location timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Observer position and local time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculatorQuery {
    /// Latitude in degrees, as typed
    pub latitude: String,
    /// Longitude in degrees, as typed
    pub longitude: String,
    /// Local date and time, as typed
    pub timestamp: String,
}

impl CalculatorQuery {
    /// Create a query from raw field values
    pub fn new(
        latitude: impl Into<String>,
        longitude: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Fill the form from an example location at the given local time
    pub fn at_location(location: &ExampleLocation, now: DateTime<Local>) -> Self {
        Self::new(
            location.latitude,
            location.longitude,
            now.format(TIMESTAMP_FORMAT).to_string(),
        )
    }

    /// True when every field has non-whitespace content
    pub fn is_complete(&self) -> bool {
        [&self.latitude, &self.longitude, &self.timestamp]
            .iter()
            .all(|f| !f.trim().is_empty())
    }

    /// Build the self-contained prompt sent to the generator
    pub fn prompt(&self) -> String {
        format!(
            "An observer is at latitude {}, longitude {} and the local date and time is {}. \
             Which constellation is at or nearest the zenith (directly overhead) for this observer? \
             Name the constellation, mention any bright stars close to the zenith, and briefly \
             explain the reasoning. Make clear that this is an estimate.",
            self.latitude.trim(),
            self.longitude.trim(),
            self.timestamp.trim()
        )
    }
}

/// A named shortcut that fills the calculator form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExampleLocation {
    /// Short name used on the command line
    pub key: &'static str,
    /// Display name
    pub name: &'static str,
    /// Latitude in degrees
    pub latitude: &'static str,
    /// Longitude in degrees
    pub longitude: &'static str,
}

/// Example locations offered by the calculator form
pub const EXAMPLE_LOCATIONS: [ExampleLocation; 2] = [
    ExampleLocation {
        key: "greenwich",
        name: "Royal Observatory, Greenwich",
        latitude: "51.4769",
        longitude: "-0.0005",
    },
    ExampleLocation {
        key: "maunakea",
        name: "Mauna Kea Observatories, Hawaii",
        latitude: "19.8207",
        longitude: "-155.4681",
    },
];

/// Look up an example location by key (case-insensitive)
pub fn find_location(key: &str) -> Option<&'static ExampleLocation> {
    EXAMPLE_LOCATIONS
        .iter()
        .find(|l| l.key.eq_ignore_ascii_case(key.trim()))
}

/// Calculator state: in-flight flag and last result
#[derive(Debug, Default)]
pub struct ZenithCalculator {
    in_flight: bool,
    result: Option<String>,
}

/// Holds the in-flight flag raised until dropped
///
/// Lowering happens on drop so a cancelled calculation leaves the
/// calculator idle.
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

impl ZenithCalculator {
    /// Create an idle calculator
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a request is outstanding
    ///
    /// `calculate` holds `&mut self` for the whole request, so a second
    /// calculation cannot start until the first one finishes or is dropped.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Last result text
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Ask the generator about `query` and keep the answer as the result
    ///
    /// An incomplete query sets the result to [`INCOMPLETE_FIELDS_MESSAGE`]
    /// without calling the generator. Generator errors become the result
    /// text, as the chat does.
    pub async fn calculate(
        &mut self,
        generator: &dyn TextGenerator,
        api_key: &str,
        query: &CalculatorQuery,
    ) -> String {
        let text = if query.is_complete() {
            match self.request(generator, api_key, query).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Zenith calculation failed: {}", e);
                    format!("Error: {}", e)
                }
            }
        } else {
            INCOMPLETE_FIELDS_MESSAGE.to_string()
        };

        self.result = Some(text.clone());
        text
    }

    /// Like [`calculate`](Self::calculate), but failures are returned
    ///
    /// # Errors
    ///
    /// Returns `StargazerError::InvalidInput` for an incomplete query, or
    /// the generator error
    pub async fn try_calculate(
        &mut self,
        generator: &dyn TextGenerator,
        api_key: &str,
        query: &CalculatorQuery,
    ) -> Result<String> {
        if !query.is_complete() {
            return Err(StargazerError::InvalidInput(INCOMPLETE_FIELDS_MESSAGE.to_string()).into());
        }

        let text = self.request(generator, api_key, query).await?;
        self.result = Some(text.clone());
        Ok(text)
    }

    async fn request(
        &mut self,
        generator: &dyn TextGenerator,
        api_key: &str,
        query: &CalculatorQuery,
    ) -> Result<String> {
        let _flight = InFlight::raise(&mut self.in_flight);
        tracing::info!(
            latitude = %query.latitude,
            longitude = %query.longitude,
            "Requesting zenith constellation"
        );

        let prompt = [Message::user(query.prompt())];
        generator.generate(api_key, None, &prompt).await
    }
}
