//! Library error type
//!
//! Every fallible operation in the crate returns [`NeboKrugError`]. The
//! binary wraps it in `anyhow` and shows [`NeboKrugError::user_message`]
//! instead of the technical text.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NeboKrugError {
    /// Today's record, or every historical year, could not be fetched
    #[error("Weather provider unavailable: {message}")]
    ProviderUnavailable { message: String },

    /// Nothing to compare against, or a sample set that breaks its invariants
    #[error("Insufficient data: {message}")]
    InsufficientData { message: String },

    #[error("Operation cancelled")]
    Cancelled,

    /// Transport or decoding failure talking to a remote API
    #[error("API error: {message}")]
    Api { message: String },

    /// Non-success answer from the AI companion service
    #[error("AI service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Settings that do not match the settings schema
    #[error("Invalid settings: {message}")]
    Settings { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

macro_rules! message_constructors {
    ($($name:ident => $variant:ident),* $(,)?) => {
        $(
            pub fn $name(message: impl Into<String>) -> Self {
                Self::$variant { message: message.into() }
            }
        )*
    };
}

impl NeboKrugError {
    message_constructors! {
        provider_unavailable => ProviderUnavailable,
        insufficient_data => InsufficientData,
        api => Api,
        validation => Validation,
        settings => Settings,
        config => Config,
        cache => Cache,
    }

    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }

    /// Short text for people, without transport details
    #[must_use]
    pub fn user_message(&self) -> String {
        let text = match self {
            Self::ProviderUnavailable { .. } | Self::Api { .. } => {
                "Unable to fetch weather data. Check the network connection and try again."
            }
            Self::InsufficientData { .. } => "There is no historical data to compare against.",
            Self::Cancelled => "The request was cancelled.",
            Self::Service { .. } => "The recommendation service is unavailable right now.",
            Self::Validation { message } => return format!("Invalid input: {message}"),
            Self::Settings { message } => return format!("Invalid settings: {message}"),
            Self::Config { message } => return format!("Configuration error: {message}"),
            Self::Cache { .. } => "The archive cache failed. Deleting the cache directory may help.",
            Self::Io(_) => "A file could not be read or written.",
            Self::Json(_) => "Received data in an unexpected format.",
        };
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert!(matches!(
            NeboKrugError::provider_unavailable("connection refused"),
            NeboKrugError::ProviderUnavailable { .. }
        ));
        assert!(matches!(
            NeboKrugError::insufficient_data("empty history"),
            NeboKrugError::InsufficientData { .. }
        ));
        assert!(matches!(
            NeboKrugError::service(502, "bad gateway"),
            NeboKrugError::Service { status: 502, .. }
        ));
    }

    #[test]
    fn test_user_messages() {
        assert!(
            NeboKrugError::api("timeout")
                .user_message()
                .starts_with("Unable to fetch weather data")
        );
        assert!(
            NeboKrugError::validation("latitude out of range")
                .user_message()
                .contains("latitude out of range")
        );
        assert_eq!(
            NeboKrugError::Cancelled.user_message(),
            "The request was cancelled."
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let err: NeboKrugError = std::io::Error::other("disk full").into();
        assert!(matches!(err, NeboKrugError::Io(_)));
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn test_service_error_display() {
        let err = NeboKrugError::service(500, "model overloaded");
        assert_eq!(err.to_string(), "AI service error (500): model overloaded");
    }
}
