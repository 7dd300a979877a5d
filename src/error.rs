//! Error types and handling for the `TripCreator` application

use thiserror::Error;

/// Main error type for the `TripCreator` application
#[derive(Error, Debug)]
pub enum TripCreatorError {
    /// The itinerary generator returned nothing usable
    #[error("Generation failed: {message}")]
    Generation { message: String },

    /// A single image lookup failed. Enrichment absorbs these.
    #[error("Image lookup failed: {message}")]
    ImageLookup { message: String },

    /// A required credential or setting is absent
    #[error("Missing configuration: {what}")]
    ConfigurationMissing { what: String },

    /// Configuration is present but invalid
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// HTTP transport or non-success responses from an external API
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TripCreatorError {
    /// Create a new generation error
    pub fn generation<S: Into<String>>(message: S) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Create a new image lookup error
    pub fn image_lookup<S: Into<String>>(message: S) -> Self {
        Self::ImageLookup {
            message: message.into(),
        }
    }

    /// Create a new missing-configuration error
    pub fn configuration_missing<S: Into<String>>(what: S) -> Self {
        Self::ConfigurationMissing { what: what.into() }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether retrying the same request might succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TripCreatorError::Generation { .. }
                | TripCreatorError::Api { .. }
                | TripCreatorError::ImageLookup { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripCreatorError::Generation { .. } => {
                "Could not understand the generated itinerary. Please try again.".to_string()
            }
            TripCreatorError::ImageLookup { .. } => "Image unavailable.".to_string(),
            TripCreatorError::ConfigurationMissing { what } => {
                format!("The service is not configured: {what} is missing.")
            }
            TripCreatorError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TripCreatorError::Api { .. } => {
                "Unable to reach the itinerary service. Please try again.".to_string()
            }
            TripCreatorError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripCreatorError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for TripCreatorError {
    fn from(err: reqwest::Error) -> Self {
        Self::api(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for TripCreatorError {
    fn from(err: reqwest_middleware::Error) -> Self {
        Self::api(err.to_string())
    }
}
