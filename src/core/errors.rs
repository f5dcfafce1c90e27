use std::fmt;

/*-------------------------------------------------------------------------------------------------
  Errors and Results
-------------------------------------------------------------------------------------------------*/

// Error type alias used throughout the crate.
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/*--------------------------------------------------------------------------------------
  Configuration Errors
--------------------------------------------------------------------------------------*/

/// Configuration failures detected before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// One or more required environment variables are unset or empty.
    MissingVars(Vec<String>),

    /// Neither a service-to-group mapping nor a legacy group id is configured.
    NoGroupTarget,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVars(vars) => write!(
                f,
                "Missing required environment variables: {}",
                vars.join(", ")
            ),
            ConfigError::NoGroupTarget => {
                write!(f, "Must provide either UNIFI_GROUP_MAPPINGS or UNIFI_GROUP_ID")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/*--------------------------------------------------------------------------------------
  UniFi API Errors
--------------------------------------------------------------------------------------*/

/// A non-success response from the UniFi API, carrying the HTTP status code and the raw
/// response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub body: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UniFi API error: {} - {}", self.status, self.body)
    }
}

impl std::error::Error for ApiError {}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
