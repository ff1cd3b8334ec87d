//! Error types for hvprobe.
//!
//! Defines the main error enum surfaced to check callers.

use thiserror::Error;

/// Main error type for probe operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// Collector-level misconfiguration (missing hypervisor, etc.).
    #[error("{0}")]
    Config(String),

    /// No username or password configured for the asset.
    #[error("missing credentials for {0}")]
    CredentialMissing(String),

    /// No guest guid configured for the asset.
    #[error("missing guid for {0}")]
    MissingGuid(String),

    /// Transport connect failure.
    #[error("unable to connect: {0}")]
    Connect(String),

    /// Authentication handshake rejected.
    #[error("unable to authenticate: {0}")]
    Auth(String),

    /// The queried class or namespace does not exist on the endpoint.
    #[error("class or namespace not available on this endpoint")]
    Ignored,

    /// The query did not complete in time.
    #[error("query timed out")]
    TimedOut,

    /// Any other query failure.
    #[error("{0}")]
    Failed(String),

    /// The query succeeded but returned no instance.
    #[error("{0}")]
    NotFound(String),

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Parse(String),
}

impl ProbeError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a connect error with the given message.
    pub fn connect(msg: impl Into<String>) -> Self {
        Self::Connect(msg.into())
    }

    /// Creates an authentication error with the given message.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Creates a generic query failure with the given message.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    /// Creates a config file parse error with the given message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::Parse(_) => "Configuration Error",
            Self::CredentialMissing(_) | Self::MissingGuid(_) => "Asset Skipped",
            Self::Connect(_) => "Connection Error",
            Self::Auth(_) => "Authentication Error",
            Self::Ignored => "Not Applicable",
            Self::TimedOut | Self::Failed(_) | Self::NotFound(_) => "Check Error",
        }
    }

    /// Returns true when the caller should drop the result instead of
    /// reporting a failure.
    pub fn is_suppressed(&self) -> bool {
        matches!(
            self,
            Self::CredentialMissing(_) | Self::MissingGuid(_) | Self::Ignored
        )
    }
}

/// Result type alias using ProbeError.
pub type Result<T> = std::result::Result<T, ProbeError>;
