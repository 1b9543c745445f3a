//! Core error types for the posbridge engine.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage
//! layer; POS transport failures are converted by the connect layer.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the synchronization engine.
///
/// Database-specific errors are wrapped in string form to keep this type
/// database-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("POS request failed: {0}")]
    Network(#[from] NetworkError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Retry budget exhausted: {0}")]
    Capacity(#[from] CapacityError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Errors around POS integration profiles.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Configuration '{0}' not found")]
    NotFound(String),

    #[error("No active configuration for store '{0}'")]
    NoActiveForStore(String),

    #[error("Configuration '{0}' is inactive")]
    Inactive(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while obtaining or refreshing a POS bearer token.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token request to '{url}' failed: {message}")]
    TokenRequestFailed { url: String, message: String },

    #[error("POS rejected the login credentials: {0}")]
    CredentialsRejected(String),

    #[error("POS returned an unusable token response: {0}")]
    InvalidTokenResponse(String),
}

/// Transport-level failures talking to the POS.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("POS unreachable: {0}")]
    Unreachable(String),

    #[error("POS request timed out after {0}s")]
    Timeout(u64),

    #[error("POS returned status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("Failed to decode POS response: {0}")]
    InvalidResponse(String),
}

/// Validation errors for administrative input and serialized payloads.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("'{0}' is not a valid URL")]
    InvalidUrl(String),

    #[error("Unsupported payload version {0}")]
    UnsupportedPayloadVersion(u32),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

/// Raised when a queue entry has consumed its whole retry budget.
#[derive(Error, Debug)]
pub enum CapacityError {
    #[error("Order '{order_number}' exhausted {max_retries} retries: {last_error}")]
    RetriesExhausted {
        order_number: String,
        max_retries: i32,
        last_error: String,
    },
}

// === From implementations for common error types ===

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::MalformedPayload(err.to_string()))
    }
}

impl From<chrono::ParseError> for Error {
    fn from(err: chrono::ParseError) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
