use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// The server rejected the stored token; the session has been torn down.
    #[error("Session expired")]
    SessionExpired,

    /// Login lookup returned no account for the supplied username.
    #[error("No account matches username {username:?}")]
    UsernameNotFound { username: String },

    /// Login lookup returned more than one account for the supplied username.
    #[error("More than one account matches username {username:?}")]
    AmbiguousUsername { username: String },

    /// Supplied password does not verify against the stored credential.
    #[error("Wrong password")]
    WrongPassword,

    /// Target route requires a permission the session does not hold.
    #[error("Insufficient permissions for {path} (requires {permission})")]
    InsufficientPermissions { permission: String, path: String },

    /// Non-2xx response that is not a session expiry.
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Network-level failure (connect, timeout, body read).
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Durable storage I/O failure.
    #[error("Storage I/O: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure (storage payloads, response bodies).
    #[error("Serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal failure.
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Returns a user-safe message, without leaking internal implementation details.
    pub fn user_message(&self) -> String {
        match self {
            Error::SessionExpired => "Session expired, please log in again".to_string(),
            Error::UsernameNotFound { .. } => "Username not found".to_string(),
            Error::AmbiguousUsername { .. } => "More than one account matches this username".to_string(),
            Error::WrongPassword => "Wrong password".to_string(),
            Error::InsufficientPermissions { .. } => "You do not have permission to access this page".to_string(),
            Error::Api { message, .. } => message.clone(),
            Error::Http(_) => "Request failed, please try again later".to_string(),
            Error::Io(_) | Error::Serialization(_) | Error::Internal { .. } | Error::Other(_) => {
                "Internal error".to_string()
            }
        }
    }
}

/// Type alias for operation results across the crate.
pub type Result<T> = std::result::Result<T, Error>;
