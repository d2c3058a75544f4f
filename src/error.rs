//! Unified client error model.
//! One enum covers every failure the session/dispatch layer can produce, so
//! callers branch on the kind instead of unwinding through exceptions.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientError {
    /// The dispatcher was asked to send an authorized request with no session.
    /// The request was never sent.
    NoActiveSession { message: String },
    /// A credential was present but its payload segment did not decode to
    /// well-formed claims.
    MalformedCredential { message: String },
    /// The backend answered with a non-2xx status.
    RequestFailed { status: u16, message: String },
    /// Transport-level failure: no response was received (connect error,
    /// timeout, TLS failure).
    NetworkFailure { message: String },
    /// The persistent credential slot could not be read or written.
    Io { message: String },
}

impl ClientError {
    pub fn no_session<S: Into<String>>(msg: S) -> Self {
        ClientError::NoActiveSession { message: msg.into() }
    }
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        ClientError::MalformedCredential { message: msg.into() }
    }
    pub fn request_failed<S: Into<String>>(status: u16, msg: S) -> Self {
        ClientError::RequestFailed { status, message: msg.into() }
    }
    pub fn network<S: Into<String>>(msg: S) -> Self {
        ClientError::NetworkFailure { message: msg.into() }
    }
    pub fn io<S: Into<String>>(msg: S) -> Self {
        ClientError::Io { message: msg.into() }
    }

    pub fn message(&self) -> &str {
        match self {
            ClientError::NoActiveSession { message }
            | ClientError::MalformedCredential { message }
            | ClientError::RequestFailed { message, .. }
            | ClientError::NetworkFailure { message }
            | ClientError::Io { message } => message.as_str(),
        }
    }

    /// True for the kinds that are resolved by dropping to the
    /// unauthenticated state and redirecting to login, rather than being
    /// shown to the user as a request error.
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            ClientError::NoActiveSession { .. } | ClientError::MalformedCredential { .. }
        )
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::NoActiveSession { message } => write!(f, "no active session: {}", message),
            ClientError::MalformedCredential { message } => {
                write!(f, "malformed credential: {}", message)
            }
            ClientError::RequestFailed { status, message } => {
                write!(f, "request failed (HTTP {}): {}", status, message)
            }
            ClientError::NetworkFailure { message } => write!(f, "network failure: {}", message),
            ClientError::Io { message } => write!(f, "credential storage error: {}", message),
        }
    }
}

impl std::error::Error for ClientError {}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::network(format!("request timed out: {}", err))
        } else {
            ClientError::network(err.to_string())
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::io(err.to_string())
    }
}
