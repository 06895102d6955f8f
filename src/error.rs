// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Library error type and the messages shown to the user for each kind.

/// Rejections raised by the transaction form before any store call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a valid amount greater than zero")]
    InvalidAmount,

    #[error("Please select a category")]
    MissingCategory,

    #[error("Please enter a description")]
    EmptyDescription,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Local validation failed; nothing was sent to the store.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// Transport level failure (DNS, TLS, timeout, ...).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered but the body could not be decoded.
    #[error("could not decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The local SQLite store failed.
    #[error("local store error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Sign-in / sign-up was refused. The message comes from the backend and
    /// is shown verbatim.
    #[error("{0}")]
    Auth(String),

    #[error("not signed in; run `spendwise auth sign-in` first")]
    NotSignedIn,

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
pub const SAVE_FAILURE: &str = "Failed to save transaction. Please try again.";
pub const DELETE_FAILURE: &str = "Failed to delete transaction. Please try again.";

impl Error {
    /// Text suitable for an alert. Validation and auth messages are shown as
    /// is; everything else collapses to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(v) => v.to_string(),
            Error::Auth(msg) => msg.clone(),
            Error::NotSignedIn | Error::NotFound(_) | Error::Config(_) => self.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failures_collapse_to_generic_message() {
        let err = Error::Remote {
            status: 500,
            message: "relation \"transactions\" does not exist".into(),
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE);
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn auth_message_is_verbatim() {
        let err = Error::Auth("Invalid login credentials".into());
        assert_eq!(err.user_message(), "Invalid login credentials");
    }

    #[test]
    fn validation_message_passes_through() {
        let err: Error = ValidationError::MissingCategory.into();
        assert!(err.is_validation());
        assert_eq!(err.user_message(), "Please select a category");
    }
}
