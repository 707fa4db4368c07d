use reqwest::StatusCode;
use thiserror::Error;

/// Why an exchange with the chat endpoint failed.
///
/// The chat view never shows these to the user; they are logged and then
/// collapsed into the fallback reply.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chat endpoint returned status {0}")]
    Status(StatusCode),
    #[error("malformed reply body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A submission the state machine refused. Callers ignore these silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("input is empty")]
    EmptyInput,
    #[error("a request is already in flight")]
    AlreadySending,
}
