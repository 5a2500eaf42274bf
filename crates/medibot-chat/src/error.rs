//! Error types for the conversational front end.

use medibot_core::error::MedibotError;

/// Errors from talking to the remote responder or persisting the transcript.
///
/// The three transport variants are handled identically by the controller:
/// each one triggers the local fallback.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend returned HTTP {0}")]
    HttpStatus(u16),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("a request is already in flight")]
    Busy,
}

impl From<MedibotError> for ChatError {
    fn from(err: MedibotError) -> Self {
        ChatError::Storage(err.to_string())
    }
}
