//! Conversational front end for Medibot.
//!
//! Sends each user message to a remote responder and, when that fails,
//! answers from the local condition matcher. The controller owns the
//! transcript and persists it after every completed submission.

pub mod controller;
pub mod error;
pub mod responder;

pub use controller::{
    ConversationController, ControllerState, RejectReason, Submission, SubmitOutcome,
    TYPING_PLACEHOLDER, UNREACHABLE_MESSAGE,
};
pub use error::ChatError;
pub use responder::{ChatReply, ChatRequest, HttpResponder, RemoteResponder};
