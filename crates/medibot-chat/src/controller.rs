//! Conversation controller: one submission at a time, remote first, local
//! matcher as fallback.
//!
//! Lifecycle of a submission:
//! - Idle/Done/Fallback -> Sending (accepted: user entry and placeholder appended)
//! - Sending -> Done (remote reply replaces the placeholder)
//! - Sending -> Fallback (matcher output or the unreachable message replaces it)
//!
//! A submission arriving while another is `Sending` is rejected without
//! touching the transcript or the network.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use medibot_core::types::{Sender, Transcript};
use medibot_matcher::LocalMatcher;
use medibot_storage::KeyValueStore;

use crate::error::ChatError;
use crate::responder::{ChatRequest, RemoteResponder};

/// Bot text shown while the remote call is pending.
pub const TYPING_PLACEHOLDER: &str = "AI is typing...";

/// Shown on failure when no condition table is configured.
pub const UNREACHABLE_MESSAGE: &str = "Sorry, I couldn't reach the AI service.";

/// Where the controller is in the submission lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerState {
    /// Nothing submitted yet in this process.
    Idle,
    /// A remote call is in flight.
    Sending,
    /// The last submission was answered by the remote responder.
    Done,
    /// The last submission was answered locally.
    Fallback,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerState::Idle => write!(f, "Idle"),
            ControllerState::Sending => write!(f, "Sending"),
            ControllerState::Done => write!(f, "Done"),
            ControllerState::Fallback => write!(f, "Fallback"),
        }
    }
}

/// Contents of the input fields at the moment of submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub message: String,
    /// Auxiliary age field; blank means "not provided".
    pub age: Option<String>,
}

impl Submission {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            age: None,
        }
    }

    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.age = Some(age.into());
        self
    }
}

/// Why a submission was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A previous submission is still waiting on the backend.
    Busy,
    /// The message was empty after trimming.
    EmptyMessage,
}

/// Result of [`ConversationController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected(RejectReason),
    /// The remote reply now shown in the transcript.
    Replied(String),
    /// The local answer now shown in the transcript.
    FellBack(String),
}

impl SubmitOutcome {
    /// Bot text added to the transcript, if the submission was accepted.
    pub fn text(&self) -> Option<&str> {
        match self {
            SubmitOutcome::Rejected(_) => None,
            SubmitOutcome::Replied(text) | SubmitOutcome::FellBack(text) => Some(text),
        }
    }
}

struct Inner {
    transcript: Transcript,
    state: ControllerState,
}

/// Held for the lifetime of an accepted submission. Clears the in-flight
/// flag on drop; if the submission never settled (its future was dropped
/// mid-call), the placeholder is resolved as a fallback first.
struct InFlight<'a> {
    controller: &'a ConversationController,
    message: String,
    placeholder: Option<usize>,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            if let Some(index) = self.placeholder {
                tracing::warn!("Submission abandoned before the backend answered, using local fallback");
                let text = self.controller.fallback_text(&self.message);
                let stored = self
                    .controller
                    .settle(index, text, ControllerState::Fallback);
                self.controller.persist(stored);
            }
        }
        self.controller.sending.store(false, Ordering::Release);
    }
}

/// Owns the transcript and the in-flight flag; drives each submission.
pub struct ConversationController {
    responder: Box<dyn RemoteResponder>,
    matcher: Option<LocalMatcher>,
    store: Arc<dyn KeyValueStore>,
    transcript_key: String,
    sending: AtomicBool,
    inner: Mutex<Inner>,
}

impl ConversationController {
    /// Create a controller. `matcher` is `None` when no condition table is
    /// configured; failures then produce [`UNREACHABLE_MESSAGE`].
    pub fn new(
        responder: Box<dyn RemoteResponder>,
        matcher: Option<LocalMatcher>,
        store: Arc<dyn KeyValueStore>,
        transcript_key: impl Into<String>,
    ) -> Self {
        Self {
            responder,
            matcher,
            store,
            transcript_key: transcript_key.into(),
            sending: AtomicBool::new(false),
            inner: Mutex::new(Inner {
                transcript: Transcript::new(),
                state: ControllerState::Idle,
            }),
        }
    }

    /// Load the persisted transcript, replacing the in-memory one.
    ///
    /// Returns `Ok(true)` if a transcript was restored. An unreadable stored
    /// value is logged and left in place; the session starts empty.
    pub fn restore(&self) -> Result<bool, ChatError> {
        let Some(raw) = self.store.get(&self.transcript_key)? else {
            return Ok(false);
        };

        match Transcript::from_stored(&raw) {
            Ok(transcript) => {
                tracing::info!(entries = transcript.len(), "Transcript restored");
                self.lock_inner()?.transcript = transcript;
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(error = %e, key = %self.transcript_key, "Ignoring unreadable stored transcript");
                Ok(false)
            }
        }
    }

    /// Submit the current input.
    ///
    /// Makes exactly one remote call per accepted submission and writes the
    /// transcript to the store once, after the bot entry is final.
    pub async fn submit(&self, submission: &Submission) -> SubmitOutcome {
        if self.sending.load(Ordering::Acquire) {
            tracing::debug!("Submission rejected: request in flight");
            return SubmitOutcome::Rejected(RejectReason::Busy);
        }

        let message = submission.message.trim();
        if message.is_empty() {
            return SubmitOutcome::Rejected(RejectReason::EmptyMessage);
        }

        if self
            .sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return SubmitOutcome::Rejected(RejectReason::Busy);
        }
        let mut in_flight = InFlight {
            controller: self,
            message: message.to_string(),
            placeholder: None,
            settled: false,
        };

        let request = ChatRequest::new(message, submission.age.as_deref());
        let user_line = format!(
            "You ({}): {}",
            request.age.as_deref().unwrap_or("N/A"),
            message
        );

        let placeholder = {
            let mut inner = self.lock_inner_or_recover();
            inner.state = ControllerState::Sending;
            inner.transcript.push(Sender::User, user_line);
            inner.transcript.push(Sender::Bot, TYPING_PLACEHOLDER)
        };
        in_flight.placeholder = Some(placeholder);

        let (text, state) = match self.responder.respond(&request).await {
            Ok(reply) => (reply.reply, ControllerState::Done),
            Err(e) => {
                tracing::warn!(error = %e, "Backend unreachable, using local fallback");
                (self.fallback_text(message), ControllerState::Fallback)
            }
        };

        let stored = self.settle(placeholder, text.clone(), state);
        in_flight.settled = true;
        self.persist(stored);
        tracing::debug!(state = %state, "Submission complete");

        match state {
            ControllerState::Done => SubmitOutcome::Replied(text),
            _ => SubmitOutcome::FellBack(text),
        }
    }

    /// Remove the persisted transcript and empty the in-memory one.
    pub fn clear(&self) -> Result<(), ChatError> {
        if self.sending.load(Ordering::Acquire) {
            return Err(ChatError::Busy);
        }
        self.store.remove(&self.transcript_key)?;
        self.lock_inner()?.transcript.clear();
        tracing::info!("Chat history cleared");
        Ok(())
    }

    pub fn state(&self) -> ControllerState {
        self.lock_inner_or_recover().state
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Snapshot of the transcript.
    pub fn transcript(&self) -> Transcript {
        self.lock_inner_or_recover().transcript.clone()
    }

    pub fn has_matcher(&self) -> bool {
        self.matcher.is_some()
    }

    // -- Private helpers --

    /// Put the final bot text in place of the placeholder and leave
    /// `Sending`. Returns the stored form of the updated transcript.
    fn settle(
        &self,
        placeholder: usize,
        text: String,
        state: ControllerState,
    ) -> medibot_core::Result<String> {
        let mut inner = self.lock_inner_or_recover();
        inner.transcript.replace_text(placeholder, text);
        inner.state = state;
        inner.transcript.to_stored()
    }

    fn fallback_text(&self, message: &str) -> String {
        match &self.matcher {
            Some(matcher) => matcher.predict(message),
            None => UNREACHABLE_MESSAGE.to_string(),
        }
    }

    fn persist(&self, stored: medibot_core::Result<String>) {
        let result = stored.and_then(|raw| self.store.set(&self.transcript_key, &raw));
        if let Err(e) = result {
            tracing::warn!(error = %e, key = %self.transcript_key, "Failed to persist transcript");
        }
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, Inner>, ChatError> {
        self.inner
            .lock()
            .map_err(|e| ChatError::Storage(format!("transcript lock poisoned: {}", e)))
    }

    /// The transcript is plain data, so a poisoned lock still holds a usable
    /// value.
    fn lock_inner_or_recover(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Transcript lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
