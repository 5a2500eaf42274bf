//! Local fallback matcher for Medibot.
//!
//! Scores a free-text query against a fixed condition table by keyword
//! substring containment and renders the top matches as a short summary.
//! Used when the remote responder is unreachable.

pub mod matcher;
pub mod table;

pub use matcher::{predict, rank, LocalMatcher, ScoredMatch, MAX_MATCHES, NO_MATCH_MESSAGE};
pub use table::ConditionTable;
