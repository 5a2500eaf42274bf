use serde::{Deserialize, Serialize};

use crate::error::Result;

// =============================================================================
// Condition table
// =============================================================================

/// One row of the symptom table consulted by the local matcher.
///
/// Accepts the dataset's native field names (`disease`, `symptoms`) as
/// aliases so existing tables load unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRecord {
    #[serde(alias = "disease")]
    pub name: String,
    /// Lowercase keywords, matched as substrings of the query.
    #[serde(alias = "symptoms")]
    pub keywords: Vec<String>,
    pub severity: String,
    #[serde(default)]
    pub precautions: Vec<String>,
}

impl ConditionRecord {
    /// Lowercase every keyword in place.
    pub fn normalize(mut self) -> Self {
        for keyword in &mut self.keywords {
            *keyword = keyword.to_lowercase();
        }
        self
    }
}

// =============================================================================
// Transcript
// =============================================================================

/// Who produced a transcript entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// A single displayed message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub sender: Sender,
    pub text: String,
}

/// Ordered, append-only record of the messages shown in a session.
///
/// Entries are never removed individually; only the text of an existing
/// entry can be replaced (the bot placeholder) or the whole transcript
/// cleared.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its index.
    pub fn push(&mut self, sender: Sender, text: impl Into<String>) -> usize {
        self.entries.push(TranscriptEntry {
            sender,
            text: text.into(),
        });
        self.entries.len() - 1
    }

    /// Replace the text of the entry at `index`. Returns `false` if there is
    /// no such entry.
    pub fn replace_text(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Display form: one block per entry, separated by a blank line.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Serialized form written to the key-value store.
    pub fn to_stored(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a value previously produced by [`Transcript::to_stored`].
    pub fn from_stored(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
