//! Keyword scoring and summary rendering.

use medibot_core::types::ConditionRecord;

use crate::table::ConditionTable;

/// Maximum number of conditions included in a summary.
pub const MAX_MATCHES: usize = 3;

/// Returned when no record scores above zero.
pub const NO_MATCH_MESSAGE: &str = "🤖 Sorry, I couldn't identify your condition locally.";

const SUMMARY_HEADER: &str = "🤖 Possible Conditions:\n\n";

/// A record together with the number of its keywords found in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMatch<'a> {
    pub record: &'a ConditionRecord,
    pub score: usize,
}

/// Rank `records` against `query`.
///
/// The query is lowercased and nothing else; a keyword counts when it is a
/// substring of the query. Zero-score records are dropped, the rest are
/// stable-sorted by descending score and cut to [`MAX_MATCHES`].
pub fn rank<'a>(query: &str, records: &'a [ConditionRecord]) -> Vec<ScoredMatch<'a>> {
    let text = query.to_lowercase();

    let mut matches: Vec<ScoredMatch<'a>> = records
        .iter()
        .filter_map(|record| {
            let score = record
                .keywords
                .iter()
                .filter(|k| text.contains(k.as_str()))
                .count();
            (score > 0).then_some(ScoredMatch { record, score })
        })
        .collect();

    // sort_by is stable: equal scores keep table order.
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches.truncate(MAX_MATCHES);
    matches
}

/// Score `query` against `records` and render the ranked summary.
pub fn predict(query: &str, records: &[ConditionRecord]) -> String {
    let matches = rank(query, records);
    if matches.is_empty() {
        return NO_MATCH_MESSAGE.to_string();
    }

    let mut reply = String::from(SUMMARY_HEADER);
    for m in &matches {
        reply.push_str(&format!(
            "🔹 {}\nSeverity: {}\nPrecautions: {}\n\n",
            m.record.name,
            m.record.severity,
            m.record.precautions.join(", ")
        ));
    }
    reply.trim_end().to_string()
}

/// Fallback responder over a fixed condition table.
#[derive(Debug, Clone)]
pub struct LocalMatcher {
    table: ConditionTable,
}

impl LocalMatcher {
    pub fn new(table: ConditionTable) -> Self {
        Self { table }
    }

    /// Render the ranked summary for `query`.
    pub fn predict(&self, query: &str) -> String {
        predict(query, self.table.records())
    }

    /// Ranked matches for `query`, at most [`MAX_MATCHES`].
    pub fn rank(&self, query: &str) -> Vec<ScoredMatch<'_>> {
        rank(query, self.table.records())
    }

    pub fn table(&self) -> &ConditionTable {
        &self.table
    }
}

// =============================================================================
// Tests
// =============================================================================
