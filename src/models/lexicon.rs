use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single lexicon term row. `normalized_term` is always the case-folded Unicode NFC
/// of `term`, maintained by the lexicon subsystem rather than by the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LexiconTerm {
    pub id: i32,
    pub lexicon_id: String,
    pub term: String,
    pub normalized_term: String,
    pub replacement: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLexiconTerm {
    pub term: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateLexiconTerm {
    pub term: Option<String>,
    pub replacement: Option<String>,
}

/// The sorted, normalized, in-memory view of a lexicon ready for matching.
/// Entries are ordered by descending term length so longest-match-first falls
/// out of a simple linear scan.
#[derive(Debug, Clone)]
pub struct CompiledLexicon {
    pub lexicon_id: String,
    pub entries: Vec<CompiledEntry>,
}

#[derive(Debug, Clone)]
pub struct CompiledEntry {
    pub normalized_term: String,
    pub replacement: String,
}

impl CompiledLexicon {
    pub fn from_active_terms(lexicon_id: &str, mut terms: Vec<LexiconTerm>) -> Self {
        terms.sort_by(|a, b| b.normalized_term.len().cmp(&a.normalized_term.len()));
        let entries = terms
            .into_iter()
            .map(|t| CompiledEntry {
                normalized_term: t.normalized_term,
                replacement: t.replacement,
            })
            .collect();
        CompiledLexicon {
            lexicon_id: lexicon_id.to_string(),
            entries,
        }
    }

    pub fn contains_normalized(&self, normalized: &str) -> bool {
        self.entries.iter().any(|e| e.normalized_term == normalized)
    }
}
