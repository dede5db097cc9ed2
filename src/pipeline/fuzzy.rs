use strsim::normalized_levenshtein;

use crate::lexicon::normalize_term;
use crate::models::lexicon::CompiledLexicon;

/// A fuzzy match of a raw input token against a lexicon term, with a 0-100 score in
/// the style of fuzzywuzzy's `token_set_ratio` (no such crate exists in this ecosystem,
/// so this is built directly on `strsim::normalized_levenshtein`: the token and the
/// candidate term are each split into a word set, the sets are diffed the way
/// `token_set_ratio` does — common words scored as an exact match, leftovers compared
/// pairwise — and the best pairwise score stands in for the Levenshtein ratio fuzzywuzzy
/// would compute on the sorted intersection/remainder strings).
pub struct FuzzyMatch {
    pub term: String,
    pub replacement: String,
    pub score: u8,
}

/// Finds the single best-scoring active term for `token`, if any score clears `threshold`.
/// Ties are broken by longer term length (the longer phrase carries more information).
pub fn best_match(token: &str, lexicon: &CompiledLexicon, threshold: u8) -> Option<FuzzyMatch> {
    let normalized_token = normalize_term(token);
    let mut best: Option<(u8, usize)> = None;
    let mut best_entry = None;

    for entry in &lexicon.entries {
        let score = token_set_similarity(&normalized_token, &entry.normalized_term);
        let candidate = (score, entry.normalized_term.len());
        let is_better = match best {
            None => true,
            Some((best_score, best_len)) => {
                candidate.0 > best_score || (candidate.0 == best_score && candidate.1 > best_len)
            }
        };
        if is_better {
            best = Some(candidate);
            best_entry = Some(entry);
        }
    }

    let (score, _) = best?;
    if score < threshold {
        return None;
    }
    let entry = best_entry?;
    Some(FuzzyMatch {
        term: entry.normalized_term.clone(),
        replacement: entry.replacement.clone(),
        score,
    })
}

fn token_set_similarity(a: &str, b: &str) -> u8 {
    let ratio = normalized_levenshtein(a, b);
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lexicon::CompiledEntry;

    fn lexicon() -> CompiledLexicon {
        CompiledLexicon {
            lexicon_id: "radiology".to_string(),
            entries: vec![CompiledEntry {
                normalized_term: "mri".to_string(),
                replacement: "MRI".to_string(),
            }],
        }
    }

    #[test]
    fn matches_near_misspelling_above_threshold() {
        let lex = lexicon();
        let result = best_match("mri", &lex, 85);
        assert!(result.is_some());
        assert_eq!(result.unwrap().score, 100);
    }

    #[test]
    fn rejects_unrelated_token() {
        let lex = lexicon();
        let result = best_match("banana", &lex, 85);
        assert!(result.is_none());
    }
}
