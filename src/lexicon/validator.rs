use std::collections::HashSet;

use crate::db::repositories::LexiconRepository;
use crate::error::{AppError, ValidationIssue};
use crate::lexicon::{MAX_REPLACEMENT_LEN, MAX_TERM_LEN, normalize_term};
use crate::models::lexicon::LexiconTerm;

/// Runs every rule from spec.md §4.4 against a candidate (term, replacement) pair and
/// returns every violation found, rather than stopping at the first one.
pub struct LexiconValidator<'a> {
    repository: &'a LexiconRepository,
}

impl<'a> LexiconValidator<'a> {
    pub fn new(repository: &'a LexiconRepository) -> Self {
        Self { repository }
    }

    /// `exclude_id` is the row being updated (excluded from the uniqueness check against
    /// itself); `None` for a brand-new term.
    pub async fn validate(
        &self,
        lexicon_id: &str,
        term: &str,
        replacement: &str,
        exclude_id: Option<i32>,
    ) -> Result<(), AppError> {
        let mut issues = Vec::new();

        let trimmed_term = term.trim();
        let trimmed_replacement = replacement.trim();

        if trimmed_term.is_empty() {
            issues.push(ValidationIssue::new("term", "empty"));
        } else if trimmed_term.len() > MAX_TERM_LEN {
            issues.push(
                ValidationIssue::new("term", "too_long").with_value(trimmed_term.len().to_string()),
            );
        }
        if trimmed_term != term {
            log::warn!("lexicon term for '{}' had leading/trailing whitespace trimmed", lexicon_id);
        }

        if trimmed_replacement.is_empty() {
            issues.push(ValidationIssue::new("replacement", "empty"));
        } else if trimmed_replacement.len() > MAX_REPLACEMENT_LEN {
            issues.push(
                ValidationIssue::new("replacement", "too_long")
                    .with_value(trimmed_replacement.len().to_string()),
            );
        }
        if trimmed_replacement != replacement {
            log::warn!("lexicon replacement for '{}' had leading/trailing whitespace trimmed", lexicon_id);
        }

        if !issues.is_empty() {
            return Err(AppError::Validation(issues));
        }

        let normalized = normalize_term(trimmed_term);
        let active_terms = self.repository.list_active(lexicon_id).await?;

        if let Some(existing) = active_terms
            .iter()
            .find(|t| t.normalized_term == normalized && Some(t.id) != exclude_id)
        {
            issues.push(
                ValidationIssue::new("term", "duplicate").with_value(existing.normalized_term.clone()),
            );
        }

        for existing in &active_terms {
            if Some(existing.id) == exclude_id {
                continue;
            }
            if existing.normalized_term.contains(&normalized) || normalized.contains(&existing.normalized_term) {
                log::info!(
                    "lexicon '{}': new term '{}' overlaps with existing term '{}' (warning only)",
                    lexicon_id, normalized, existing.normalized_term
                );
            }
        }

        if let Some(chain) = detect_cycle(&active_terms, exclude_id, &normalized, &normalize_term(trimmed_replacement)) {
            issues.push(ValidationIssue::new("replacement", "circular_reference").with_chain(chain));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(issues))
        }
    }
}

/// Builds the directed graph where each active term points at its replacement (only when
/// that replacement is itself an active term in the same lexicon), adds the candidate edge
/// `new_term -> new_replacement`, and DFS-searches for a path back to `new_term`. Returns
/// the full cycle chain (e.g. `["MRI", "magnetic resonance", "MRI"]`) if one closes.
fn detect_cycle(
    active_terms: &[LexiconTerm],
    exclude_id: Option<i32>,
    new_term: &str,
    new_replacement: &str,
) -> Option<Vec<String>> {
    let term_set: HashSet<&str> = active_terms
        .iter()
        .filter(|t| Some(t.id) != exclude_id)
        .map(|t| t.normalized_term.as_str())
        .collect();

    let edge_of = |from: &str| -> Option<String> {
        if from == new_term {
            return Some(new_replacement.to_string());
        }
        active_terms
            .iter()
            .filter(|t| Some(t.id) != exclude_id)
            .find(|t| t.normalized_term == from)
            .map(|t| normalize_term(&t.replacement))
    };

    if !term_set.contains(new_replacement.to_string().as_str()) && new_replacement != new_term {
        // The new replacement isn't itself a term in this lexicon, so it can't be part of a cycle.
        return None;
    }

    let mut chain = vec![new_term.to_string()];
    let mut visited = HashSet::new();
    visited.insert(new_term.to_string());
    let mut current = new_replacement.to_string();

    loop {
        chain.push(current.clone());
        if current == new_term {
            return Some(chain);
        }
        if !visited.insert(current.clone()) {
            // Cycle among other terms not involving new_term; not this mutation's fault.
            return None;
        }
        match edge_of(&current) {
            Some(next) => current = next,
            None => return None,
        }
        if chain.len() > active_terms.len() + 2 {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn term(id: i32, lexicon: &str, normalized: &str, replacement: &str) -> LexiconTerm {
        LexiconTerm {
            id,
            lexicon_id: lexicon.to_string(),
            term: normalized.to_string(),
            normalized_term: normalized.to_string(),
            replacement: replacement.to_string(),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn detects_direct_cycle() {
        let existing = vec![term(1, "radiology", "mri", "magnetic resonance")];
        let cycle = detect_cycle(&existing, None, "magnetic resonance", "mri");
        assert!(cycle.is_some());
        let chain = cycle.unwrap();
        assert_eq!(chain.first(), Some(&"magnetic resonance".to_string()));
        assert_eq!(chain.last(), Some(&"magnetic resonance".to_string()));
    }

    #[test]
    fn no_cycle_for_unrelated_replacement() {
        let existing = vec![term(1, "radiology", "mri", "magnetic resonance")];
        let cycle = detect_cycle(&existing, None, "ct", "computed tomography");
        assert!(cycle.is_none());
    }
}
