use std::cell::Cell;

use regex::Regex;

use crate::models::lexicon::CompiledLexicon;
use crate::pipeline::fuzzy;

/// Outcome of running the lexicon step over a transcript.
pub struct LexiconStepResult {
    pub text: String,
    pub exact_match_count: usize,
    pub fuzzy_match_count: usize,
}

/// Step 1 of the pipeline: exact whole-word substitution of every active lexicon term,
/// longest term first (so multi-word terms win over any single-word term they contain),
/// followed by fuzzy substitution of the tokens exact matching left untouched.
pub fn apply(text: &str, lexicon: &CompiledLexicon, fuzzy_enabled: bool, fuzzy_threshold: u8) -> LexiconStepResult {
    let mut working = text.to_string();
    let mut exact_match_count = 0;

    for entry in &lexicon.entries {
        let (next, count) = substitute_term(&working, &entry.normalized_term, &entry.replacement);
        working = next;
        exact_match_count += count;
    }

    let mut fuzzy_match_count = 0;
    if fuzzy_enabled {
        let (next, count) = apply_fuzzy(&working, lexicon, fuzzy_threshold);
        working = next;
        fuzzy_match_count = count;
    }

    LexiconStepResult {
        text: working,
        exact_match_count,
        fuzzy_match_count,
    }
}

/// Whole-word, case-insensitive substitution of `normalized_term` in `text`, preserving
/// the casing convention of each match: an all-uppercase match gets an uppercase
/// replacement, a title-case match gets a title-cased replacement, anything else gets
/// the replacement exactly as stored.
fn substitute_term(text: &str, normalized_term: &str, replacement: &str) -> (String, usize) {
    let pattern = format!(r"(?iu)\b{}\b", regex::escape(normalized_term));
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(_) => return (text.to_string(), 0),
    };

    let count = Cell::new(0usize);
    let result = re.replace_all(text, |caps: &regex::Captures| {
        count.set(count.get() + 1);
        apply_casing(&caps[0], replacement)
    });
    (result.into_owned(), count.get())
}

fn apply_casing(matched: &str, replacement: &str) -> String {
    if is_all_uppercase(matched) {
        replacement.to_uppercase()
    } else if is_title_case(matched) {
        title_case(replacement)
    } else {
        replacement.to_string()
    }
}

fn is_all_uppercase(s: &str) -> bool {
    s.chars().any(|c| c.is_alphabetic()) && s.chars().filter(|c| c.is_alphabetic()).all(|c| c.is_uppercase())
}

fn is_title_case(s: &str) -> bool {
    let mut words = s.split_whitespace();
    words.all(|w| {
        let mut chars = w.chars();
        match chars.next() {
            Some(first) => first.is_uppercase() && chars.all(|c| !c.is_alphabetic() || c.is_lowercase()),
            None => true,
        }
    })
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokenizes the working text into Unicode alphanumeric runs and runs each token that
/// didn't already take part in an exact match through fuzzy matching. A matched token is
/// replaced in place; the surrounding whitespace/punctuation is left untouched.
fn apply_fuzzy(text: &str, lexicon: &CompiledLexicon, threshold: u8) -> (String, usize) {
    let token_re = Regex::new(r"[\p{Alphabetic}\p{Number}]+").expect("static pattern");
    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;
    let mut fuzzy_count = 0;

    for m in token_re.find_iter(text) {
        result.push_str(&text[last_end..m.start()]);
        let token = m.as_str();
        if let Some(found) = fuzzy::best_match(token, lexicon, threshold) {
            result.push_str(&apply_casing(token, &found.replacement));
            fuzzy_count += 1;
        } else {
            result.push_str(token);
        }
        last_end = m.end();
    }
    result.push_str(&text[last_end..]);

    (result, fuzzy_count)
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
    fn substitutes_whole_word_case_insensitively() {
        let (text, count) = substitute_term("patient needs an Mri today", "mri", "MRI");
        assert_eq!(text, "patient needs an MRI today");
        assert_eq!(count, 1);
    }

    #[test]
    fn does_not_match_inside_larger_word() {
        let (text, count) = substitute_term("the mriage was cancelled", "mri", "MRI");
        assert_eq!(text, "the mriage was cancelled");
        assert_eq!(count, 0);
    }

    #[test]
    fn apply_reports_exact_match_count() {
        let result = apply("order an mri scan", &lexicon(), false, 85);
        assert_eq!(result.exact_match_count, 1);
        assert!(result.text.contains("MRI"));
    }
}
