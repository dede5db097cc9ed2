pub mod cache;
pub mod compiler;
pub mod validator;

use unicode_normalization::UnicodeNormalization;

/// Case-folds and NFC-normalizes a term the same way on write (before persisting
/// `normalized_term`) and on read (before matching against compiled lexicon entries),
/// so the two paths can never disagree about what "the same term" means.
pub fn normalize_term(term: &str) -> String {
    term.trim().nfc().collect::<String>().to_lowercase()
}

pub const MAX_TERM_LEN: usize = 200;
pub const MAX_REPLACEMENT_LEN: usize = 500;
