use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Step 2 of the pipeline: normalizes form, collapses redundant whitespace/punctuation
/// while preserving paragraph breaks, and strips recognizer artifacts like `[inaudible]`.
pub fn apply(text: &str, language_normalisations_enabled: bool) -> String {
    let nfc: String = text.nfc().collect();
    let stripped = strip_bracket_artifacts(&nfc);
    let collapsed = collapse_whitespace(&stripped);
    let canonical_punctuation = canonicalize_punctuation_variants(&collapsed);
    let punctuation_fixed = collapse_repeated_punctuation(&canonical_punctuation);

    if language_normalisations_enabled {
        normalize_persian_characters(&punctuation_fixed)
    } else {
        punctuation_fixed
    }
}

/// Drops recognizer-inserted bracketed artifacts such as `[inaudible]`, `[music]`,
/// `[background noise]` without touching ordinary bracketed text a speaker might dictate.
fn strip_bracket_artifacts(text: &str) -> String {
    let known = Regex::new(r"(?i)\[\s*(inaudible|unintelligible|music|noise|background noise|silence|crosstalk)\s*\]")
        .expect("static pattern");
    known.replace_all(text, "").to_string()
}

fn collapse_whitespace(text: &str) -> String {
    let paragraphs: Vec<&str> = text.split("\n\n").collect();
    let single_space = Regex::new(r"[ \t]+").expect("static pattern");
    paragraphs
        .into_iter()
        .map(|p| {
            let lines: Vec<String> = p
                .lines()
                .map(|line| single_space.replace_all(line.trim(), " ").trim().to_string())
                .filter(|line| !line.is_empty())
                .collect();
            lines.join(" ")
        })
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Canonicalizes punctuation variants to their plain-ASCII forms: the ellipsis character
/// `…` to `...`, and en/em dashes (`–`, `—`) to a plain hyphen.
fn canonicalize_punctuation_variants(text: &str) -> String {
    text.chars()
        .flat_map(|c| match c {
            '\u{2026}' => vec!['.', '.', '.'],
            '\u{2013}' | '\u{2014}' => vec!['-'],
            other => vec![other],
        })
        .collect()
}

fn collapse_repeated_punctuation(text: &str) -> String {
    let repeated = Regex::new(r"([.,!?;:])\1+").expect("static pattern");
    let spaced_before = Regex::new(r"\s+([.,!?;:])").expect("static pattern");
    let once = repeated.replace_all(text, "$1");
    spaced_before.replace_all(&once, "$1").to_string()
}

/// Arabic-script yeh/kaf are frequently emitted by recognizers trained on Arabic corpora
/// even for Persian/Dari audio; this normalizes them to their Persian forms.
fn normalize_persian_characters(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{064A}' => '\u{06CC}', // Arabic yeh -> Persian yeh
            '\u{0643}' => '\u{06A9}', // Arabic kaf -> Persian keheh
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_artifacts() {
        let out = apply("the patient said [inaudible] and left", false);
        assert_eq!(out, "the patient said and left");
    }

    #[test]
    fn collapses_whitespace_but_keeps_paragraphs() {
        let out = apply("first   line\n\n\nsecond line", false);
        assert_eq!(out, "first line\n\nsecond line");
    }

    #[test]
    fn collapses_repeated_punctuation() {
        let out = apply("wait... really??", false);
        assert_eq!(out, "wait. really?");
    }

    #[test]
    fn normalizes_persian_characters_when_enabled() {
        let out = apply("\u{064A}\u{0643}", true);
        assert_eq!(out, "\u{06CC}\u{06A9}");
    }

    #[test]
    fn canonicalizes_ellipsis_character() {
        let out = apply("wait\u{2026} really", false);
        assert_eq!(out, "wait. really");
    }

    #[test]
    fn canonicalizes_en_and_em_dashes() {
        let out = apply("pages 4\u{2013}9 \u{2014} see appendix", false);
        assert_eq!(out, "pages 4-9 - see appendix");
    }
}
