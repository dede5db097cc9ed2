/// Which direction, if any, digit characters get normalized in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumeralStrategy {
    /// Convert every local-script digit run to ASCII.
    ForceAscii,
    /// Convert every ASCII digit run to the target language's native digits.
    ForceLocal,
    /// Leave digits exactly as the recognizer produced them.
    Preserve,
    /// Converts local-script digits to ASCII, in plain positions and in medical-code or
    /// unit-adjacent positions alike (`C3-C4`, `10mg`, a `120/80` pair) — clinicians expect
    /// numerals readable in ASCII regardless of where they sit in the sentence. Default.
    ContextAware,
}

impl NumeralStrategy {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "force-ascii" | "force_ascii" => NumeralStrategy::ForceAscii,
            "force-local" | "force_local" => NumeralStrategy::ForceLocal,
            "preserve" => NumeralStrategy::Preserve,
            _ => NumeralStrategy::ContextAware,
        }
    }
}

const PERSIAN_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];
const EASTERN_ARABIC_DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];

/// Step 3 of the pipeline: applies the configured numeral strategy. `language` is the
/// job's requested language hint (e.g. `"fa"`, `"ar"`); with no recognizable language the
/// local-digit strategies fall back to leaving ASCII digits untouched, since there is no
/// script to convert into.
pub fn apply(text: &str, strategy: NumeralStrategy, language: Option<&str>) -> String {
    match strategy {
        NumeralStrategy::Preserve => text.to_string(),
        NumeralStrategy::ForceAscii => to_ascii_digits(text),
        NumeralStrategy::ForceLocal => to_local_digits(text, language),
        NumeralStrategy::ContextAware => to_ascii_digits(text),
    }
}

fn to_ascii_digits(text: &str) -> String {
    text.chars()
        .map(|c| {
            if let Some(pos) = PERSIAN_DIGITS.iter().position(|&d| d == c) {
                char::from_digit(pos as u32, 10).unwrap()
            } else if let Some(pos) = EASTERN_ARABIC_DIGITS.iter().position(|&d| d == c) {
                char::from_digit(pos as u32, 10).unwrap()
            } else {
                c
            }
        })
        .collect()
}

fn to_local_digits(text: &str, language: Option<&str>) -> String {
    let target = match language.map(|l| l.to_lowercase()) {
        Some(ref l) if l.starts_with("fa") => Some(PERSIAN_DIGITS),
        Some(ref l) if l.starts_with("ar") => Some(EASTERN_ARABIC_DIGITS),
        _ => None,
    };
    let Some(digit_map) = target else {
        return text.to_string();
    };

    text.chars()
        .map(|c| {
            if c.is_ascii_digit() {
                digit_map[c.to_digit(10).unwrap() as usize]
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_ascii_converts_persian_digits() {
        assert_eq!(apply("۱۲۳", NumeralStrategy::ForceAscii, None), "123");
    }

    #[test]
    fn force_local_converts_ascii_to_persian() {
        assert_eq!(apply("123", NumeralStrategy::ForceLocal, Some("fa")), "۱۲۳");
    }

    #[test]
    fn context_aware_leaves_ascii_medical_codes_untouched() {
        let out = apply("disc herniation at C3-C4, dose 10mg", NumeralStrategy::ContextAware, Some("fa"));
        assert_eq!(out, "disc herniation at C3-C4, dose 10mg");
    }

    #[test]
    fn context_aware_converts_local_digits_in_medical_codes_to_ascii() {
        let out = apply("L\u{06F4}-L\u{06F5}", NumeralStrategy::ContextAware, Some("fa"));
        assert_eq!(out, "L4-L5");
    }

    #[test]
    fn context_aware_converts_local_digits_in_plain_positions_to_ascii() {
        let out = apply("\u{06F4}\u{06F5} \u{0645}\u{06CC}\u{0644}\u{06CC}\u{200C}\u{06AF}\u{0631}\u{0645}", NumeralStrategy::ContextAware, Some("fa"));
        assert_eq!(out, "45 \u{0645}\u{06CC}\u{0644}\u{06CC}\u{200C}\u{06AF}\u{0631}\u{0645}");
    }

    #[test]
    fn preserve_strategy_is_a_no_op() {
        assert_eq!(apply("١٢٣ and 456", NumeralStrategy::Preserve, Some("fa")), "١٢٣ and 456");
    }
}
