//! Input normalization for account records.
//!
//! This module canonicalizes free-text inputs before they are validated and
//! persisted. It acts as a gatekeeper in front of the store: records whose
//! normalized name or phone comes out empty never reach the business logic.
//!
//! ## Conventions
//!
//! **Empty string is the invalid sentinel.** None of the functions here
//! returns an error; callers check for emptiness and reject the record
//! themselves. This keeps the functions total and trivially composable.
//!
//! **Normalization is idempotent.** Feeding an already-normalized value back
//! in returns it unchanged, so stored values can be re-normalized safely.

/// Space-like code points folded to an ASCII space before collapsing.
///
/// Covers the non-breaking and typographic spaces that commonly leak into
/// copy-pasted names, plus the zero-width space and the BOM.
const SPACE_LIKE: &[char] = &[
    '\u{00A0}', // no-break space
    '\u{1680}', // ogham space mark
    '\u{2000}', '\u{2001}', '\u{2002}', '\u{2003}', '\u{2004}', '\u{2005}', '\u{2006}',
    '\u{2007}', '\u{2008}', '\u{2009}', '\u{200A}', // en/em/thin/hair spaces
    '\u{200B}', // zero-width space
    '\u{202F}', // narrow no-break space
    '\u{205F}', // medium mathematical space
    '\u{3000}', // ideographic space
    '\u{FEFF}', // byte order mark
];

/// Canonicalizes a display name.
///
/// Folds the [`SPACE_LIKE`] code points to an ordinary space, collapses
/// whitespace runs to a single space and trims both ends. May return the
/// empty string; callers must treat that as an invalid name.
pub fn normalize_name(raw: &str) -> String {
    let folded: String =
        raw.chars().map(|c| if SPACE_LIKE.contains(&c) { ' ' } else { c }).collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonicalizes a phone number to its trailing 10-digit local form.
///
/// Strips every non-digit character. Inputs with fewer than 10 digits yield
/// the empty string (invalid); longer inputs keep exactly the last 10 digits,
/// so country-code prefixes are truncated away.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 10 {
        return String::new();
    }
    digits[digits.len() - 10..].to_string()
}

/// Canonicalizes a tag: trimmed and lower-cased. Empty is a valid tag.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, normalize_phone, normalize_tag};

    #[test]
    fn unit_normalize_name_folds_unicode_spaces() {
        assert_eq!(normalize_name("  a\u{00A0}\u{00A0}b  "), "a b");
        assert_eq!(normalize_name("a\u{200B}\u{200B}b"), "a b");
        assert_eq!(normalize_name("\u{FEFF}Ada\u{3000}Lovelace"), "Ada Lovelace");
    }

    #[test]
    fn unit_normalize_name_collapses_and_trims() {
        assert_eq!(normalize_name("  Ada   Lovelace "), "Ada Lovelace");
        assert_eq!(normalize_name("\t\na \t b\n"), "a b");
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("   \u{00A0} "), "");
    }

    #[test]
    fn unit_normalize_name_is_idempotent() {
        for raw in ["  Ada   Lovelace ", "a\u{00A0}b", "x", ""] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once);
        }
    }

    #[test]
    fn unit_normalize_phone_keeps_last_ten_digits() {
        assert_eq!(normalize_phone("+1 (555) 123-4567"), "5551234567");
        assert_eq!(normalize_phone("5551234567"), "5551234567");
        assert_eq!(normalize_phone("+91 98765 43210"), "9876543210");
        assert_eq!(normalize_phone("00115551234567"), "5551234567");
    }

    #[test]
    fn unit_normalize_phone_rejects_short_inputs() {
        assert_eq!(normalize_phone("123"), "");
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("555-123-456"), "");
        assert_eq!(normalize_phone("no digits at all"), "");
    }

    #[test]
    fn unit_normalize_phone_output_shape() {
        // Either empty or exactly 10 ASCII digits, for any input.
        for raw in ["+1 (555) 123-4567", "abc", "123456789012345", "٠١٢٣٤٥٦٧٨٩"] {
            let out = normalize_phone(raw);
            assert!(out.is_empty() || (out.len() == 10 && out.chars().all(|c| c.is_ascii_digit())));
        }
    }

    #[test]
    fn unit_normalize_tag_lowercases_and_trims() {
        assert_eq!(normalize_tag("  VIP "), "vip");
        assert_eq!(normalize_tag(""), "");
        assert_eq!(normalize_tag("Follow-Up"), "follow-up");
    }
}
