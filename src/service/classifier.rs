use regex::Regex;
use std::sync::LazyLock;

/// Canonical base64 grammar: 4-char groups with an optional padded tail.
const ENCODED_GRAMMAR: &str = r"^([A-Za-z0-9+/]{4})*([A-Za-z0-9+/]{3}=|[A-Za-z0-9+/]{2}==)?$";

static ENCODED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ENCODED_GRAMMAR).expect("encoded grammar must compile"));

/// Reports whether `value` already looks like the output of the encrypt step.
///
/// This is a heuristic search over the grammar. Plaintext that happens to
/// satisfy it (e.g. `"abcd"`) is treated as encoded and left untouched.
/// The empty string is never considered encoded.
pub fn is_already_encoded(value: &str) -> bool {
    !value.is_empty() && ENCODED.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::is_already_encoded;

    #[test]
    fn empty_string_is_not_encoded() {
        assert!(!is_already_encoded(""));
    }

    #[test]
    fn single_group_is_encoded() {
        assert!(is_already_encoded("abcd"));
        assert!(is_already_encoded("A+/9"));
    }

    #[test]
    fn padded_tails_are_encoded() {
        assert!(is_already_encoded("abcdxyz="));
        assert!(is_already_encoded("abcdxy=="));
        assert!(is_already_encoded("QWxyZWFkeUVuY29kZWQ9"));
    }

    #[test]
    fn invalid_characters_are_not_encoded() {
        assert!(!is_already_encoded("abcd efgh"));
        assert!(!is_already_encoded("abc-"));
        assert!(!is_already_encoded("plain_secret!"));
    }

    #[test]
    fn unpadded_or_misaligned_values_are_not_encoded() {
        assert!(!is_already_encoded("plainSecret"));
        assert!(!is_already_encoded("abcdx"));
        assert!(!is_already_encoded("abcdx==="));
        assert!(!is_already_encoded("ab=c"));
    }
}
