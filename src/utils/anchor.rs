//! GitHub.com anchor generation
//!
//! Input is the plain text of a heading, after inline markup has been
//! stripped by the parser. The algorithm then matches GitHub:
//! 1. Lowercase conversion
//! 2. Letters, digits, underscores and hyphens are kept (Unicode letters included)
//! 3. Each whitespace character becomes one hyphen
//! 4. Everything else is dropped, so `-->` between spaces yields four hyphens
//! 5. No leading/trailing trimming and no hyphen consolidation

/// Generate a GitHub.com style anchor fragment from heading text
///
/// # Examples
/// ```
/// use mdtidy_lib::utils::anchor::heading_to_fragment;
///
/// assert_eq!(heading_to_fragment("Hello World"), "hello-world");
/// assert_eq!(heading_to_fragment("cbrown --> sbrown: --unsafe-paths"), "cbrown----sbrown---unsafe-paths");
/// assert_eq!(heading_to_fragment("test_with_underscores"), "test_with_underscores");
/// ```
pub fn heading_to_fragment(heading: &str) -> String {
    let mut result = String::with_capacity(heading.len());

    for c in heading.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '_' || c == '-' {
            result.push(c);
        } else if c.is_whitespace() {
            result.push('-');
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_basic_cases() {
        assert_eq!(heading_to_fragment("Hello World"), "hello-world");
        assert_eq!(heading_to_fragment("Test Case"), "test-case");
        assert_eq!(heading_to_fragment(""), "");
    }

    #[test]
    fn test_github_underscores() {
        assert_eq!(heading_to_fragment("test_with_underscores"), "test_with_underscores");
        assert_eq!(heading_to_fragment("Update login_type"), "update-login_type");
        assert_eq!(heading_to_fragment("__dunder__"), "__dunder__");
    }

    #[test]
    fn test_github_arrows() {
        assert_eq!(
            heading_to_fragment("cbrown --> sbrown: --unsafe-paths"),
            "cbrown----sbrown---unsafe-paths"
        );
        assert_eq!(heading_to_fragment("cbrown -> sbrown"), "cbrown---sbrown");
        assert_eq!(heading_to_fragment("Arrow Test <-> bidirectional"), "arrow-test---bidirectional");
        assert_eq!(heading_to_fragment("Double Arrow ==> Test"), "double-arrow--test");
    }

    #[test]
    fn test_github_hyphens() {
        assert_eq!(heading_to_fragment("Double--Hyphen"), "double--hyphen");
        assert_eq!(heading_to_fragment("---both---"), "---both---");
    }

    #[test]
    fn test_github_special_symbols() {
        assert_eq!(heading_to_fragment("Testing & Coverage"), "testing--coverage");
        assert_eq!(heading_to_fragment("API::Response > Error--Handling"), "apiresponse--error--handling");
        assert_eq!(heading_to_fragment("Version 2.1.0"), "version-210");
    }

    #[test]
    fn test_github_unicode() {
        assert_eq!(heading_to_fragment("Café René"), "café-rené");
        assert_eq!(heading_to_fragment("über uns"), "über-uns");
    }

    #[test]
    fn test_github_emojis_are_dropped() {
        assert_eq!(heading_to_fragment("Emoji 🎉 Party"), "emoji--party");
    }

    #[test]
    fn test_github_numbers() {
        assert_eq!(heading_to_fragment("Step 1: Getting Started"), "step-1-getting-started");
        assert_eq!(heading_to_fragment("123 Numbers"), "123-numbers");
    }
}
