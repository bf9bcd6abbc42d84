//! Unit tests for wildcard matching

use mosaicsh::wildcard::matches;

#[cfg(test)]
mod wildcard_tests {
    use super::*;

    #[test]
    fn test_literal() {
        assert!(matches("Cargo.toml", "Cargo.toml"));
        assert!(!matches("Cargo.toml", "Cargo.lock"));
    }

    #[test]
    fn test_question_mark_is_exactly_one() {
        assert!(matches("a1", "a?"));
        assert!(!matches("a", "a?"));
        assert!(!matches("a12", "a?"));
    }

    #[test]
    fn test_star_matches_empty_run() {
        assert!(matches("ab", "a*b"));
        assert!(matches("", ""));
        assert!(matches("", "**"));
        assert!(!matches("", "a*"));
    }

    #[test]
    fn test_multiple_stars() {
        assert!(matches("src/main.rs", "*/*.rs"));
        assert!(matches("abcbcd", "a*bc*d"));
        assert!(!matches("abcbce", "a*bc*d"));
    }

    #[test]
    fn test_star_in_name_is_matched_by_star() {
        assert!(matches("*notes*", "*"));
        assert!(matches("*notes*", "*notes*"));
        assert!(matches("a*b", "a*"));
    }

    #[test]
    fn test_trailing_text_after_star() {
        assert!(matches("archive.tar.gz", "*.gz"));
        assert!(!matches("archive.tar.gz", "*.tar"));
    }
}
