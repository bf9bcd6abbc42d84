//! Property-based tests for wildcard matching

use mosaicsh::wildcard::matches;
use proptest::prelude::*;

/// Straightforward recursive matcher used as the reference
fn reference(text: &[char], pattern: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => (0..=text.len()).any(|skip| reference(&text[skip..], rest)),
        Some(('?', rest)) => !text.is_empty() && reference(&text[1..], rest),
        Some((c, rest)) => text.first() == Some(c) && reference(&text[1..], rest),
    }
}

proptest! {
    #[test]
    fn test_agrees_with_reference(text in "[ab.*?]{0,10}", pattern in "[ab.*?]{0,8}") {
        let t: Vec<char> = text.chars().collect();
        let p: Vec<char> = pattern.chars().collect();
        prop_assert_eq!(matches(&text, &pattern), reference(&t, &p));
    }

    #[test]
    fn test_text_matches_itself(text in "[a-zA-Z0-9._-]{0,30}") {
        prop_assert!(matches(&text, &text));
    }

    #[test]
    fn test_star_matches_everything(text in "\\PC{0,30}") {
        prop_assert!(matches(&text, "*"));
    }

    #[test]
    fn test_question_marks_match_length(text in "[a-z]{0,12}") {
        let pattern = "?".repeat(text.chars().count());
        prop_assert!(matches(&text, &pattern));
        let longer = format!("{}?", pattern);
        prop_assert!(!matches(&text, &longer));
    }
}
