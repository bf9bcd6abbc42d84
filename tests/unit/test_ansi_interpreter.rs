//! Unit tests for the escape sequence interpreter

use mosaicsh::ansi::{interpret, plain_text, strip, AnsiColor, PaletteColor, StyledRun};

#[cfg(test)]
mod interpreter_tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let runs = interpret("Hello, World!");
        assert_eq!(runs, vec![StyledRun::plain("Hello, World!")]);
    }

    #[test]
    fn test_red_then_reset() {
        let runs = interpret("\x1b[31mRed text\x1b[0m normal");
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Red text");
        assert_eq!(runs[0].style.foreground, PaletteColor::Normal(AnsiColor::Red));
        assert!(runs[1].style.is_default());
    }

    #[test]
    fn test_attributes_accumulate() {
        let runs = interpret("\x1b[1m\x1b[3m\x1b[4mX");
        assert_eq!(runs.len(), 1);
        let style = runs[0].style;
        assert!(style.bold && style.italic && style.underline);
    }

    #[test]
    fn test_underline_off_and_default_foreground() {
        let runs = interpret("\x1b[4m\x1b[32mA\x1b[24mB\x1b[39mC");
        assert!(runs[0].style.underline);
        assert!(!runs[1].style.underline);
        assert_eq!(runs[1].style.foreground, PaletteColor::Normal(AnsiColor::Green));
        assert_eq!(runs[2].style.foreground, PaletteColor::DefaultForeground);
    }

    #[test]
    fn test_second_parameter_only_sets_background() {
        // A foreground code in second position is not a foreground change.
        let runs = interpret("\x1b[1;31mX");
        assert!(runs[0].style.bold);
        assert_eq!(runs[0].style.foreground, PaletteColor::DefaultForeground);

        let runs = interpret("\x1b[0;41mA\x1b[0;49mB");
        assert_eq!(runs[0].style.background, PaletteColor::Normal(AnsiColor::Red));
        assert_eq!(runs[1].style.background, PaletteColor::DefaultBackground);
    }

    #[test]
    fn test_background_code_in_first_position_is_ignored() {
        let runs = interpret("\x1b[41mA");
        assert_eq!(runs.len(), 1);
        assert!(runs[0].style.is_default());
    }

    #[test]
    fn test_cursor_movement_is_dropped() {
        assert_eq!(strip("a\x1b[2Kb\x1b[10Cc"), "abc");
    }

    #[test]
    fn test_unknown_escape_consumes_one_character() {
        assert_eq!(strip("a\x1b7b"), "ab");
    }

    #[test]
    fn test_clear_screen() {
        let runs = interpret("\x1b[31mfirst\x1b[2J\x1b[0msecond");
        assert_eq!(plain_text(&runs), "second");
    }

    #[test]
    fn test_truncated_sequence_at_end() {
        assert_eq!(strip("text\x1b[3"), "text");
    }

    #[test]
    fn test_adjacent_same_style_text_stays_one_run() {
        let runs = interpret("ab\x1b[0mcd");
        assert_eq!(plain_text(&runs), "abcd");
        assert!(runs.iter().all(|run| run.style.is_default()));
    }
}
