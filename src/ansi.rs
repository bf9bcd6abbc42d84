//! ANSI escape sequence interpretation
//!
//! Turns a character stream containing a small subset of ANSI escape
//! sequences into a list of [`StyledRun`]s. Only SGR styling (bold, italic,
//! underline and the 16 color palette) is modelled; cursor movement, private
//! modes and character set designation are recognized and dropped.
//!
//! Every call to [`interpret`] starts from a fresh state machine, so a caller
//! that wants styling to carry across chunks must re-interpret the whole
//! accumulated buffer.

use serde::{Deserialize, Serialize};

const ESC: char = '\u{1b}';

/// The eight base ANSI colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnsiColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl AnsiColor {
    fn from_offset(offset: u32) -> Option<Self> {
        match offset {
            0 => Some(AnsiColor::Black),
            1 => Some(AnsiColor::Red),
            2 => Some(AnsiColor::Green),
            3 => Some(AnsiColor::Yellow),
            4 => Some(AnsiColor::Blue),
            5 => Some(AnsiColor::Magenta),
            6 => Some(AnsiColor::Cyan),
            7 => Some(AnsiColor::White),
            _ => None,
        }
    }
}

/// Semantic palette entry: 8 normal, 8 bright, plus the two defaults.
///
/// Mapping these to concrete colors is the rendering layer's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaletteColor {
    Normal(AnsiColor),
    Bright(AnsiColor),
    DefaultForeground,
    DefaultBackground,
}

impl PaletteColor {
    /// Foreground color for SGR 30–37 / 90–97
    pub fn foreground_from_sgr(code: u32) -> Option<Self> {
        match code {
            30..=37 => AnsiColor::from_offset(code - 30).map(PaletteColor::Normal),
            90..=97 => AnsiColor::from_offset(code - 90).map(PaletteColor::Bright),
            _ => None,
        }
    }

    /// Background color for SGR 40–47 / 100–107
    pub fn background_from_sgr(code: u32) -> Option<Self> {
        match code {
            40..=47 => AnsiColor::from_offset(code - 40).map(PaletteColor::Normal),
            100..=107 => AnsiColor::from_offset(code - 100).map(PaletteColor::Bright),
            _ => None,
        }
    }

    /// Whether this is one of the two default entries
    pub fn is_default(&self) -> bool {
        matches!(
            self,
            PaletteColor::DefaultForeground | PaletteColor::DefaultBackground
        )
    }
}

/// Text attributes applied to a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub foreground: PaletteColor,
    pub background: PaletteColor,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            underline: false,
            foreground: PaletteColor::DefaultForeground,
            background: PaletteColor::DefaultBackground,
        }
    }
}

impl TextStyle {
    /// Whether every attribute is at its default
    pub fn is_default(&self) -> bool {
        *self == TextStyle::default()
    }

    /// Apply a first-position SGR parameter. Unknown values are ignored.
    fn apply_sgr(&mut self, code: u32) {
        match code {
            0 => *self = TextStyle::default(),
            1 => self.bold = true,
            3 => self.italic = true,
            4 => self.underline = true,
            24 => self.underline = false,
            39 => self.foreground = PaletteColor::DefaultForeground,
            _ => {
                if let Some(color) = PaletteColor::foreground_from_sgr(code) {
                    self.foreground = color;
                }
            }
        }
    }

    /// Apply a second-position SGR parameter, which only addresses the background.
    fn apply_background_sgr(&mut self, code: u32) {
        if code == 49 {
            self.background = PaletteColor::DefaultBackground;
        } else if let Some(color) = PaletteColor::background_from_sgr(code) {
            self.background = color;
        }
    }
}

/// A contiguous span of text sharing one style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    pub text: String,
    pub style: TextStyle,
}

impl StyledRun {
    /// Create a run with an explicit style
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Create a run with the default style
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, TextStyle::default())
    }
}

/// Concatenate the text of a run sequence, dropping styles
pub fn plain_text(runs: &[StyledRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Initial,
    Escaped,
    FirstParam,
    SecondParam,
    XtermExtension,
    TerminalModeExtension,
}

/// One-shot interpreter state
struct Interpreter {
    state: ParserState,
    style: TextStyle,
    pending: String,
    runs: Vec<StyledRun>,
    first: Option<u32>,
    second: Option<u32>,
}

impl Interpreter {
    fn new() -> Self {
        Self {
            state: ParserState::Initial,
            style: TextStyle::default(),
            pending: String::new(),
            runs: Vec::new(),
            first: None,
            second: None,
        }
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            let text = std::mem::take(&mut self.pending);
            self.runs.push(StyledRun::new(text, self.style));
        }
    }

    fn accumulate(param: &mut Option<u32>, digit: u32) {
        // Values only ever get compared against small ranges, so saturate.
        let value = param.unwrap_or(0).saturating_mul(10).saturating_add(digit);
        *param = Some(value);
    }

    fn feed(&mut self, ch: char) {
        self.state = match self.state {
            ParserState::Initial => self.feed_initial(ch),
            ParserState::Escaped => match ch {
                '[' => ParserState::FirstParam,
                '(' => ParserState::TerminalModeExtension,
                _ => ParserState::Initial,
            },
            ParserState::FirstParam => {
                if let Some(digit) = ch.to_digit(10) {
                    Self::accumulate(&mut self.first, digit);
                    ParserState::FirstParam
                } else {
                    match ch {
                        '?' => ParserState::XtermExtension,
                        ';' | 'm' => {
                            self.style.apply_sgr(self.first.unwrap_or(0));
                            if ch == ';' {
                                ParserState::SecondParam
                            } else {
                                ParserState::Initial
                            }
                        }
                        'J' => {
                            if self.first == Some(2) {
                                self.runs.clear();
                            }
                            ParserState::Initial
                        }
                        _ => ParserState::Initial,
                    }
                }
            }
            ParserState::SecondParam => {
                if let Some(digit) = ch.to_digit(10) {
                    Self::accumulate(&mut self.second, digit);
                    ParserState::SecondParam
                } else {
                    if ch == 'm' {
                        self.style.apply_background_sgr(self.second.unwrap_or(0));
                    }
                    ParserState::Initial
                }
            }
            ParserState::XtermExtension => {
                if ch == 'h' {
                    ParserState::Initial
                } else {
                    ParserState::XtermExtension
                }
            }
            // Only a designator is consumed; anything else is ordinary input.
            ParserState::TerminalModeExtension => match ch {
                'A' | 'B' | '0' | '1' | '2' => ParserState::Initial,
                _ => self.feed_initial(ch),
            },
        };
    }

    fn feed_initial(&mut self, ch: char) -> ParserState {
        if ch == ESC {
            self.flush();
            self.first = None;
            self.second = None;
            ParserState::Escaped
        } else {
            self.pending.push(ch);
            ParserState::Initial
        }
    }

    fn finish(mut self) -> Vec<StyledRun> {
        self.flush();
        self.runs
    }
}

/// Interpret `input` into styled runs.
///
/// Concatenating the text of the returned runs yields `input` with every
/// recognized escape sequence removed.
pub fn interpret(input: &str) -> Vec<StyledRun> {
    let mut interpreter = Interpreter::new();
    for ch in input.chars() {
        interpreter.feed(ch);
    }
    interpreter.finish()
}

/// Strip recognized escape sequences, keeping only the text
pub fn strip(input: &str) -> String {
    plain_text(&interpret(input))
}
