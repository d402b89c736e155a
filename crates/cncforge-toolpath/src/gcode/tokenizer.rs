//! Address-word tokenizer
//!
//! Lexes one program line into `(letter, value)` words after removing
//! parenthetical and semicolon comments.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::arc::ArcDirection;
use super::cycles::CycleCode;
use super::shapes::ShapeKind;

/// Address letters the tokenizer keeps. Anything else (N, O, L, ...) is dropped.
pub const RECOGNIZED_LETTERS: [char; 14] = [
    'G', 'M', 'X', 'Y', 'Z', 'I', 'J', 'K', 'R', 'Q', 'P', 'F', 'S', 'T',
];

/// G codes whose axis words are not a motion target
const NON_MOTION_AXIS_CODES: [u32; 5] = [100, 280, 300, 520, 920];

/// One address word, e.g. `X10.5`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub letter: char,
    pub value: f64,
}

impl Word {
    /// Code number times ten, so `G13.1` -> 131 and `G01` -> 10
    pub fn code_key(&self) -> u32 {
        (self.value.abs() * 10.0).round() as u32
    }
}

/// Dominant code family of a line, in priority order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionClass {
    Arc(ArcDirection),
    Linear { rapid: bool },
    Cycle(CycleCode),
    Shape(ShapeKind),
    Dwell,
    /// G10/G28/G30/G52/G92 style codes that consume axis words
    NonMotion(u32),
    ModalOnly,
}

impl MotionClass {
    fn priority(&self) -> u8 {
        match self {
            Self::Arc(_) => 6,
            Self::Linear { .. } => 5,
            Self::Cycle(_) => 4,
            Self::Shape(_) => 3,
            Self::Dwell => 2,
            Self::NonMotion(_) => 1,
            Self::ModalOnly => 0,
        }
    }

    fn from_key(key: u32) -> Option<Self> {
        match key {
            0 => Some(Self::Linear { rapid: true }),
            10 => Some(Self::Linear { rapid: false }),
            20 => Some(Self::Arc(ArcDirection::Clockwise)),
            30 => Some(Self::Arc(ArcDirection::CounterClockwise)),
            40 => Some(Self::Dwell),
            k if NON_MOTION_AXIS_CODES.contains(&k) => Some(Self::NonMotion(k)),
            k => CycleCode::from_key(k)
                .map(Self::Cycle)
                .or_else(|| ShapeKind::from_key(k).map(Self::Shape)),
        }
    }
}

/// A tokenized program line. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramLine {
    /// 1-based line number
    pub number: usize,
    /// Raw source text
    pub raw: String,
    /// Words in left-to-right order
    pub words: Vec<Word>,
}

impl ProgramLine {
    /// First value for `letter`; later repeats on the same line are ignored
    pub fn value(&self, letter: char) -> Option<f64> {
        self.words
            .iter()
            .find(|w| w.letter == letter)
            .map(|w| w.value)
    }

    pub fn has(&self, letter: char) -> bool {
        self.words.iter().any(|w| w.letter == letter)
    }

    /// Every G code on the line as a code key (see [`Word::code_key`])
    pub fn g_codes(&self) -> impl Iterator<Item = u32> + '_ {
        self.words
            .iter()
            .filter(|w| w.letter == 'G')
            .map(Word::code_key)
    }

    /// Every M code on the line
    pub fn m_codes(&self) -> impl Iterator<Item = u32> + '_ {
        self.words
            .iter()
            .filter(|w| w.letter == 'M')
            .map(|w| w.value.abs().round() as u32)
    }

    pub fn has_g(&self, key: u32) -> bool {
        self.g_codes().any(|k| k == key)
    }

    /// Whether any X, Y, or Z word is present
    pub fn has_axis_words(&self) -> bool {
        self.words
            .iter()
            .any(|w| matches!(w.letter, 'X' | 'Y' | 'Z'))
    }

    /// Words other than G codes and the listed letters
    pub fn has_words_besides(&self, letters: &[char]) -> bool {
        self.words
            .iter()
            .any(|w| w.letter != 'G' && !letters.contains(&w.letter))
    }

    /// Dominant code family: Arc > Linear > Cycle > Shape > Dwell > modal-only.
    /// The first code of the winning family is used.
    pub fn motion_class(&self) -> MotionClass {
        let mut best = MotionClass::ModalOnly;
        for key in self.g_codes() {
            if let Some(class) = MotionClass::from_key(key) {
                if class.priority() > best.priority() {
                    best = class;
                }
            }
        }
        best
    }
}

/// Split a raw line into its code part and its comment text
///
/// Parenthetical comments are removed wherever they appear; an unmatched
/// `(` comments out the rest of the line. A `;` comments out the rest of
/// the line.
pub fn split_comment(raw: &str) -> (String, Option<String>) {
    let mut code = String::with_capacity(raw.len());
    let mut comments: Vec<String> = Vec::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            '(' => {
                let mut text = String::new();
                for inner in chars.by_ref() {
                    if inner == ')' {
                        break;
                    }
                    text.push(inner);
                }
                comments.push(text.trim().to_string());
            }
            ';' => {
                comments.push(chars.by_ref().collect::<String>().trim().to_string());
                break;
            }
            _ => code.push(c),
        }
    }

    comments.retain(|c| !c.is_empty());
    let comment = if comments.is_empty() {
        None
    } else {
        Some(comments.join(" "))
    };
    (code.trim().to_string(), comment)
}

fn word_regex() -> &'static Regex {
    static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
    WORD_REGEX.get_or_init(|| {
        Regex::new(r"(,?)([A-Za-z])\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+))")
            .expect("invalid regex pattern")
    })
}

/// Tokenize one line. Returns `None` for blank, `%`, or comment-only lines.
pub fn tokenize(number: usize, raw: &str) -> Option<ProgramLine> {
    let (code, _) = split_comment(raw);
    if code.is_empty() || code == "%" {
        return None;
    }

    let words = word_regex()
        .captures_iter(&code)
        .filter(|caps| caps[1].is_empty())
        .filter_map(|caps| {
            let letter = caps[2].chars().next()?.to_ascii_uppercase();
            if !RECOGNIZED_LETTERS.contains(&letter) {
                return None;
            }
            let value = caps[3].parse::<f64>().ok()?;
            Some(Word { letter, value })
        })
        .collect();

    Some(ProgramLine {
        number,
        raw: raw.to_string(),
        words,
    })
}

/// Whether the text holds at least one line that survives comment stripping
pub fn has_executable_lines(text: &str) -> bool {
    text.lines().any(|line| {
        let (code, _) = split_comment(line);
        !code.is_empty() && code != "%"
    })
}
