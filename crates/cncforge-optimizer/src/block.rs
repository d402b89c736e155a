//! Text-level view of one program line
//!
//! Rules edit lines in place: only the words they touch change, so block
//! numbers, unknown words and comments survive every rewrite.

use cncforge_toolpath::{tokenize, ProgramLine};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

fn span_regex() -> &'static Regex {
    static SPAN_REGEX: OnceLock<Regex> = OnceLock::new();
    SPAN_REGEX.get_or_init(|| {
        Regex::new(r"(,?)([A-Za-z])\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+))")
            .expect("invalid regex pattern")
    })
}

/// One address word as it appears in the raw text
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WordSpan {
    /// Upper-case letter
    pub letter: char,
    pub value: f64,
    /// Span of the whole word, comma prefix included
    pub range: Range<usize>,
    /// Span of the numeric text
    pub value_range: Range<usize>,
    /// Comma-prefixed corner word (`,R2.`)
    pub corner: bool,
}

/// A raw line with its word spans and comment regions
#[derive(Debug, Clone)]
pub(crate) struct Block<'a> {
    pub raw: &'a str,
    pub line: Option<ProgramLine>,
    pub spans: Vec<WordSpan>,
    comments: Vec<Range<usize>>,
}

/// Byte ranges covered by `( ... )` and `; ...` comments
fn comment_ranges(raw: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut open: Option<usize> = None;
    for (i, c) in raw.char_indices() {
        match (open, c) {
            (None, '(') => open = Some(i),
            (Some(start), ')') => {
                ranges.push(start..i + 1);
                open = None;
            }
            (None, ';') => {
                ranges.push(i..raw.len());
                return ranges;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        ranges.push(start..raw.len());
    }
    ranges
}

impl<'a> Block<'a> {
    pub fn parse(number: usize, raw: &'a str) -> Self {
        let comments = comment_ranges(raw);
        let in_comment = |pos: usize| comments.iter().any(|r| r.contains(&pos));
        let spans = span_regex()
            .captures_iter(raw)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                if in_comment(whole.start()) {
                    return None;
                }
                let number = caps.get(3)?;
                Some(WordSpan {
                    letter: caps[2].chars().next()?.to_ascii_uppercase(),
                    value: number.as_str().parse().ok()?,
                    range: whole.range(),
                    value_range: number.range(),
                    corner: !caps[1].is_empty(),
                })
            })
            .collect();

        Self {
            raw,
            line: tokenize(number, raw),
            spans,
            comments,
        }
    }

    pub fn has_comment(&self) -> bool {
        !self.comments.is_empty()
    }

    fn outside_comments(&self) -> impl Iterator<Item = (usize, char)> + '_ {
        self.raw
            .char_indices()
            .filter(|(i, _)| !self.comments.iter().any(|r| r.contains(i)))
    }

    /// Whether every letter in the code part is one of `allowed`
    ///
    /// Stricter than looking at the tokenized words: unknown letters such as
    /// block numbers or D/H offsets make a line non-pure.
    pub fn letters_within(&self, allowed: &[char]) -> bool {
        self.outside_comments()
            .filter(|(_, c)| c.is_ascii_alphabetic())
            .all(|(_, c)| allowed.contains(&c.to_ascii_uppercase()))
    }

    /// Code keys of every G word (G number times ten)
    pub fn g_keys(&self) -> Vec<u32> {
        self.line
            .as_ref()
            .map(|line| line.g_codes().collect())
            .unwrap_or_default()
    }

    pub fn has_letter(&self, letter: char) -> bool {
        self.find(letter).is_some()
    }

    /// Index of the first plain (non-corner) word with `letter`
    pub fn find(&self, letter: char) -> Option<usize> {
        self.spans
            .iter()
            .position(|s| s.letter == letter && !s.corner)
    }

    pub fn has_corner_word(&self) -> bool {
        self.spans.iter().any(|s| s.corner)
    }

    /// Line with one word removed, whitespace tidied
    pub fn without_span(&self, index: usize) -> String {
        let span = &self.spans[index];
        let before = self.raw[..span.range.start].trim_end();
        let after = self.raw[span.range.end..].trim_start();
        match (before.is_empty(), after.is_empty()) {
            (true, _) => after.to_string(),
            (_, true) => before.to_string(),
            _ => format!("{} {}", before, after),
        }
    }

    /// Line with the numeric text of one word replaced
    pub fn with_value(&self, index: usize, value: &str) -> String {
        let span = &self.spans[index];
        format!(
            "{}{}{}",
            &self.raw[..span.value_range.start],
            value,
            &self.raw[span.value_range.end..]
        )
    }

    /// Rebuild the line word by word
    ///
    /// `word` receives each span and returns its new text. Whitespace between
    /// words is dropped when `compact` is set; comments are kept verbatim.
    pub fn rewrite(
        &self,
        compact: bool,
        mut word: impl FnMut(&WordSpan, &str) -> String,
    ) -> String {
        let mut out = String::with_capacity(self.raw.len());
        let mut pos = 0;
        let mut spans = self.spans.iter().peekable();

        while pos < self.raw.len() {
            if let Some(range) = self.comments.iter().find(|r| r.start == pos) {
                out.push_str(&self.raw[range.clone()]);
                pos = range.end;
                continue;
            }
            if let Some(span) = spans.next_if(|s| s.range.start == pos) {
                out.push_str(&word(span, &self.raw[span.range.clone()]));
                pos = span.range.end;
                continue;
            }
            let Some(c) = self.raw[pos..].chars().next() else {
                break;
            };
            if !(compact && c.is_whitespace()) {
                out.push(c);
            }
            pos += c.len_utf8();
        }
        out.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_skip_comments() {
        let block = Block::parse(1, "G1 X10 (X99 note) Y2 ; F5");
        let letters: Vec<char> = block.spans.iter().map(|s| s.letter).collect();
        assert_eq!(letters, vec!['G', 'X', 'Y']);
        assert!(block.has_comment());
    }

    #[test]
    fn test_letters_within() {
        assert!(Block::parse(1, "G0 X1 Y2 (fast)").letters_within(&['G', 'X', 'Y', 'Z']));
        assert!(!Block::parse(1, "N10 G0 X1").letters_within(&['G', 'X', 'Y', 'Z']));
        assert!(!Block::parse(1, "G1 X1 ,R2.").letters_within(&['G', 'X', 'Y', 'Z']));
    }

    #[test]
    fn test_edit_words() {
        let block = Block::parse(1, "G1 X10 F200 (cut)");
        let f = block.find('F').unwrap();
        assert_eq!(block.without_span(f), "G1 X10 (cut)");
        assert_eq!(block.with_value(f, "150"), "G1 X10 F150 (cut)");
    }

    #[test]
    fn test_rewrite_compact_keeps_comments() {
        let block = Block::parse(1, "G01 X10.0 Y 2 (keep me)");
        let out = block.rewrite(true, |span, text| {
            if span.letter == 'G' {
                "G1".to_string()
            } else {
                text.chars().filter(|c| !c.is_whitespace()).collect()
            }
        });
        assert_eq!(out, "G1X10.0Y2(keep me)");
    }
}
