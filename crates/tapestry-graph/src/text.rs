//! Source text helpers shared by the detectors.

use crate::node::SourceRange;
use crate::signature::SourceLanguage;

/// A line of source with its zero-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SourceLine<'a> {
    pub(crate) number: u32,
    /// Byte offset of `text` within the original line.
    pub(crate) offset: usize,
    pub(crate) text: &'a str,
}

/// Returns the lines covered by `range`.
///
/// A range ending at column zero of a later line does not include that line.
pub(crate) fn span_lines<'a>(source: &'a str, range: &SourceRange) -> Vec<SourceLine<'a>> {
    let last = if range.end.column == 0 && range.end.line > range.start.line {
        range.end.line.saturating_sub(1)
    } else {
        range.end.line
    };
    source
        .lines()
        .zip(0_u32..)
        .skip_while(|(_, number)| *number < range.start.line)
        .take_while(|(_, number)| *number <= last)
        .map(|(text, number)| SourceLine {
            number,
            offset: 0,
            text,
        })
        .collect()
}

/// Returns the source text of `range` as whole lines.
pub(crate) fn span_text(source: &str, range: &SourceRange) -> String {
    span_lines(source, range)
        .iter()
        .map(|line| line.text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns the lines of a function body, skipping the signature line.
///
/// Single-line definitions have no second line, so the body is whatever
/// follows the first `{` on that line.
pub(crate) fn body_lines<'a>(source: &'a str, range: &SourceRange) -> Vec<SourceLine<'a>> {
    let lines = span_lines(source, range);
    if lines.len() > 1 {
        return lines.into_iter().skip(1).collect();
    }
    lines
        .into_iter()
        .filter_map(|line| {
            let open = line.text.find('{')?;
            let start = open.saturating_add(1);
            line.text.get(start..).map(|rest| SourceLine {
                number: line.number,
                offset: start,
                text: rest,
            })
        })
        .collect()
}

/// Comment and literal syntax of a family of languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lexicon {
    /// `#` comments, `'`/`"` strings and triple-quoted strings.
    Hash,
    /// `//` and `/* */` comments, `"` strings, char literals and raw strings.
    Rust,
    /// `//` and `/* */` comments, `'`, `"` and backtick strings.
    CFamily,
}

impl Lexicon {
    pub(crate) const fn of(language: SourceLanguage) -> Self {
        match language {
            SourceLanguage::Python => Self::Hash,
            SourceLanguage::Rust => Self::Rust,
            _ => Self::CFamily,
        }
    }

    fn starts_line_comment(self, first: char, second: Option<char>) -> bool {
        match self {
            Self::Hash => first == '#',
            Self::Rust | Self::CFamily => first == '/' && second == Some('/'),
        }
    }

    const fn opens_quote(self, ch: char) -> bool {
        match self {
            Self::Hash => matches!(ch, '"' | '\''),
            Self::Rust => ch == '"',
            Self::CFamily => matches!(ch, '"' | '\'' | '`'),
        }
    }

    /// Whether a string opened by `quote` may continue on the next line.
    fn spans_lines(self, quote: char) -> bool {
        quote == '`' || self == Self::Rust
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Code,
    BlockComment,
    Quoted(char),
    TripleQuoted(char),
    /// Rust raw string closed by `"` and this many `#`.
    Raw(usize),
}

/// A line of source with literal contents and comments blanked out.
///
/// `code` has the same byte length as the original text, so byte offsets
/// into it are offsets into the source line. Quote delimiters are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CodeLine {
    pub(crate) number: u32,
    pub(crate) offset: usize,
    pub(crate) code: String,
}

/// Blanks strings and comments in consecutive source lines.
///
/// Block comments and multi-line strings carry over from one line to the
/// next.
pub(crate) fn code_lines(lines: &[SourceLine<'_>], language: SourceLanguage) -> Vec<CodeLine> {
    let mut masker = Masker {
        lexicon: Lexicon::of(language),
        state: LexState::Code,
    };
    lines
        .iter()
        .map(|line| CodeLine {
            number: line.number,
            offset: line.offset,
            code: masker.mask(line.text),
        })
        .collect()
}

struct Masker {
    lexicon: Lexicon,
    state: LexState,
}

impl Masker {
    fn mask(&mut self, line: &str) -> String {
        let chars: Vec<char> = line.chars().collect();
        let mut out = String::with_capacity(line.len());
        let mut index = 0_usize;
        while let Some(rest) = chars.get(index..).filter(|rest| !rest.is_empty()) {
            let previous = index.checked_sub(1).and_then(|at| chars.get(at)).copied();
            let consumed = match self.state {
                LexState::Code => self.code(rest, previous, &mut out),
                LexState::BlockComment => self.block_comment(rest, &mut out),
                LexState::Quoted(quote) => self.quoted(quote, rest, &mut out),
                LexState::TripleQuoted(quote) => self.triple_quoted(quote, rest, &mut out),
                LexState::Raw(hashes) => self.raw(hashes, rest, &mut out),
            };
            index = index.saturating_add(consumed.max(1));
        }
        if matches!(self.state, LexState::Quoted(quote) if !self.lexicon.spans_lines(quote)) {
            self.state = LexState::Code;
        }
        out
    }

    fn code(&mut self, rest: &[char], previous: Option<char>, out: &mut String) -> usize {
        let first = rest.first().copied().unwrap_or_default();
        let second = rest.get(1).copied();
        if self.lexicon.starts_line_comment(first, second) {
            blank(out, rest);
            return rest.len();
        }
        if self.lexicon != Lexicon::Hash && first == '/' && second == Some('*') {
            self.state = LexState::BlockComment;
            return blank_prefix(out, rest, 2);
        }
        if self.lexicon == Lexicon::Hash && opens_triple_quote(rest) {
            self.state = LexState::TripleQuoted(first);
            return keep_prefix(out, rest, 3);
        }
        if self.lexicon == Lexicon::Rust {
            if let Some(hashes) = raw_string_hashes(rest, previous) {
                self.state = LexState::Raw(hashes);
                return keep_prefix(out, rest, hashes.saturating_add(2));
            }
            if first == '\'' {
                return char_literal(out, rest);
            }
        }
        if self.lexicon.opens_quote(first) {
            self.state = LexState::Quoted(first);
        }
        keep_prefix(out, rest, 1)
    }

    fn block_comment(&mut self, rest: &[char], out: &mut String) -> usize {
        if rest.starts_with(&['*', '/']) {
            self.state = LexState::Code;
            return blank_prefix(out, rest, 2);
        }
        blank_prefix(out, rest, 1)
    }

    fn quoted(&mut self, quote: char, rest: &[char], out: &mut String) -> usize {
        match rest.first() {
            Some('\\') => blank_prefix(out, rest, 2),
            Some(ch) if *ch == quote => {
                self.state = LexState::Code;
                keep_prefix(out, rest, 1)
            }
            _ => blank_prefix(out, rest, 1),
        }
    }

    fn triple_quoted(&mut self, quote: char, rest: &[char], out: &mut String) -> usize {
        if rest.starts_with(&[quote, quote, quote]) {
            self.state = LexState::Code;
            return keep_prefix(out, rest, 3);
        }
        if rest.first() == Some(&'\\') {
            return blank_prefix(out, rest, 2);
        }
        blank_prefix(out, rest, 1)
    }

    fn raw(&mut self, hashes: usize, rest: &[char], out: &mut String) -> usize {
        let closes = rest.first() == Some(&'"')
            && rest
                .get(1..=hashes)
                .is_some_and(|tail| tail.iter().all(|ch| *ch == '#'));
        if closes {
            self.state = LexState::Code;
            return keep_prefix(out, rest, hashes.saturating_add(1));
        }
        blank_prefix(out, rest, 1)
    }
}

fn opens_triple_quote(rest: &[char]) -> bool {
    matches!(rest, [first, second, third, ..] if matches!(first, '"' | '\'') && first == second && second == third)
}

/// Returns the number of `#` in a raw string opener such as `r#"`.
fn raw_string_hashes(rest: &[char], previous: Option<char>) -> Option<usize> {
    if rest.first() != Some(&'r') || previous.is_some_and(is_identifier_char) {
        return None;
    }
    let after = rest.get(1..)?;
    let hashes = after.iter().take_while(|ch| **ch == '#').count();
    (after.get(hashes) == Some(&'"')).then_some(hashes)
}

/// Masks a Rust char literal, or keeps a lone `'` starting a lifetime.
fn char_literal(out: &mut String, rest: &[char]) -> usize {
    let close = if rest.get(1) == Some(&'\\') {
        rest.iter()
            .take(12)
            .skip(3)
            .position(|ch| *ch == '\'')
            .map(|found| found.saturating_add(3))
    } else {
        (rest.get(2) == Some(&'\'')).then_some(2)
    };
    let Some(close) = close else {
        return keep_prefix(out, rest, 1);
    };
    keep_prefix(out, rest, 1);
    blank(out, rest.get(1..close).unwrap_or_default());
    keep_prefix(out, rest.get(close..).unwrap_or_default(), 1);
    close.saturating_add(1)
}

fn keep_prefix(out: &mut String, rest: &[char], count: usize) -> usize {
    let taken = rest.get(..count).unwrap_or(rest);
    out.extend(taken);
    taken.len()
}

fn blank_prefix(out: &mut String, rest: &[char], count: usize) -> usize {
    let taken = rest.get(..count).unwrap_or(rest);
    blank(out, taken);
    taken.len()
}

fn blank(out: &mut String, chars: &[char]) {
    for ch in chars {
        for _ in 0..ch.len_utf8() {
            out.push(' ');
        }
    }
}

/// Returns whether `ch` can appear in an identifier.
pub(crate) const fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Returns the zero-based column of `byte_offset` as a `u32`.
pub(crate) fn column(byte_offset: usize) -> u32 {
    u32::try_from(byte_offset).unwrap_or(u32::MAX)
}
