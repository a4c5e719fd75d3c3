use std::sync::LazyLock;

use regex::Regex;

use crate::model::entry::ValueStyle;

use super::escape::is_unescaped;

static QUOTED_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*\["([^"]*)"\]\s*=\s*""#).expect("valid key regex"));

static LONG_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*\["([^"]*)"\]\s*=\s*\[\["#).expect("valid key regex"));

/// What distinguishes one table-literal flavour from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// Name of the table variable on the opening line (`dictionary = `).
    pub root_name: &'static str,
    pub long_strings: bool,
    /// Accept a bare closing `"` (last field of a table has no comma).
    pub bare_quote_terminator: bool,
    pub record_indent: bool,
}

pub const DICTIONARY: Dialect = Dialect {
    root_name: "dictionary",
    long_strings: false,
    bare_quote_terminator: false,
    record_indent: false,
};

pub const CAMPAIGN: Dialect = Dialect {
    root_name: "campaign",
    long_strings: true,
    bare_quote_terminator: true,
    record_indent: true,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    InValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStart<'a> {
    pub key: &'a str,
    /// Byte offset of the first value character, `None` when the opening sequence is missing.
    pub value_start: Option<usize>,
    pub style: ValueStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Ignorable,
    KeyStart(KeyStart<'a>),
    Continuation,
}

impl Dialect {
    pub fn classify<'a>(&self, line: &'a str, mode: Mode) -> LineKind<'a> {
        if let Some(start) = self.key_start(line) {
            return LineKind::KeyStart(start);
        }

        // Inside a value every other line is content, even a blank one.
        if mode == Mode::Idle && self.is_boilerplate(line) {
            return LineKind::Ignorable;
        }

        LineKind::Continuation
    }

    pub fn is_boilerplate(&self, line: &str) -> bool {
        let t = line.trim_start_matches('\u{feff}').trim();
        if t.is_empty() || t == "{" || t == "}" || t == "}," {
            return true;
        }

        match t.strip_prefix(self.root_name) {
            Some(rest) if rest.trim_start().starts_with('=') => true,
            _ => t.starts_with("} -- end of"),
        }
    }

    fn key_start<'a>(&self, line: &'a str) -> Option<KeyStart<'a>> {
        if let Some(caps) = QUOTED_KEY_RE.captures(line) {
            let key = caps.get(1)?;
            return Some(KeyStart {
                key: key.as_str(),
                value_start: quoted_value_start(line, key.end()),
                style: ValueStyle::Quoted,
            });
        }

        if self.long_strings {
            if let Some(caps) = LONG_KEY_RE.captures(line) {
                let key = caps.get(1)?;
                return Some(KeyStart {
                    key: key.as_str(),
                    value_start: long_value_start(line, key.end()),
                    style: ValueStyle::LongBracket,
                });
            }
        }

        None
    }

    /// Byte offset of the closing quote when `fragment` ends a quoted value.
    ///
    /// `",` always closes. With bare quotes allowed, `"` closes too, and either may be
    /// followed by a `--` comment.
    pub fn terminator_at(&self, fragment: &str) -> Option<usize> {
        if let Some(body) = fragment.strip_suffix("\",") {
            if is_unescaped(fragment, body.len()) {
                return Some(body.len());
            }
        }

        if !self.bare_quote_terminator {
            return None;
        }

        let quote = fragment.rfind('"')?;
        let tail = fragment[quote + 1..].trim_start();
        let tail = tail.strip_prefix(',').unwrap_or(tail).trim_start();
        let closes = tail.is_empty() || tail.starts_with("--");
        (closes && is_unescaped(fragment, quote)).then_some(quote)
    }

    /// Column of the declaration: count of leading whitespace characters.
    pub fn indent_of(&self, line: &str) -> Option<usize> {
        if !self.record_indent {
            return None;
        }
        Some(line.chars().take_while(|c| c.is_whitespace()).count())
    }
}

fn quoted_value_start(line: &str, key_end: usize) -> Option<usize> {
    find_after(line, key_end, "= \"").or_else(|| find_after(line, key_end, "=\""))
}

fn long_value_start(line: &str, key_end: usize) -> Option<usize> {
    find_after(line, key_end, "= [[").or_else(|| find_after(line, key_end, "=[["))
}

fn find_after(line: &str, from: usize, needle: &str) -> Option<usize> {
    line.get(from..)?
        .find(needle)
        .map(|pos| from + pos + needle.len())
}

/// Byte offset where the value begins on a declaration line, for either delimiter style.
pub(crate) fn value_start(line: &str, style: ValueStyle) -> Option<usize> {
    let caps = match style {
        ValueStyle::Quoted => QUOTED_KEY_RE.captures(line)?,
        ValueStyle::LongBracket => LONG_KEY_RE.captures(line)?,
    };
    let key_end = caps.get(1)?.end();
    match style {
        ValueStyle::Quoted => quoted_value_start(line, key_end),
        ValueStyle::LongBracket => long_value_start(line, key_end),
    }
}
