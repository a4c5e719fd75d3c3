//! Line-by-line state machine shared by the dictionary and campaign parsers.

use crate::model::document::{Document, FileFormat, LineEnding};
use crate::model::entry::{Entry, ValueStyle};
use crate::model::store::Store;

use super::classify::{Dialect, KeyStart, LineKind, Mode};
use super::escape;

/// A key whose value is still being collected.
#[derive(Debug)]
struct OpenEntry {
    key: String,
    fragments: Vec<String>,
    raw_lines: Vec<String>,
    start_line_index: usize,
    indent: Option<usize>,
    style: ValueStyle,
}

#[derive(Debug)]
enum State {
    Idle,
    InValue(OpenEntry),
    InLongString(OpenEntry),
}

pub(crate) fn parse(dialect: &Dialect, text: &str) -> Document {
    let source_lines: Vec<String> = text.lines().map(str::to_string).collect();

    let (last, mut store) = source_lines.iter().enumerate().fold(
        (State::Idle, Store::new()),
        |(state, mut store), (index, line)| {
            let next = state.step(dialect, index, line, &mut store);
            (next, store)
        },
    );

    match last {
        State::Idle => {}
        State::InValue(open) | State::InLongString(open) => {
            tracing::debug!(key = %open.key, "value still open at end of input");
            open.commit(dialect, &mut store);
        }
    }

    tracing::debug!(
        format = dialect.root_name,
        lines = source_lines.len(),
        entries = store.len(),
        "parsed"
    );

    Document {
        format: if dialect.long_strings {
            FileFormat::Campaign
        } else {
            FileFormat::Dictionary
        },
        store,
        line_ending: LineEnding::detect(text),
        trailing_newline: text.ends_with('\n'),
        source_lines,
    }
}

impl State {
    fn step(self, dialect: &Dialect, index: usize, line: &str, store: &mut Store) -> State {
        match self {
            State::InLongString(open) => open.feed_long_fragment(dialect, line, line, store),
            State::InValue(open) => match dialect.classify(line, Mode::InValue) {
                LineKind::KeyStart(start) => {
                    // The previous value never saw its terminator.
                    open.commit(dialect, store);
                    begin(dialect, index, line, start, store)
                }
                _ => open.feed_quoted(dialect, line, line, store),
            },
            State::Idle => match dialect.classify(line, Mode::Idle) {
                LineKind::Ignorable => State::Idle,
                LineKind::KeyStart(start) => begin(dialect, index, line, start, store),
                LineKind::Continuation => {
                    tracing::trace!(line = index, "skipping line outside any value");
                    State::Idle
                }
            },
        }
    }
}

fn begin(
    dialect: &Dialect,
    index: usize,
    line: &str,
    start: KeyStart<'_>,
    store: &mut Store,
) -> State {
    let Some(value_start) = start.value_start else {
        tracing::debug!(key = start.key, line = index, "key line without value opening, dropped");
        return State::Idle;
    };

    let open = OpenEntry {
        key: start.key.to_string(),
        fragments: Vec::new(),
        raw_lines: Vec::new(),
        start_line_index: index,
        indent: dialect.indent_of(line),
        style: start.style,
    };

    let fragment = &line[value_start..];
    match start.style {
        ValueStyle::Quoted => open.feed_quoted(dialect, line, fragment, store),
        ValueStyle::LongBracket => open.feed_long_fragment(dialect, line, fragment, store),
    }
}

impl OpenEntry {
    fn push(&mut self, fragment: &str, raw: &str) {
        self.fragments.push(fragment.to_string());
        self.raw_lines.push(raw.to_string());
    }

    fn feed_quoted(
        mut self,
        dialect: &Dialect,
        raw: &str,
        fragment: &str,
        store: &mut Store,
    ) -> State {
        if let Some(body) = fragment.strip_suffix('\\') {
            self.push(body, raw);
            return State::InValue(self);
        }

        if let Some(body) = strip_terminator(dialect, fragment) {
            self.push(body, raw);
            self.commit(dialect, store);
            return State::Idle;
        }

        self.push(fragment, raw);
        State::InValue(self)
    }

    fn feed_long_fragment(
        mut self,
        dialect: &Dialect,
        raw: &str,
        fragment: &str,
        store: &mut Store,
    ) -> State {
        match fragment.find("]]") {
            Some(end) => {
                self.push(&fragment[..end], raw);
                self.commit(dialect, store);
                State::Idle
            }
            None => {
                self.push(fragment, raw);
                State::InLongString(self)
            }
        }
    }

    fn commit(self, dialect: &Dialect, store: &mut Store) {
        if self.fragments.is_empty() {
            tracing::debug!(key = %self.key, "no value collected, entry dropped");
            return;
        }

        let value_lines = match self.style {
            ValueStyle::Quoted => self.fragments.iter().map(|f| escape::decode(f)).collect(),
            ValueStyle::LongBracket => self.fragments,
        };

        let entry = Entry {
            key: self.key,
            value_lines,
            raw_file_lines: self.raw_lines,
            start_line_index: self.start_line_index,
            indent: self.indent,
            style: self.style,
        };

        if dialect.record_indent {
            store.insert_unless_nested(entry);
        } else {
            store.insert(entry);
        }
    }
}

/// The value part of a fragment that closes the value, without its terminator.
fn strip_terminator<'a>(dialect: &Dialect, fragment: &'a str) -> Option<&'a str> {
    dialect.terminator_at(fragment).map(|end| &fragment[..end])
}
