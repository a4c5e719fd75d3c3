use serde::Serialize;

use crate::model::document::{Document, FileFormat, LineEnding, Translations};
use crate::model::entry::{Entry, ValueStyle};
use crate::parsers::classify::{value_start, CAMPAIGN};
use crate::parsers::escape;

pub const DICTIONARY_HEADER: [&str; 2] = ["dictionary = ", "{"];
pub const DICTIONARY_FOOTER: &str = "} -- end of dictionary";

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct LineCountChange {
    pub key: String,
    pub original: usize,
    pub replacement: usize,
}

#[derive(Debug, Serialize, Clone)]
pub struct RebuildOutput {
    pub text: String,
    pub translated: usize,
    pub line_count_changes: Vec<LineCountChange>,
    /// Translation keys that matched no entry; they are not written.
    pub unknown_keys: Vec<String>,
}

pub fn rebuild(doc: &Document, translations: &Translations) -> RebuildOutput {
    rebuild_with(doc, translations, doc.line_ending)
}

pub fn rebuild_with(
    doc: &Document,
    translations: &Translations,
    line_ending: LineEnding,
) -> RebuildOutput {
    let mut changes = Vec::new();
    let mut translated = 0usize;

    let lines = match doc.format {
        FileFormat::Dictionary => {
            let mut out: Vec<String> = DICTIONARY_HEADER.iter().map(|l| l.to_string()).collect();

            for entry in doc.store.iter() {
                match replacement_for(entry, translations) {
                    Some(lines) => {
                        note_line_count(entry, &lines, &mut changes);
                        out.extend(render_entry(entry, &lines, "\","));
                        translated += 1;
                    }
                    // Untouched entries are reproduced byte for byte.
                    None => out.extend(entry.raw_file_lines.iter().cloned()),
                }
            }

            out.push(DICTIONARY_FOOTER.to_string());
            out
        }
        FileFormat::Campaign => {
            // Campaign files carry structure that is not an entry, so translated
            // entries are spliced into the original lines instead.
            let mut patches: Vec<(usize, usize, Vec<String>)> = Vec::new();

            for entry in doc.store.iter() {
                if let Some(lines) = replacement_for(entry, translations) {
                    note_line_count(entry, &lines, &mut changes);
                    let closing = original_closing(entry);
                    patches.push((
                        entry.start_line_index,
                        entry.end_line_index(),
                        render_entry(entry, &lines, &closing),
                    ));
                    translated += 1;
                }
            }

            patches.sort_by(|a, b| b.0.cmp(&a.0));

            let mut out = doc.source_lines.clone();
            for (start, end, rendered) in patches {
                let end = end.min(out.len());
                out.splice(start..end, rendered);
            }
            out
        }
    };

    let eol = line_ending.as_str();
    let mut text = lines.join(eol);
    if doc.format == FileFormat::Dictionary || doc.trailing_newline {
        text.push_str(eol);
    }

    let mut unknown_keys: Vec<String> = translations
        .keys()
        .filter(|k| !doc.store.contains_key(k))
        .cloned()
        .collect();
    unknown_keys.sort();
    if !unknown_keys.is_empty() {
        tracing::debug!(count = unknown_keys.len(), "translations for unknown keys ignored");
    }

    tracing::info!(
        format = %doc.format,
        entries = doc.store.len(),
        translated,
        line_count_changes = changes.len(),
        "rebuilt"
    );

    RebuildOutput {
        text,
        translated,
        line_count_changes: changes,
        unknown_keys,
    }
}

/// Replacement lines for an entry, or `None` when it should pass through unchanged.
///
/// Lines containing raw newlines are split so every output line is one physical line.
fn replacement_for(entry: &Entry, translations: &Translations) -> Option<Vec<String>> {
    let lines = translations.get(&entry.key)?;
    if lines.is_empty() {
        return None;
    }

    Some(
        lines
            .iter()
            .flat_map(|l| l.split('\n'))
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect(),
    )
}

fn note_line_count(entry: &Entry, lines: &[String], changes: &mut Vec<LineCountChange>) {
    if lines.len() == entry.line_count() {
        return;
    }

    tracing::warn!(
        key = %entry.key,
        original = entry.line_count(),
        replacement = lines.len(),
        "replacement changes line count"
    );

    changes.push(LineCountChange {
        key: entry.key.clone(),
        original: entry.line_count(),
        replacement: lines.len(),
    });
}

/// Text up to and including the value opening (`    ["key"] = "`).
fn declaration_prefix(entry: &Entry) -> String {
    entry
        .raw_file_lines
        .first()
        .and_then(|first| value_start(first, entry.style).map(|end| first[..end].to_string()))
        .unwrap_or_else(|| match entry.style {
            ValueStyle::Quoted => format!("[\"{}\"] = \"", entry.key),
            ValueStyle::LongBracket => format!("[\"{}\"] = [[", entry.key),
        })
}

/// How the original value was closed, including anything after the delimiter.
fn original_closing(entry: &Entry) -> String {
    let Some(last) = entry.raw_file_lines.last() else {
        return default_closing(entry.style).to_string();
    };

    // On a one-line value the closing follows the opening delimiter.
    let from = if entry.raw_file_lines.len() == 1 {
        value_start(last, entry.style).unwrap_or(0)
    } else {
        0
    };

    last.get(from..)
        .and_then(|rest| match entry.style {
            ValueStyle::Quoted => CAMPAIGN.terminator_at(rest),
            ValueStyle::LongBracket => rest.find("]]"),
        })
        .map(|pos| last[from + pos..].to_string())
        .unwrap_or_else(|| default_closing(entry.style).to_string())
}

fn default_closing(style: ValueStyle) -> &'static str {
    match style {
        ValueStyle::Quoted => "\",",
        ValueStyle::LongBracket => "]]",
    }
}

/// Renders `lines` as the entry's value, continuing quoted values with a trailing `\`.
pub fn render_entry(entry: &Entry, lines: &[String], closing: &str) -> Vec<String> {
    let prefix = declaration_prefix(entry);
    let last = lines.len().saturating_sub(1);

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let mut out = String::new();
            if i == 0 {
                out.push_str(&prefix);
            }

            match entry.style {
                ValueStyle::Quoted => out.push_str(&escape::encode(line)),
                ValueStyle::LongBracket => out.push_str(line),
            }

            if i == last {
                out.push_str(closing);
            } else if entry.style == ValueStyle::Quoted {
                out.push('\\');
            }
            out
        })
        .collect()
}
