use serde::{Deserialize, Serialize};

use crate::model::document::{Document, Translations};
use crate::model::entry::ValueStyle;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QaIssue {
    pub key: String,
    pub code: String,
    pub severity: Severity,
    pub message: String,
}

impl QaIssue {
    fn new(key: &str, code: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            code: code.to_string(),
            severity,
            message: message.into(),
        }
    }
}

/// Checks a set of translations against the parsed file before it is written.
pub fn run(doc: &Document, translations: &Translations) -> Vec<QaIssue> {
    let mut issues: Vec<QaIssue> = Vec::new();

    let mut keys: Vec<&String> = translations.keys().collect();
    keys.sort_by_key(|k| {
        doc.store
            .get(k)
            .map_or(usize::MAX, |e| e.start_line_index)
    });

    for key in keys {
        let lines = &translations[key];

        let Some(entry) = doc.store.get(key) else {
            issues.push(QaIssue::new(
                key,
                "UNKNOWN_KEY",
                Severity::Error,
                "no entry with this key in the file; it will not be written",
            ));
            continue;
        };

        // An empty list means "keep the original".
        if lines.is_empty() {
            continue;
        }

        if lines.iter().all(|l| l.trim().is_empty()) {
            issues.push(QaIssue::new(
                key,
                "EMPTY_TRANSLATION",
                Severity::Warning,
                "translation is blank and will replace the original text",
            ));
        }

        let same = lines.len() == entry.value_lines.len()
            && lines
                .iter()
                .zip(&entry.value_lines)
                .all(|(a, b)| a.trim() == b.trim());
        if same && !entry.value_lines.iter().all(|l| l.trim().is_empty()) {
            issues.push(QaIssue::new(
                key,
                "SAME_AS_ORIGINAL",
                Severity::Info,
                "translation is identical to the original text",
            ));
        }

        if lines.iter().any(|l| l.contains('\n') || l.contains('\r')) {
            issues.push(QaIssue::new(
                key,
                "EMBEDDED_NEWLINE",
                Severity::Info,
                "a line contains a line break and will be split into several lines",
            ));
        }

        if lines.len() != entry.line_count() {
            issues.push(QaIssue::new(
                key,
                "LINE_COUNT_CHANGED",
                Severity::Info,
                format!(
                    "original has {} line(s), translation has {}",
                    entry.line_count(),
                    lines.len()
                ),
            ));
        }

        if entry.style == ValueStyle::LongBracket && lines.iter().any(|l| l.contains("]]")) {
            issues.push(QaIssue::new(
                key,
                "LONG_STRING_TERMINATOR",
                Severity::Error,
                "`]]` inside a [[ ]] string ends it early and corrupts the file",
            ));
        }
    }

    issues
}
