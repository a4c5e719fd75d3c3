use serde::{Deserialize, Serialize};

/// One key's value as it appeared in the source file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,

    /// Decoded text, one fragment per physical line.
    #[serde(default)]
    pub value_lines: Vec<String>,

    /// The physical lines exactly as read, used for untouched passthrough.
    #[serde(default)]
    pub raw_file_lines: Vec<String>,

    #[serde(default)]
    pub start_line_index: usize,

    /// Leading whitespace of the declaration line (campaign files only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,

    #[serde(default)]
    pub style: ValueStyle,
}

impl Entry {
    pub fn line_count(&self) -> usize {
        self.value_lines.len()
    }

    /// Index one past the last physical line owned by this entry.
    pub fn end_line_index(&self) -> usize {
        self.start_line_index + self.raw_file_lines.len()
    }

    pub fn text(&self) -> String {
        self.value_lines.join("\n")
    }
}

/// How the value was delimited in the source.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueStyle {
    /// `"..."` with `\` line continuation and escaped quotes.
    #[default]
    Quoted,
    /// `[[ ... ]]`, taken verbatim.
    LongBracket,
}
