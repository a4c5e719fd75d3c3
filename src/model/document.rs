use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::store::Store;

/// Replacement lines per key, as supplied by the editor.
pub type Translations = HashMap<String, Vec<String>>;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// `l10n/<LANG>/dictionary` inside a mission archive.
    #[default]
    Dictionary,
    /// A `.cmp` campaign description.
    Campaign,
}

impl FileFormat {
    /// Guess from the first meaningful line; anything unrecognized is treated as a dictionary.
    pub fn detect(text: &str) -> Self {
        let first = text
            .lines()
            .map(|l| l.trim_start_matches('\u{feff}').trim())
            .find(|l| !l.is_empty() && !l.starts_with("--"));

        match first {
            Some(l) if l.starts_with("campaign") => FileFormat::Campaign,
            _ => FileFormat::Dictionary,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Dictionary => "dictionary",
            FileFormat::Campaign => "campaign",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dictionary" | "miz" => Ok(FileFormat::Dictionary),
            "campaign" | "cmp" => Ok(FileFormat::Campaign),
            other => Err(format!("unknown file format: {other}")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A parsed localization file.
#[derive(Debug, Clone)]
pub struct Document {
    pub format: FileFormat,
    pub store: Store,
    /// Every physical line of the source, without terminators.
    pub source_lines: Vec<String>,
    pub line_ending: LineEnding,
    pub trailing_newline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_campaign_header() {
        assert_eq!(
            FileFormat::detect("\n\ncampaign = \n{\n}"),
            FileFormat::Campaign
        );
        assert_eq!(
            FileFormat::detect("dictionary = \n{\n} -- end of dictionary\n"),
            FileFormat::Dictionary
        );
        assert_eq!(FileFormat::detect(""), FileFormat::Dictionary);
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("CMP".parse::<FileFormat>(), Ok(FileFormat::Campaign));
        assert_eq!(" dictionary ".parse::<FileFormat>(), Ok(FileFormat::Dictionary));
        assert!("lua".parse::<FileFormat>().is_err());
    }

    #[test]
    fn detects_crlf() {
        assert_eq!(LineEnding::detect("a\r\nb"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\nb"), LineEnding::Lf);
    }
}
