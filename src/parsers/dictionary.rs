use crate::model::document::Document;

use super::accumulator;
use super::classify::DICTIONARY;

/// Parses the `dictionary` table of a mission's `l10n/<LANG>/` folder.
pub fn parse(text: &str) -> Document {
    accumulator::parse(&DICTIONARY, text)
}
