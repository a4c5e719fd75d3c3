pub mod accumulator;
pub mod campaign;
pub mod classify;
pub mod dictionary;
pub mod escape;

use crate::model::document::{Document, FileFormat};

pub fn parse(text: &str, format: FileFormat) -> Document {
    match format {
        FileFormat::Dictionary => dictionary::parse(text),
        FileFormat::Campaign => campaign::parse(text),
    }
}
