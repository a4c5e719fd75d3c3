//! Campaign (`.cmp`) files: nested tables, per-locale `_XX` key variants and `[[ ]]` strings.

use crate::model::document::Document;
use crate::model::entry::Entry;
use crate::model::store::Store;

use super::accumulator;
use super::classify::CAMPAIGN;

pub fn parse(text: &str) -> Document {
    accumulator::parse(&CAMPAIGN, text)
}

/// Splits `description_RU` into `("description", Some("RU"))`.
///
/// A suffix counts as a locale when it is two or three ASCII uppercase letters.
pub fn split_locale(key: &str) -> (&str, Option<&str>) {
    match key.rsplit_once('_') {
        Some((base, suffix))
            if !base.is_empty()
                && (2..=3).contains(&suffix.len())
                && suffix.bytes().all(|b| b.is_ascii_uppercase()) =>
        {
            (base, Some(suffix))
        }
        _ => (key, None),
    }
}

/// Indent of the shallowest declaration, i.e. the campaign's own fields.
pub fn root_indent(store: &Store) -> Option<usize> {
    store.iter().filter_map(|e| e.indent).min()
}

pub fn root_entries(store: &Store) -> impl Iterator<Item = &Entry> {
    let root = root_indent(store);
    store.iter().filter(move |e| e.indent == root)
}

/// Every entry sharing `base`, the unsuffixed one first (locale `None`).
pub fn locale_variants<'a>(store: &'a Store, base: &str) -> Vec<(Option<&'a str>, &'a Entry)> {
    let mut variants: Vec<(Option<&str>, &Entry)> = store
        .iter()
        .filter_map(|e| {
            let (b, locale) = split_locale(&e.key);
            (b == base).then_some((locale, e))
        })
        .collect();
    variants.sort_by_key(|(locale, _)| locale.is_some());
    variants
}
