use indexmap::IndexMap;
use serde::Serialize;

use super::entry::Entry;

/// Entries of one parse, in the order their keys were first seen.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct Store {
    entries: IndexMap<String, Entry>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins; a repeated key keeps the slot of its first occurrence.
    pub fn insert(&mut self, entry: Entry) -> Option<Entry> {
        let previous = self.entries.insert(entry.key.clone(), entry);
        if let Some(prev) = &previous {
            tracing::debug!(
                key = %prev.key,
                first_line = prev.start_line_index,
                "duplicate key, later declaration replaces earlier one"
            );
        }
        previous
    }

    /// Like [`Store::insert`], but a declaration nested deeper than an existing one with the
    /// same key is ignored. Returns whether the entry was stored.
    pub fn insert_unless_nested(&mut self, entry: Entry) -> bool {
        if let Some(existing) = self.entries.get(&entry.key) {
            if let (Some(kept), Some(new)) = (existing.indent, entry.indent) {
                if new > kept {
                    tracing::debug!(
                        key = %entry.key,
                        line = entry.start_line_index,
                        "nested declaration shadowed by shallower one"
                    );
                    return false;
                }
            }
        }
        self.insert(entry);
        true
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The editable view handed to front-ends: key -> current value lines.
    pub fn value_lines(&self) -> IndexMap<String, Vec<String>> {
        self.entries
            .iter()
            .map(|(k, e)| (k.clone(), e.value_lines.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::ValueStyle;

    fn entry(key: &str, value: &str, line: usize) -> Entry {
        Entry {
            key: key.to_string(),
            value_lines: vec![value.to_string()],
            raw_file_lines: vec![format!("[\"{key}\"] = \"{value}\",")],
            start_line_index: line,
            indent: None,
            style: ValueStyle::Quoted,
        }
    }

    #[test]
    fn duplicate_key_keeps_first_slot_with_last_value() {
        let mut store = Store::new();
        store.insert(entry("a", "1", 0));
        store.insert(entry("b", "2", 1));
        let prev = store.insert(entry("a", "3", 2));

        assert_eq!(prev.map(|e| e.value_lines), Some(vec!["1".to_string()]));
        assert_eq!(store.len(), 2);
        assert_eq!(store.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(store.get("a").unwrap().value_lines, vec!["3"]);
        assert_eq!(store.get("a").unwrap().start_line_index, 2);
    }

    #[test]
    fn nested_declaration_does_not_replace_root_field() {
        let mut root = entry("name", "Campaign", 2);
        root.indent = Some(4);
        let mut nested = entry("name", "Stage 1", 9);
        nested.indent = Some(12);

        let mut store = Store::new();
        assert!(store.insert_unless_nested(root));
        assert!(!store.insert_unless_nested(nested));
        assert_eq!(store.get("name").unwrap().value_lines, vec!["Campaign"]);

        let mut later_root = entry("name", "Renamed", 20);
        later_root.indent = Some(4);
        assert!(store.insert_unless_nested(later_root));
        assert_eq!(store.get("name").unwrap().value_lines, vec!["Renamed"]);
    }

    #[test]
    fn editing_view_follows_store_order() {
        let mut store = Store::new();
        store.insert(entry("z", "last", 0));
        store.insert(entry("m", "mid", 1));

        let view = store.value_lines();
        let keys: Vec<&String> = view.keys().collect();
        assert_eq!(keys, vec!["z", "m"]);
        assert_eq!(view["m"], vec!["mid"]);
    }
}
