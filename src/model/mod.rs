pub mod document;
pub mod entry;
pub mod store;
