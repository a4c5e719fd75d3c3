//! Headless core for translating DCS World mission dictionaries and campaign files.
//!
//! Text goes in through [`parsers::parse`], comes back out through
//! [`services::rebuild::rebuild`]; [`protocol::handle`] exposes both to a front-end.

pub mod config;
pub mod error;
pub mod model;
pub mod parsers;
pub mod protocol;
pub mod services;
