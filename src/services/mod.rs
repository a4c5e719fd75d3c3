pub mod archive;
pub mod encoding;
pub mod fingerprint;
pub mod qa;
pub mod rebuild;
