//! Filename classification and per-bank workarounds.

mod filename;
mod workarounds;

pub use filename::{classify_bank, classify_filename, classify_office, parse_year};
pub use workarounds::configure;
