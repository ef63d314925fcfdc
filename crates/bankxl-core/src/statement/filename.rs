//! Bank, office and year detection from statement filenames.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ParseError;
use crate::models::statement::{Bank, Office};

lazy_static! {
    static ref LEADING_YEAR: Regex = Regex::new(r"^([0-9]{4})").unwrap();
}

/// Office tokens in priority order; the first one present wins.
const OFFICE_TOKENS: [(&str, Office); 5] = [
    ("Dar", Office::Dar),
    ("Dodoma", Office::Dodoma),
    ("Musoma", Office::Musoma),
    ("Mbeya", Office::Mbeya),
    ("Katavi", Office::Katavi),
];

/// Bank tokens in priority order.
const BANK_TOKENS: [(&str, Bank); 2] = [("CRDB", Bank::Crdb), ("NBC", Bank::Nbc)];

/// Classify a filename into `(bank, office, year)`.
///
/// Only a missing year is an error; unrecognised banks and offices come back
/// as `Unknown`.
pub fn classify_filename(name: &str) -> Result<(Bank, Office, u16), ParseError> {
    let year = parse_year(name)?;
    Ok((classify_bank(name), classify_office(name), year))
}

/// Case-sensitive search for a bank token anywhere in the name.
pub fn classify_bank(name: &str) -> Bank {
    BANK_TOKENS
        .iter()
        .find(|(token, _)| name.contains(token))
        .map(|(_, bank)| *bank)
        .unwrap_or(Bank::Unknown)
}

/// Case-sensitive search for an office token anywhere in the name.
pub fn classify_office(name: &str) -> Office {
    OFFICE_TOKENS
        .iter()
        .find(|(token, _)| name.contains(token))
        .map(|(_, office)| *office)
        .unwrap_or(Office::Unknown)
}

/// Parse the year from the first four characters of the name.
pub fn parse_year(name: &str) -> Result<u16, ParseError> {
    LEADING_YEAR
        .captures(name)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| ParseError::MissingYear(name.to_string()))
}
