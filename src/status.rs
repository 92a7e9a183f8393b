//! Canonical status phrases and message normalization.
//!
//! Every envelope carries a human-readable message. When a handler does not
//! supply one, the phrase comes from the IANA status table shipped with the
//! `http` crate, normalized to title case ("OK" becomes "Ok").

use http::StatusCode;

/// Phrase used for status codes that have no registered reason phrase.
pub const UNKNOWN_STATUS_PHRASE: &str = "Unknown Status";

/// Canonical, title-cased message for a status code.
///
/// # Example
///
/// ```
/// use treeroute::status::canonical_message;
///
/// assert_eq!(canonical_message(200), "Ok");
/// assert_eq!(canonical_message(404), "Not Found");
/// assert_eq!(canonical_message(429), "Too Many Requests");
/// ```
#[must_use]
pub fn canonical_message(status: u16) -> String {
    let phrase = StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or(UNKNOWN_STATUS_PHRASE);
    title_case(phrase)
}

/// Title-case a message: the first letter of every alphabetic run is
/// upper-cased, every other letter lower-cased.
///
/// Non-alphabetic characters are kept as they are and start a new run,
/// so `"no path!"` becomes `"No Path!"` and `"I'M A TEAPOT"` becomes
/// `"I'M A Teapot"`.
#[must_use]
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
                in_word = true;
            }
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
