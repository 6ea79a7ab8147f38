use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use crate::utils::error::PayloadError;

/// Fields of one decoded relay payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub username: String,
    pub message: String,
}

/// Decodes `key=value` pairs joined by `&`.
///
/// The first `=` of a pair separates key from value, so values may contain
/// further `=`. Keys are taken verbatim, values are form-decoded. A repeated
/// key keeps its last value. `username` is required, `message` defaults to empty.
pub fn parse_payload(raw: &[u8]) -> Result<Submission, PayloadError> {
    let text = std::str::from_utf8(raw).map_err(|_| PayloadError::NotUtf8)?;

    let mut fields: HashMap<&str, String> = HashMap::new();
    for pair in text.split('&') {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| PayloadError::MissingDelimiter(pair.to_string()))?;
        fields.insert(key, decode_value(value));
    }

    let username = fields
        .remove("username")
        .ok_or(PayloadError::MissingField("username"))?;
    let message = fields.remove("message").unwrap_or_default();

    Ok(Submission { username, message })
}

/// `application/x-www-form-urlencoded` value decoding: `+` is a space, `%XX`
/// an escaped byte. Invalid UTF-8 after unescaping is replaced, not rejected.
pub fn decode_value(value: &str) -> String {
    let spaced = value.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
