//! Encoding of pair state into URL-safe share tokens
//!
//! A token is built in three layers, each reversible:
//! canonical JSON → percent-escape → URL-safe base64 without padding.
//! The percent layer keeps the base64 payload pure ASCII regardless of what
//! people type into names and descriptions, and the alphabet substitutions
//! (`+` → `-`, `/` → `_`, `=` stripped) let the token sit in a URL fragment
//! with no further escaping. The decoder re-derives padding from length.
//!
//! The JSON layer uses a fixed field order (person1, person2, expenses), so
//! two clients encoding the same state produce the same token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

use crate::data::PairState;

/// Fragment parameter carrying the token: `#data=<token>`.
const FRAGMENT_PREFIX: &str = "#data=";

/// Characters left bare by the escape layer: alphanumeric plus the
/// unreserved set of `encodeURIComponent`. Everything else becomes `%XX`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Why a token could not be produced or understood.
///
/// Callers treat any decode error the same as "no shared state present".
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("token payload is not a valid pair state: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no share token found in input")]
    NoToken,
}

/// Encode a pair's state into a share token.
pub fn encode_state(state: &PairState) -> Result<String, CodecError> {
    let json = serde_json::to_string(state)?;
    let escaped = utf8_percent_encode(&json, COMPONENT).to_string();
    Ok(URL_SAFE_NO_PAD.encode(escaped.as_bytes()))
}

/// Decode a share token back into a pair's state.
///
/// Every layer can reject: wrong alphabet or truncated length at the base64
/// layer, broken escapes at the percent layer, anything non-conforming at
/// the JSON layer. All of it surfaces as a [`CodecError`], never a panic.
pub fn decode_state(token: &str) -> Result<PairState, CodecError> {
    let bytes = URL_SAFE_NO_PAD.decode(token)?;
    let escaped = std::str::from_utf8(&bytes)?;
    let json = percent_decode_str(escaped).decode_utf8()?;
    Ok(serde_json::from_str(&json)?)
}

/// Build a shareable URL: `<base>#data=<token>`.
pub fn share_url(base: &str, state: &PairState) -> Result<String, CodecError> {
    let token = encode_state(state)?;
    Ok(format!("{}{}{}", base, FRAGMENT_PREFIX, token))
}

/// Pull the token out of a share URL, or pass a bare token through.
pub fn token_from_url(input: &str) -> Result<&str, CodecError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CodecError::NoToken);
    }
    match input.find(FRAGMENT_PREFIX) {
        Some(pos) => {
            let token = &input[pos + FRAGMENT_PREFIX.len()..];
            if token.is_empty() {
                Err(CodecError::NoToken)
            } else {
                Ok(token)
            }
        }
        // No fragment marker: treat the whole input as a token unless it
        // looks like a URL that simply lacks one.
        None if input.contains('#') || input.contains("://") => Err(CodecError::NoToken),
        None => Ok(input),
    }
}
