//! Data URL encoding and decoding utilities
//!
//! Images travel through the pipeline as base64 data URLs so no separate
//! binary channel is needed between browser, proxy and model.

use crate::error::{AppError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};

/// Assemble a data URL from a mime type and an already-encoded payload.
pub fn from_base64(mime_type: &str, payload: &str) -> String {
    format!("data:{};base64,{}", mime_type, payload)
}

/// Encode binary image data as a base64 data URL.
pub fn encode(data: &[u8], mime_type: &str) -> String {
    from_base64(mime_type, &STANDARD.encode(data))
}

/// Split a data URL into its mime type and base64 payload without decoding.
pub fn split(data_url: &str) -> Result<(&str, &str)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| AppError::Encoding("not a data URL".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AppError::Encoding("data URL has no payload".to_string()))?;

    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| AppError::Encoding("only base64 data URLs are supported".to_string()))?;

    if mime_type.is_empty() {
        return Err(AppError::Encoding("data URL has no mime type".to_string()));
    }

    Ok((mime_type, payload))
}

/// Decode a data URL into its mime type and raw bytes.
pub fn decode(data_url: &str) -> Result<(String, Vec<u8>)> {
    let (mime_type, payload) = split(data_url)?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| AppError::Encoding(format!("invalid base64 payload: {}", e)))?;

    Ok((mime_type.to_string(), bytes))
}

/// Exact decoded size of a base64 payload, computed without decoding it.
///
/// Lets the size limit reject oversize images before any decode happens.
pub fn decoded_len(payload: &str) -> usize {
    let payload = payload.trim();
    let padding = payload.bytes().rev().take_while(|&b| b == b'=').count();
    if payload.len() % 4 == 0 {
        (payload.len() / 4) * 3 - padding
    } else {
        payload.len() * 3 / 4
    }
}
