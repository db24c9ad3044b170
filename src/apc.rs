//! Buildkite APC payload decoding
//!
//! The Buildkite agent timestamps log output with APC sequences in the `bk`
//! namespace: `bk;t=<millis>` carries an absolute timestamp and
//! `bk;dt=<millis>` a delta against the previous one. Decoded timestamps are
//! attached to the current line as metadata under [`BK_NAMESPACE`].

use std::collections::HashMap;

use thiserror::Error;

/// Metadata namespace for Buildkite-decoded values
pub const BK_NAMESPACE: &str = "bk";

/// APC payload decode error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApcError {
    /// The timestamp value was not an integer
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),

    /// The payload used an unrecognized key
    #[error("unknown key {0:?}")]
    UnknownKey(String),
}

/// Decode a Buildkite APC payload.
///
/// `last_timestamp` carries the running absolute timestamp across calls so
/// that `dt=` deltas accumulate. Payloads outside the `bk;` namespace yield
/// `Ok(None)`.
pub fn parse_buildkite_apc(
    sequence: &str,
    last_timestamp: &mut i64,
) -> Result<Option<HashMap<String, String>>, ApcError> {
    let Some(rest) = sequence.strip_prefix("bk;") else {
        return Ok(None);
    };

    if let Some(value) = rest.strip_prefix("t=") {
        let t: i64 = value
            .parse()
            .map_err(|_| ApcError::InvalidTimestamp(value.to_string()))?;
        *last_timestamp = t;
    } else if let Some(value) = rest.strip_prefix("dt=") {
        let dt: i64 = value
            .parse()
            .map_err(|_| ApcError::InvalidTimestamp(value.to_string()))?;
        *last_timestamp += dt;
    } else {
        let key = rest.split('=').next().unwrap_or(rest);
        return Err(ApcError::UnknownKey(key.to_string()));
    }

    let mut data = HashMap::new();
    data.insert("t".to_string(), last_timestamp.to_string());
    Ok(Some(data))
}
