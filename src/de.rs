//! Deserialization helpers for fields whose value decides which shape of a
//! response we're looking at.

use serde::de::{Deserialize, Deserializer, Error};

/// Accepts only `false`, so that an untagged error variant can't swallow a
/// response which merely lacks the fields of the success variant.
pub fn only_false<'a, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'a>,
{
    let b = bool::deserialize(deserializer)?;
    if b {
        Err(Error::custom("invalid bool: true"))
    } else {
        Ok(b)
    }
}
