//! Change identifiers and the client-held sync cursor
//!
//! Every mutation in the library is stamped with an id drawn from one
//! monotonic sequence; tombstones draw from the same sequence, so a
//! single cursor totally orders upserts and deletes. Callers only ever
//! see the opaque `SyncAck` token, never the raw integer, so the
//! identifier strategy can change without breaking the protocol.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A change identifier issued by the storage layer.
///
/// Strictly increasing, never reused, unique across the whole library.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UpdateId(i64);

impl UpdateId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UpdateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client acknowledgment cursor: the last fully-applied change id.
///
/// Serialized as an opaque token (`c1.<id>`). A client persists the token
/// only after durably applying a batch; the next sync resumes strictly
/// after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SyncAck(UpdateId);

const ACK_PREFIX: &str = "c1.";

impl SyncAck {
    pub fn new(update_id: UpdateId) -> Self {
        Self(update_id)
    }

    pub fn update_id(self) -> UpdateId {
        self.0
    }
}

impl fmt::Display for SyncAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ACK_PREFIX, self.0)
    }
}

impl FromStr for SyncAck {
    type Err = CursorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .strip_prefix(ACK_PREFIX)
            .ok_or_else(|| CursorParseError(s.to_string()))?;
        let value: i64 = id.parse().map_err(|_| CursorParseError(s.to_string()))?;
        Ok(Self(UpdateId::new(value)))
    }
}

impl Serialize for SyncAck {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SyncAck {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A cursor token that could not be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid sync cursor: {0:?}")]
pub struct CursorParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_round_trips_through_token_form() {
        let ack = SyncAck::new(UpdateId::new(42));
        let token = ack.to_string();
        assert_eq!(token, "c1.42");
        assert_eq!(token.parse::<SyncAck>().unwrap(), ack);
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!("42".parse::<SyncAck>().is_err());
        assert!("c1.".parse::<SyncAck>().is_err());
        assert!("c2.42".parse::<SyncAck>().is_err());
    }

    #[test]
    fn acks_order_by_update_id() {
        let a = SyncAck::new(UpdateId::new(1));
        let b = SyncAck::new(UpdateId::new(2));
        assert!(a < b);
    }
}
