//! Guild blacklist marker
//!
//! Wire format is intentionally narrow: a clear guild serializes as the JSON
//! boolean `false`, a blacklisted guild as the reason string. Reads are more
//! tolerant than writes so imperfect historical documents still parse.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Whether a guild is barred from using the bot.
///
/// Serialized as `false` (clear) or a reason string (blacklisted). On
/// deserialize, `true` is accepted as blacklisted with an unknown reason and
/// `null` as clear; neither shape is ever written back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Blacklist {
    /// Guild is in good standing.
    #[default]
    Clear,
    /// Guild is blacklisted with the given reason (may be empty).
    Reason(String),
}

impl Blacklist {
    /// Blacklist a guild with a reason.
    #[inline]
    #[must_use]
    pub fn reason_for(reason: impl Into<String>) -> Self {
        Self::Reason(reason.into())
    }

    /// True when the guild is not blacklisted.
    #[inline]
    #[must_use]
    pub fn is_clear(&self) -> bool {
        matches!(self, Self::Clear)
    }

    /// The blacklist reason, if any.
    #[inline]
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Clear => None,
            Self::Reason(reason) => Some(reason),
        }
    }
}

impl Serialize for Blacklist {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Clear => serializer.serialize_bool(false),
            Self::Reason(reason) => serializer.serialize_str(reason),
        }
    }
}

impl<'de> Deserialize<'de> for Blacklist {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(BlacklistVisitor)
    }
}

struct BlacklistVisitor;

impl Visitor<'_> for BlacklistVisitor {
    type Value = Blacklist;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("false or a blacklist reason string")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        if v {
            // Blacklisted with the reason lost; keep the gate closed.
            Ok(Blacklist::Reason(String::new()))
        } else {
            Ok(Blacklist::Clear)
        }
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Blacklist::Reason(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Blacklist::Reason(v))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Blacklist::Clear)
    }
}

impl fmt::Display for Blacklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clear => f.write_str("clear"),
            Self::Reason(reason) if reason.is_empty() => f.write_str("blacklisted"),
            Self::Reason(reason) => write!(f, "blacklisted: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clear_serializes_as_false() {
        let value = serde_json::to_value(Blacklist::Clear).unwrap();
        assert_eq!(value, json!(false));
    }

    #[test]
    fn reason_serializes_as_string() {
        let value = serde_json::to_value(Blacklist::reason_for("ToS violation")).unwrap();
        assert_eq!(value, json!("ToS violation"));
    }

    #[test]
    fn false_deserializes_as_clear() {
        let parsed: Blacklist = serde_json::from_value(json!(false)).unwrap();
        assert!(parsed.is_clear());
    }

    #[test]
    fn string_deserializes_as_reason() {
        let parsed: Blacklist = serde_json::from_value(json!("spam")).unwrap();
        assert_eq!(parsed.reason(), Some("spam"));
    }

    #[test]
    fn lenient_true_stays_blacklisted() {
        let parsed: Blacklist = serde_json::from_value(json!(true)).unwrap();
        assert!(!parsed.is_clear());
        assert_eq!(parsed.reason(), Some(""));
    }

    #[test]
    fn lenient_null_is_clear() {
        let parsed: Blacklist = serde_json::from_value(json!(null)).unwrap();
        assert!(parsed.is_clear());
    }

    #[test]
    fn object_shape_is_rejected() {
        let result: Result<Blacklist, _> =
            serde_json::from_value(json!({"status": true, "reason": "old shape"}));
        assert!(result.is_err());
    }
}
