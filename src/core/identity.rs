//! Submission identity
//!
//! A `KeyId` is assigned once when a submission is created and never changes
//! afterwards. New ids are `SUB-<ULID>`; ids read back from storage are kept
//! verbatim so that records imported from older dumps (UUIDs) stay addressable.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;

/// Prefix for generated submission ids
pub const KEY_PREFIX: &str = "SUB";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("Key id cannot be empty")]
    Empty,

    #[error("Key id cannot contain whitespace: '{0}'")]
    Whitespace(String),
}

/// Opaque, stable identifier of a submission
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyId(String);

impl KeyId {
    /// Generate a fresh, globally unique id
    pub fn generate() -> Self {
        Self(format!("{}-{}", KEY_PREFIX, Ulid::new()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `reference` is a case-insensitive prefix of this id
    pub fn matches_prefix(&self, reference: &str) -> bool {
        let reference = reference.trim();
        !reference.is_empty()
            && self
                .0
                .get(..reference.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(reference))
    }
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for KeyId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdParseError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(IdParseError::Whitespace(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for KeyId {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyId> for String {
    fn from(id: KeyId) -> Self {
        id.0
    }
}

impl AsRef<str> for KeyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_has_prefix_and_ulid() {
        let id = KeyId::generate();
        let s = id.to_string();
        assert!(s.starts_with("SUB-"));
        // SUB- plus a 26 char ULID
        assert_eq!(s.len(), 30);
        assert!(Ulid::from_string(&s[4..]).is_ok());
    }

    #[test]
    fn test_generate_is_unique() {
        let a = KeyId::generate();
        let b = KeyId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_accepts_legacy_uuid() {
        let id: KeyId = "1b9d6bcd-bbfd-4b2d-9b5d-ab8dfbbd4bed".parse().unwrap();
        assert_eq!(id.as_str(), "1b9d6bcd-bbfd-4b2d-9b5d-ab8dfbbd4bed");
    }

    #[test]
    fn test_parse_rejects_empty_and_whitespace() {
        assert_eq!("".parse::<KeyId>(), Err(IdParseError::Empty));
        assert_eq!("   ".parse::<KeyId>(), Err(IdParseError::Empty));
        assert!(matches!(
            "SUB 1".parse::<KeyId>(),
            Err(IdParseError::Whitespace(_))
        ));
    }

    #[test]
    fn test_matches_prefix() {
        let id: KeyId = "SUB-01KCWY20F01B21V0G4E835NW3J".parse().unwrap();
        assert!(id.matches_prefix("SUB-01KC"));
        assert!(id.matches_prefix("sub-01kc"));
        assert!(!id.matches_prefix("SUB-02"));
        assert!(!id.matches_prefix(""));
    }

    #[test]
    fn test_serde_is_plain_string() {
        let id: KeyId = "SUB-ABC".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"SUB-ABC\"");
        let back: KeyId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<KeyId>("\"\"").is_err());
    }
}
