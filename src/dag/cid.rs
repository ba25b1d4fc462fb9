//! Content identifier value type
//!
//! A `Cid` is the opaque address the gateway assigns to stored content. The
//! client never validates it: the empty string means "undefined" and every
//! other value is taken as-is.
//!
//! JSON form follows the IPLD link convention:
//!
//! ```text
//! { "/": "<cid-string>" }
//! ```
//!
//! and an undefined identifier is `null`.

use crate::dag::link::Link;
use crate::error::CidError;
use serde::de::{Error as _, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const LINK_KEY: &str = "/";

/// Self-describing content address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cid(String);

impl Cid {
    /// The undefined identifier.
    pub fn undefined() -> Self {
        Self(String::new())
    }

    /// Returns true unless this is the undefined identifier.
    ///
    /// Other accessors on an undefined `Cid` return meaningless values.
    pub fn is_defined(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap this identifier as a child link of a parent node.
    pub fn to_link(&self, name: impl Into<String>, size: u64) -> Link {
        Link {
            cid: self.clone(),
            name: name.into(),
            size,
        }
    }

    /// Parse the JSON link form of a content identifier.
    pub fn from_json(blob: &[u8]) -> Result<Self, CidError> {
        if blob.len() < 2 {
            return Err(CidError::InvalidBlob);
        }
        let repr: Option<CidRepr> = serde_json::from_slice(blob)?;
        Self::from_repr(repr)
    }

    fn from_repr(repr: Option<CidRepr>) -> Result<Self, CidError> {
        match repr {
            None => Ok(Self::undefined()),
            Some(CidRepr { target }) if target.is_empty() => Err(CidError::IncorrectlyFormatted),
            Some(CidRepr { target }) => Ok(Self(target)),
        }
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Cid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Cid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The `{"/": token}` object. Only a JSON object is accepted; a missing
/// `"/"` key leaves `target` empty.
struct CidRepr {
    target: String,
}

impl<'de> Deserialize<'de> for CidRepr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CidReprVisitor)
    }
}

struct CidReprVisitor;

impl<'de> Visitor<'de> for CidReprVisitor {
    type Value = CidRepr;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a link object of the form {\"/\": \"<cid>\"}")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut target = String::new();
        while let Some(key) = map.next_key::<String>()? {
            if key == LINK_KEY {
                target = map.next_value()?;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(CidRepr { target })
    }
}

impl Serialize for Cid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.is_defined() {
            return serializer.serialize_none();
        }
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(LINK_KEY, &self.0)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Cid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = Option::<CidRepr>::deserialize(deserializer)?;
        Cid::from_repr(repr).map_err(D::Error::custom)
    }
}
