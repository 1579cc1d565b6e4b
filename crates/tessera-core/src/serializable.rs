//! Inputs accepted by ledger hashing and signing.
//!
//! Text serializes as its UTF-8 bytes, byte sequences as themselves. Multiple
//! inputs are concatenated in argument order before reaching the crypto
//! provider, so `hash(a, b)` and `hash(a ++ b)` agree.

use bytes::Bytes;
use serde_json::Value;
use std::borrow::Cow;

use crate::error::SerializableError;

/// Text or a byte sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Serializable<'a> {
    Text(Cow<'a, str>),
    Bytes(Cow<'a, [u8]>),
}

impl Serializable<'_> {
    /// The byte-serialized form.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Serializable::Text(text) => text.as_bytes(),
            Serializable::Bytes(bytes) => bytes,
        }
    }
}

/// Concatenate the byte-serialized forms of `parts` in order.
pub fn concat(parts: &[Serializable<'_>]) -> Vec<u8> {
    let len = parts.iter().map(|p| p.as_bytes().len()).sum();
    let mut out = Vec::with_capacity(len);
    for part in parts {
        out.extend_from_slice(part.as_bytes());
    }
    out
}

impl<'a> From<&'a str> for Serializable<'a> {
    fn from(text: &'a str) -> Self {
        Serializable::Text(Cow::Borrowed(text))
    }
}

impl<'a> From<&'a String> for Serializable<'a> {
    fn from(text: &'a String) -> Self {
        Serializable::Text(Cow::Borrowed(text.as_str()))
    }
}

impl From<String> for Serializable<'static> {
    fn from(text: String) -> Self {
        Serializable::Text(Cow::Owned(text))
    }
}

impl<'a> From<&'a [u8]> for Serializable<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Serializable::Bytes(Cow::Borrowed(bytes))
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Serializable<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Serializable::Bytes(Cow::Borrowed(&bytes[..]))
    }
}

impl<'a> From<&'a Vec<u8>> for Serializable<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Serializable::Bytes(Cow::Borrowed(bytes.as_slice()))
    }
}

impl From<Vec<u8>> for Serializable<'static> {
    fn from(bytes: Vec<u8>) -> Self {
        Serializable::Bytes(Cow::Owned(bytes))
    }
}

impl<'a> From<&'a Bytes> for Serializable<'a> {
    fn from(bytes: &'a Bytes) -> Self {
        Serializable::Bytes(Cow::Borrowed(bytes.as_ref()))
    }
}

/// Accepts strings and arrays of byte values from dynamically typed input.
impl<'a> TryFrom<&'a Value> for Serializable<'a> {
    type Error = SerializableError;

    fn try_from(value: &'a Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(text) => Ok(Serializable::Text(Cow::Borrowed(text.as_str()))),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or(SerializableError::Unsupported {
                            found: "array with non-byte element",
                        })
                })
                .collect::<Result<Vec<u8>, _>>()
                .map(|bytes| Serializable::Bytes(Cow::Owned(bytes))),
            Value::Null => Err(SerializableError::Unsupported { found: "null" }),
            Value::Bool(_) => Err(SerializableError::Unsupported { found: "boolean" }),
            Value::Number(_) => Err(SerializableError::Unsupported { found: "number" }),
            Value::Object(_) => Err(SerializableError::Unsupported { found: "object" }),
        }
    }
}
