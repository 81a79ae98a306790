//! Claimed record references

use std::fmt;

/// An opaque reference to a domain record claimed by a module.
///
/// `type_tag` is the *declared* kind under which the record was claimed, not
/// a canonicalized identity: claiming the same id under two different tags
/// counts as two distinct claims and produces two receipts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordRef {
    pub type_tag: String,
    pub id: i64,
}

impl RecordRef {
    pub fn new(type_tag: impl Into<String>, id: i64) -> Self {
        Self {
            type_tag: type_tag.into(),
            id,
        }
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_tag, self.id)
    }
}
