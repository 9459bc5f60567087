//! Tag support for nametag.
//!
//! A tag is nothing more than a name. Its only persistent home besides the
//! tag table is the file names themselves: a file tagged `beach` carries an
//! `@beach` token in its name.
//!
//! ## Tag Naming Rules
//!
//! Tag names are normalized by [`crate::codec::sanitize_tag_name`]:
//! - All whitespace and every `@` is stripped
//! - Path separators are rejected
//! - The result must be non-empty
//! - Case is preserved and significant (`Beach` and `beach` are distinct)
//!
//! ## Tag Index
//!
//! [`TagIndex`] is the authoritative table of tag identities. It also owns the
//! tag → file membership, so a cascade delete is a lookup in one map instead
//! of a walk over every file.

pub mod index;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

pub use index::{Resolved, TagIndex};

/// A tag entry in the tag table.
///
/// Two tags are equal iff their names are equal; `created_at` is bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// The sanitized tag name.
    pub name: String,
    /// When this tag was first registered.
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Creates a new tag entry with the given name.
    ///
    /// Note: This does not sanitize the name. Go through
    /// [`TagIndex::add_tag`] to get a validated tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
