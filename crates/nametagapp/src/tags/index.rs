use super::Tag;
use crate::codec::sanitize_tag_name;
use crate::error::Result;
use crate::file::FileKey;
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of resolving user-supplied tag names against the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    /// Known tag names, sanitized, deduplicated, in request order.
    pub found: Vec<String>,
    /// Names that are invalid or not in the index, as given.
    pub unknown: Vec<String>,
}

/// The tag table plus tag → file membership.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    tags_by_name: BTreeMap<String, Tag>,
    holders: BTreeMap<String, BTreeSet<FileKey>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds an index from a persisted tag table. Membership starts empty.
    pub fn from_tags(tags: Vec<Tag>) -> Self {
        let mut index = Self::new();
        for tag in tags {
            index.tags_by_name.entry(tag.name.clone()).or_insert(tag);
        }
        index
    }

    /// Registers a tag, returning it and whether it was newly created.
    ///
    /// An existing tag with the same sanitized name is returned unchanged.
    pub fn add_tag(&mut self, raw: &str) -> Result<(Tag, bool)> {
        let name = sanitize_tag_name(raw)?;
        if let Some(existing) = self.tags_by_name.get(&name) {
            return Ok((existing.clone(), false));
        }
        let tag = Tag::new(name.clone());
        self.tags_by_name.insert(name, tag.clone());
        log::debug!("registered tag '{}'", tag.name);
        Ok((tag, true))
    }

    pub fn get_tag(&self, raw: &str) -> Option<&Tag> {
        let name = sanitize_tag_name(raw).ok()?;
        self.tags_by_name.get(&name)
    }

    /// Looks up several names; unknown ones are silently dropped.
    pub fn get_tags<S: AsRef<str>>(&self, names: &[S]) -> Vec<Tag> {
        names
            .iter()
            .filter_map(|n| self.get_tag(n.as_ref()))
            .cloned()
            .collect()
    }

    /// Like [`TagIndex::get_tags`], but also reports what was dropped.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Resolved {
        let mut resolved = Resolved::default();
        for raw in names {
            let raw = raw.as_ref();
            match self.get_tag(raw) {
                Some(tag) => {
                    if !resolved.found.contains(&tag.name) {
                        resolved.found.push(tag.name.clone());
                    }
                }
                None => resolved.unknown.push(raw.to_string()),
            }
        }
        resolved
    }

    /// Deletes tags and their membership. Missing names are ignored.
    ///
    /// Returns the names actually removed. Untagging the files that held them
    /// is the caller's job; see
    /// [`Library::remove_tags`](crate::library::Library::remove_tags).
    pub fn remove_tags<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<String> {
        let mut removed = Vec::new();
        for raw in names {
            let Ok(name) = sanitize_tag_name(raw.as_ref()) else {
                continue;
            };
            if self.tags_by_name.remove(&name).is_some() {
                self.holders.remove(&name);
                removed.push(name);
            }
        }
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags_by_name.contains_key(name)
    }

    /// All tags, ordered by name.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags_by_name.values()
    }

    pub fn names(&self) -> Vec<String> {
        self.tags_by_name.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tags_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags_by_name.is_empty()
    }

    // --- Membership ---

    /// Records that `key` holds `name`. Unknown tag names are ignored.
    pub fn link(&mut self, name: &str, key: &FileKey) {
        if self.tags_by_name.contains_key(name) {
            self.holders
                .entry(name.to_string())
                .or_default()
                .insert(key.clone());
        }
    }

    pub fn unlink(&mut self, name: &str, key: &FileKey) {
        if let Some(keys) = self.holders.get_mut(name) {
            keys.remove(key);
            if keys.is_empty() {
                self.holders.remove(name);
            }
        }
    }

    /// Drops `key` from every tag's membership.
    pub fn unlink_all(&mut self, key: &FileKey) {
        self.holders.retain(|_, keys| {
            keys.remove(key);
            !keys.is_empty()
        });
    }

    /// Files currently holding `name`.
    pub fn holders(&self, name: &str) -> Vec<FileKey> {
        self.holders
            .get(name)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Files holding any of `names`, each listed once.
    pub fn holders_of_any<S: AsRef<str>>(&self, names: &[S]) -> Vec<FileKey> {
        let mut keys = BTreeSet::new();
        for name in names {
            if let Some(held) = self.holders.get(name.as_ref()) {
                keys.extend(held.iter().cloned());
            }
        }
        keys.into_iter().collect()
    }

    pub fn usage(&self, name: &str) -> usize {
        self.holders.get(name).map(BTreeSet::len).unwrap_or(0)
    }

    /// Moves all membership from `old` to `new`.
    pub fn rekey(&mut self, old: &FileKey, new: &FileKey) {
        for keys in self.holders.values_mut() {
            if keys.remove(old) {
                keys.insert(new.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn key(name: &str) -> FileKey {
        FileKey {
            dir: PathBuf::from("/pics"),
            untagged: name.to_string(),
            extension: ".jpg".to_string(),
        }
    }

    #[test]
    fn test_add_tag_sanitizes() {
        let mut index = TagIndex::new();
        let (tag, created) = index.add_tag(" @beach ").unwrap();
        assert!(created);
        assert_eq!(tag.name, "beach");
        assert!(index.contains("beach"));
    }

    #[test]
    fn test_add_tag_returns_existing() {
        let mut index = TagIndex::new();
        let (first, _) = index.add_tag("beach").unwrap();
        let (second, created) = index.add_tag("@beach").unwrap();
        assert!(!created);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_add_tag_rejects_empty() {
        let mut index = TagIndex::new();
        assert!(index.add_tag("  @ ").is_err());
        assert!(index.is_empty());
    }

    #[test]
    fn test_get_tag_is_case_sensitive() {
        let mut index = TagIndex::new();
        index.add_tag("Beach").unwrap();
        assert!(index.get_tag("Beach").is_some());
        assert!(index.get_tag("@Beach").is_some());
        assert!(index.get_tag("beach").is_none());
        assert!(index.get_tag("").is_none());
    }

    #[test]
    fn test_get_tags_drops_unknown() {
        let mut index = TagIndex::new();
        index.add_tag("beach").unwrap();
        index.add_tag("sunset").unwrap();

        let tags = index.get_tags(&["beach", "nope", "sunset"]);
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["beach", "sunset"]);
    }

    #[test]
    fn test_resolve_reports_unknown() {
        let mut index = TagIndex::new();
        index.add_tag("beach").unwrap();

        let resolved = index.resolve(&["beach", "@beach", "nope", "@"]);
        assert_eq!(resolved.found, vec!["beach"]);
        assert_eq!(resolved.unknown, vec!["nope", "@"]);
    }

    #[test]
    fn test_remove_tags_ignores_missing() {
        let mut index = TagIndex::new();
        index.add_tag("beach").unwrap();
        index.link("beach", &key("a"));

        let removed = index.remove_tags(&["beach", "nope"]);
        assert_eq!(removed, vec!["beach"]);
        assert!(index.is_empty());
        assert!(index.holders("beach").is_empty());
    }

    #[test]
    fn test_link_requires_known_tag() {
        let mut index = TagIndex::new();
        index.link("ghost", &key("a"));
        assert!(index.holders("ghost").is_empty());
    }

    #[test]
    fn test_membership() {
        let mut index = TagIndex::new();
        index.add_tag("beach").unwrap();
        index.add_tag("sunset").unwrap();
        index.link("beach", &key("a"));
        index.link("beach", &key("b"));
        index.link("sunset", &key("b"));

        assert_eq!(index.usage("beach"), 2);
        assert_eq!(
            index.holders_of_any(&["beach", "sunset"]),
            vec![key("a"), key("b")]
        );

        index.unlink_all(&key("b"));
        assert_eq!(index.holders("beach"), vec![key("a")]);
        assert_eq!(index.usage("sunset"), 0);

        index.rekey(&key("a"), &key("c"));
        assert_eq!(index.holders("beach"), vec![key("c")]);
    }

    #[test]
    fn test_from_tags_dedups() {
        let index = TagIndex::from_tags(vec![Tag::new("a"), Tag::new("a"), Tag::new("b")]);
        assert_eq!(index.names(), vec!["a", "b"]);
    }
}
