//! # Filename Grammar
//!
//! Tags are stored in the file name itself. A tagged file name looks like:
//!
//! ```text
//! <base tokens separated by single spaces>( " @" <tag> )*<.extension>
//! ```
//!
//! e.g. `sunset @beach @vacation.jpg` is the file `sunset.jpg` tagged with
//! `beach` and `vacation`.
//!
//! ## Decoding Rules
//!
//! - The extension is everything from the **last** `.` to the end.
//! - The remaining base name is split on whitespace runs.
//! - Any token containing `@` is a tag token. Its identity is the token with
//!   every `@` removed; tokens that are empty after that are ignored.
//! - All other tokens are rejoined with single spaces, in their original
//!   order, to form the *untagged name*.
//!
//! ## Out-of-Grammar Names
//!
//! A name without a `.`, or whose only `.` is the first character (`.hidden`),
//! has no extension boundary. Such names are rejected with
//! [`NametagError::OutOfGrammar`] instead of being guessed at.
//!
//! Everything in this module is pure: no state, no I/O.

use crate::error::{NametagError, Result};

/// Marker that distinguishes a tag token from a base-name token.
pub const TAG_SIGIL: char = '@';

/// A file name split into its grammar parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedName {
    /// Base name with every tag token removed.
    pub untagged: String,
    /// Tag identities in the order they appear in the name.
    pub tags: Vec<String>,
    /// Extension including its leading dot (e.g. `.jpg`).
    pub extension: String,
}

/// Splits `filename` into `(base, extension)` at the last `.`.
///
/// Returns `None` for names that have no extension boundary.
pub fn split_extension(filename: &str) -> Option<(&str, &str)> {
    match filename.rfind('.') {
        None | Some(0) => None,
        Some(dot) => Some((&filename[..dot], &filename[dot..])),
    }
}

/// Returns the base name (file name minus extension).
pub fn base_name(filename: &str) -> Result<&str> {
    split_extension(filename)
        .map(|(base, _)| base)
        .ok_or_else(|| NametagError::OutOfGrammar(filename.to_string()))
}

/// Renders `base + (" @" + tag)* + extension`.
///
/// Tag names must already be sanitized. An empty base renders without the
/// leading separator, so `encode("", ["beach"], ".jpg")` is `@beach.jpg`.
pub fn encode<S: AsRef<str>>(base: &str, tags: &[S], extension: &str) -> String {
    let mut name = String::from(base);
    for tag in tags {
        if !name.is_empty() {
            name.push(' ');
        }
        name.push(TAG_SIGIL);
        name.push_str(tag.as_ref());
    }
    name.push_str(extension);
    name
}

/// Parses a full file name (with extension).
pub fn decode(filename: &str) -> Result<DecodedName> {
    let (base, extension) = split_extension(filename)
        .ok_or_else(|| NametagError::OutOfGrammar(filename.to_string()))?;
    let (untagged, tags) = decode_base(base);
    Ok(DecodedName {
        untagged,
        tags,
        extension: extension.to_string(),
    })
}

/// Parses a base name (no extension) into its untagged name and tag names.
pub fn decode_base(base: &str) -> (String, Vec<String>) {
    let mut untagged: Vec<&str> = Vec::new();
    let mut tags: Vec<String> = Vec::new();

    for token in base.split_whitespace() {
        if is_tag_token(token) {
            let name: String = token.chars().filter(|c| *c != TAG_SIGIL).collect();
            if !name.is_empty() {
                tags.push(name);
            }
        } else {
            untagged.push(token);
        }
    }

    (untagged.join(" "), tags)
}

/// A whitespace-delimited token is a tag token iff it contains the sigil.
pub fn is_tag_token(token: &str) -> bool {
    token.contains(TAG_SIGIL)
}

/// Normalizes user input into a tag identity.
///
/// Strips all whitespace and every `@`. Fails with
/// [`NametagError::InvalidTagName`] if nothing is left, or if the name would
/// introduce a path separator into the file name.
pub fn sanitize_tag_name(raw: &str) -> Result<String> {
    let name: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != TAG_SIGIL)
        .collect();

    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return Err(NametagError::InvalidTagName(raw.to_string()));
    }
    Ok(name)
}

/// The display form of a tag, as it appears inside a file name.
pub fn render_tag(name: &str) -> String {
    format!("{}{}", TAG_SIGIL, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_without_tags() {
        let tags: [&str; 0] = [];
        assert_eq!(encode("vacation", &tags, ".jpg"), "vacation.jpg");
    }

    #[test]
    fn test_encode_with_tags_in_order() {
        assert_eq!(
            encode("vacation", &["beach", "sunset"], ".jpg"),
            "vacation @beach @sunset.jpg"
        );
    }

    #[test]
    fn test_encode_empty_base() {
        assert_eq!(encode("", &["beach"], ".png"), "@beach.png");
    }

    #[test]
    fn test_decode_plain_name() {
        let decoded = decode("vacation.jpg").unwrap();
        assert_eq!(decoded.untagged, "vacation");
        assert!(decoded.tags.is_empty());
        assert_eq!(decoded.extension, ".jpg");
    }

    #[test]
    fn test_decode_tagged_name() {
        let decoded = decode("sunset @beach @vacation.jpg").unwrap();
        assert_eq!(decoded.untagged, "sunset");
        assert_eq!(decoded.tags, vec!["beach", "vacation"]);
        assert_eq!(decoded.extension, ".jpg");
    }

    #[test]
    fn test_decode_keeps_multi_word_base_order() {
        let decoded = decode("my  summer @beach   trip.JPG").unwrap();
        assert_eq!(decoded.untagged, "my summer trip");
        assert_eq!(decoded.tags, vec!["beach"]);
        assert_eq!(decoded.extension, ".JPG");
    }

    #[test]
    fn test_decode_token_containing_sigil_mid_word() {
        // "a@b" contains '@' and is therefore a tag token named "ab".
        let decoded = decode("photo a@b.jpg").unwrap();
        assert_eq!(decoded.untagged, "photo");
        assert_eq!(decoded.tags, vec!["ab"]);
    }

    #[test]
    fn test_decode_ignores_bare_sigil() {
        let decoded = decode("photo @ @@.jpg").unwrap();
        assert_eq!(decoded.untagged, "photo");
        assert!(decoded.tags.is_empty());
    }

    #[test]
    fn test_decode_uses_last_dot() {
        let decoded = decode("my.photo @v1.2.jpeg").unwrap();
        assert_eq!(decoded.untagged, "my.photo");
        assert_eq!(decoded.tags, vec!["v1.2"]);
        assert_eq!(decoded.extension, ".jpeg");
    }

    #[test]
    fn test_decode_rejects_missing_extension() {
        let err = decode("README").unwrap_err();
        assert!(matches!(err, NametagError::OutOfGrammar(_)));
    }

    #[test]
    fn test_decode_rejects_leading_dot_only() {
        assert!(matches!(
            decode(".hidden"),
            Err(NametagError::OutOfGrammar(_))
        ));
        assert!(split_extension(".hidden").is_none());
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("vacation @beach.jpg").unwrap(), "vacation @beach");
        assert!(base_name("noext").is_err());
    }

    #[test]
    fn test_sanitize_strips_whitespace_and_sigil() {
        assert_eq!(sanitize_tag_name(" @be ach ").unwrap(), "beach");
        assert_eq!(sanitize_tag_name("Beach").unwrap(), "Beach");
    }

    #[test]
    fn test_sanitize_rejects_empty() {
        assert!(matches!(
            sanitize_tag_name(" @ @ "),
            Err(NametagError::InvalidTagName(_))
        ));
        assert!(sanitize_tag_name("").is_err());
    }

    #[test]
    fn test_sanitize_rejects_path_separators() {
        assert!(sanitize_tag_name("a/b").is_err());
        assert!(sanitize_tag_name("a\\b").is_err());
    }

    #[test]
    fn test_render_tag() {
        assert_eq!(render_tag("beach"), "@beach");
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(
            base in "[a-z0-9]{1,8}( [a-z0-9]{1,8}){0,3}",
            tags in prop::collection::vec("[a-zA-Z0-9_-]{1,10}", 0..5),
            ext in "\\.[a-zA-Z]{1,4}",
        ) {
            let decoded = decode(&encode(&base, &tags, &ext)).unwrap();
            prop_assert_eq!(decoded.untagged, base);
            prop_assert_eq!(decoded.tags, tags);
            prop_assert_eq!(decoded.extension, ext);
        }
    }
}
