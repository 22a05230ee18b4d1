//! URL slugs derived from anime titles
//!
//! The streaming site addresses every show by a slug built from its title.
//! [`slugify`] reproduces that derivation and [`Slug`] carries the result
//! around in a form that is known to be canonical.

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::{AnistreamError, Result};

/// Derive a URL slug from a title.
///
/// The title is decomposed (NFD) so accented letters keep their base letter,
/// lowercased, and reduced to ASCII letters and digits. Runs of whitespace or
/// hyphens become a single hyphen; every other character is dropped. The
/// output never starts or ends with a hyphen.
///
/// # Examples
/// ```
/// use anistream_core::slug::slugify;
///
/// assert_eq!(slugify("One Piece"), "one-piece");
/// assert_eq!(slugify("Re:Zero - Starting Life in Another World"), "rezero-starting-life-in-another-world");
/// assert_eq!(slugify("Pokémon"), "pokemon");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.nfd().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
    }

    slug
}

/// Check that `s` is exactly what [`slugify`] would produce for it.
fn is_canonical(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// A canonical, non-empty slug.
///
/// Computed once when a catalog entry is received and never changed after.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Build the slug for a title.
    ///
    /// Returns `None` when nothing slug-worthy is left, e.g. a title written
    /// entirely in Japanese script.
    pub fn from_title(title: &str) -> Option<Self> {
        let slug = slugify(title);
        if slug.is_empty() {
            None
        } else {
            Some(Self(slug))
        }
    }

    /// Accept an existing slug, rejecting anything not in canonical form.
    pub fn parse(s: &str) -> Result<Self> {
        if is_canonical(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(AnistreamError::InvalidSlug(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Slug {
    type Error = AnistreamError;

    fn try_from(value: String) -> Result<Self> {
        if is_canonical(&value) {
            Ok(Self(value))
        } else {
            Err(AnistreamError::InvalidSlug(value))
        }
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}
