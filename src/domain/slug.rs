//! URL slug generation.
//!
//! Mirrors the common web-framework `slugify`: accents are folded to ASCII,
//! anything that is not a word character, whitespace or hyphen is dropped,
//! and runs of whitespace/hyphens collapse into a single hyphen.

use unicode_normalization::UnicodeNormalization;

/// Convert free text into a lowercase ASCII slug
pub fn slugify(text: &str) -> String {
  let folded: String = text
    .nfkd()
    .filter(|c| c.is_ascii())
    .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_ascii_whitespace())
    .collect::<String>()
    .to_ascii_lowercase();

  let mut slug = String::with_capacity(folded.len());
  let mut pending_separator = false;
  for c in folded.trim().chars() {
    if c == '-' || c.is_ascii_whitespace() {
      pending_separator = true;
    } else {
      if pending_separator && !slug.is_empty() {
        slug.push('-');
      }
      pending_separator = false;
      slug.push(c);
    }
  }
  slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Whether a submitted slug only uses letters, digits, underscores and hyphens
pub fn is_valid_slug(slug: &str) -> bool {
  !slug.is_empty()
    && slug
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
