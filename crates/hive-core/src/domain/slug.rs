//! Slug derivation for post URLs.
//!
//! A slug is derived from the title at creation time and must be globally
//! unique. Collisions are resolved by appending a numeric suffix starting
//! at 2; the storage layer additionally carries a unique index so a racing
//! insert surfaces as a constraint violation instead of a duplicate.

/// Derive the base slug candidate from a title: lowercase, spaces to hyphens.
pub fn slugify(title: &str) -> String {
    title.replace(' ', "-").to_lowercase()
}

/// The nth dedup candidate for a base slug. Suffixes start at 2.
pub fn with_suffix(base: &str, n: u32) -> String {
    format!("{base}-{n}")
}
