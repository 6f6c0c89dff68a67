//! Stable slug derivation for guest identity.
//!
//! A slug is the collision-check key for registration and the token embedded
//! in personalized invitation links, so derivation must be pure and
//! deterministic: the same name always yields the same slug.

/// Derive a slug from a free-text guest name.
///
/// Lowercases, drops every character outside ASCII alphanumerics, `_`, and
/// `-`, and collapses each whitespace run into a single `+` join character.
/// Leading and trailing whitespace never produces a join character.
///
/// ```
/// use guestbook::core::slug::derive_slug;
/// assert_eq!(derive_slug("Dr. Joko Widodo"), "dr+joko+widodo");
/// ```
pub fn derive_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_gap = false;

    for c in name.trim().chars() {
        if c.is_whitespace() {
            pending_gap = true;
            continue;
        }
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            if pending_gap && !slug.is_empty() {
                slug.push('+');
            }
            pending_gap = false;
            slug.push(c);
        }
    }

    slug
}
