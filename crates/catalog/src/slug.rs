//! Slug derivation from product names.

/// Pure name → slug mapping.
///
/// Implementations must be deterministic: the slug of a product is only ever
/// derived from its current name.
pub trait Slugifier: Send + Sync {
    fn slugify(&self, input: &str) -> String;
}

/// Transliterated to ASCII, then lower-cased alphanumeric runs joined by
/// single dashes. Every other character acts as a separator.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSlugifier;

impl Slugifier for DefaultSlugifier {
    fn slugify(&self, input: &str) -> String {
        let ascii = deunicode::deunicode(input);
        let mut out = String::with_capacity(ascii.len());
        let mut pending_dash = false;

        for c in ascii.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(c.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }

        out
    }
}

impl<F> Slugifier for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn slugify(&self, input: &str) -> String {
        self(input)
    }
}
