//! Approximate string similarity.
//!
//! [`similarity`] is the matching-character ratio `2·M / (|a| + |b|)`, where
//! `M` is the number of characters left unchanged by a minimal character diff
//! of the normalized inputs. The diff comes from the `similar` crate.

use similar::TextDiff;

use crate::text::normalize;

/// Similarity of two strings in `[0.0, 1.0]`.
///
/// Both inputs are case-folded and trimmed first. Exact equality after
/// normalization scores `1.0`; two empty strings are equal; one empty and one
/// non-empty string score `0.0`. The result does not depend on argument order.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    // A minimal diff can pick different equal runs depending on direction.
    // A fixed order keeps the score symmetric.
    let (first, second) = if a <= b { (&a, &b) } else { (&b, &a) };
    f64::from(TextDiff::from_chars(first.as_str(), second.as_str()).ratio())
}
