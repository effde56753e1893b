//! Ordering of version identifiers such as `v18` or `v18.10`.

use std::cmp::Ordering;

/// Compare two version identifiers.
///
/// Identifiers made of dot-separated integers after an optional leading `v`
/// compare numerically (`v9 < v10`, `v18.1 < v18.10`). Other identifiers
/// compare lexicographically and sort below numeric ones.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (numeric_parts(a), numeric_parts(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

fn numeric_parts(version: &str) -> Option<Vec<u64>> {
    let digits = version
        .strip_prefix(['v', 'V'])
        .unwrap_or(version);
    if digits.is_empty() {
        return None;
    }
    digits.split('.').map(|part| part.parse().ok()).collect()
}
