//! Editor version ordering.
//!
//! Editor versions look like `2019.4.14f1`: numeric fields separated by `.`
//! or by a release-stage letter (`a`lpha, `b`eta, `f`inal). Stages order
//! alphabetically, which happens to match their maturity.

use std::cmp::Ordering;

const SEPARATORS: &[char] = &['.', 'a', 'b', 'f'];

/// Compare two editor versions.
///
/// Fields that are not numeric fall back to a plain string comparison, so
/// malformed versions still sort deterministically.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut a = a;
    let mut b = b;

    loop {
        let idx_a = a.find(SEPARATORS);
        let idx_b = b.find(SEPARATORS);

        let (idx_a, idx_b) = match (idx_a, idx_b) {
            (Some(x), Some(y)) => (x, y),
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => break,
        };

        let (part_a, sep_a) = (&a[..idx_a], a.as_bytes()[idx_a]);
        let (part_b, sep_b) = (&b[..idx_b], b.as_bytes()[idx_b]);

        let ord = match (part_a.parse::<u64>(), part_b.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => part_a.cmp(part_b),
        };
        if ord != Ordering::Equal {
            return ord;
        }

        let ord = sep_a.cmp(&sep_b);
        if ord != Ordering::Equal {
            return ord;
        }

        a = &a[idx_a + 1..];
        b = &b[idx_b + 1..];
    }

    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// Whether a version names an alpha or beta build.
pub fn is_prerelease(version: &str) -> bool {
    version.contains(['a', 'b'])
}
