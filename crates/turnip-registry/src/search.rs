//! # Fuzzy Name Matching
//!
//! One matching primitive is shared by field resolution (inside a record)
//! and protocol resolution (across the catalog).
//!
//! ## Matching Rules
//!
//! 1. **Exact pass**: if any candidate equals the query case-insensitively,
//!    that candidate alone is returned, whatever else would have matched.
//! 2. **Fuzzy pass**: otherwise a candidate matches when it contains the
//!    query (case-insensitive), or, for a threshold above zero, when its
//!    similarity ratio to the query reaches the threshold.
//!
//! A threshold of `0.0` therefore means "exact or contains, no fuzziness".
//!
//! The similarity ratio is `1 - levenshtein(a, b) / max(len(a), len(b))`
//! computed over lowercased characters, so it lies in `[0, 1]`.
//!
//! ## References
//!
//! - Levenshtein, V. I. (1966). "Binary codes capable of correcting
//!   deletions, insertions, and reversals". *Soviet Physics Doklady*, 10(8).

/// Returns the candidate equal to `query`, ignoring case.
pub fn exact_search<'a, S: AsRef<str>>(query: &str, candidates: &'a [S]) -> Option<&'a str> {
    let query = query.to_lowercase();
    candidates
        .iter()
        .map(AsRef::as_ref)
        .find(|candidate| candidate.to_lowercase() == query)
}

/// Returns every candidate matching `query`.
///
/// An exact match short-circuits to a single result. An empty result means
/// no match; more than one result means the query is ambiguous.
///
/// # Example
///
/// ```rust
/// use turnip_registry::search::search;
///
/// let names = ["HTTP", "HTTPS", "FTP"];
/// assert_eq!(search("http", &names, 0.0), vec!["HTTP"]);
/// assert_eq!(search("TTP", &names, 0.0), vec!["HTTP", "HTTPS"]);
/// assert!(search("smtp", &names, 0.0).is_empty());
/// ```
pub fn search<'a, S: AsRef<str>>(query: &str, candidates: &'a [S], threshold: f64) -> Vec<&'a str> {
    if let Some(exact) = exact_search(query, candidates) {
        return vec![exact];
    }

    let query = query.to_lowercase();
    candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|candidate| {
            let candidate = candidate.to_lowercase();
            candidate.contains(&query) || (threshold > 0.0 && similarity(&query, &candidate) >= threshold)
        })
        .collect()
}

/// Normalized edit-distance similarity between two strings, in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Classic two-row Levenshtein distance over Unicode scalar values.
fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
