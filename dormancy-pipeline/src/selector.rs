use std::cmp::Ordering;

/// Orders a stage's output by score, highest first, and optionally caps
/// its length.
pub trait Selector<Q, C>: Send + Sync {
    /// Score a candidate is ranked by.
    fn score(&self, candidate: &C) -> f64;

    /// Maximum number of candidates kept. `None` keeps all.
    fn size(&self) -> Option<usize> {
        None
    }

    /// Stable sort by descending score, then truncate to `size()`.
    fn select(&self, _query: &Q, mut candidates: Vec<C>) -> Vec<C> {
        candidates.sort_by(|a, b| descending_nan_last(self.score(a), self.score(b)));
        if let Some(limit) = self.size() {
            candidates.truncate(limit);
        }
        candidates
    }
}

/// Descending comparison where NaN sorts after every number, so a score
/// computed from missing data never ranks first.
pub fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_sorts_last() {
        let mut scores = vec![1.0, f64::NAN, 3.0, 2.0];
        scores.sort_by(|a, b| descending_nan_last(*a, *b));
        assert_eq!(&scores[..3], &[3.0, 2.0, 1.0]);
        assert!(scores[3].is_nan());
    }

    #[test]
    fn signed_zeros_tie() {
        assert_eq!(descending_nan_last(0.0, -0.0), Ordering::Equal);
    }
}
