//! Symmetric distance matrices over entity lists.

use strsim::levenshtein;

use crate::entity::Entity;
use crate::normalize::Normalizer;
use crate::project::{project_pair, TailHandling};

/// Immutable symmetric `n x n` matrix of non-negative distances.
///
/// Cells are only ever written in symmetric pairs from unordered `(i, j)`
/// combinations, so `get(i, j) == get(j, i)` and the diagonal is zero by
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    cells: Vec<f64>,
}

impl DistanceMatrix {
    /// Build a matrix by evaluating `dist` once per unordered pair.
    pub fn from_pairs(n: usize, mut dist: impl FnMut(usize, usize) -> f64) -> Self {
        let mut cells = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = dist(i, j);
                cells[i * n + j] = d;
                cells[j * n + i] = d;
            }
        }
        Self { n, cells }
    }

    /// Number of entities the matrix was built over.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Whether the matrix is empty.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Distance between entities `i` and `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.cells[i * self.n + j]
    }

    /// Row `i` as a slice (distances from entity `i` to every entity).
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.cells[i * self.n..(i + 1) * self.n]
    }
}

/// Edit-distance matrix over entity names.
///
/// Each name is normalized once; every unordered pair is then projected to
/// its distinguishing remainder before taking the Levenshtein distance.
/// O(n^2 * L^2) in the projected string length, acceptable for one
/// category's item list.
pub fn name_matrix(
    items: &[Entity],
    normalizer: &Normalizer,
    tail: TailHandling,
) -> DistanceMatrix {
    let normalized: Vec<String> = items
        .iter()
        .map(|item| normalizer.normalize(&item.name))
        .collect();
    DistanceMatrix::from_pairs(items.len(), |i, j| {
        let (a, b) = project_pair(&normalized[i], &normalized[j], tail);
        levenshtein(&a, &b) as f64
    })
}

/// Absolute-difference matrix over closing prices.
pub fn price_matrix(items: &[Entity]) -> DistanceMatrix {
    DistanceMatrix::from_pairs(items.len(), |i, j| {
        (items[i].closing_price - items[j].closing_price).abs()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NormalizerConfig;

    fn items(names: &[&str]) -> Vec<Entity> {
        names
            .iter()
            .map(|n| Entity::new(*n, 1.0, 1.0, 0))
            .collect()
    }

    #[test]
    fn single_entity_zero_matrix() {
        let norm = Normalizer::new(&NormalizerConfig::default()).unwrap();
        let m = name_matrix(&items(&["laptop"]), &norm, TailHandling::Truncate);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(0, 0), 0.0);
    }

    #[test]
    fn name_matrix_symmetric_zero_diagonal() {
        let norm = Normalizer::new(&NormalizerConfig::default()).unwrap();
        let m = name_matrix(
            &items(&["laptop dell", "laptop hp", "mouse"]),
            &norm,
            TailHandling::Truncate,
        );
        for i in 0..3 {
            assert_eq!(m.get(i, i), 0.0);
            for j in 0..3 {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
    }

    #[test]
    fn empty_name_never_panics() {
        // "" is a prefix of every string, so the pair collapses and the
        // projected distance is 0 rather than an error.
        let norm = Normalizer::new(&NormalizerConfig::default()).unwrap();
        let m = name_matrix(&items(&["", "abc"]), &norm, TailHandling::Truncate);
        assert_eq!(m.get(0, 1), 0.0);
    }

    #[test]
    fn price_matrix_absolute_differences() {
        let a = Entity::new("a", 1.0, 10.0, 0);
        let b = Entity::new("b", 1.0, 14.5, 0);
        let m = price_matrix(&[a, b]);
        assert_eq!(m.get(0, 1), 4.5);
        assert_eq!(m.get(1, 0), 4.5);
    }
}
