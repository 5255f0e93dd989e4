//! Price-outlier ("fraud") scoring against a comparator set.

use tracing::debug;

use crate::cluster::{ClusterAlgorithm, Density};
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::matrix::price_matrix;

/// Scores how far an item's unit price sits from its peer group.
///
/// Small comparator sets are too sparse for density clustering to be
/// meaningful, so a deviation-from-mean fallback kicks in below 3
/// comparators. Larger sets first isolate the "normal" sub-population (the
/// largest density cluster) before measuring deviation, so a minority of
/// already-anomalous comparator prices cannot skew the baseline.
#[derive(Debug, Clone, Default)]
pub struct FraudScorer {
    density: Density,
}

impl FraudScorer {
    /// Scorer with the default density strategy (2 minimum neighbors).
    pub fn new() -> Self {
        Self {
            density: Density::new(),
        }
    }

    /// Replace the density strategy used to isolate the baseline group.
    pub fn with_density(mut self, density: Density) -> Self {
        self.density = density;
        self
    }

    /// Score `target` against `comparators`; the result is in `[0, 100]`.
    ///
    /// 0 means the target's unit price is perfectly consistent with its peer
    /// group; 100 is the cap for maximal deviation. An empty comparator set
    /// is an input error.
    pub fn score(&self, target: &Entity, comparators: &[Entity]) -> Result<f64> {
        if comparators.is_empty() {
            return Err(Error::EmptyInput);
        }
        if comparators.len() < 3 {
            return Ok(small_set_score(target, comparators));
        }

        let matrix = price_matrix(comparators);
        // Density derives its own count; the length is only an upper bound.
        let labels = self.density.cluster(&matrix, Some(comparators.len()))?;

        let groups = group_indices(&labels);
        // First-encountered group wins ties.
        let mut largest: &[usize] = &[];
        for group in &groups {
            if group.len() > largest.len() {
                largest = group;
            }
        }
        debug!(
            groups = groups.len(),
            baseline_size = largest.len(),
            "isolated baseline group"
        );

        let baseline = mean_unit_price(comparators, largest);
        if baseline == 0.0 {
            return Ok(0.0);
        }
        Ok(capped_deviation(target.unit_price(), baseline))
    }

    /// Mean per-item score over an acquisition's items.
    ///
    /// `comparators` supplies the comparator set for each item (typically
    /// every item listed under a sibling category).
    pub fn score_acquisition<F>(&self, items: &[Entity], mut comparators: F) -> Result<f64>
    where
        F: FnMut(&Entity) -> Vec<Entity>,
    {
        if items.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut total = 0.0;
        for item in items {
            total += self.score(item, &comparators(item))?;
        }
        Ok(total / items.len() as f64)
    }
}

fn small_set_score(target: &Entity, comparators: &[Entity]) -> f64 {
    let mean = comparators.iter().map(Entity::unit_price).sum::<f64>() / comparators.len() as f64;
    // Floor the baseline at 1 so near-free comparators cannot blow the
    // denominator up.
    let mean = mean.max(1.0);
    capped_deviation(target.unit_price(), mean)
}

fn capped_deviation(unit_price: f64, baseline: f64) -> f64 {
    ((unit_price - baseline).abs() / baseline).min(1.0) * 100.0
}

/// Indices grouped by label, first-seen label order. Noise (`-1`) forms a
/// group like any other label; a noise "group" can legitimately be the
/// largest when no dense sub-population exists.
fn group_indices(labels: &[i64]) -> Vec<Vec<usize>> {
    let mut positions: std::collections::HashMap<i64, usize> = std::collections::HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (idx, &label) in labels.iter().enumerate() {
        let at = *positions.entry(label).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[at].push(idx);
    }
    groups
}

fn mean_unit_price(items: &[Entity], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| items[i].unit_price()).sum::<f64>() / indices.len() as f64
}
