//! Single-pass clustering: matrix, count sweep, one final run.

use std::collections::HashSet;

use tracing::debug;

use super::Grouping;
use crate::cluster::{ClusterAlgorithm, CountSelector, QualityMetric};
use crate::entity::Entity;
use crate::error::Result;
use crate::matrix::name_matrix;
use crate::normalize::Normalizer;
use crate::project::TailHandling;

/// Orchestrates normalization, the name distance matrix, optimal-count
/// selection, and a final clustering run into a [`Grouping`].
#[derive(Debug, Clone)]
pub struct SimpleEngine {
    normalizer: Normalizer,
    selector: CountSelector,
    tail: TailHandling,
}

impl SimpleEngine {
    /// Engine with the default quality metric (dispersion ratio) and
    /// compatibility tail handling.
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            selector: CountSelector::default(),
            tail: TailHandling::default(),
        }
    }

    /// Use a different quality metric for the count sweep.
    pub fn with_metric(mut self, metric: QualityMetric) -> Self {
        self.selector = CountSelector::new(metric);
        self
    }

    /// Use a different projection tail mode.
    pub fn with_tail_handling(mut self, tail: TailHandling) -> Self {
        self.tail = tail;
        self
    }

    /// Cluster `items` with `strategy`.
    ///
    /// Zero or one entity yields a single cluster with whatever is present,
    /// as does a sweep that finds no usable count. Otherwise the strategy
    /// runs once more at the selected count and entities are grouped by
    /// label. The output covers every input entity exactly once.
    pub fn cluster(
        &self,
        items: &[Entity],
        strategy: &dyn ClusterAlgorithm,
    ) -> Result<Grouping> {
        if items.len() <= 1 {
            return Ok(Grouping::single(items));
        }

        let matrix = name_matrix(items, &self.normalizer, self.tail);
        let distinct = distinct_names(items);
        match self.selector.select(&matrix, distinct, strategy)? {
            None => {
                debug!(items = items.len(), "no usable cluster count, keeping one cluster");
                Ok(Grouping::single(items))
            }
            Some(count) => {
                let labels = strategy.cluster(&matrix, Some(count))?;
                Ok(Grouping::from_labels(items, &labels))
            }
        }
    }

}

fn distinct_names(items: &[Entity]) -> usize {
    items
        .iter()
        .map(|item| item.name.to_lowercase())
        .collect::<HashSet<_>>()
        .len()
}
