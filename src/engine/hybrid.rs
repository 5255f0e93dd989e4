//! Two-phase clustering: a first pass, then selective refinement of
//! clusters that still bundle distinguishable products.

use tracing::debug;

use super::simple::SimpleEngine;
use super::Grouping;
use crate::cluster::{ClusterAlgorithm, Kmeans};
use crate::entity::Entity;
use crate::error::Result;
use crate::normalize::mixes_letters_digits;

/// Decides whether an initial cluster's members may still mix
/// distinguishable items and should be reclustered.
pub trait ReclusterPolicy {
    /// `true` when the cluster is worth a second pass.
    fn should_recluster(&self, members: &[Entity]) -> bool;
}

/// Default policy: recluster unless every member shares one name, or no
/// member's name carries a token mixing letters and digits.
///
/// The letters+digits token is a proxy for "these names encode model
/// variants" ("128gb", "xps13"); names without one rarely split further in
/// a useful way.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariantTokenPolicy;

impl ReclusterPolicy for VariantTokenPolicy {
    fn should_recluster(&self, members: &[Entity]) -> bool {
        let Some(first) = members.first() else {
            return false;
        };
        let reference = first.name.to_lowercase();
        if members
            .iter()
            .all(|m| m.name.to_lowercase() == reference)
        {
            return false;
        }
        members
            .iter()
            .any(|m| m.name.split_whitespace().any(mixes_letters_digits))
    }
}

/// Runs [`SimpleEngine`] once, then reclusters mixed clusters with a
/// `++`-seeded centroid strategy, flattening everything into contiguous
/// final labels.
pub struct HybridEngine {
    simple: SimpleEngine,
    policy: Box<dyn ReclusterPolicy + Send + Sync>,
    refiner: Kmeans,
}

impl HybridEngine {
    /// Hybrid engine with the [`VariantTokenPolicy`] default.
    pub fn new(simple: SimpleEngine) -> Self {
        Self {
            simple,
            policy: Box::new(VariantTokenPolicy),
            refiner: Kmeans::plus_plus(),
        }
    }

    /// Replace the recluster predicate.
    pub fn with_policy(mut self, policy: Box<dyn ReclusterPolicy + Send + Sync>) -> Self {
        self.policy = policy;
        self
    }

    /// Seed the refinement strategy for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.refiner = Kmeans::plus_plus().with_seed(seed);
        self
    }

    /// Cluster `items`, refining initial clusters the policy flags.
    ///
    /// Singleton clusters and clusters the policy skips pass through
    /// unchanged. A refined cluster whose nested count sweep finds no usable
    /// split also passes through unchanged. The output covers exactly the
    /// input entities, renumbered contiguously in discovery order.
    pub fn cluster(
        &self,
        items: &[Entity],
        strategy: &dyn ClusterAlgorithm,
    ) -> Result<Grouping> {
        let initial = self.simple.cluster(items, strategy)?;

        let mut finals = Grouping::default();
        for members in initial {
            if members.len() < 2 || !self.policy.should_recluster(&members) {
                finals.push(members);
                continue;
            }

            debug!(size = members.len(), "reclustering mixed cluster");
            let refined = self.simple.cluster(&members, &self.refiner)?;
            for sub in refined {
                finals.push(sub);
            }
        }
        Ok(finals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Agglomerative;
    use crate::config::NormalizerConfig;
    use crate::normalize::Normalizer;

    fn engine() -> HybridEngine {
        let simple = SimpleEngine::new(Normalizer::new(&NormalizerConfig::default()).unwrap());
        HybridEngine::new(simple).with_seed(42)
    }

    fn named(names: &[&str]) -> Vec<Entity> {
        names
            .iter()
            .map(|n| Entity::new(*n, 1.0, 1.0, 0))
            .collect()
    }

    #[test]
    fn policy_skips_identical_names() {
        let members = named(&["laptop dell", "Laptop Dell"]);
        assert!(!VariantTokenPolicy.should_recluster(&members));
    }

    #[test]
    fn policy_skips_names_without_variant_tokens() {
        let members = named(&["laptop dell", "laptop hp"]);
        assert!(!VariantTokenPolicy.should_recluster(&members));
    }

    #[test]
    fn policy_reclusters_variant_names() {
        let members = named(&["laptop dell xps13", "laptop dell xps15"]);
        assert!(VariantTokenPolicy.should_recluster(&members));
    }

    #[test]
    fn no_entity_lost_or_duplicated() {
        let items = named(&[
            "phone galaxy s24 128gb",
            "phone galaxy s24 256gb",
            "phone galaxy s23 128gb",
            "printer laserjet",
            "printer laserjet",
            "desk chair",
        ]);
        let grouping = engine().cluster(&items, &Agglomerative::new()).unwrap();
        assert_eq!(grouping.total_items(), items.len());
        let mut seen: Vec<String> = grouping
            .clusters()
            .iter()
            .flatten()
            .map(|e| e.name.clone())
            .collect();
        seen.sort();
        let mut expected: Vec<String> = items.iter().map(|e| e.name.clone()).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn final_labels_are_contiguous() {
        let items = named(&[
            "phone galaxy s24 128gb",
            "phone galaxy s24 256gb",
            "desk chair",
        ]);
        let grouping = engine().cluster(&items, &Agglomerative::new()).unwrap();
        // Positions are the labels; just check no cluster is empty.
        assert!(grouping.clusters().iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn custom_policy_is_honored() {
        struct Never;
        impl ReclusterPolicy for Never {
            fn should_recluster(&self, _members: &[Entity]) -> bool {
                false
            }
        }

        let simple = SimpleEngine::new(Normalizer::new(&NormalizerConfig::default()).unwrap());
        let hybrid = HybridEngine::new(simple).with_policy(Box::new(Never));
        let items = named(&["phone a1", "phone a2", "phone b9", "phone b8"]);
        let initial_len = {
            let simple = SimpleEngine::new(Normalizer::new(&NormalizerConfig::default()).unwrap());
            simple.cluster(&items, &Agglomerative::new()).unwrap().len()
        };
        let grouping = hybrid.cluster(&items, &Agglomerative::new()).unwrap();
        assert_eq!(grouping.len(), initial_len);
    }
}
