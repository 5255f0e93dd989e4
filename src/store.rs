//! Incremental cluster store collaborator.
//!
//! The batch engines rebuild clusters from scratch; the store-backed path
//! instead keeps clusters alive across runs and folds new items in one at a
//! time. Each stored cluster carries a core point, the member that best
//! represents it for cheap nearest-cluster lookups.

use strsim::levenshtein;

use crate::entity::Entity;

/// Identifier of a stored cluster.
pub type ClusterId = usize;

/// One persisted cluster: its representative core point and its members.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCluster {
    /// The member minimizing total edit distance to all other members.
    pub core_point: Entity,
    /// Members in insertion order.
    pub members: Vec<Entity>,
}

/// Persistence surface the incremental path talks to.
///
/// The surrounding service backs this with its document store; the crate
/// ships [`MemoryClusterStore`] for tests and single-process runs.
pub trait ClusterStore {
    /// Persist a new cluster and return its id.
    fn create_cluster(&mut self, core_point: Entity, members: Vec<Entity>) -> ClusterId;

    /// All stored clusters, in creation order.
    fn clusters(&self) -> &[StoredCluster];

    /// Append an item to a cluster's members.
    fn add_item(&mut self, id: ClusterId, item: Entity);

    /// Replace a cluster's core point.
    fn update_core_point(&mut self, id: ClusterId, core_point: Entity);
}

/// In-memory [`ClusterStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryClusterStore {
    clusters: Vec<StoredCluster>,
}

impl MemoryClusterStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClusterStore for MemoryClusterStore {
    fn create_cluster(&mut self, core_point: Entity, members: Vec<Entity>) -> ClusterId {
        self.clusters.push(StoredCluster {
            core_point,
            members,
        });
        self.clusters.len() - 1
    }

    fn clusters(&self) -> &[StoredCluster] {
        &self.clusters
    }

    fn add_item(&mut self, id: ClusterId, item: Entity) {
        if let Some(cluster) = self.clusters.get_mut(id) {
            cluster.members.push(item);
        }
    }

    fn update_core_point(&mut self, id: ClusterId, core_point: Entity) {
        if let Some(cluster) = self.clusters.get_mut(id) {
            cluster.core_point = core_point;
        }
    }
}

/// The member minimizing total edit distance to all other members; ties go
/// to the first-encountered member.
pub fn core_point(members: &[Entity]) -> Option<&Entity> {
    let mut best: Option<(&Entity, usize)> = None;
    for candidate in members {
        let total: usize = members
            .iter()
            .map(|other| levenshtein(&candidate.name, &other.name))
            .sum();
        if best.map_or(true, |(_, t)| total < t) {
            best = Some((candidate, total));
        }
    }
    best.map(|(entity, _)| entity)
}

/// Assigns new items into a stored cluster set, growing it when nothing
/// fits.
///
/// An item joins the cluster whose core point is nearest by name edit
/// distance, unless that distance exceeds
/// `growth_factor x core_radius + growth_offset` (core radius: the largest
/// core-to-member distance). The `2 x radius - 1` default is an empirical
/// heuristic, kept configurable rather than hard-coded.
#[derive(Debug, Clone)]
pub struct Assigner {
    growth_factor: f64,
    growth_offset: f64,
}

impl Assigner {
    /// Assigner with the default join threshold `2 x radius - 1`.
    pub fn new() -> Self {
        Self {
            growth_factor: 2.0,
            growth_offset: -1.0,
        }
    }

    /// Scale applied to the cluster's core radius.
    pub fn with_growth_factor(mut self, factor: f64) -> Self {
        self.growth_factor = factor;
        self
    }

    /// Offset added after scaling.
    pub fn with_growth_offset(mut self, offset: f64) -> Self {
        self.growth_offset = offset;
        self
    }

    /// Place `item` into the store, joining the nearest cluster or creating
    /// a singleton, and return the cluster id it landed in.
    pub fn assign<S: ClusterStore>(&self, store: &mut S, item: Entity) -> ClusterId {
        let nearest = store
            .clusters()
            .iter()
            .enumerate()
            .map(|(id, cluster)| {
                (
                    id,
                    levenshtein(&cluster.core_point.name, &item.name) as f64,
                )
            })
            .fold(None::<(ClusterId, f64)>, |best, (id, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((id, d)),
            });

        let Some((id, distance)) = nearest else {
            return store.create_cluster(item.clone(), vec![item]);
        };

        let radius = core_radius(&store.clusters()[id]);
        if distance > self.growth_factor * radius + self.growth_offset {
            return store.create_cluster(item.clone(), vec![item]);
        }

        store.add_item(id, item);
        if let Some(core) = core_point(&store.clusters()[id].members) {
            let core = core.clone();
            store.update_core_point(id, core);
        }
        id
    }
}

impl Default for Assigner {
    fn default() -> Self {
        Self::new()
    }
}

fn core_radius(cluster: &StoredCluster) -> f64 {
    cluster
        .members
        .iter()
        .map(|m| levenshtein(&cluster.core_point.name, &m.name) as f64)
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> Entity {
        Entity::new(name, 1.0, 10.0, 0)
    }

    #[test]
    fn core_point_minimizes_total_distance() {
        let members = vec![item("laptop dell"), item("laptop del"), item("laptop dellx")];
        // "laptop dell" is 1 edit from both others; the others are 2 apart.
        assert_eq!(core_point(&members).unwrap().name, "laptop dell");
    }

    #[test]
    fn core_point_tie_takes_first() {
        let members = vec![item("ab"), item("ac")];
        assert_eq!(core_point(&members).unwrap().name, "ab");
    }

    #[test]
    fn empty_members_have_no_core() {
        assert!(core_point(&[]).is_none());
    }

    #[test]
    fn first_item_starts_a_cluster() {
        let mut store = MemoryClusterStore::new();
        let id = Assigner::new().assign(&mut store, item("laptop dell"));
        assert_eq!(id, 0);
        assert_eq!(store.clusters().len(), 1);
        assert_eq!(store.clusters()[0].core_point.name, "laptop dell");
    }

    #[test]
    fn near_item_joins_and_core_updates() {
        let mut store = MemoryClusterStore::new();
        let assigner = Assigner::new();
        store.create_cluster(
            item("laptop dell"),
            vec![item("laptop dell"), item("laptop delll")],
        );
        // Radius 1, threshold 2*1-1 = 1: one edit away joins.
        let id = assigner.assign(&mut store, item("laptop del"));
        assert_eq!(id, 0);
        assert_eq!(store.clusters()[0].members.len(), 3);
        assert_eq!(store.clusters()[0].core_point.name, "laptop dell");
    }

    #[test]
    fn far_item_starts_new_cluster() {
        let mut store = MemoryClusterStore::new();
        let assigner = Assigner::new();
        store.create_cluster(
            item("laptop dell"),
            vec![item("laptop dell"), item("laptop delll")],
        );
        let id = assigner.assign(&mut store, item("office chair"));
        assert_eq!(id, 1);
        assert_eq!(store.clusters().len(), 2);
        assert_eq!(store.clusters()[1].members.len(), 1);
    }

    #[test]
    fn singleton_cluster_only_accepts_duplicates() {
        // Radius 0 gives threshold -1, so even a 1-edit neighbor spawns a
        // new cluster.
        let mut store = MemoryClusterStore::new();
        let assigner = Assigner::new();
        assigner.assign(&mut store, item("mouse"));
        let id = assigner.assign(&mut store, item("mousse"));
        assert_eq!(id, 1);
    }

    #[test]
    fn looser_threshold_is_configurable() {
        let mut store = MemoryClusterStore::new();
        let assigner = Assigner::new().with_growth_offset(2.0);
        assigner.assign(&mut store, item("mouse"));
        // Threshold 2*0+2 = 2: "mousse" (distance 1) now joins.
        let id = assigner.assign(&mut store, item("mousse"));
        assert_eq!(id, 0);
        assert_eq!(store.clusters()[0].members.len(), 2);
    }
}
