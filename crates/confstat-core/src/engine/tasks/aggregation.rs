//! Molecular aggregate detection.
//!
//! Molecules in the selected id range start as singleton clusters. Walking the
//! candidate pairs of a [`NeighborIndex`], every pair of particles closer than
//! the distance criterion adds a contact between their molecules; once two
//! molecules in different clusters reach the required number of contacts, the
//! cluster of the second particle is absorbed into the cluster of the first.

use crate::core::utils::geometry::squared_distance;
use crate::engine::config::AggregationConfig;
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use crate::engine::neighbors::{CellSystem, NeighborIndex};
use crate::engine::progress::Progress;
use itertools::Itertools;
use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use tracing::{debug, info, instrument};

new_key_type! {
    /// Handle of a cluster inside one aggregation run.
    pub struct ClusterKey;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    /// Molecule id that represents the aggregate.
    pub representative: usize,
    /// Member molecule ids in chain order.
    pub members: Vec<usize>,
}

impl Aggregate {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Population statistics of the aggregate sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub variance: f64,
}

impl AggregateStats {
    pub fn std_dev(&self) -> f64 {
        self.variance.max(0.0).sqrt()
    }

    fn from_sizes(sizes: &[usize]) -> Self {
        let n = sizes.len().max(1) as f64;
        let sum: f64 = sizes.iter().map(|&s| s as f64).sum();
        let sum_sq: f64 = sizes.iter().map(|&s| (s * s) as f64).sum();
        let mean = sum / n;
        let (min, max) = sizes.iter().copied().minmax().into_option().unwrap_or((0, 0));
        Self {
            min,
            max,
            mean,
            variance: sum_sq / n - mean * mean,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    /// Aggregates ordered by ascending representative.
    pub aggregates: Vec<Aggregate>,
    pub stats: AggregateStats,
}

impl AggregationResult {
    pub fn count(&self) -> usize {
        self.aggregates.len()
    }
}

#[derive(Debug)]
struct ClusterNode {
    representative: usize,
    members: Vec<usize>,
}

/// Arena of disjoint clusters over a contiguous range of molecule ids.
#[derive(Debug)]
struct ClusterPartition {
    range: RangeInclusive<usize>,
    clusters: SlotMap<ClusterKey, ClusterNode>,
    membership: Vec<ClusterKey>,
}

impl ClusterPartition {
    fn singletons(range: RangeInclusive<usize>) -> Self {
        let mut clusters = SlotMap::with_key();
        let membership = range
            .clone()
            .map(|mol| {
                clusters.insert(ClusterNode {
                    representative: mol,
                    members: vec![mol],
                })
            })
            .collect();
        Self {
            range,
            clusters,
            membership,
        }
    }

    #[inline]
    fn cluster_of(&self, mol: usize) -> ClusterKey {
        self.membership[mol - self.range.start()]
    }

    /// Moves every member of `absorbed` in front of the members of `survivor`.
    fn merge(&mut self, survivor: ClusterKey, absorbed: ClusterKey) {
        let Some(absorbed_node) = self.clusters.remove(absorbed) else {
            return;
        };
        for &mol in &absorbed_node.members {
            self.membership[mol - self.range.start()] = survivor;
        }
        if let Some(node) = self.clusters.get_mut(survivor) {
            let mut members = absorbed_node.members;
            members.append(&mut node.members);
            node.members = members;
        }
    }

    fn into_aggregates(self) -> Vec<Aggregate> {
        let mut aggregates: Vec<Aggregate> = self
            .clusters
            .into_iter()
            .map(|(_, node)| Aggregate {
                representative: node.representative,
                members: node.members,
            })
            .collect();
        aggregates.sort_unstable_by_key(|a| a.representative);
        aggregates
    }
}

/// Number of contacts per molecule pair, keyed larger id first.
#[derive(Debug, Default)]
struct ContactCounter {
    counts: HashMap<(usize, usize), u32>,
}

impl ContactCounter {
    fn entry(&mut self, a: usize, b: usize) -> &mut u32 {
        self.counts.entry((a.max(b), a.min(b))).or_insert(0)
    }
}

/// Groups the molecules `first_molecule..=last_molecule` into aggregates.
///
/// # Errors
///
/// Returns [`EngineError::Precondition`] unless the index runs on a single node
/// with a domain-decomposed cell system and its cutoff covers the distance
/// criterion; [`EngineError::Validation`] if the molecule range exceeds the
/// number of molecules or the index yields pairs outside the snapshot.
#[instrument(skip_all, name = "aggregation_task")]
pub fn run<I: NeighborIndex + ?Sized>(
    context: &AnalysisContext,
    index: &I,
    config: &AggregationConfig,
) -> Result<AggregationResult, EngineError> {
    let topology = index.topology();
    if topology.n_nodes > 1 {
        return Err(EngineError::Precondition(
            "aggregation can only be calculated on a single node".to_string(),
        ));
    }
    if topology.cell_system != CellSystem::DomainDecomposition {
        return Err(EngineError::Precondition(
            "aggregation needs the domain decomposition cell system".to_string(),
        ));
    }
    let n_molecules = context.snapshot.n_molecules();
    if config.first_molecule > config.last_molecule || config.last_molecule >= n_molecules {
        return Err(EngineError::Validation(format!(
            "molecule range {}..={} is invalid for {n_molecules} molecules",
            config.first_molecule, config.last_molecule
        )));
    }
    if index.interaction_cutoff() < config.distance_criteria {
        return Err(EngineError::Precondition(format!(
            "distance criterion {} is larger than the interaction cutoff {}",
            config.distance_criteria,
            index.interaction_cutoff()
        )));
    }

    context
        .reporter
        .report(Progress::Message("Detecting aggregates...".to_string()));

    let particles = context.snapshot.particles();
    let range = config.first_molecule..=config.last_molecule;
    let criteria2 = config.distance_criteria * config.distance_criteria;
    let mut partition = ClusterPartition::singletons(range.clone());
    let mut contacts = ContactCounter::default();
    let mut merges = 0usize;

    for (a, b) in index.candidate_pairs() {
        let (Some(p1), Some(p2)) = (particles.get(a), particles.get(b)) else {
            return Err(EngineError::Validation(format!(
                "neighbor index yielded pair ({a}, {b}) outside of {} particles",
                particles.len()
            )));
        };
        if !range.contains(&p1.mol_id) || !range.contains(&p2.mol_id) {
            continue;
        }
        let survivor = partition.cluster_of(p1.mol_id);
        let absorbed = partition.cluster_of(p2.mol_id);
        if survivor == absorbed {
            continue;
        }

        let count = contacts.entry(p1.mol_id, p2.mol_id);
        if squared_distance(&p1.position, &p2.position, context.simulation_box) < criteria2 {
            *count += 1;
        }
        if *count >= config.min_contact {
            partition.merge(survivor, absorbed);
            merges += 1;
        }
    }
    debug!(merges, "Merged clusters.");

    let aggregates = partition.into_aggregates();
    let sizes: Vec<usize> = aggregates.iter().map(Aggregate::size).collect();
    let stats = AggregateStats::from_sizes(&sizes);

    info!(
        aggregates = aggregates.len(),
        max = stats.max,
        min = stats.min,
        mean = stats.mean,
        "Aggregation complete."
    );
    Ok(AggregationResult { aggregates, stats })
}
