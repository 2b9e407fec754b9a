//! Spatial neighbor indices used by the pair-based analyses.

use crate::core::models::simulation_box::SimulationBox;
use crate::core::models::snapshot::ParticleSnapshot;
use crate::core::utils::geometry::fold_position;
use crate::engine::error::EngineError;
use std::collections::BTreeSet;
use tracing::debug;

/// How the index partitions space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSystem {
    /// Linked cells with an edge of at least the interaction cutoff.
    DomainDecomposition,
    /// Every particle is checked against every other one.
    AllPairs,
}

/// Process layout of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexTopology {
    pub n_nodes: usize,
    pub cell_system: CellSystem,
}

impl IndexTopology {
    pub const SINGLE_NODE_CELLS: Self = Self {
        n_nodes: 1,
        cell_system: CellSystem::DomainDecomposition,
    };
}

/// Supplier of candidate particle pairs.
///
/// Pairs are indices into [`ParticleSnapshot::particles`]. Every unordered pair
/// whose minimum-image distance is below [`NeighborIndex::interaction_cutoff`]
/// must be yielded exactly once; farther pairs may appear as well.
pub trait NeighborIndex {
    fn interaction_cutoff(&self) -> f64;

    fn topology(&self) -> IndexTopology;

    /// Candidate pairs in a deterministic order.
    fn candidate_pairs(&self) -> Vec<(usize, usize)>;
}

/// Single-node linked-cell grid over a periodic box.
#[derive(Debug, Clone)]
pub struct CellGrid {
    cutoff: f64,
    dims: [usize; 3],
    cells: Vec<Vec<usize>>,
}

impl CellGrid {
    /// Sorts the particles of `snapshot` into cells with an edge of at least `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] if `cutoff` is not positive and finite.
    pub fn build(
        snapshot: &ParticleSnapshot,
        simulation_box: &SimulationBox,
        cutoff: f64,
    ) -> Result<Self, EngineError> {
        if !(cutoff.is_finite() && cutoff > 0.0) {
            return Err(EngineError::Validation(format!(
                "interaction cutoff must be positive (got {cutoff})"
            )));
        }

        let lengths = simulation_box.lengths();
        let dims = [0, 1, 2].map(|axis| ((lengths[axis] / cutoff).floor() as usize).max(1));
        let mut cells = vec![Vec::new(); dims[0] * dims[1] * dims[2]];

        for (index, particle) in snapshot.iter().enumerate() {
            let folded = fold_position(&particle.position, simulation_box);
            let cell = [0, 1, 2].map(|axis| {
                ((folded[axis] / lengths[axis] * dims[axis] as f64) as usize).min(dims[axis] - 1)
            });
            cells[linear_index(cell, dims)].push(index);
        }

        debug!(?dims, cutoff, "Built linked-cell grid.");
        Ok(Self {
            cutoff,
            dims,
            cells,
        })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    fn neighbor_cells(&self, cell: [usize; 3]) -> BTreeSet<usize> {
        let mut neighbors = BTreeSet::new();
        for dx in -1i64..=1 {
            for dy in -1i64..=1 {
                for dz in -1i64..=1 {
                    let offset = [dx, dy, dz];
                    let coords = [0, 1, 2].map(|axis| {
                        (cell[axis] as i64 + offset[axis]).rem_euclid(self.dims[axis] as i64)
                            as usize
                    });
                    neighbors.insert(linear_index(coords, self.dims));
                }
            }
        }
        neighbors
    }
}

#[inline]
fn linear_index(cell: [usize; 3], dims: [usize; 3]) -> usize {
    cell[0] + dims[0] * (cell[1] + dims[1] * cell[2])
}

impl NeighborIndex for CellGrid {
    fn interaction_cutoff(&self) -> f64 {
        self.cutoff
    }

    fn topology(&self) -> IndexTopology {
        IndexTopology::SINGLE_NODE_CELLS
    }

    fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for z in 0..self.dims[2] {
            for y in 0..self.dims[1] {
                for x in 0..self.dims[0] {
                    let cell = linear_index([x, y, z], self.dims);
                    let members = &self.cells[cell];
                    for neighbor in self.neighbor_cells([x, y, z]).range(cell..) {
                        if *neighbor == cell {
                            for (a, &i) in members.iter().enumerate() {
                                for &j in &members[a + 1..] {
                                    pairs.push((i, j));
                                }
                            }
                        } else {
                            for &i in members {
                                for &j in &self.cells[*neighbor] {
                                    pairs.push((i, j));
                                }
                            }
                        }
                    }
                }
            }
        }
        pairs
    }
}

/// An explicit pair list built elsewhere, with the topology its producer declares.
#[derive(Debug, Clone)]
pub struct PairList {
    pairs: Vec<(usize, usize)>,
    cutoff: f64,
    topology: IndexTopology,
}

impl PairList {
    pub fn new(pairs: Vec<(usize, usize)>, cutoff: f64, topology: IndexTopology) -> Self {
        Self {
            pairs,
            cutoff,
            topology,
        }
    }
}

impl NeighborIndex for PairList {
    fn interaction_cutoff(&self) -> f64 {
        self.cutoff
    }

    fn topology(&self) -> IndexTopology {
        self.topology
    }

    fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        self.pairs.clone()
    }
}
