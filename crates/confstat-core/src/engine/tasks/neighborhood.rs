//! Point queries against the live snapshot.

use crate::core::utils::geometry::{fold_position, squared_distance};
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use kiddo::{ImmutableKdTree, SquaredEuclidean};
use nalgebra::{Point3, Vector3};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Identities of all particles closer than `radius` to `point`, ascending.
///
/// The search runs on an immutable k-d tree of folded positions, which tolerates
/// any number of coincident particles. It is queried with every periodic
/// image of the folded point adjacent to the primary box; each hit is confirmed
/// with the minimum-image distance.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] if `radius` is negative or not finite.
#[instrument(skip_all, name = "neighborhood_task")]
pub fn neighborhood(
    context: &AnalysisContext,
    point: &Point3<f64>,
    radius: f64,
) -> Result<Vec<usize>, EngineError> {
    if !(radius.is_finite() && radius >= 0.0) {
        return Err(EngineError::Validation(format!(
            "radius must be finite and non-negative (got {radius})"
        )));
    }
    let particles = context.snapshot.particles();
    if particles.is_empty() {
        return Ok(Vec::new());
    }

    let simulation_box = context.simulation_box;
    let folded: Vec<[f64; 3]> = particles
        .iter()
        .map(|p| {
            let f = fold_position(&p.position, simulation_box);
            [f.x, f.y, f.z]
        })
        .collect();
    let kdtree: ImmutableKdTree<f64, 3> = ImmutableKdTree::new_from_slice(&folded);

    let center = fold_position(point, simulation_box);
    let lengths = simulation_box.lengths();
    let radius_sq = radius * radius;
    let mut found = BTreeSet::new();

    for sx in -1..=1 {
        for sy in -1..=1 {
            for sz in -1..=1 {
                let shift = Vector3::new(sx as f64, sy as f64, sz as f64).component_mul(lengths);
                let image = center + shift;
                let query = [image.x, image.y, image.z];
                for hit in kdtree.within_unsorted::<SquaredEuclidean>(&query, radius_sq) {
                    let Ok(index) = usize::try_from(hit.item) else {
                        continue;
                    };
                    let particle = &particles[index];
                    if squared_distance(point, &particle.position, simulation_box) < radius_sq {
                        found.insert(particle.identity);
                    }
                }
            }
        }
    }

    debug!(radius, hits = found.len(), "Neighborhood query finished.");
    Ok(found.into_iter().collect())
}

/// Smallest minimum-image distance from `point` to any particle except `exclude`.
///
/// Returns `Lx + Ly + Lz` if every particle is excluded.
///
/// # Errors
///
/// Returns [`EngineError::Precondition`] if the snapshot is empty.
#[instrument(skip_all, name = "distance_to_task")]
pub fn distance_to(
    context: &AnalysisContext,
    point: &Point3<f64>,
    exclude: Option<usize>,
) -> Result<f64, EngineError> {
    if context.snapshot.is_empty() {
        return Err(EngineError::Precondition("no particles".to_string()));
    }
    let start = context.simulation_box.perimeter_sum().powi(2);
    let min_d2 = context
        .snapshot
        .iter()
        .filter(|p| Some(p.identity) != exclude)
        .map(|p| squared_distance(point, &p.position, context.simulation_box))
        .fold(start, f64::min);
    Ok(min_d2.sqrt())
}

/// Identity and position folded into the primary box, for every particle in storage order.
pub fn folded_positions(context: &AnalysisContext) -> Vec<(usize, Point3<f64>)> {
    context
        .snapshot
        .iter()
        .map(|p| (p.identity, fold_position(&p.position, context.simulation_box)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::particle::Particle;
    use crate::core::models::simulation_box::SimulationBox;
    use crate::core::models::snapshot::ParticleSnapshot;
    use crate::core::utils::geometry::distance;
    use crate::engine::progress::ProgressReporter;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TOLERANCE: f64 = 1e-12;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn with_context<T>(
        snapshot: &ParticleSnapshot,
        simulation_box: &SimulationBox,
        f: impl FnOnce(&AnalysisContext) -> T,
    ) -> T {
        let reporter = ProgressReporter::new();
        let context = AnalysisContext::new(snapshot, simulation_box, &reporter);
        f(&context)
    }

    fn sample() -> ParticleSnapshot {
        [
            Particle::new(0, 0, Point3::new(0.5, 5.0, 5.0)),
            Particle::new(1, 0, Point3::new(9.5, 5.0, 5.0)),
            Particle::new(2, 0, Point3::new(5.0, 5.0, 5.0)),
            Particle::new(3, 0, Point3::new(-9.0, 5.0, 5.0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn neighborhood_sees_across_the_boundary() {
        let simulation_box = SimulationBox::cubic(10.0).unwrap();
        let ids = with_context(&sample(), &simulation_box, |c| {
            neighborhood(c, &Point3::new(0.0, 5.0, 5.0), 1.1)
        })
        .unwrap();
        assert_eq!(ids, vec![0, 1, 3]);
    }

    #[test]
    fn neighborhood_matches_brute_force() {
        let simulation_box = SimulationBox::new(10.0, 12.0, 8.0).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let snapshot: ParticleSnapshot = (0..300)
            .map(|i| {
                Particle::new(
                    i,
                    0,
                    Point3::new(
                        rng.random_range(-10.0..20.0),
                        rng.random_range(0.0..12.0),
                        rng.random_range(0.0..8.0),
                    ),
                )
            })
            .collect();
        let point = Point3::new(9.7, 0.2, 7.9);

        for radius in [0.5, 2.0, 3.5] {
            let ids = with_context(&snapshot, &simulation_box, |c| {
                neighborhood(c, &point, radius)
            })
            .unwrap();
            let expected: Vec<usize> = snapshot
                .iter()
                .filter(|p| distance(&point, &p.position, &simulation_box) < radius)
                .map(|p| p.identity)
                .collect();
            assert_eq!(ids, expected, "radius {radius}");
        }
    }

    #[test]
    fn neighborhood_handles_many_coincident_particles() {
        let simulation_box = SimulationBox::cubic(10.0).unwrap();
        let snapshot: ParticleSnapshot = (0..200)
            .map(|i| {
                let z = (i % 2) as f64 + if i % 4 >= 2 { 10.0 } else { 0.0 };
                Particle::new(i, 0, Point3::new(1.0, 1.0, z))
            })
            .collect();

        let ids = with_context(&snapshot, &simulation_box, |c| {
            neighborhood(c, &Point3::new(1.0, 1.0, 1.0), 0.6)
        })
        .unwrap();

        let expected: Vec<usize> = (0..200).filter(|i| i % 2 == 1).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn neighborhood_rejects_negative_radius() {
        let simulation_box = SimulationBox::cubic(10.0).unwrap();
        assert!(matches!(
            with_context(&sample(), &simulation_box, |c| {
                neighborhood(c, &Point3::origin(), -1.0)
            }),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn distance_to_skips_excluded_particle() {
        let simulation_box = SimulationBox::cubic(10.0).unwrap();
        let snapshot = sample();
        let point = Point3::new(0.5, 5.0, 5.0);

        let including = with_context(&snapshot, &simulation_box, |c| {
            distance_to(c, &point, None)
        })
        .unwrap();
        let excluding = with_context(&snapshot, &simulation_box, |c| {
            distance_to(c, &point, Some(0))
        })
        .unwrap();

        assert!(f64_approx_equal(including, 0.0));
        assert!(f64_approx_equal(excluding, 0.5));
    }

    #[test]
    fn distance_to_requires_particles() {
        let simulation_box = SimulationBox::cubic(10.0).unwrap();
        assert!(matches!(
            with_context(&ParticleSnapshot::new(), &simulation_box, |c| {
                distance_to(c, &Point3::origin(), None)
            }),
            Err(EngineError::Precondition(_))
        ));
    }

    #[test]
    fn folded_positions_lie_in_primary_box() {
        let simulation_box = SimulationBox::cubic(10.0).unwrap();
        let folded = with_context(&sample(), &simulation_box, folded_positions);
        assert_eq!(folded[3].0, 3);
        assert!(f64_approx_equal(folded[3].1.x, 1.0));
    }
}
