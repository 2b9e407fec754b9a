use crate::core::models::particle::ParticleType;
use crate::core::utils::geometry::squared_distance;
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use tracing::{info, instrument};

/// Smallest minimum-image distance between a particle of `set1` and one of `set2`.
///
/// A missing set matches every type. Pairs are unordered, so swapping the sets
/// gives the same result. If no pair qualifies the result is `Lx + Ly + Lz`.
///
/// # Errors
///
/// Returns [`EngineError::Precondition`] if the snapshot holds fewer than two particles.
#[instrument(skip_all, name = "mindist_task")]
pub fn run(
    context: &AnalysisContext,
    set1: Option<&[ParticleType]>,
    set2: Option<&[ParticleType]>,
) -> Result<f64, EngineError> {
    let particles = context.snapshot.particles();
    if particles.len() < 2 {
        return Err(EngineError::Precondition(format!(
            "mindist needs at least two particles (got {})",
            particles.len()
        )));
    }

    let mut min_d2 = context.simulation_box.perimeter_sum().powi(2);
    for (j, pj) in particles.iter().enumerate() {
        let in_first = pj.matches(set1);
        let in_second = pj.matches(set2);
        if !in_first && !in_second {
            continue;
        }
        for pi in &particles[j + 1..] {
            if (in_first && pi.matches(set2)) || (in_second && pi.matches(set1)) {
                min_d2 = min_d2.min(squared_distance(
                    &pj.position,
                    &pi.position,
                    context.simulation_box,
                ));
            }
        }
    }

    let result = min_d2.sqrt();
    info!(mindist = result, "Minimum distance computed.");
    Ok(result)
}
