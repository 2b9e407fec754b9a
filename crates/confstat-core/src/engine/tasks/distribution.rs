use crate::core::models::particle::ParticleType;
use crate::core::utils::geometry::squared_distance;
use crate::engine::config::{Binning, Spacing};
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use tracing::{debug, info, instrument};

/// Histogram of nearest-neighbour distances.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceDistribution {
    /// Bin centres.
    pub centers: Vec<f64>,
    /// Fraction of reference particles per bin (running sum when cumulative).
    pub values: Vec<f64>,
    /// Fraction of reference particles whose nearest neighbour is closer than `r_min`.
    pub below_range: f64,
}

/// Distribution of the distance from each `types1` particle to its nearest `types2` particle.
///
/// Distances in `[r_min, r_max]` are binned (a distance landing exactly on the
/// upper edge is dropped), distances below `r_min` are counted in
/// [`DistanceDistribution::below_range`]. All counts are divided by the number of
/// `types1` particles. With `cumulative` the result is integrated: the
/// below-range fraction is added to the first bin and each bin then holds the
/// running sum.
///
/// # Errors
///
/// Returns [`EngineError::Domain`] for logarithmic bins starting at 0 and
/// [`EngineError::Precondition`] if no particle has a type in `types1`.
#[instrument(skip_all, name = "distance_distribution_task")]
pub fn run(
    context: &AnalysisContext,
    types1: &[ParticleType],
    types2: &[ParticleType],
    binning: &Binning,
    cumulative: bool,
) -> Result<DistanceDistribution, EngineError> {
    if binning.spacing() == Spacing::Logarithmic && binning.r_min() == 0.0 {
        return Err(EngineError::Domain(
            "logarithmic binning needs r_min > 0".to_string(),
        ));
    }

    let particles = context.snapshot.particles();
    let start_d2 = context.simulation_box.perimeter_sum().powi(2);
    let mut values = vec![0.0; binning.bins()];
    let mut below_range = 0.0;
    let mut count = 0usize;

    for (i, pi) in context.select(Some(types1)) {
        let min_d2 = particles
            .iter()
            .enumerate()
            .filter(|&(j, pj)| j != i && pj.matches(Some(types2)))
            .map(|(_, pj)| squared_distance(&pi.position, &pj.position, context.simulation_box))
            .fold(start_d2, f64::min);
        let min_dist = min_d2.sqrt();

        if min_dist <= binning.r_max() {
            if min_dist >= binning.r_min() {
                if let Some(index) = binning.index_of(min_dist) {
                    values[index] += 1.0;
                }
            } else {
                below_range += 1.0;
            }
        }
        count += 1;
    }

    if count == 0 {
        return Err(EngineError::Precondition(format!(
            "no particles of types {types1:?}"
        )));
    }
    debug!(reference_particles = count, "Collected nearest-neighbour distances.");

    let norm = count as f64;
    below_range /= norm;
    values.iter_mut().for_each(|v| *v /= norm);

    if cumulative {
        values[0] += below_range;
        for i in 1..values.len() {
            values[i] += values[i - 1];
        }
    }

    info!(bins = values.len(), cumulative, "Distance distribution computed.");
    Ok(DistanceDistribution {
        centers: binning.centers(),
        values,
        below_range,
    })
}
