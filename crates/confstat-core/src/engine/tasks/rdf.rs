//! Radial distribution functions.
//!
//! Two type lists are "mixed" unless they are literally identical, element by
//! element and in the same order. Identical lists count each unordered pair once
//! (`j > i`); mixed lists count every ordered pair, including a particle paired
//! with itself when it appears in both lists. Every counted pair enters the
//! normalisation, binned or not.

use crate::core::models::particle::ParticleType;
use crate::core::utils::geometry::distance;
use crate::engine::config::{Binning, Spacing};
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use crate::engine::history::ConfigurationHistory;
use crate::engine::progress::Progress;
use nalgebra::Point3;
use std::f64::consts::PI;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct RadialDistribution {
    pub centers: Vec<f64>,
    pub values: Vec<f64>,
}

/// Whether two type lists are treated as different species.
#[inline]
pub fn is_mixed(types1: &[ParticleType], types2: &[ParticleType]) -> bool {
    types1 != types2
}

#[derive(Debug, Clone, Copy)]
struct PairFilter {
    mixed: bool,
    intermolecular: bool,
}

/// Instantaneous radial distribution function of the live snapshot.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] for logarithmic bins and
/// [`EngineError::Precondition`] if no pair qualifies.
#[instrument(skip_all, name = "rdf_task")]
pub fn run(
    context: &AnalysisContext,
    types1: &[ParticleType],
    types2: &[ParticleType],
    binning: &Binning,
) -> Result<RadialDistribution, EngineError> {
    require_linear(binning)?;
    let filter = PairFilter {
        mixed: is_mixed(types1, types2),
        intermolecular: false,
    };
    let particles = context.snapshot.particles();
    let values = frame_rdf(context, types1, types2, binning, filter, |i| {
        particles[i].position
    })?;

    info!(mixed = filter.mixed, "Radial distribution function computed.");
    Ok(RadialDistribution {
        centers: binning.centers(),
        values,
    })
}

/// Radial distribution function averaged over the `n_conf` most recent stored frames.
///
/// Particle types (and molecule ids) come from the live snapshot, positions
/// from the stored frames. Each frame is normalised on its own and the results
/// are averaged arithmetically. With `intermolecular`, pairs within one molecule
/// are skipped entirely. `n_conf = None` averages over every stored frame.
///
/// # Errors
///
/// Returns [`EngineError::Precondition`] for an empty history, a live particle
/// count that differs from the stored frames, or a frame without qualifying
/// pairs; [`EngineError::Validation`] for logarithmic bins or an `n_conf` outside
/// `1..=len`.
#[instrument(skip_all, name = "rdf_average_task")]
pub fn run_average(
    context: &AnalysisContext,
    history: &ConfigurationHistory,
    types1: &[ParticleType],
    types2: &[ParticleType],
    binning: &Binning,
    n_conf: Option<usize>,
    intermolecular: bool,
) -> Result<RadialDistribution, EngineError> {
    require_linear(binning)?;
    if history.is_empty() {
        return Err(EngineError::Precondition(
            "no configurations stored; append some first or use the instantaneous rdf".to_string(),
        ));
    }
    let n_conf = n_conf.unwrap_or(history.len());
    if n_conf == 0 || n_conf > history.len() {
        return Err(EngineError::Validation(format!(
            "n_conf must lie in 1..={} (got {n_conf})",
            history.len()
        )));
    }

    let particles = context.snapshot.particles();
    if particles.len() != history.n_part_conf() {
        return Err(EngineError::Precondition(format!(
            "stored frames have {} particles but the live store has {}",
            history.n_part_conf(),
            particles.len()
        )));
    }
    if let Some(p) = particles.iter().find(|p| p.identity >= history.n_part_conf()) {
        return Err(EngineError::Precondition(format!(
            "particle identity {} has no stored position",
            p.identity
        )));
    }

    let filter = PairFilter {
        mixed: is_mixed(types1, types2),
        intermolecular,
    };

    context.reporter.report(Progress::TaskStart {
        total_steps: n_conf as u64,
    });
    let mut values = vec![0.0; binning.bins()];
    for (frame_number, frame) in history.recent(n_conf).enumerate() {
        let positions = frame.positions();
        let frame_values = frame_rdf(context, types1, types2, binning, filter, |i| {
            positions[particles[i].identity]
        })?;
        for (total, value) in values.iter_mut().zip(frame_values) {
            *total += value;
        }
        debug!(frame = frame_number, "Accumulated frame.");
        context.reporter.report(Progress::TaskIncrement);
    }
    context.reporter.report(Progress::TaskFinish);

    values.iter_mut().for_each(|v| *v /= n_conf as f64);

    info!(
        n_conf,
        intermolecular, "Averaged radial distribution function computed."
    );
    Ok(RadialDistribution {
        centers: binning.centers(),
        values,
    })
}

fn require_linear(binning: &Binning) -> Result<(), EngineError> {
    match binning.spacing() {
        Spacing::Linear => Ok(()),
        Spacing::Logarithmic => Err(EngineError::Validation(
            "the radial distribution function supports linear bins only".to_string(),
        )),
    }
}

fn frame_rdf<F>(
    context: &AnalysisContext,
    types1: &[ParticleType],
    types2: &[ParticleType],
    binning: &Binning,
    filter: PairFilter,
    position_of: F,
) -> Result<Vec<f64>, EngineError>
where
    F: Fn(usize) -> Point3<f64>,
{
    let particles = context.snapshot.particles();
    let second: Vec<usize> = context.select(Some(types2)).map(|(j, _)| j).collect();
    let (r_min, r_max) = (binning.r_min(), binning.r_max());
    let width = binning.width();

    let mut histogram = vec![0.0; binning.bins()];
    let mut pairs = 0u64;

    for (i, pi) in context.select(Some(types1)) {
        let start = if filter.mixed { 0 } else { i + 1 };
        let from = second.partition_point(|&j| j < start);
        let position_i = position_of(i);

        for &j in &second[from..] {
            if filter.intermolecular && pi.mol_id == particles[j].mol_id {
                continue;
            }
            let d = distance(&position_i, &position_of(j), context.simulation_box);
            if d > r_min && d < r_max {
                let index = ((d - r_min) / width) as usize;
                if let Some(bin) = histogram.get_mut(index) {
                    *bin += 1.0;
                }
            }
            pairs += 1;
        }
    }

    if pairs == 0 {
        return Err(EngineError::Precondition(format!(
            "no particle pairs between types {types1:?} and {types2:?}"
        )));
    }

    let volume = context.simulation_box.volume();
    for (index, bin) in histogram.iter_mut().enumerate() {
        let (r_in, r_out) = binning.edges(index);
        let shell_volume = 4.0 / 3.0 * PI * (r_out.powi(3) - r_in.powi(3));
        *bin *= volume / (shell_volume * pairs as f64);
    }
    Ok(histogram)
}
