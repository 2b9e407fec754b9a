use crate::core::models::particle::ParticleType;
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use itertools::iproduct;
use nalgebra::Point3;
use std::f64::consts::PI;
use tracing::{info, instrument};

/// Spherically averaged structure factor on one shell `|n|² = shell` of the reciprocal lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureFactorShell {
    pub shell: usize,
    pub q: f64,
    pub value: f64,
}

/// Static structure factor of the particles of `particle_type` by direct summation.
///
/// Wave vectors are `q = 2π/Lx · (i, j, k)` with `i ≥ 0`, `|j|, |k| ≤ order` and
/// `0 < i² + j² + k² ≤ order²`; the x edge of the box sets the lattice spacing
/// for all three axes. Shells without any wave vector are omitted.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] for `order < 1` and [`EngineError::Domain`]
/// if the type does not exist or has no particles.
#[instrument(skip_all, name = "structure_factor_task")]
pub fn run(
    context: &AnalysisContext,
    particle_type: ParticleType,
    order: usize,
) -> Result<Vec<StructureFactorShell>, EngineError> {
    if order < 1 {
        return Err(EngineError::Validation(
            "order has to be a positive whole number".to_string(),
        ));
    }
    let n_types = context.snapshot.n_particle_types();
    if usize::try_from(particle_type).map_or(true, |t| t >= n_types) {
        return Err(EngineError::Domain(format!(
            "type {particle_type} does not exist"
        )));
    }
    let positions: Vec<Point3<f64>> = context
        .snapshot
        .iter()
        .filter(|p| p.particle_type == particle_type)
        .map(|p| p.position)
        .collect();
    if positions.is_empty() {
        return Err(EngineError::Domain(format!(
            "no particles of type {particle_type}"
        )));
    }

    let order2 = order * order;
    let two_pi_over_l = 2.0 * PI / context.simulation_box.lengths().x;
    let mut sums = vec![0.0; order2 + 1];
    let mut vectors = vec![0usize; order2 + 1];
    let signed_order = order as i64;

    context.reporter.report(Progress::TaskStart {
        total_steps: order as u64 + 1,
    });
    for i in 0..=signed_order {
        for (j, k) in iproduct!(-signed_order..=signed_order, -signed_order..=signed_order) {
            let n = (i * i + j * j + k * k) as usize;
            if n == 0 || n > order2 {
                continue;
            }
            let (c, s) = positions.iter().fold((0.0, 0.0), |(c, s), r| {
                let qr = two_pi_over_l * (i as f64 * r.x + j as f64 * r.y + k as f64 * r.z);
                (c + qr.cos(), s + qr.sin())
            });
            sums[n] += c * c + s * s;
            vectors[n] += 1;
        }
        context.reporter.report(Progress::TaskIncrement);
    }
    context.reporter.report(Progress::TaskFinish);

    let count = positions.len() as f64;
    let shells: Vec<StructureFactorShell> = (1..=order2)
        .filter(|&n| vectors[n] > 0)
        .map(|n| StructureFactorShell {
            shell: n,
            q: two_pi_over_l * (n as f64).sqrt(),
            value: sums[n] / (count * vectors[n] as f64),
        })
        .collect();

    info!(
        particle_type,
        order,
        shells = shells.len(),
        "Structure factor computed."
    );
    Ok(shells)
}
