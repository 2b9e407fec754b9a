//! Geometric moments of all particles of one type.
//!
//! Positions enter as stored. Molecules that straddle a periodic boundary are
//! not unwrapped, so the moments are only meaningful for compact groups that
//! do not cross the box edge.

use crate::core::models::particle::{Particle, ParticleType};
use crate::core::utils::eigen::symmetric_eigen;
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use nalgebra::{Matrix3, Point3, Vector3};
use tracing::{info, instrument};

/// One principal axis of inertia.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrincipalAxis {
    pub moment: f64,
    pub direction: Vector3<f64>,
}

fn of_type<'a>(
    context: &AnalysisContext<'a>,
    particle_type: ParticleType,
) -> Result<Vec<&'a Particle>, EngineError> {
    let particles: Vec<&Particle> = context
        .snapshot
        .iter()
        .filter(|p| p.particle_type == particle_type)
        .collect();
    if particles.is_empty() {
        return Err(EngineError::Domain(format!(
            "no particles of type {particle_type}"
        )));
    }
    Ok(particles)
}

fn mass_weighted_center(particles: &[&Particle]) -> Point3<f64> {
    let (weighted, total_mass) = particles.iter().fold(
        (Vector3::zeros(), 0.0),
        |(sum, mass): (Vector3<f64>, f64), p| (sum + p.position.coords * p.mass, mass + p.mass),
    );
    Point3::from(weighted / total_mass)
}

/// Mass-weighted mean position of the particles of `particle_type`.
///
/// # Errors
///
/// Returns [`EngineError::Domain`] if no particle has that type.
#[instrument(skip_all, name = "center_of_mass_task")]
pub fn center_of_mass(
    context: &AnalysisContext,
    particle_type: ParticleType,
) -> Result<Point3<f64>, EngineError> {
    let particles = of_type(context, particle_type)?;
    let center = mass_weighted_center(&particles);
    info!(particle_type, ?center, "Center of mass computed.");
    Ok(center)
}

/// Moment of inertia tensor of the particles of `particle_type` about their center of mass.
///
/// # Errors
///
/// Returns [`EngineError::Domain`] if no particle has that type.
#[instrument(skip_all, name = "inertia_tensor_task")]
pub fn inertia_tensor(
    context: &AnalysisContext,
    particle_type: ParticleType,
) -> Result<Matrix3<f64>, EngineError> {
    let particles = of_type(context, particle_type)?;
    let center = mass_weighted_center(&particles);

    let mut tensor = Matrix3::zeros();
    for p in &particles {
        let r = p.position - center;
        let m = p.mass;
        tensor[(0, 0)] += m * (r.y * r.y + r.z * r.z);
        tensor[(1, 1)] += m * (r.x * r.x + r.z * r.z);
        tensor[(2, 2)] += m * (r.x * r.x + r.y * r.y);
        tensor[(0, 1)] -= m * r.x * r.y;
        tensor[(0, 2)] -= m * r.x * r.z;
        tensor[(1, 2)] -= m * r.y * r.z;
    }
    tensor[(1, 0)] = tensor[(0, 1)];
    tensor[(2, 0)] = tensor[(0, 2)];
    tensor[(2, 1)] = tensor[(1, 2)];

    info!(particle_type, "Inertia tensor computed.");
    Ok(tensor)
}

/// Principal moments and axes of inertia, largest moment first.
#[instrument(skip_all, name = "principal_axes_task")]
pub fn principal_axes(
    context: &AnalysisContext,
    particle_type: ParticleType,
) -> Result<[PrincipalAxis; 3], EngineError> {
    let tensor = inertia_tensor(context, particle_type)?;
    let eigen = symmetric_eigen(&tensor);
    Ok([0, 1, 2].map(|i| PrincipalAxis {
        moment: eigen.values[i],
        direction: eigen.vectors[i],
    }))
}
