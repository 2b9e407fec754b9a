use super::particle::{Particle, ParticleType};
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum StoreError {
    #[error(
        "Particles must have consecutive identities starting at 0 (found identity {found} at position {expected})"
    )]
    NotContiguous { expected: usize, found: usize },

    #[error("Particle {0} does not exist")]
    UnknownParticle(usize),
}

/// Interface to the live particle source.
///
/// The live store is owned and mutated outside of this crate. Analyses only
/// read from it; the configuration history additionally asks it to sort itself
/// before copying positions and writes positions back when a stored frame is
/// activated.
pub trait ParticleStore {
    /// The current particle data, read-only.
    fn snapshot(&self) -> &ParticleSnapshot;

    /// Sorts the particles by identity and checks that identities run from 0 without gaps.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotContiguous`] if the identities have gaps or duplicates.
    fn sort_by_identity(&mut self) -> Result<(), StoreError>;

    /// Moves the particle with the given identity to `position`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownParticle`] if no particle has that identity.
    fn place_particle(&mut self, identity: usize, position: Point3<f64>) -> Result<(), StoreError>;
}

/// An ordered collection of particles captured at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleSnapshot {
    particles: Vec<Particle>,
}

impl ParticleSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_particles(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Positions in storage order.
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.particles.iter().map(|p| p.position).collect()
    }

    /// Number of particle types, defined as the largest type plus one.
    ///
    /// Returns 0 for an empty snapshot or if every type is negative.
    pub fn n_particle_types(&self) -> usize {
        self.particles
            .iter()
            .map(|p| p.particle_type)
            .max()
            .map_or(0, |t| usize::try_from(t + 1).unwrap_or(0))
    }

    /// Number of molecules, defined as the largest molecule id plus one.
    pub fn n_molecules(&self) -> usize {
        self.particles
            .iter()
            .map(|p| p.mol_id + 1)
            .max()
            .unwrap_or(0)
    }

    /// Number of particles of the given type.
    pub fn count_of_type(&self, particle_type: ParticleType) -> usize {
        self.particles
            .iter()
            .filter(|p| p.particle_type == particle_type)
            .count()
    }
}

impl ParticleStore for ParticleSnapshot {
    fn snapshot(&self) -> &ParticleSnapshot {
        self
    }

    fn sort_by_identity(&mut self) -> Result<(), StoreError> {
        self.particles.sort_by_key(|p| p.identity);
        match self
            .particles
            .iter()
            .enumerate()
            .find(|(expected, p)| p.identity != *expected)
        {
            Some((expected, p)) => Err(StoreError::NotContiguous {
                expected,
                found: p.identity,
            }),
            None => Ok(()),
        }
    }

    fn place_particle(&mut self, identity: usize, position: Point3<f64>) -> Result<(), StoreError> {
        let particle = self
            .particles
            .iter_mut()
            .find(|p| p.identity == identity)
            .ok_or(StoreError::UnknownParticle(identity))?;
        particle.position = position;
        Ok(())
    }
}

impl FromIterator<Particle> for ParticleSnapshot {
    fn from_iter<I: IntoIterator<Item = Particle>>(iter: I) -> Self {
        Self::from_particles(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(identity: usize, particle_type: ParticleType) -> Particle {
        Particle::new(identity, particle_type, Point3::new(identity as f64, 0.0, 0.0))
    }

    #[test]
    fn sort_by_identity_orders_contiguous_particles() {
        let mut snapshot: ParticleSnapshot =
            [particle(2, 0), particle(0, 0), particle(1, 1)].into_iter().collect();

        snapshot.sort_by_identity().unwrap();

        let ids: Vec<_> = snapshot.iter().map(|p| p.identity).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn sort_by_identity_rejects_gaps() {
        let mut snapshot: ParticleSnapshot =
            [particle(0, 0), particle(2, 0)].into_iter().collect();

        assert_eq!(
            snapshot.sort_by_identity(),
            Err(StoreError::NotContiguous {
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn sort_by_identity_rejects_duplicates() {
        let mut snapshot: ParticleSnapshot =
            [particle(0, 0), particle(0, 1)].into_iter().collect();
        assert!(snapshot.sort_by_identity().is_err());
    }

    #[test]
    fn place_particle_moves_by_identity() {
        let mut snapshot: ParticleSnapshot =
            [particle(1, 0), particle(0, 0)].into_iter().collect();

        snapshot
            .place_particle(0, Point3::new(5.0, 5.0, 5.0))
            .unwrap();

        assert_eq!(snapshot.particles()[1].position, Point3::new(5.0, 5.0, 5.0));
        assert_eq!(
            snapshot.place_particle(9, Point3::origin()),
            Err(StoreError::UnknownParticle(9))
        );
    }

    #[test]
    fn counts_types_and_molecules() {
        let snapshot: ParticleSnapshot = [
            particle(0, 0).with_mol_id(0),
            particle(1, 3).with_mol_id(4),
            particle(2, 3).with_mol_id(4),
        ]
        .into_iter()
        .collect();

        assert_eq!(snapshot.n_particle_types(), 4);
        assert_eq!(snapshot.n_molecules(), 5);
        assert_eq!(snapshot.count_of_type(3), 2);
        assert_eq!(ParticleSnapshot::new().n_particle_types(), 0);
    }
}
