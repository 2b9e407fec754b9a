use nalgebra::Point3;

/// Numeric particle type as used by type filters.
pub type ParticleType = i32;

/// A single particle of a simulation snapshot.
///
/// Positions are stored exactly as the simulation reports them. They may lie
/// outside the primary box; every distance computed by this crate applies the
/// minimum-image convention, so folding is never required for correctness.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Unique particle identity. Stored configurations require identities `0..n`.
    pub identity: usize,
    /// The particle type used by the type-list filters.
    pub particle_type: ParticleType,
    /// The molecule this particle belongs to.
    pub mol_id: usize,
    /// The particle mass, used by the geometric moments.
    pub mass: f64,
    /// The position in simulation length units.
    pub position: Point3<f64>,
}

impl Particle {
    /// Creates a particle of unit mass that belongs to molecule 0.
    ///
    /// # Arguments
    ///
    /// * `identity` - The particle identity.
    /// * `particle_type` - The particle type.
    /// * `position` - The particle position.
    pub fn new(identity: usize, particle_type: ParticleType, position: Point3<f64>) -> Self {
        Self {
            identity,
            particle_type,
            mol_id: 0,
            mass: 1.0,
            position,
        }
    }

    /// Returns the particle with its molecule id replaced.
    pub fn with_mol_id(mut self, mol_id: usize) -> Self {
        self.mol_id = mol_id;
        self
    }

    /// Returns the particle with its mass replaced.
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Returns `true` if the particle type is listed in `types`.
    ///
    /// A missing filter (`None`) accepts every particle.
    #[inline]
    pub fn matches(&self, types: Option<&[ParticleType]>) -> bool {
        types.is_none_or(|list| list.contains(&self.particle_type))
    }
}
