//! # Core Models Module
//!
//! Data structures describing one instant of a periodic particle simulation.
//!
//! ## Key Components
//!
//! - [`particle`] - a single particle record (identity, type, molecule, mass, position)
//! - [`snapshot`] - an ordered particle collection and the live-store interface
//! - [`simulation_box`] - the periodic box lengths
//!
//! ## Usage
//!
//! ```ignore
//! use confstat::core::models::{particle::Particle, snapshot::ParticleSnapshot};
//!
//! let snapshot = ParticleSnapshot::from_particles(vec![
//!     Particle::new(0, 0, Point3::new(0.0, 0.0, 0.0)),
//!     Particle::new(1, 0, Point3::new(9.0, 0.0, 0.0)),
//! ]);
//! ```

pub mod particle;
pub mod simulation_box;
pub mod snapshot;
