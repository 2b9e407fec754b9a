//! # Core Module
//!
//! Stateless building blocks shared by every analysis.
//!
//! - **Particle data** ([`models`]) - particles, snapshots, the simulation box and the
//!   [`models::snapshot::ParticleStore`] interface to the live particle source
//! - **Geometry** ([`utils`]) - minimum-image distances, position folding and the
//!   closed-form eigen decomposition of symmetric 3x3 matrices
//! - **Cell model** ([`cell_model`]) - the Poisson-Boltzmann cell-model equation solver
//! - **File I/O** ([`io`]) - reading and writing particle frames
//!
//! Nothing in this module keeps state between calls.

pub mod cell_model;
pub mod io;
pub mod models;
pub mod utils;
