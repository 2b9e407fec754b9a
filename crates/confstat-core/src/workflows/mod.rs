//! # Workflows Module
//!
//! The user-facing layer of confstat. Each entry point takes the particles, the
//! box and a progress reporter, resolves unset parameters from the system and
//! runs the matching analysis task.
//!
//! ## Overview
//!
//! Callers usually hold a [`ParticleSnapshot`](crate::core::models::snapshot::ParticleSnapshot)
//! (read from a frame file or filled by a simulation) and a
//! [`SimulationBox`](crate::core::models::simulation_box::SimulationBox). An
//! [`analyze::Analyzer`] bundles both and answers one observable per method call.
//! The stateful pieces, the configuration history and the volume-fluctuation
//! accumulator, are owned by the caller and passed in where needed.
//!
//! ## Key Capabilities
//!
//! - **Distance statistics**: minimum distance between particle sets and the
//!   nearest-neighbour distance distribution
//! - **Radial distribution functions**: instantaneous and averaged over stored
//!   configurations, optionally restricted to intermolecular pairs
//! - **Aggregation**: molecular clusters from a linked-cell grid or a caller-supplied index
//! - **Moments**: center of mass, inertia tensor and principal axes
//! - **Structure factor**: spherically averaged `S(q)` per reciprocal shell
//! - **Cell model**: solution of the Poisson-Boltzmann cell-model boundary condition

pub mod analyze;
