//! # confstat Core Library
//!
//! Structural observables for snapshots of periodic many-particle simulations:
//! pairwise distance statistics, radial distribution functions, molecular
//! aggregation, geometric moments, static structure factors and the
//! Poisson-Boltzmann cell-model solver.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout so that each concern can be tested on its own.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`ParticleSnapshot`, `SimulationBox`),
//!   periodic geometry, the closed-form eigen solver, the cell-model root finder and frame I/O.
//!
//! - **[`engine`]: The Logic Core.** The stateful pieces (`ConfigurationHistory`), the spatial
//!   neighbor index used by aggregation, validated parameter objects and one task module per
//!   observable.
//!
//! - **[`workflows`]: The Public API.** Thin entry points that validate parameters, build an
//!   analysis context and dispatch to the engine tasks.

pub mod core;
pub mod engine;
pub mod workflows;
