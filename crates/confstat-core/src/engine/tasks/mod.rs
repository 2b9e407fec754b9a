//! Analysis tasks.
//!
//! Each submodule computes one family of observables from an
//! [`AnalysisContext`](crate::engine::context::AnalysisContext): pairwise
//! distance statistics, radial distribution functions, aggregation, geometric
//! moments, the static structure factor and neighborhood queries. Tasks never
//! modify the particles they read.

pub mod aggregation;
pub mod distribution;
pub mod mindist;
pub mod moments;
pub mod neighborhood;
pub mod rdf;
pub mod structure_factor;
pub mod volume;
