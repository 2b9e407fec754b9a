//! # Engine Module
//!
//! The algorithmic layer of confstat. It owns the stateful pieces (the
//! configuration history and the neighbor index) and the analysis tasks that
//! turn a particle snapshot into observables.
//!
//! - **Configuration** ([`config`]) - Binning, aggregation and solver parameters with builders
//! - **History** ([`history`]) - In-memory store of past configurations
//! - **Neighbor search** ([`neighbors`]) - Candidate pair suppliers for clustering
//! - **Progress Monitoring** ([`progress`]) - Progress reporting for long loops
//! - **Error Handling** ([`error`]) - Engine-specific error types and their classification

pub mod config;
pub mod context;
pub mod error;
pub mod history;
pub mod neighbors;
pub mod progress;
pub mod tasks;
