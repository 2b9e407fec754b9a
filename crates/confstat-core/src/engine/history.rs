//! In-memory store of past particle configurations.
//!
//! The history keeps position-only copies of the live particle store. Every
//! frame holds exactly [`ConfigurationHistory::n_part_conf`] positions indexed by
//! particle identity. Each mutating operation validates the live store first and
//! only then touches the history, so a failed call leaves it unchanged.

use crate::core::models::snapshot::{ParticleStore, StoreError};
use nalgebra::Point3;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq, Clone)]
pub enum HistoryError {
    #[error("No particles in the live store")]
    NoParticles,

    #[error(
        "Particle count changed: stored configurations have {expected} particles, got {found}"
    )]
    LengthMismatch { expected: usize, found: usize },

    #[error("Live store rejected the operation: {0}")]
    Store(#[from] StoreError),

    #[error("No configurations stored")]
    EmptyHistory,

    #[error("Configuration index {index} is out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Positions of every particle at one instant, indexed by identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    positions: Vec<Point3<f64>>,
}

impl Frame {
    pub fn new(positions: Vec<Point3<f64>>) -> Self {
        Self { positions }
    }

    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Outcome of [`ConfigurationHistory::activate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    /// The history was empty, so the live configuration was stored instead.
    Appended,
    /// The stored positions were written back into the live store.
    Restored(ActivationReport),
}

/// Per-particle result of writing a frame back into the live store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivationReport {
    pub written: usize,
    pub failures: Vec<StoreError>,
}

impl ActivationReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationHistory {
    frames: VecDeque<Frame>,
    n_part_conf: usize,
}

impl ConfigurationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of particles in every stored frame; 0 while the history is empty.
    #[inline]
    pub fn n_part_conf(&self) -> usize {
        self.n_part_conf
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Frames from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    /// The `n` most recent frames, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Frame> {
        self.frames.iter().rev().take(n)
    }

    /// Appends a copy of the live configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NoParticles`] for an empty store,
    /// [`HistoryError::LengthMismatch`] if the particle count differs from the stored
    /// frames and [`HistoryError::Store`] if the identities are not `0..n`.
    pub fn append<S: ParticleStore>(&mut self, store: &mut S) -> Result<(), HistoryError> {
        let frame = self.capture(store)?;
        self.push(frame);
        Ok(())
    }

    /// Appends the live configuration while keeping at most `target` frames.
    ///
    /// With a target, the oldest frame is dropped first once the history holds
    /// `target` or more frames, and afterwards the front is trimmed until no more
    /// than `target` remain. Without a target the history is rotated: oldest out,
    /// newest in (a plain append while empty).
    pub fn maintain_window<S: ParticleStore>(
        &mut self,
        target: Option<usize>,
        store: &mut S,
    ) -> Result<(), HistoryError> {
        let frame = self.capture(store)?;
        match target {
            Some(target) => {
                if !self.frames.is_empty() && self.frames.len() >= target {
                    self.frames.pop_front();
                }
                self.push(frame);
                while self.frames.len() > target {
                    self.frames.pop_front();
                }
            }
            None => {
                self.frames.pop_front();
                self.push(frame);
            }
        }
        if self.frames.is_empty() {
            self.n_part_conf = 0;
        }
        debug!(len = self.frames.len(), ?target, "Maintained configuration window.");
        Ok(())
    }

    /// Overwrites frame `index` with the live configuration.
    ///
    /// On an empty history, index 0 appends instead.
    pub fn replace<S: ParticleStore>(
        &mut self,
        index: usize,
        store: &mut S,
    ) -> Result<(), HistoryError> {
        if self.frames.is_empty() && index == 0 {
            return self.append(store);
        }
        self.check_index(index)?;
        let frame = self.capture(store)?;
        self.frames[index] = frame;
        Ok(())
    }

    /// Removes frame `index`, or every frame for `None`.
    ///
    /// The live store is not consulted.
    pub fn remove(&mut self, index: Option<usize>) -> Result<(), HistoryError> {
        match index {
            Some(index) => {
                self.check_index(index)?;
                self.frames.remove(index);
            }
            None => {
                if self.frames.is_empty() {
                    return Err(HistoryError::EmptyHistory);
                }
                self.frames.clear();
            }
        }
        if self.frames.is_empty() {
            self.n_part_conf = 0;
        }
        Ok(())
    }

    /// Writes frame `index` back into the live store.
    ///
    /// On an empty history, index 0 stores the live configuration instead. Write
    /// failures of single particles are collected in the report and do not stop the
    /// remaining writes.
    pub fn activate<S: ParticleStore>(
        &mut self,
        index: usize,
        store: &mut S,
    ) -> Result<Activation, HistoryError> {
        if self.frames.is_empty() && index == 0 {
            self.append(store)?;
            return Ok(Activation::Appended);
        }
        self.check_index(index)?;
        self.validate_store(store)?;

        let mut report = ActivationReport::default();
        for (identity, position) in self.frames[index].positions().iter().enumerate() {
            match store.place_particle(identity, *position) {
                Ok(()) => report.written += 1,
                Err(err) => {
                    warn!(identity, error = %err, "Failed to restore particle position.");
                    report.failures.push(err);
                }
            }
        }
        Ok(Activation::Restored(report))
    }

    /// Appends a frame supplied by the caller instead of the live store.
    ///
    /// The first submitted frame fixes the particle count; later ones must match it.
    pub fn submit(&mut self, positions: Vec<Point3<f64>>) -> Result<(), HistoryError> {
        if positions.is_empty() {
            return Err(HistoryError::NoParticles);
        }
        if !self.frames.is_empty() && positions.len() != self.n_part_conf {
            return Err(HistoryError::LengthMismatch {
                expected: self.n_part_conf,
                found: positions.len(),
            });
        }
        self.push(Frame::new(positions));
        Ok(())
    }

    fn push(&mut self, frame: Frame) {
        if self.frames.is_empty() {
            self.n_part_conf = frame.len();
        }
        self.frames.push_back(frame);
    }

    fn check_index(&self, index: usize) -> Result<(), HistoryError> {
        if self.frames.is_empty() {
            return Err(HistoryError::EmptyHistory);
        }
        if index >= self.frames.len() {
            return Err(HistoryError::IndexOutOfRange {
                index,
                len: self.frames.len(),
            });
        }
        Ok(())
    }

    fn validate_store<S: ParticleStore>(&self, store: &mut S) -> Result<(), HistoryError> {
        let found = store.snapshot().len();
        if found == 0 {
            return Err(HistoryError::NoParticles);
        }
        if !self.frames.is_empty() && found != self.n_part_conf {
            return Err(HistoryError::LengthMismatch {
                expected: self.n_part_conf,
                found,
            });
        }
        store.sort_by_identity()?;
        Ok(())
    }

    fn capture<S: ParticleStore>(&self, store: &mut S) -> Result<Frame, HistoryError> {
        self.validate_store(store)?;
        Ok(Frame::new(store.snapshot().positions()))
    }
}
