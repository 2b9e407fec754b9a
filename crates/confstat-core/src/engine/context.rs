use super::progress::ProgressReporter;
use crate::core::models::particle::{Particle, ParticleType};
use crate::core::models::simulation_box::SimulationBox;
use crate::core::models::snapshot::ParticleSnapshot;

/// Everything a single analysis call reads: the live particles, the box and
/// where to send progress events.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub snapshot: &'a ParticleSnapshot,
    pub simulation_box: &'a SimulationBox,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        snapshot: &'a ParticleSnapshot,
        simulation_box: &'a SimulationBox,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            snapshot,
            simulation_box,
            reporter,
        }
    }

    /// Storage indices and particles whose type passes `types` (`None` accepts all).
    pub fn select<'t>(
        self,
        types: Option<&'t [ParticleType]>,
    ) -> impl Iterator<Item = (usize, &'a Particle)> + 't
    where
        'a: 't,
    {
        self.snapshot
            .particles()
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.matches(types))
    }
}
