use crate::core::cell_model::{CellModelSolution, solve_cell_gpb};
use crate::core::models::particle::ParticleType;
use crate::core::models::simulation_box::SimulationBox;
use crate::core::models::snapshot::ParticleSnapshot;
use crate::engine::config::{AggregationConfig, Binning, BinningBuilder, CellModelConfig};
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use crate::engine::history::ConfigurationHistory;
use crate::engine::neighbors::{CellGrid, NeighborIndex};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::aggregation::AggregationResult;
use crate::engine::tasks::distribution::DistanceDistribution;
use crate::engine::tasks::moments::PrincipalAxis;
use crate::engine::tasks::rdf::RadialDistribution;
use crate::engine::tasks::structure_factor::StructureFactorShell;
use crate::engine::tasks::{
    aggregation, distribution, mindist, moments, neighborhood, rdf, structure_factor,
};
use nalgebra::{Matrix3, Point3};
use tracing::{debug, info, instrument};

/// Upper bound on linked cells per box edge when the grid is sized from the contact distance.
const MAX_CELLS_PER_AXIS: f64 = 32.0;

/// Entry point for every observable of one particle configuration.
#[derive(Clone, Copy)]
pub struct Analyzer<'a> {
    context: AnalysisContext<'a>,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        snapshot: &'a ParticleSnapshot,
        simulation_box: &'a SimulationBox,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            context: AnalysisContext::new(snapshot, simulation_box, reporter),
        }
    }

    pub fn context(&self) -> &AnalysisContext<'a> {
        &self.context
    }

    /// Completes `binning` with the system defaults (`r_max = min(L)/2`, one bin per 20 particles).
    pub fn resolve_binning(&self, binning: BinningBuilder) -> Result<Binning, EngineError> {
        let binning =
            binning.build_for(self.context.simulation_box, self.context.snapshot.len())?;
        debug!(
            r_min = binning.r_min(),
            r_max = binning.r_max(),
            bins = binning.bins(),
            "Resolved binning."
        );
        Ok(binning)
    }

    /// Minimum distance between particles of `set1` and `set2` (`None` matches every type).
    pub fn mindist(
        &self,
        set1: Option<&[ParticleType]>,
        set2: Option<&[ParticleType]>,
    ) -> Result<f64, EngineError> {
        mindist::run(&self.context, set1, set2)
    }

    pub fn distance_distribution(
        &self,
        types1: &[ParticleType],
        types2: &[ParticleType],
        binning: BinningBuilder,
        cumulative: bool,
    ) -> Result<DistanceDistribution, EngineError> {
        let binning = self.resolve_binning(binning)?;
        distribution::run(&self.context, types1, types2, &binning, cumulative)
    }

    /// Radial distribution function of the live configuration.
    pub fn rdf(
        &self,
        types1: &[ParticleType],
        types2: &[ParticleType],
        binning: BinningBuilder,
    ) -> Result<RadialDistribution, EngineError> {
        let binning = self.resolve_binning(binning)?;
        rdf::run(&self.context, types1, types2, &binning)
    }

    /// Radial distribution function averaged over the `n_conf` newest stored configurations.
    pub fn rdf_average(
        &self,
        history: &ConfigurationHistory,
        types1: &[ParticleType],
        types2: &[ParticleType],
        binning: BinningBuilder,
        n_conf: Option<usize>,
    ) -> Result<RadialDistribution, EngineError> {
        let binning = self.resolve_binning(binning)?;
        rdf::run_average(&self.context, history, types1, types2, &binning, n_conf, false)
    }

    /// Like [`Analyzer::rdf_average`], but pairs within one molecule are ignored.
    pub fn rdf_average_intermolecular(
        &self,
        history: &ConfigurationHistory,
        types1: &[ParticleType],
        types2: &[ParticleType],
        binning: BinningBuilder,
        n_conf: Option<usize>,
    ) -> Result<RadialDistribution, EngineError> {
        let binning = self.resolve_binning(binning)?;
        rdf::run_average(&self.context, history, types1, types2, &binning, n_conf, true)
    }

    /// Aggregates found with a linked-cell grid sized from the contact distance.
    #[instrument(skip_all, name = "aggregation_workflow")]
    pub fn aggregation(
        &self,
        config: &AggregationConfig,
    ) -> Result<AggregationResult, EngineError> {
        let simulation_box = self.context.simulation_box;
        let cutoff = config
            .distance_criteria
            .max(simulation_box.min_length() / MAX_CELLS_PER_AXIS);
        self.context.reporter.report(Progress::PhaseStart {
            name: "Neighbor Grid",
        });
        let grid = CellGrid::build(self.context.snapshot, simulation_box, cutoff)?;
        self.context.reporter.report(Progress::PhaseFinish);

        let result = aggregation::run(&self.context, &grid, config)?;
        info!(
            aggregates = result.count(),
            dims = ?grid.dims(),
            "Aggregation workflow complete."
        );
        Ok(result)
    }

    /// Aggregates found with a neighbor index maintained by the caller.
    pub fn aggregation_with<I: NeighborIndex + ?Sized>(
        &self,
        index: &I,
        config: &AggregationConfig,
    ) -> Result<AggregationResult, EngineError> {
        aggregation::run(&self.context, index, config)
    }

    pub fn center_of_mass(&self, particle_type: ParticleType) -> Result<Point3<f64>, EngineError> {
        moments::center_of_mass(&self.context, particle_type)
    }

    pub fn inertia_tensor(&self, particle_type: ParticleType) -> Result<Matrix3<f64>, EngineError> {
        moments::inertia_tensor(&self.context, particle_type)
    }

    pub fn principal_axes(
        &self,
        particle_type: ParticleType,
    ) -> Result<[PrincipalAxis; 3], EngineError> {
        moments::principal_axes(&self.context, particle_type)
    }

    pub fn structure_factor(
        &self,
        particle_type: ParticleType,
        order: usize,
    ) -> Result<Vec<StructureFactorShell>, EngineError> {
        structure_factor::run(&self.context, particle_type, order)
    }

    pub fn neighborhood(&self, point: &Point3<f64>, radius: f64) -> Result<Vec<usize>, EngineError> {
        neighborhood::neighborhood(&self.context, point, radius)
    }

    pub fn distance_to(
        &self,
        point: &Point3<f64>,
        exclude: Option<usize>,
    ) -> Result<f64, EngineError> {
        neighborhood::distance_to(&self.context, point, exclude)
    }

    pub fn folded_positions(&self) -> Vec<(usize, Point3<f64>)> {
        neighborhood::folded_positions(&self.context)
    }
}

/// Solves the cell-model boundary condition with the solver settings of `config`.
///
/// # Errors
///
/// Returns [`EngineError::CellModel`] for invalid inputs or a failed bisection.
#[instrument(skip_all, name = "cell_gpb_workflow")]
pub fn cell_gpb(
    xi_m: f64,
    rc: f64,
    ro: f64,
    config: &CellModelConfig,
) -> Result<CellModelSolution, EngineError> {
    let solution = solve_cell_gpb(xi_m, rc, ro, config.accuracy, config.max_iterations)?;
    info!(
        gamma = solution.gamma,
        manning_radius = solution.manning_radius,
        regime = ?solution.regime,
        iterations = solution.iterations,
        "Cell model solved."
    );
    Ok(solution)
}
