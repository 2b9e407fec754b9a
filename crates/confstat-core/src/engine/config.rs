use crate::core::cell_model::{DEFAULT_ACCURACY, DEFAULT_MAX_ITERATIONS};
use crate::core::models::simulation_box::SimulationBox;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{parameter}': {reason}")]
    Invalid {
        parameter: &'static str,
        reason: String,
    },
}

/// Bin spacing of a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Spacing {
    #[default]
    Linear,
    Logarithmic,
}

/// Histogram layout over the distance range `[r_min, r_max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binning {
    r_min: f64,
    r_max: f64,
    bins: usize,
    spacing: Spacing,
}

impl Binning {
    /// Creates a validated binning.
    ///
    /// Logarithmic spacing additionally needs `r_min > 0`; that is checked by the
    /// analyses that support it, since `r_min = 0` is a legal linear layout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `bins == 0`, `r_min < 0`, `r_max <= r_min`
    /// or either bound is not finite.
    pub fn new(r_min: f64, r_max: f64, bins: usize, spacing: Spacing) -> Result<Self, ConfigError> {
        if bins == 0 {
            return Err(ConfigError::Invalid {
                parameter: "bins",
                reason: "at least one bin is required".to_string(),
            });
        }
        if !(r_min.is_finite() && r_min >= 0.0) {
            return Err(ConfigError::Invalid {
                parameter: "r_min",
                reason: format!("must be finite and non-negative (got {r_min})"),
            });
        }
        if !(r_max.is_finite() && r_max > r_min) {
            return Err(ConfigError::Invalid {
                parameter: "r_max",
                reason: format!("must be finite and larger than r_min = {r_min} (got {r_max})"),
            });
        }
        Ok(Self {
            r_min,
            r_max,
            bins,
            spacing,
        })
    }

    pub fn linear(r_min: f64, r_max: f64, bins: usize) -> Result<Self, ConfigError> {
        Self::new(r_min, r_max, bins, Spacing::Linear)
    }

    pub fn logarithmic(r_min: f64, r_max: f64, bins: usize) -> Result<Self, ConfigError> {
        Self::new(r_min, r_max, bins, Spacing::Logarithmic)
    }

    #[inline]
    pub fn r_min(&self) -> f64 {
        self.r_min
    }

    #[inline]
    pub fn r_max(&self) -> f64 {
        self.r_max
    }

    #[inline]
    pub fn bins(&self) -> usize {
        self.bins
    }

    #[inline]
    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// Width of one linear bin.
    #[inline]
    pub fn width(&self) -> f64 {
        (self.r_max - self.r_min) / self.bins as f64
    }

    /// Ratio between consecutive logarithmic bin edges, `(r_max / r_min)^(1/bins)`.
    #[inline]
    pub fn log_factor(&self) -> f64 {
        (self.r_max / self.r_min).powf(1.0 / self.bins as f64)
    }

    /// Bin index of `r`, or `None` if `r` falls outside `[r_min, r_max)`.
    pub fn index_of(&self, r: f64) -> Option<usize> {
        if r < self.r_min || r > self.r_max {
            return None;
        }
        let position = match self.spacing {
            Spacing::Linear => (r - self.r_min) / self.width(),
            Spacing::Logarithmic => {
                (r / self.r_min).ln() * self.bins as f64 / (self.r_max / self.r_min).ln()
            }
        };
        let index = position.floor() as usize;
        (index < self.bins).then_some(index)
    }

    /// Bin centres: arithmetic midpoints for linear spacing, geometric ones for logarithmic.
    pub fn centers(&self) -> Vec<f64> {
        match self.spacing {
            Spacing::Linear => {
                let width = self.width();
                (0..self.bins)
                    .map(|i| self.r_min + width * (i as f64 + 0.5))
                    .collect()
            }
            Spacing::Logarithmic => {
                let factor = self.log_factor();
                (0..self.bins)
                    .map(|i| self.r_min * factor.powf(i as f64 + 0.5))
                    .collect()
            }
        }
    }

    /// Inner and outer radius of linear bin `index`.
    #[inline]
    pub fn edges(&self, index: usize) -> (f64, f64) {
        let width = self.width();
        let inner = self.r_min + width * index as f64;
        (inner, inner + width)
    }
}

#[derive(Default)]
pub struct BinningBuilder {
    r_min: Option<f64>,
    r_max: Option<f64>,
    bins: Option<usize>,
    spacing: Option<Spacing>,
}

impl BinningBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn r_min(mut self, r_min: f64) -> Self {
        self.r_min = Some(r_min);
        self
    }
    pub fn r_max(mut self, r_max: f64) -> Self {
        self.r_max = Some(r_max);
        self
    }
    pub fn bins(mut self, bins: usize) -> Self {
        self.bins = Some(bins);
        self
    }
    pub fn spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = Some(spacing);
        self
    }

    /// Builds the binning; `r_max` and `bins` are required, `r_min` defaults to 0.
    pub fn build(self) -> Result<Binning, ConfigError> {
        Binning::new(
            self.r_min.unwrap_or(0.0),
            self.r_max.ok_or(ConfigError::MissingParameter("r_max"))?,
            self.bins.ok_or(ConfigError::MissingParameter("bins"))?,
            self.spacing.unwrap_or_default(),
        )
    }

    /// Builds the binning, filling unset values from the system.
    ///
    /// `r_max` defaults to half the smallest box length and `bins` to one bin per
    /// twenty particles (at least one).
    pub fn build_for(
        self,
        simulation_box: &SimulationBox,
        n_particles: usize,
    ) -> Result<Binning, ConfigError> {
        Binning::new(
            self.r_min.unwrap_or(0.0),
            self.r_max.unwrap_or(simulation_box.min_length() / 2.0),
            self.bins.unwrap_or((n_particles / 20).max(1)),
            self.spacing.unwrap_or_default(),
        )
    }
}

/// Parameters of a molecular aggregation analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationConfig {
    /// Two molecules are in contact when any pair of their particles is closer than this.
    pub distance_criteria: f64,
    /// Contacts required before two molecules are merged into one aggregate.
    pub min_contact: u32,
    /// First molecule id taken into account (inclusive).
    pub first_molecule: usize,
    /// Last molecule id taken into account (inclusive).
    pub last_molecule: usize,
}

#[derive(Default)]
pub struct AggregationConfigBuilder {
    distance_criteria: Option<f64>,
    min_contact: Option<u32>,
    first_molecule: Option<usize>,
    last_molecule: Option<usize>,
}

impl AggregationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance_criteria(mut self, distance: f64) -> Self {
        self.distance_criteria = Some(distance);
        self
    }
    pub fn min_contact(mut self, n: u32) -> Self {
        self.min_contact = Some(n);
        self
    }
    pub fn molecule_range(mut self, first: usize, last: usize) -> Self {
        self.first_molecule = Some(first);
        self.last_molecule = Some(last);
        self
    }

    pub fn build(self) -> Result<AggregationConfig, ConfigError> {
        let distance_criteria = self
            .distance_criteria
            .ok_or(ConfigError::MissingParameter("distance_criteria"))?;
        if !(distance_criteria.is_finite() && distance_criteria >= 0.0) {
            return Err(ConfigError::Invalid {
                parameter: "distance_criteria",
                reason: format!("must be finite and non-negative (got {distance_criteria})"),
            });
        }
        let min_contact = self.min_contact.unwrap_or(1);
        if min_contact == 0 {
            return Err(ConfigError::Invalid {
                parameter: "min_contact",
                reason: "at least one contact is required".to_string(),
            });
        }
        let first_molecule = self
            .first_molecule
            .ok_or(ConfigError::MissingParameter("first_molecule"))?;
        let last_molecule = self
            .last_molecule
            .ok_or(ConfigError::MissingParameter("last_molecule"))?;
        if first_molecule > last_molecule {
            return Err(ConfigError::Invalid {
                parameter: "first_molecule",
                reason: format!("{first_molecule} is larger than last_molecule = {last_molecule}"),
            });
        }
        Ok(AggregationConfig {
            distance_criteria,
            min_contact,
            first_molecule,
            last_molecule,
        })
    }
}

/// Numerical settings of the cell-model solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellModelConfig {
    pub accuracy: f64,
    pub max_iterations: usize,
}

impl Default for CellModelConfig {
    fn default() -> Self {
        Self {
            accuracy: DEFAULT_ACCURACY,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl CellModelConfig {
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn binning_rejects_invalid_layouts() {
        assert!(matches!(
            Binning::linear(0.0, 1.0, 0),
            Err(ConfigError::Invalid {
                parameter: "bins",
                ..
            })
        ));
        assert!(Binning::linear(-1.0, 1.0, 4).is_err());
        assert!(Binning::linear(2.0, 1.0, 4).is_err());
        assert!(Binning::linear(1.0, 1.0, 4).is_err());
        assert!(Binning::linear(0.0, f64::INFINITY, 4).is_err());
    }

    #[test]
    fn linear_index_and_centers() {
        let binning = Binning::linear(0.0, 5.0, 5).unwrap();
        assert_eq!(binning.index_of(0.0), Some(0));
        assert_eq!(binning.index_of(1.0), Some(1));
        assert_eq!(binning.index_of(4.99), Some(4));
        assert_eq!(binning.index_of(5.0), None);
        assert_eq!(binning.index_of(5.1), None);
        let centers = binning.centers();
        assert!(f64_approx_equal(centers[0], 0.5));
        assert!(f64_approx_equal(centers[4], 4.5));
        assert_eq!(binning.edges(2), (2.0, 3.0));
    }

    #[test]
    fn logarithmic_index_and_centers() {
        let binning = Binning::logarithmic(1.0, 100.0, 2).unwrap();
        assert!(f64_approx_equal(binning.log_factor(), 10.0));
        assert_eq!(binning.index_of(5.0), Some(0));
        assert_eq!(binning.index_of(50.0), Some(1));
        assert_eq!(binning.index_of(0.5), None);
        let centers = binning.centers();
        assert!(f64_approx_equal(centers[0], 10f64.sqrt()));
        assert!(f64_approx_equal(centers[1], 10f64.powf(1.5)));
    }

    #[test]
    fn binning_builder_requires_bins_and_r_max() {
        assert_eq!(
            BinningBuilder::new().bins(4).build(),
            Err(ConfigError::MissingParameter("r_max"))
        );
        assert_eq!(
            BinningBuilder::new().r_max(4.0).build(),
            Err(ConfigError::MissingParameter("bins"))
        );
    }

    #[test]
    fn binning_builder_fills_defaults_from_system() {
        let simulation_box = SimulationBox::new(10.0, 8.0, 12.0).unwrap();
        let binning = BinningBuilder::new().build_for(&simulation_box, 100).unwrap();
        assert_eq!(binning.r_min(), 0.0);
        assert_eq!(binning.r_max(), 4.0);
        assert_eq!(binning.bins(), 5);
        assert_eq!(binning.spacing(), Spacing::Linear);

        let few = BinningBuilder::new().build_for(&simulation_box, 3).unwrap();
        assert_eq!(few.bins(), 1);
    }

    #[test]
    fn aggregation_builder_applies_defaults_and_validates() {
        let config = AggregationConfigBuilder::new()
            .distance_criteria(1.5)
            .molecule_range(0, 9)
            .build()
            .unwrap();
        assert_eq!(config.min_contact, 1);

        assert_eq!(
            AggregationConfigBuilder::new().molecule_range(0, 1).build(),
            Err(ConfigError::MissingParameter("distance_criteria"))
        );
        assert!(AggregationConfigBuilder::new()
            .distance_criteria(-1.0)
            .molecule_range(0, 1)
            .build()
            .is_err());
        assert!(AggregationConfigBuilder::new()
            .distance_criteria(1.0)
            .min_contact(0)
            .molecule_range(0, 1)
            .build()
            .is_err());
        assert!(AggregationConfigBuilder::new()
            .distance_criteria(1.0)
            .molecule_range(3, 1)
            .build()
            .is_err());
    }

    #[test]
    fn cell_model_config_defaults() {
        let config = CellModelConfig::default();
        assert_eq!(config.accuracy, 1e-6);
        assert_eq!(config.max_iterations, 30_000);
        assert_eq!(config.with_max_iterations(5).max_iterations, 5);
    }
}
