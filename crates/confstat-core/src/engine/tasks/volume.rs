use crate::core::models::simulation_box::SimulationBox;
use crate::engine::error::EngineError;
use tracing::warn;

/// Running accumulator of box volume fluctuations, `<V²> - <V>²`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VolumeFluctuations {
    sum_v: f64,
    sum_v2: f64,
    samples: f64,
}

impl VolumeFluctuations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the current box volume as one sample and returns the updated fluctuation.
    pub fn record(&mut self, simulation_box: &SimulationBox) -> f64 {
        let volume = simulation_box.volume();
        self.sum_v += volume;
        self.sum_v2 += volume * volume;
        self.samples += 1.0;
        self.fluctuation()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Replaces the accumulated sums; `samples` must be positive.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for `samples <= 0`, after resetting the accumulator.
    pub fn set(&mut self, sum_v: f64, sum_v2: f64, samples: f64) -> Result<f64, EngineError> {
        if samples.is_nan() || samples <= 0.0 {
            warn!(samples, "Number of averages must be positive; resetting accumulator.");
            self.reset();
            return Err(EngineError::Validation(format!(
                "number of averages must be positive (got {samples})"
            )));
        }
        *self = Self {
            sum_v,
            sum_v2,
            samples,
        };
        Ok(self.fluctuation())
    }

    /// The accumulated `(Σ V, Σ V², samples)`.
    pub fn read(&self) -> (f64, f64, f64) {
        (self.sum_v, self.sum_v2, self.samples)
    }

    /// `<V²> - <V>²` over the recorded samples, or `None` before the first sample.
    pub fn kappa(&self) -> Option<f64> {
        (self.samples > 0.0).then(|| self.fluctuation())
    }

    fn fluctuation(&self) -> f64 {
        let mean = self.sum_v / self.samples;
        self.sum_v2 / self.samples - mean * mean
    }
}
