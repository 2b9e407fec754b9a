use nalgebra::Vector3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum BoxError {
    #[error("Box lengths must be positive and finite (got {0:?})")]
    NonPositiveLength([f64; 3]),
}

/// The periodic simulation box, an orthorhombic cell with edge lengths `lengths`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBox {
    lengths: Vector3<f64>,
}

impl SimulationBox {
    /// Creates a box from its three edge lengths.
    ///
    /// # Errors
    ///
    /// Returns [`BoxError::NonPositiveLength`] if any length is zero, negative or not finite.
    pub fn new(lx: f64, ly: f64, lz: f64) -> Result<Self, BoxError> {
        let lengths = Vector3::new(lx, ly, lz);
        if lengths.iter().any(|l| !l.is_finite() || *l <= 0.0) {
            return Err(BoxError::NonPositiveLength([lx, ly, lz]));
        }
        Ok(Self { lengths })
    }

    /// Creates a cubic box of edge `l`.
    pub fn cubic(l: f64) -> Result<Self, BoxError> {
        Self::new(l, l, l)
    }

    #[inline]
    pub fn lengths(&self) -> &Vector3<f64> {
        &self.lengths
    }

    /// The smallest edge length, the default basis for distance cutoffs.
    #[inline]
    pub fn min_length(&self) -> f64 {
        self.lengths.min()
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.lengths.x * self.lengths.y * self.lengths.z
    }

    /// Sum of the edge lengths, an upper bound for any minimum-image distance.
    #[inline]
    pub fn perimeter_sum(&self) -> f64 {
        self.lengths.x + self.lengths.y + self.lengths.z
    }
}

impl TryFrom<[f64; 3]> for SimulationBox {
    type Error = BoxError;

    fn try_from(value: [f64; 3]) -> Result<Self, Self::Error> {
        Self::new(value[0], value[1], value[2])
    }
}
