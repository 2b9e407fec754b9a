//! Poisson-Boltzmann cell model of a charged cylinder.
//!
//! Given the reduced Manning parameter `ξ` and the outer and inner cell radii
//! `R_c` and `r_0`, the boundary condition of the cell model fixes an
//! integration constant `γ` (real, or purely imaginary for weakly charged
//! cylinders) and the Manning radius `R_M`. With `L = ln(R_c / r_0)` and
//! `ξ_min = L / (1 + L)` the problem splits into six regimes, each with its own
//! closed form or analytic bisection bracket.

use std::f64::consts::{FRAC_PI_2, PI};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_ACCURACY: f64 = 1e-6;
pub const DEFAULT_MAX_ITERATIONS: usize = 30_000;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum CellModelError {
    #[error("Manning parameter must not be negative (got {0})")]
    Domain(f64),

    #[error("Cell radii must satisfy 0 < r0 < Rc (got Rc = {rc}, r0 = {ro})")]
    InvalidRadii { rc: f64, ro: f64 },

    #[error("Accuracy must be positive and finite (got {0})")]
    InvalidAccuracy(f64),

    #[error("gamma is not bracketed by the initial guess (f = {f_first} and {f_second})")]
    BracketInvalid { f_first: f64, f_second: f64 },

    #[error(
        "Maximum number of iterations exceeded ({iterations}); got {estimate} with bracket width {width} so far"
    )]
    NotConverged {
        estimate: f64,
        width: f64,
        iterations: usize,
    },
}

/// Whether `γ` is real or the solution lives on the imaginary axis (`-iγ` is reported).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Real,
    Imaginary,
}

impl Branch {
    /// The numeric regime code of the classic `cell_gpb` output: `1` or `-1`.
    pub fn code(self) -> f64 {
        match self {
            Branch::Real => 1.0,
            Branch::Imaginary => -1.0,
        }
    }
}

/// The six mutually exclusive parameter regimes of the cell model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// `ξ > 1`
    Strong,
    /// `ξ = 1`
    Critical,
    /// `ξ = ξ_min`, closed form.
    Threshold,
    /// `ξ_min < ξ < 1`
    Intermediate,
    /// `0 < ξ < ξ_min`
    Weak,
    /// `ξ = 0`, closed form.
    Uncharged,
}

impl Regime {
    /// Selects the regime for `xi_m` given `xi_min`.
    ///
    /// # Errors
    ///
    /// Returns [`CellModelError::Domain`] for negative (or NaN) Manning parameters.
    pub fn classify(xi_m: f64, xi_min: f64) -> Result<Self, CellModelError> {
        if xi_m > 1.0 {
            Ok(Regime::Strong)
        } else if xi_m == 1.0 {
            Ok(Regime::Critical)
        } else if xi_m == xi_min {
            Ok(Regime::Threshold)
        } else if xi_m > xi_min {
            Ok(Regime::Intermediate)
        } else if xi_m > 0.0 {
            Ok(Regime::Weak)
        } else if xi_m == 0.0 {
            Ok(Regime::Uncharged)
        } else {
            Err(CellModelError::Domain(xi_m))
        }
    }

    pub fn branch(self) -> Branch {
        match self {
            Regime::Strong | Regime::Critical | Regime::Threshold | Regime::Intermediate => {
                Branch::Real
            }
            Regime::Weak | Regime::Uncharged => Branch::Imaginary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellModelSolution {
    /// `γ` on the real branch, `-iγ` on the imaginary branch.
    pub gamma: f64,
    pub manning_radius: f64,
    pub branch: Branch,
    pub regime: Regime,
    /// Number of bisection steps taken; zero for the closed-form regimes.
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bracket {
    first: f64,
    second: f64,
}

/// Solves the cell-model boundary condition for `γ` and the Manning radius.
///
/// # Arguments
///
/// * `xi_m` - The reduced Manning parameter, `ξ ≥ 0`.
/// * `rc` - The outer cell radius.
/// * `ro` - The inner (cylinder) radius, `0 < ro < rc`.
/// * `accuracy` - Bisection stops once the bracket is narrower than this.
/// * `max_iter` - Maximum number of bisection steps (at least one step is always taken).
///
/// # Errors
///
/// Returns [`CellModelError::Domain`] for `ξ < 0`, [`CellModelError::InvalidRadii`] or
/// [`CellModelError::InvalidAccuracy`] for invalid inputs,
/// [`CellModelError::BracketInvalid`] if the analytic bracket does not enclose a sign
/// change and [`CellModelError::NotConverged`] if `max_iter` steps do not suffice.
pub fn solve_cell_gpb(
    xi_m: f64,
    rc: f64,
    ro: f64,
    accuracy: f64,
    max_iter: usize,
) -> Result<CellModelSolution, CellModelError> {
    if !(ro > 0.0 && rc > ro && rc.is_finite()) {
        return Err(CellModelError::InvalidRadii { rc, ro });
    }
    if !(accuracy > 0.0 && accuracy.is_finite()) {
        return Err(CellModelError::InvalidAccuracy(accuracy));
    }
    let max_iter = max_iter.max(1);

    let log_ratio = (rc / ro).ln();
    let xi_min = log_ratio / (1.0 + log_ratio);
    let regime = Regime::classify(xi_m, xi_min)?;
    debug!(xi_m, xi_min, ?regime, "Classified cell-model regime.");

    let closed_form = |gamma: f64, manning_radius: f64| CellModelSolution {
        gamma,
        manning_radius,
        branch: regime.branch(),
        regime,
        iterations: 0,
    };

    let (gamma, iterations) = match regime {
        Regime::Threshold => return Ok(closed_form(0.0, 0.0)),
        Regime::Uncharged => return Ok(closed_form(1.0 - xi_m, -1.0)),
        Regime::Strong => bisect_real(
            xi_m,
            log_ratio,
            Bracket {
                first: PI / log_ratio,
                second: PI / (log_ratio + xi_m / (xi_m - 1.0)),
            },
            accuracy,
            max_iter,
        )?,
        Regime::Critical => bisect_real(
            xi_m,
            log_ratio,
            Bracket {
                first: FRAC_PI_2 / log_ratio,
                second: FRAC_PI_2 / (log_ratio + 1.0),
            },
            accuracy,
            max_iter,
        )?,
        Regime::Intermediate => bisect_real(
            xi_m,
            log_ratio,
            Bracket {
                first: FRAC_PI_2 / log_ratio,
                second: (3.0 * (log_ratio - xi_m / (1.0 - xi_m))
                    / (1.0 - (1.0 - xi_m).powi(-3)))
                .sqrt(),
            },
            accuracy,
            max_iter,
        )?,
        Regime::Weak => bisect_imaginary(
            xi_m,
            log_ratio,
            Bracket {
                first: 1.0 - xi_m,
                second: xi_m * (6.0 - (3.0 - xi_m) * xi_m) / (3.0 * log_ratio),
            },
            accuracy,
            max_iter,
        )?,
    };

    let manning_radius = match regime.branch() {
        Branch::Real => rc * (-(1.0 / gamma) * (1.0 / gamma).atan()).exp(),
        Branch::Imaginary => rc * ((1.0 / gamma).atan() / gamma).exp(),
    };

    Ok(CellModelSolution {
        gamma,
        manning_radius,
        branch: regime.branch(),
        regime,
        iterations,
    })
}

/// Left-hand side of the real-branch boundary condition.
pub fn real_branch_residual(gamma: f64, xi_m: f64, log_ratio: f64) -> f64 {
    (1.0 / gamma).atan() + ((xi_m - 1.0) / gamma).atan() - gamma * log_ratio
}

/// Left-hand side of the imaginary-branch boundary condition.
pub fn imaginary_branch_residual(gamma: f64, xi_m: f64, log_ratio: f64) -> f64 {
    -(gamma.atanh() + (gamma / (xi_m - 1.0)).atanh()) - gamma * log_ratio
}

fn bisect_real(
    xi_m: f64,
    log_ratio: f64,
    bracket: Bracket,
    accuracy: f64,
    max_iter: usize,
) -> Result<(f64, usize), CellModelError> {
    let f = |g: f64| real_branch_residual(g, xi_m, log_ratio);
    let f_first = f(bracket.first);
    let f_second = f(bracket.second);
    if f_first * f_second >= 0.0 {
        return Err(CellModelError::BracketInvalid { f_first, f_second });
    }

    // Orient so that the running bound always sits on the negative side.
    let (mut root, mut step) = if f_first < 0.0 {
        (bracket.first, bracket.second - bracket.first)
    } else {
        (bracket.second, bracket.first - bracket.second)
    };

    let mut mid = root;
    for iteration in 1..=max_iter {
        step *= 0.5;
        mid = root + step;
        let f_mid = f(mid);
        if f_mid <= 0.0 {
            root = mid;
        }
        if step.abs() < accuracy || f_mid == 0.0 {
            return Ok((mid, iteration));
        }
    }

    Err(CellModelError::NotConverged {
        estimate: mid,
        width: step,
        iterations: max_iter,
    })
}

fn bisect_imaginary(
    xi_m: f64,
    log_ratio: f64,
    bracket: Bracket,
    accuracy: f64,
    max_iter: usize,
) -> Result<(f64, usize), CellModelError> {
    let f = |g: f64| imaginary_branch_residual(g, xi_m, log_ratio);

    // Searches backwards from the upper bound `bracket.first`.
    let f_lower = f(bracket.second);
    let root = bracket.first;
    let mut step = if f_lower < 0.0 {
        bracket.first - bracket.second
    } else {
        warn!(
            lower = bracket.second,
            f_lower, "Lower boundary is actually larger than l.h.s, flipping!"
        );
        bracket.first
    };

    let mut root = root;
    let mut mid = root;
    for iteration in 1..=max_iter {
        step *= 0.5;
        mid = root - step;
        let f_mid = f(mid);
        if f_mid >= 0.0 {
            root = mid;
        }
        if step.abs() < accuracy || f_mid == 0.0 {
            return Ok((mid, iteration));
        }
    }

    Err(CellModelError::NotConverged {
        estimate: mid,
        width: step,
        iterations: max_iter,
    })
}
