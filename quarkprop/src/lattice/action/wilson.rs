// SPDX-License-Identifier: AGPL-3.0-only

//! Wilson fermion action.
//!
//!   `D ψ(x) = (m + D) ψ(x) - ½ Σ_μ [(1 - γ_μ) U_μ(x) ψ(x+μ) + (1 + γ_μ) U_μ(x-μ)† ψ(x-μ)]`
//!
//! with Wilson parameter r = 1. `D` is γ_{D+1}-Hermitian.

use num_complex::Complex64;

use super::{phases_from_twists, wilson_type_action, WilsonKernel};
use crate::error::Result;
use crate::lattice::field::LatticeColourMatrix;

/// `(hops, coefficient)` of the naive symmetric derivative.
pub const WILSON_TERMS: [(usize, f64); 1] = [(1, 1.0)];

/// Nearest-neighbour Wilson operator.
#[derive(Clone, Debug)]
pub struct WilsonAction<const NC: usize> {
    kernel: WilsonKernel<NC>,
}

impl<const NC: usize> WilsonAction<NC> {
    /// Periodic boundaries in every direction.
    ///
    /// # Errors
    ///
    /// See [`WilsonAction::with_phases`].
    pub fn new(mass: f64, gauge_field: &LatticeColourMatrix<NC>) -> Result<Self> {
        let twists = vec![0.0; gauge_field.num_dims()];
        Self::with_twists(mass, gauge_field, &twists)
    }

    /// Boundary phases `exp(2πi t_μ)` from twist fractions.
    ///
    /// # Errors
    ///
    /// See [`WilsonAction::with_phases`].
    pub fn with_twists(mass: f64, gauge_field: &LatticeColourMatrix<NC>, twists: &[f64]) -> Result<Self> {
        Self::with_phases(mass, gauge_field, &phases_from_twists(twists))
    }

    /// Explicit boundary phases, one per direction.
    ///
    /// # Errors
    ///
    /// Odd or zero dimension count, non-finite mass, or any hopping-matrix
    /// construction error (gauge site size, phase count, lattice too small).
    pub fn with_phases(
        mass: f64,
        gauge_field: &LatticeColourMatrix<NC>,
        phases: &[Complex64],
    ) -> Result<Self> {
        let kernel = WilsonKernel::new("Wilson", mass, gauge_field, phases, &WILSON_TERMS)?;
        Ok(Self { kernel })
    }
}

wilson_type_action!(WilsonAction);
