// SPDX-License-Identifier: AGPL-3.0-only

//! Mass-only action `D = m · 1`.
//!
//! Has no stencil and a trivial hermiticity transform. CG on it converges
//! in one iteration, which makes it the reference check for the solver.

use num_complex::Complex64;

use super::{phases_from_twists, FermionAction, HermiticityStage};
use crate::error::{QuarkPropError, Result};
use crate::lattice::field::LatticeColourVector;

/// `D ψ = m ψ`.
#[derive(Clone, Debug)]
pub struct MassAction {
    mass: f64,
    phases: Vec<Complex64>,
}

impl MassAction {
    /// Mass-only action. `mass = 0` is allowed and makes the operator singular.
    ///
    /// # Errors
    ///
    /// [`QuarkPropError::InvalidParameter`] for a non-finite mass.
    pub fn new(mass: f64) -> Result<Self> {
        Self::with_twists(mass, &[])
    }

    /// Mass-only action carrying boundary twists for bookkeeping; they do
    /// not affect a purely local operator.
    ///
    /// # Errors
    ///
    /// [`QuarkPropError::InvalidParameter`] for a non-finite mass.
    pub fn with_twists(mass: f64, twists: &[f64]) -> Result<Self> {
        if !mass.is_finite() {
            return Err(QuarkPropError::InvalidParameter {
                name: "mass",
                reason: format!("must be finite, got {mass}"),
            });
        }
        Ok(Self {
            mass,
            phases: phases_from_twists(twists),
        })
    }

    /// Boundary phases.
    #[must_use]
    pub fn phases(&self) -> &[Complex64] {
        &self.phases
    }
}

impl<const NC: usize> FermionAction<NC> for MassAction {
    fn apply_full(&self, out: &mut LatticeColourVector<NC>, fermion_in: &LatticeColourVector<NC>) {
        out.copy_from(fermion_in);
        out.scale(self.mass);
    }

    fn hermiticity_transform(&self, _fermion: &mut LatticeColourVector<NC>, _stage: HermiticityStage) {}

    fn mass(&self) -> f64 {
        self.mass
    }
}
