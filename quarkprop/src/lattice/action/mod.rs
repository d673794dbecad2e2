// SPDX-License-Identifier: AGPL-3.0-only

//! Fermion actions: the capability the solver is generic over.
//!
//! Every action provides
//!
//! - `apply_full`: `out ← D ψ` (overwrites `out`),
//! - a single involutory hermiticity transform `Γ` with `D† = Γ D Γ`,
//!   invoked through [`FermionAction::apply_hermiticity`] and
//!   [`FermionAction::remove_hermiticity`],
//! - `check_field`: boundary validation of the fields it will see.
//!
//! | Action | Stencil | `Γ` |
//! |--------|---------|-----|
//! | [`MassAction`] | `m · 1` | identity |
//! | [`WilsonAction`] | 1 hop, `-½(1 ∓ γ_μ)` | `γ_{D+1}` |
//! | [`HamberWuAction`] | Wilson + 2-hop derivative | `γ_{D+1}` |
//! | [`NaikAction`] | Wilson + 3-hop derivative | `γ_{D+1}` |
//!
//! Wilson-type actions share one kernel: diagonal `m + D`, a list of
//! hopping matrices, and the chirality matrix.
//!
//! # References
//!
//! - Wilson, in "New Phenomena in Subnuclear Physics" (1977)
//! - Hamber & Wu, Phys. Lett. B 133, 351 (1983)
//! - Naik, Nucl. Phys. B 316, 211 (1989)

mod improved;
mod mass;
mod wilson;

pub use improved::{HamberWuAction, NaikAction, HAMBER_WU_TERMS, NAIK_TERMS};
pub use mass::MassAction;
pub use wilson::{WilsonAction, WILSON_TERMS};

use std::f64::consts::PI;
use std::sync::Arc;

use nalgebra::DMatrix;
use num_complex::Complex64;
use rayon::prelude::*;

use super::colour::ColourVector;
use super::field::{LatticeColourMatrix, LatticeColourVector};
use super::gamma::{chirality, euclidean_gammas, hopping_spin_structures, num_spins};
use super::hopping::HoppingMatrix;
use super::layout::Layout;
use crate::error::{QuarkPropError, Result};

/// Which side of the operator the hermiticity transform is applied on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HermiticityStage {
    /// Before applying D.
    Apply,
    /// After applying D.
    Remove,
}

/// Linear fermion operator on a lattice with a known hermiticity transform.
pub trait FermionAction<const NC: usize> {
    /// Overwrite `out` with `D · fermion_in`.
    fn apply_full(&self, out: &mut LatticeColourVector<NC>, fermion_in: &LatticeColourVector<NC>);

    /// Apply the involutory transform `Γ` in place.
    fn hermiticity_transform(&self, fermion: &mut LatticeColourVector<NC>, stage: HermiticityStage);

    /// Bare mass parameter.
    fn mass(&self) -> f64;

    /// `Γ` before D in `D† = Γ D Γ`.
    fn apply_hermiticity(&self, fermion: &mut LatticeColourVector<NC>) {
        self.hermiticity_transform(fermion, HermiticityStage::Apply);
    }

    /// `Γ` after D in `D† = Γ D Γ`.
    fn remove_hermiticity(&self, fermion: &mut LatticeColourVector<NC>) {
        self.hermiticity_transform(fermion, HermiticityStage::Remove);
    }

    /// Reject fields the operator cannot act on.
    ///
    /// # Errors
    ///
    /// Layout or site-size mismatch with the operator's stencil.
    fn check_field(&self, _field: &LatticeColourVector<NC>) -> Result<()> {
        Ok(())
    }
}

/// Boundary phases `exp(2πi t_μ)` from twist fractions `t_μ`.
///
/// `t = 0` is periodic, `t = 0.5` antiperiodic.
#[must_use]
pub fn phases_from_twists(twists: &[f64]) -> Vec<Complex64> {
    twists
        .iter()
        .map(|&t| Complex64::from_polar(1.0, 2.0 * PI * t))
        .collect()
}

/// Shared implementation of Wilson-type actions.
#[derive(Clone, Debug)]
pub(crate) struct WilsonKernel<const NC: usize> {
    layout: Arc<Layout>,
    mass: f64,
    phases: Vec<Complex64>,
    diagonal: f64,
    chirality: DMatrix<Complex64>,
    hoppings: Vec<HoppingMatrix<NC>>,
}

impl<const NC: usize> WilsonKernel<NC> {
    /// `terms` lists `(hops, derivative_coefficient)`; the unit Wilson
    /// term rides on the nearest-neighbour hop only.
    pub(crate) fn new(
        action: &'static str,
        mass: f64,
        gauge_field: &LatticeColourMatrix<NC>,
        phases: &[Complex64],
        terms: &[(usize, f64)],
    ) -> Result<Self> {
        let num_dims = gauge_field.num_dims();
        if num_dims == 0 || num_dims % 2 != 0 {
            return Err(QuarkPropError::UnsupportedDimensions { action, num_dims });
        }
        if !mass.is_finite() {
            return Err(QuarkPropError::InvalidParameter {
                name: "mass",
                reason: format!("must be finite, got {mass}"),
            });
        }
        let gammas = euclidean_gammas(num_dims)?;
        let hoppings = terms
            .iter()
            .map(|&(hops, coefficient)| {
                let wilson_weight = if hops == 1 { 1.0 } else { 0.0 };
                HoppingMatrix::new(
                    gauge_field,
                    phases,
                    hops,
                    hopping_spin_structures(&gammas, coefficient, wilson_weight),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            layout: Arc::clone(gauge_field.layout()),
            mass,
            phases: phases.to_vec(),
            diagonal: mass + num_dims as f64,
            chirality: chirality(&gammas),
            hoppings,
        })
    }

    pub(crate) fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    pub(crate) fn mass(&self) -> f64 {
        self.mass
    }

    pub(crate) fn phases(&self) -> &[Complex64] {
        &self.phases
    }

    pub(crate) fn num_spins(&self) -> usize {
        num_spins(self.layout.num_dims())
    }

    pub(crate) fn apply_full(
        &self,
        out: &mut LatticeColourVector<NC>,
        fermion_in: &LatticeColourVector<NC>,
    ) {
        out.copy_from(fermion_in);
        out.scale(self.diagonal);
        for hopping in &self.hoppings {
            hopping.apply_full(out, fermion_in);
        }
    }

    pub(crate) fn multiply_chirality(&self, fermion: &mut LatticeColourVector<NC>) {
        let ns = self.chirality.nrows();
        let g = &self.chirality;
        fermion
            .as_mut_slice()
            .par_chunks_mut(ns)
            .for_each(|spins| {
                let original: Vec<ColourVector<NC>> = spins.to_vec();
                for (alpha, out) in spins.iter_mut().enumerate() {
                    let mut acc = ColourVector::zeros();
                    for (beta, &v) in original.iter().enumerate() {
                        let c = g[(alpha, beta)];
                        if c.norm_sqr() > 0.0 {
                            acc += v * c;
                        }
                    }
                    *out = acc;
                }
            });
    }

    pub(crate) fn check_field(&self, field: &LatticeColourVector<NC>) -> Result<()> {
        match self.hoppings.first() {
            Some(hopping) => hopping.check_field(field),
            None => Ok(()),
        }
    }
}

/// Implements [`FermionAction`] for a newtype around [`WilsonKernel`].
macro_rules! wilson_type_action {
    ($action:ident) => {
        impl<const NC: usize> $crate::lattice::action::FermionAction<NC> for $action<NC> {
            fn apply_full(
                &self,
                out: &mut $crate::lattice::field::LatticeColourVector<NC>,
                fermion_in: &$crate::lattice::field::LatticeColourVector<NC>,
            ) {
                self.kernel.apply_full(out, fermion_in);
            }

            fn hermiticity_transform(
                &self,
                fermion: &mut $crate::lattice::field::LatticeColourVector<NC>,
                _stage: $crate::lattice::action::HermiticityStage,
            ) {
                self.kernel.multiply_chirality(fermion);
            }

            fn mass(&self) -> f64 {
                self.kernel.mass()
            }

            fn check_field(
                &self,
                field: &$crate::lattice::field::LatticeColourVector<NC>,
            ) -> $crate::error::Result<()> {
                self.kernel.check_field(field)
            }
        }

        impl<const NC: usize> $action<NC> {
            /// Layout of the gauge field the action was built on.
            #[must_use]
            pub fn layout(&self) -> &std::sync::Arc<$crate::lattice::layout::Layout> {
                self.kernel.layout()
            }

            /// Boundary phase per direction.
            #[must_use]
            pub fn phases(&self) -> &[num_complex::Complex64] {
                self.kernel.phases()
            }

            /// Spin components of the fields the action acts on.
            #[must_use]
            pub fn num_spins(&self) -> usize {
                self.kernel.num_spins()
            }
        }
    };
}

pub(crate) use wilson_type_action;
