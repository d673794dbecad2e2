// SPDX-License-Identifier: AGPL-3.0-only

//! Improved-derivative Wilson-type actions.
//!
//! Both keep the r = 1 Wilson term on the nearest-neighbour hop and replace
//! the naive symmetric derivative with a longer stencil whose momentum-space
//! form cancels the O(p³) error:
//!
//! | Action | Derivative in momentum space |
//! |--------|------------------------------|
//! | Hamber-Wu | `4/3 sin p - 1/6 sin 2p` |
//! | Naik | `9/8 sin p - 1/24 sin 3p` |
//!
//! The lattice must be at least as long as the longest hop in every direction.

use num_complex::Complex64;

use super::{phases_from_twists, wilson_type_action, WilsonKernel};
use crate::error::Result;
use crate::lattice::field::LatticeColourMatrix;

/// `(hops, coefficient)` of the Hamber-Wu derivative.
pub const HAMBER_WU_TERMS: [(usize, f64); 2] = [(1, 4.0 / 3.0), (2, -1.0 / 6.0)];

/// `(hops, coefficient)` of the Naik derivative.
pub const NAIK_TERMS: [(usize, f64); 2] = [(1, 9.0 / 8.0), (3, -1.0 / 24.0)];

/// Wilson term plus next-to-nearest-neighbour improved derivative.
#[derive(Clone, Debug)]
pub struct HamberWuAction<const NC: usize> {
    kernel: WilsonKernel<NC>,
}

impl<const NC: usize> HamberWuAction<NC> {
    /// Periodic boundaries in every direction.
    ///
    /// # Errors
    ///
    /// See [`HamberWuAction::with_phases`].
    pub fn new(mass: f64, gauge_field: &LatticeColourMatrix<NC>) -> Result<Self> {
        let twists = vec![0.0; gauge_field.num_dims()];
        Self::with_phases(mass, gauge_field, &phases_from_twists(&twists))
    }

    /// Boundary phases from twist fractions.
    ///
    /// # Errors
    ///
    /// See [`HamberWuAction::with_phases`].
    pub fn with_twists(mass: f64, gauge_field: &LatticeColourMatrix<NC>, twists: &[f64]) -> Result<Self> {
        Self::with_phases(mass, gauge_field, &phases_from_twists(twists))
    }

    /// Explicit boundary phases.
    ///
    /// # Errors
    ///
    /// As for the Wilson action; additionally every extent must be ≥ 2.
    pub fn with_phases(
        mass: f64,
        gauge_field: &LatticeColourMatrix<NC>,
        phases: &[Complex64],
    ) -> Result<Self> {
        let kernel = WilsonKernel::new("Hamber-Wu", mass, gauge_field, phases, &HAMBER_WU_TERMS)?;
        Ok(Self { kernel })
    }
}

wilson_type_action!(HamberWuAction);

/// Wilson term plus three-hop Naik derivative.
#[derive(Clone, Debug)]
pub struct NaikAction<const NC: usize> {
    kernel: WilsonKernel<NC>,
}

impl<const NC: usize> NaikAction<NC> {
    /// Periodic boundaries in every direction.
    ///
    /// # Errors
    ///
    /// See [`NaikAction::with_phases`].
    pub fn new(mass: f64, gauge_field: &LatticeColourMatrix<NC>) -> Result<Self> {
        let twists = vec![0.0; gauge_field.num_dims()];
        Self::with_phases(mass, gauge_field, &phases_from_twists(&twists))
    }

    /// Boundary phases from twist fractions.
    ///
    /// # Errors
    ///
    /// See [`NaikAction::with_phases`].
    pub fn with_twists(mass: f64, gauge_field: &LatticeColourMatrix<NC>, twists: &[f64]) -> Result<Self> {
        Self::with_phases(mass, gauge_field, &phases_from_twists(twists))
    }

    /// Explicit boundary phases.
    ///
    /// # Errors
    ///
    /// As for the Wilson action; additionally every extent must be ≥ 3.
    pub fn with_phases(
        mass: f64,
        gauge_field: &LatticeColourMatrix<NC>,
        phases: &[Complex64],
    ) -> Result<Self> {
        let kernel = WilsonKernel::new("Naik", mass, gauge_field, phases, &NAIK_TERMS)?;
        Ok(Self { kernel })
    }
}

wilson_type_action!(NaikAction);
