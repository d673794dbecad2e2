// SPDX-License-Identifier: AGPL-3.0-only

//! Point-to-all quark propagators.
//!
//! The propagator `S(x, x₀)` is the inverse of the Dirac operator from a
//! point source at `x₀`. Each of its `Ns · Nc` columns is one CG solve with
//! a unit source in a single spin-colour component:
//!
//!   `S(x)[(α,a), (β,b)] = (D⁻¹ δ_{x₀,β,b})(x)[α][a]`
//!
//! Rows are the sink index `α · Nc + a`, columns the source index
//! `β · Nc + b`.

use std::sync::Arc;

use nalgebra::DMatrix;
use num_complex::Complex64;
use tracing::{debug, info};

use super::action::FermionAction;
use super::cg::{conjugate_gradient, CgStatus};
use super::constants::C_ZERO;
use super::field::LatticeColourVector;
use super::layout::Layout;
use crate::error::{QuarkPropError, Result};

/// Outcome of one column solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveSummary {
    /// Source spin.
    pub spin: usize,
    /// Source colour.
    pub colour: usize,
    /// CG iterations.
    pub iterations: usize,
    /// Final relative residual.
    pub residual: f64,
    /// Termination reason.
    pub status: CgStatus,
}

/// Full spin-colour propagator from one source point.
#[derive(Clone, Debug)]
pub struct Propagator {
    layout: Arc<Layout>,
    num_spins: usize,
    num_colours: usize,
    source_coords: Vec<isize>,
    blocks: Vec<DMatrix<Complex64>>,
}

impl Propagator {
    /// Layout of the propagator.
    #[must_use]
    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    /// Spin components per site.
    #[must_use]
    pub const fn num_spins(&self) -> usize {
        self.num_spins
    }

    /// Colours per site.
    #[must_use]
    pub const fn num_colours(&self) -> usize {
        self.num_colours
    }

    /// Source position, wrapped into the lattice.
    #[must_use]
    pub fn source_coords(&self) -> &[isize] {
        &self.source_coords
    }

    /// `(Ns·Nc) × (Ns·Nc)` block at `array_index`.
    #[must_use]
    pub fn site_matrix(&self, array_index: usize) -> &DMatrix<Complex64> {
        &self.blocks[array_index]
    }

    /// Block at (possibly wrapped) coordinates.
    #[must_use]
    pub fn at_coords(&self, coords: &[isize]) -> &DMatrix<Complex64> {
        &self.blocks[self.layout.array_index_of(coords)]
    }
}

/// Propagator together with the per-column solver outcomes.
#[derive(Clone, Debug)]
pub struct PropagatorResult {
    /// The assembled propagator.
    pub propagator: Propagator,
    /// One entry per `(spin, colour)` column, spin-major.
    pub solves: Vec<SolveSummary>,
}

impl PropagatorResult {
    /// Whether every column converged.
    #[must_use]
    pub fn all_converged(&self) -> bool {
        self.solves.iter().all(|s| s.status == CgStatus::Converged)
    }

    /// Total CG iterations over all columns.
    #[must_use]
    pub fn total_iterations(&self) -> usize {
        self.solves.iter().map(|s| s.iterations).sum()
    }
}

/// Invert `action` on all `num_spins · NC` unit sources at `source_coords`.
///
/// # Errors
///
/// [`QuarkPropError::InvalidParameter`] if `source_coords` has the wrong
/// length or `num_spins == 0`, plus any error from [`conjugate_gradient`].
/// Columns that fail to converge are reported in
/// [`PropagatorResult::solves`] rather than as errors.
pub fn compute_propagator<A, const NC: usize>(
    action: &A,
    layout: &Arc<Layout>,
    num_spins: usize,
    source_coords: &[isize],
    max_iterations: usize,
    tolerance: f64,
) -> Result<PropagatorResult>
where
    A: FermionAction<NC> + ?Sized,
{
    if source_coords.len() != layout.num_dims() {
        return Err(QuarkPropError::InvalidParameter {
            name: "source_coords",
            reason: format!(
                "expected {} coordinates, got {}",
                layout.num_dims(),
                source_coords.len()
            ),
        });
    }
    if num_spins == 0 {
        return Err(QuarkPropError::InvalidParameter {
            name: "num_spins",
            reason: "must be at least 1".to_string(),
        });
    }

    let mut source_coords = source_coords.to_vec();
    layout.sanitize_site_coords(&mut source_coords);
    let dim = num_spins * NC;
    let mut blocks = vec![DMatrix::from_element(dim, dim, C_ZERO); layout.volume()];
    let mut solves = Vec::with_capacity(dim);

    for spin in 0..num_spins {
        for colour in 0..NC {
            let source = LatticeColourVector::<NC>::point_source(
                Arc::clone(layout),
                num_spins,
                &source_coords,
                spin,
                colour,
            );
            let result = conjugate_gradient(action, &source, max_iterations, tolerance)?;
            debug!(
                spin,
                colour,
                iterations = result.iterations,
                residual = result.residual,
                "propagator column solved"
            );
            solves.push(SolveSummary {
                spin,
                colour,
                iterations: result.iterations,
                residual: result.residual,
                status: result.status,
            });

            let column = spin * NC + colour;
            for (array_index, block) in blocks.iter_mut().enumerate() {
                for (alpha, v) in result.solution.site(array_index).iter().enumerate() {
                    for a in 0..NC {
                        block[(alpha * NC + a, column)] = v[a];
                    }
                }
            }
        }
    }

    let converged = solves.iter().filter(|s| s.status == CgStatus::Converged).count();
    info!(
        columns = solves.len(),
        converged,
        iterations = solves.iter().map(|s| s.iterations).sum::<usize>(),
        "propagator computed"
    );

    Ok(PropagatorResult {
        propagator: Propagator {
            layout: Arc::clone(layout),
            num_spins,
            num_colours: NC,
            source_coords,
            blocks,
        },
        solves,
    })
}
