// SPDX-License-Identifier: AGPL-3.0-only

//! Conjugate Gradient solver for `D x = b` via the normal equations.
//!
//! `D` is not Hermitian, so CG runs on `D†D x = D†b`. The adjoint comes from
//! the action's hermiticity transform, `D† = Γ D Γ`, so one solver serves
//! every action without knowing its internals.
//!
//! # Algorithm
//!
//! Starting from `x₀ = 0`, `r₀ = p₀ = D†b`:
//!
//! ```text
//!   α    = ‖r‖² / ‖D p‖²
//!   x   += α p
//!   r   -= α D†D p
//!   β    = ‖r_new‖² / ‖r‖²
//!   p    = r + β p
//! ```
//!
//! The true residual `s = b - D x` is carried alongside (`s -= α D p`), and
//! convergence is declared when `‖s‖ / ‖b‖ ≤ tolerance`.
//!
//! # References
//!
//! - Hestenes & Stiefel (1952): original CG
//! - Gattringer & Lang, "QCD on the Lattice" (2010), Ch. 8.4

use num_complex::Complex64;
use tracing::{debug, trace, warn};

use super::action::FermionAction;
use super::constants::CG_BREAKDOWN_GUARD;
use super::field::LatticeColourVector;
use crate::error::{QuarkPropError, Result};

/// How a CG run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CgStatus {
    /// Relative residual reached the tolerance.
    Converged,
    /// Iteration limit hit first; the solution is the best estimate.
    MaxIterations,
    /// The search direction collapsed (`‖D p‖² ≈ 0`); iteration stopped early.
    Breakdown,
}

/// CG solver result.
#[derive(Clone, Debug)]
pub struct CgResult<const NC: usize> {
    /// Solution estimate.
    pub solution: LatticeColourVector<NC>,
    /// Final relative residual `‖b - D x‖ / ‖b‖`.
    pub residual: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Termination reason.
    pub status: CgStatus,
}

impl<const NC: usize> CgResult<NC> {
    /// Whether the tolerance was reached.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.status == CgStatus::Converged
    }

    /// `(solution, residual, iterations)`
    #[must_use]
    pub fn into_parts(self) -> (LatticeColourVector<NC>, f64, usize) {
        (self.solution, self.residual, self.iterations)
    }
}

/// `out ← D† v = Γ D Γ v`, using `scratch` for `Γ v`.
fn apply_dagger<A, const NC: usize>(
    action: &A,
    out: &mut LatticeColourVector<NC>,
    v: &LatticeColourVector<NC>,
    scratch: &mut LatticeColourVector<NC>,
) where
    A: FermionAction<NC> + ?Sized,
{
    scratch.copy_from(v);
    action.apply_hermiticity(scratch);
    action.apply_full(out, scratch);
    action.remove_hermiticity(out);
}

/// Solve `D x = source` with CG on the normal equations.
///
/// # Errors
///
/// [`QuarkPropError::InvalidParameter`] for `max_iterations == 0` or a
/// non-positive or non-finite tolerance, and whatever the action's
/// `check_field` reports for `source`. Non-convergence and breakdown are
/// not errors; see [`CgStatus`].
pub fn conjugate_gradient<A, const NC: usize>(
    action: &A,
    source: &LatticeColourVector<NC>,
    max_iterations: usize,
    tolerance: f64,
) -> Result<CgResult<NC>>
where
    A: FermionAction<NC> + ?Sized,
{
    if max_iterations == 0 {
        return Err(QuarkPropError::InvalidParameter {
            name: "max_iterations",
            reason: "must be at least 1".to_string(),
        });
    }
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(QuarkPropError::InvalidParameter {
            name: "tolerance",
            reason: format!("must be positive and finite, got {tolerance}"),
        });
    }
    action.check_field(source)?;

    let mut solution = source.zeros_like();
    let b_norm_sq = source.norm_sq();
    if b_norm_sq == 0.0 {
        debug!("zero source, returning zero solution");
        return Ok(CgResult {
            solution,
            residual: 0.0,
            iterations: 0,
            status: CgStatus::Converged,
        });
    }
    let b_norm = b_norm_sq.sqrt();

    let mut scratch = source.zeros_like();
    let mut true_residual = source.clone();
    let mut r = source.zeros_like();
    apply_dagger(action, &mut r, source, &mut scratch);
    let mut p = r.clone();
    let mut dp = source.zeros_like();
    let mut ap = source.zeros_like();
    let mut r_norm_sq = r.norm_sq();
    let mut residual = 1.0;

    for iteration in 1..=max_iterations {
        // dp = D p, ap = D† D p
        action.apply_full(&mut dp, &p);
        apply_dagger(action, &mut ap, &dp, &mut scratch);

        let p_ap = dp.norm_sq();
        let p_norm_sq = p.norm_sq();
        if !p_ap.is_finite() || p_ap <= CG_BREAKDOWN_GUARD * p_norm_sq {
            warn!(
                iteration,
                residual, p_ap, p_norm_sq, "CG breakdown: search direction in kernel of D"
            );
            return Ok(CgResult {
                solution,
                residual,
                iterations: iteration - 1,
                status: CgStatus::Breakdown,
            });
        }

        let alpha = r_norm_sq / p_ap;
        solution.axpy(Complex64::new(alpha, 0.0), &p);
        true_residual.axpy(Complex64::new(-alpha, 0.0), &dp);
        r.axpy(Complex64::new(-alpha, 0.0), &ap);

        residual = true_residual.norm_sq().sqrt() / b_norm;
        trace!(iteration, residual, "CG iteration");

        if residual <= tolerance {
            debug!(iterations = iteration, residual, "CG converged");
            return Ok(CgResult {
                solution,
                residual,
                iterations: iteration,
                status: CgStatus::Converged,
            });
        }

        let r_norm_sq_new = r.norm_sq();
        let beta = r_norm_sq_new / r_norm_sq;
        r_norm_sq = r_norm_sq_new;

        // p = r + beta * p
        p.xpay(&r, Complex64::new(beta, 0.0));
    }

    warn!(max_iterations, residual, "CG hit iteration limit");
    Ok(CgResult {
        solution,
        residual,
        iterations: max_iterations,
        status: CgStatus::MaxIterations,
    })
}
