// SPDX-License-Identifier: AGPL-3.0-only

//! Meson two-point functions from point propagators.
//!
//! With `S_a`, `S_b` propagators from a common source `x₀` and
//! `γ5`-hermiticity `S(x₀, x) = γ5 S(x, x₀)† γ5`, a meson with source and
//! sink spin structures `Γ_src`, `Γ_snk` has
//!
//!   `C(t) = Σ_{x : x_t = t₀ + t} Tr[ Γ_snk γ5 S_a(x)† γ5 Γ_src S_b(x) ]`
//!
//! For `S_a = S_b` the pseudoscalar channel `Γ = γ5` collapses to
//! `Σ |S(x)|²`, which is positive on every timeslice.
//!
//! # References
//!
//! - Gattringer & Lang, "QCD on the Lattice" (2010), Ch. 6.1, eq. 6.57

use std::f64::consts::{LN_2, PI};

use nalgebra::DMatrix;
use num_complex::Complex64;
use tracing::debug;

use super::propagator::Propagator;
use crate::error::{QuarkPropError, Result};

/// Newton iterations per timeslice before the effective-mass solve gives up.
const EFFMASS_MAX_ITERATIONS: usize = 1000;

/// Relative step size at which the effective-mass solve counts as converged.
const EFFMASS_TOLERANCE: f64 = 1e-13;

fn check_time_dim(prop: &Propagator, time_dim: usize) -> Result<()> {
    let num_dims = prop.layout().num_dims();
    if time_dim >= num_dims {
        return Err(QuarkPropError::DirectionOutOfRange {
            direction: time_dim,
            num_dims,
        });
    }
    Ok(())
}

/// Coordinates of every site relative to the source, wrapped into
/// `0..L`, as `(array_index, coords)`.
fn relative_sites(prop: &Propagator) -> impl Iterator<Item = (usize, Vec<isize>)> + '_ {
    let layout = prop.layout();
    let source = prop.source_coords();
    (0..layout.volume()).map(move |array_index| {
        let mut coords = layout.compute_site_coords(layout.get_site_index(array_index));
        for ((x, &x0), &n) in coords.iter_mut().zip(source).zip(layout.shape()) {
            *x = (*x - x0).rem_euclid(n as isize);
        }
        (array_index, coords)
    })
}

/// Pion correlator `C(t) = Σ_x |S(x)|²` (Frobenius norm over spin and colour).
///
/// # Errors
///
/// [`QuarkPropError::DirectionOutOfRange`] if `time_dim` is not a lattice direction.
pub fn pion_correlator(prop: &Propagator, time_dim: usize) -> Result<Vec<f64>> {
    check_time_dim(prop, time_dim)?;
    let mut correlator = vec![0.0; prop.layout().shape()[time_dim]];
    for (array_index, x) in relative_sites(prop) {
        correlator[x[time_dim] as usize] += prop.site_matrix(array_index).norm_squared();
    }
    Ok(correlator)
}

/// Zero-momentum meson correlator of two propagators from the same source.
///
/// `prop_a` enters through `γ5`-hermiticity as the backward propagator,
/// `prop_b` as the forward one; `chirality` is that `γ5`. Passing the same
/// propagator twice gives the degenerate-flavour meson.
///
/// # Errors
///
/// See [`meson_correlator_at_momentum`].
pub fn meson_correlator(
    prop_a: &Propagator,
    prop_b: &Propagator,
    gamma_sink: &DMatrix<Complex64>,
    gamma_source: &DMatrix<Complex64>,
    chirality: &DMatrix<Complex64>,
    time_dim: usize,
) -> Result<Vec<Complex64>> {
    let momentum = vec![0; prop_a.layout().num_dims().saturating_sub(1)];
    meson_correlator_at_momentum(
        prop_a,
        prop_b,
        gamma_sink,
        gamma_source,
        chirality,
        time_dim,
        &momentum,
    )
}

/// Meson correlator projected onto the lattice momentum `momentum`:
///
///   `C(t, p) = Σ_{x : x_t = t₀ + t} e^{i p·(x - x₀)} Tr[ Γ_snk γ5 S_a(x)† γ5 Γ_src S_b(x) ]`
///
/// with `p_d = 2π k_d / L_d` over the directions other than `time_dim`, in
/// increasing order.
///
/// # Errors
///
/// [`QuarkPropError::DirectionOutOfRange`] for a bad `time_dim`,
/// [`QuarkPropError::LayoutMismatch`] if the propagators live on different
/// layouts, [`QuarkPropError::InvalidParameter`] for propagators with
/// different sources or site structure or a momentum with the wrong number
/// of components, and [`QuarkPropError::SpinStructureShape`] if a spin
/// matrix is not `Ns × Ns`.
pub fn meson_correlator_at_momentum(
    prop_a: &Propagator,
    prop_b: &Propagator,
    gamma_sink: &DMatrix<Complex64>,
    gamma_source: &DMatrix<Complex64>,
    chirality: &DMatrix<Complex64>,
    time_dim: usize,
    momentum: &[isize],
) -> Result<Vec<Complex64>> {
    check_time_dim(prop_a, time_dim)?;
    check_pair(prop_a, prop_b)?;
    let layout = prop_a.layout();
    let num_dims = layout.num_dims();
    if momentum.len() + 1 != num_dims {
        return Err(QuarkPropError::InvalidParameter {
            name: "momentum",
            reason: format!(
                "expected {} spatial components, got {}",
                num_dims - 1,
                momentum.len()
            ),
        });
    }
    let ns = prop_a.num_spins();
    for (index, m) in [gamma_sink, gamma_source, chirality].into_iter().enumerate() {
        if m.nrows() != ns || m.ncols() != ns {
            return Err(QuarkPropError::SpinStructureShape {
                index,
                rows: m.nrows(),
                cols: m.ncols(),
                expected: ns,
            });
        }
    }

    // Lift spin matrices to spin ⊗ colour, matching the (α·Nc + a) index.
    let colour_id = DMatrix::<Complex64>::identity(prop_a.num_colours(), prop_a.num_colours());
    let sink = (gamma_sink * chirality).kronecker(&colour_id);
    let source = (chirality * gamma_source).kronecker(&colour_id);

    let spatial: Vec<usize> = (0..num_dims).filter(|&d| d != time_dim).collect();
    let mut correlator = vec![Complex64::new(0.0, 0.0); layout.shape()[time_dim]];
    for (array_index, x) in relative_sites(prop_a) {
        let phase: f64 = spatial
            .iter()
            .zip(momentum)
            .map(|(&d, &k)| 2.0 * PI * (k * x[d]) as f64 / layout.shape()[d] as f64)
            .sum();
        let s_a = prop_a.site_matrix(array_index);
        let s_b = prop_b.site_matrix(array_index);
        let trace = (&sink * s_a.adjoint() * &source * s_b).trace();
        correlator[x[time_dim] as usize] += trace * Complex64::from_polar(1.0, phase);
    }
    Ok(correlator)
}

fn check_pair(prop_a: &Propagator, prop_b: &Propagator) -> Result<()> {
    let (la, lb) = (prop_a.layout(), prop_b.layout());
    if !std::sync::Arc::ptr_eq(la, lb) && **la != **lb {
        return Err(QuarkPropError::LayoutMismatch);
    }
    if prop_a.num_spins() != prop_b.num_spins() || prop_a.num_colours() != prop_b.num_colours() {
        return Err(QuarkPropError::InvalidParameter {
            name: "propagator",
            reason: format!(
                "site structure {}x{} vs {}x{}",
                prop_a.num_spins(),
                prop_a.num_colours(),
                prop_b.num_spins(),
                prop_b.num_colours()
            ),
        });
    }
    if prop_a.source_coords() != prop_b.source_coords() {
        return Err(QuarkPropError::InvalidParameter {
            name: "propagator",
            reason: format!(
                "sources differ: {:?} vs {:?}",
                prop_a.source_coords(),
                prop_b.source_coords()
            ),
        });
    }
    Ok(())
}

/// Sign with zero mapped to zero.
fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// A periodic correlator is treated as symmetric when `C(1)` and `C(T-1)`
/// have the same sign (both zero counts as the same sign).
fn is_symmetric(correlator: &[f64]) -> bool {
    let n = correlator.len();
    sign(correlator[1]) == sign(correlator[n - 1])
}

/// Fold a periodic correlator about its midpoint.
///
/// `out[0] = C(0)`, `out[t] = (C(t) ± C(T-t)) / 2`: symmetric (`+`) when
/// `C(1)` and `C(T-1)` share a sign, antisymmetric otherwise. A zero on one
/// side and a non-zero value on the other folds antisymmetrically.
#[must_use]
pub fn fold_correlator(correlator: &[f64]) -> Vec<f64> {
    let n = correlator.len();
    if n < 2 {
        return correlator.to_vec();
    }
    let symmetric = is_symmetric(correlator);
    let mut out = Vec::with_capacity(n);
    out.push(correlator[0]);
    for t in 1..n {
        let mirror = correlator[n - t];
        out.push(if symmetric {
            (correlator[t] + mirror) / 2.0
        } else {
            (correlator[t] - mirror) / 2.0
        });
    }
    out
}

/// Effective mass `m(t) = ln |C(t) / C(t+1)|`, periodic in t.
#[must_use]
pub fn log_effective_mass(correlator: &[f64]) -> Vec<f64> {
    let n = correlator.len();
    (0..n)
        .map(|t| (correlator[t] / correlator[(t + 1) % n]).abs().ln())
        .collect()
}

/// Effective mass from the periodic ratio
///
///   `C(t) / C(t+1) = cosh(m (t - T/2)) / cosh(m (t + 1 - T/2))`
///
/// (`sinh` for an antisymmetric correlator), solved for `m > 0` at every
/// timeslice by Newton iteration starting from `guess_mass`. `T/2` is
/// rounded down for odd `T`. If the ratio has no solution at some
/// timeslice, the whole result falls back to [`log_effective_mass`].
#[must_use]
pub fn effective_mass(correlator: &[f64], guess_mass: f64) -> Vec<f64> {
    let n = correlator.len();
    if n < 2 {
        return log_effective_mass(correlator);
    }
    let guess = if guess_mass.is_finite() && guess_mass > 0.0 {
        guess_mass
    } else {
        1.0
    };
    let symmetric = is_symmetric(correlator);
    let half = (n / 2) as f64;

    let solved: Option<Vec<f64>> = (0..n)
        .map(|t| {
            let ratio = correlator[t] / correlator[(t + 1) % n];
            let a = t as f64 - half;
            solve_ratio(ratio, a, a + 1.0, symmetric, guess)
        })
        .collect();
    solved.unwrap_or_else(|| {
        debug!(symmetric, "effective-mass ratio unsolvable, using log ratio");
        log_effective_mass(correlator)
    })
}

/// `ln cosh x`, stable for large `|x|`.
fn ln_cosh(x: f64) -> f64 {
    let x = x.abs();
    x + (-2.0 * x).exp().ln_1p() - LN_2
}

/// `ln |sinh x|`, stable for large `|x|`.
fn ln_abs_sinh(x: f64) -> f64 {
    let x = x.abs();
    x + (-(-2.0 * x).exp()).ln_1p() - LN_2
}

/// Solve `g(m) = ratio` for `m > 0` with `g(m) = cosh(ma)/cosh(mb)` or
/// `sinh(ma)/sinh(mb)`, Newton on `ln g`.
fn solve_ratio(ratio: f64, a: f64, b: f64, symmetric: bool, guess: f64) -> Option<f64> {
    if !ratio.is_finite() || ratio == 0.0 {
        return None;
    }
    if symmetric {
        if ratio < 0.0 {
            return None;
        }
    } else {
        // sinh(ma)/sinh(mb) is singular at b = 0 and vanishes at a = 0
        if a == 0.0 || b == 0.0 || sign(ratio) != sign(a) * sign(b) {
            return None;
        }
    }

    let target = ratio.abs().ln();
    let mut m = guess;
    for _ in 0..EFFMASS_MAX_ITERATIONS {
        let (value, slope) = if symmetric {
            (
                ln_cosh(m * a) - ln_cosh(m * b),
                a * (m * a).tanh() - b * (m * b).tanh(),
            )
        } else {
            (
                ln_abs_sinh(m * a) - ln_abs_sinh(m * b),
                a / (m * a).tanh() - b / (m * b).tanh(),
            )
        };
        let residual = value - target;
        if !(residual.is_finite() && slope.is_finite()) || slope == 0.0 {
            return None;
        }
        let mut next = m - residual / slope;
        if next <= 0.0 {
            next = m / 2.0;
        }
        if (next - m).abs() <= EFFMASS_TOLERANCE * m.max(1.0) {
            return Some(next);
        }
        m = next;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn fold_symmetric() {
        let c = [4.0, 2.0, 1.0, 2.5];
        let folded = fold_correlator(&c);
        assert_eq!(folded, vec![4.0, 2.25, 1.0, 2.25]);
    }

    #[test]
    fn fold_antisymmetric() {
        let c = [0.0, 2.0, 0.0, -2.0];
        let folded = fold_correlator(&c);
        assert_eq!(folded, vec![0.0, 2.0, 0.0, -2.0]);
    }

    #[test]
    fn fold_short_input_unchanged() {
        assert_eq!(fold_correlator(&[1.5]), vec![1.5]);
        assert!(fold_correlator(&[]).is_empty());
    }

    #[test]
    fn fold_treats_zero_as_its_own_sign() {
        // C(1) = 0 but C(T-1) > 0: signs differ, fold antisymmetrically
        let c = [1.0, 0.0, 0.5, 0.25];
        let folded = fold_correlator(&c);
        assert_eq!(folded, vec![1.0, -0.125, 0.0, 0.125]);
        // both zero counts as symmetric
        assert_eq!(fold_correlator(&[1.0, 0.0, 2.0, 0.0]), vec![1.0, 0.0, 2.0, 0.0]);
    }

    #[test]
    fn log_effective_mass_of_pure_exponential() {
        let m = 0.4;
        let c: Vec<f64> = (0..6).map(|t| (-m * t as f64).exp()).collect();
        let meff = log_effective_mass(&c);
        for &v in &meff[..5] {
            assert_abs_diff_eq!(v, m, epsilon = 1e-12);
        }
        // wraps to C(5)/C(0)
        assert_abs_diff_eq!(meff[5], -5.0 * m, epsilon = 1e-12);
    }

    #[test]
    fn effective_mass_recovers_cosh_at_every_timeslice() {
        for (m, guess) in [(0.05, 1.0), (0.3, 1.0), (1.5, 0.2), (3.0, 1.0)] {
            let c: Vec<f64> = (0..16).map(|t| (m * (t as f64 - 8.0)).cosh()).collect();
            let meff = effective_mass(&c, guess);
            assert_eq!(meff.len(), 16);
            for (t, &v) in meff.iter().enumerate() {
                assert_abs_diff_eq!(v, m, epsilon = 1e-10);
                assert!(v > 0.0, "t = {t}");
            }
        }
    }

    #[test]
    fn effective_mass_handles_amplitude_and_bad_guess() {
        let c: Vec<f64> = (0..12).map(|t| 3.5 * (0.7 * (t as f64 - 6.0)).cosh()).collect();
        for guess in [f64::NAN, -1.0, 0.0, 10.0] {
            for v in effective_mass(&c, guess) {
                assert_abs_diff_eq!(v, 0.7, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn antisymmetric_effective_mass_falls_back_to_log_ratio() {
        // sinh(m (t - T/2)) vanishes at t = T/2, so the ratio cannot be solved there
        let c: Vec<f64> = (0..8).map(|t| (0.3 * (t as f64 - 4.0)).sinh()).collect();
        assert_eq!(effective_mass(&c, 1.0), log_effective_mass(&c));
    }
}
