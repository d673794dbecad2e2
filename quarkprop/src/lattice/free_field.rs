// SPDX-License-Identifier: AGPL-3.0-only

//! Free-field (unit gauge) Wilson-type propagators in momentum space.
//!
//! On a unit gauge field the operator is diagonal in momentum:
//!
//!   `D(p) = M(p) + i Σ_μ γ_μ s̃_μ(p)`
//!   `M(p) = m + Σ_μ (1 - cos p_μ)`
//!   `s̃_μ(p) = Σ_n c_n sin(n p_μ)`
//!
//! with `p_μ = (2π k_μ + 2π t_μ) / L_μ` for twist fractions `t_μ`. The
//! propagator at zero separation has no γ component, so every spin-diagonal
//! entry equals
//!
//!   `G(0) = (1/V) Σ_p M(p) / (M(p)² + Σ_μ s̃_μ(p)²)`
//!
//! which is the exact answer a CG solve on a cold gauge field must
//! reproduce at the source point.

use std::f64::consts::PI;

use rayon::prelude::*;

use super::layout::Layout;
use crate::error::{QuarkPropError, Result};

/// Spin-diagonal free propagator at the source point.
///
/// `derivative_terms` lists `(hops, coefficient)` as in
/// [`crate::lattice::action::WILSON_TERMS`]; the Wilson term is always the
/// nearest-neighbour `1 - cos p`.
///
/// # Errors
///
/// Invalid shape, a twist count different from the dimension count, or a
/// singular operator (zero denominator at some momentum).
pub fn free_propagator_origin(
    shape: &[usize],
    mass: f64,
    twists: &[f64],
    derivative_terms: &[(usize, f64)],
) -> Result<f64> {
    let layout = Layout::new(shape)?;
    if twists.len() != shape.len() {
        return Err(QuarkPropError::PhaseCount {
            expected: shape.len(),
            found: twists.len(),
        });
    }

    let terms: Vec<Option<f64>> = (0..layout.volume())
        .into_par_iter()
        .map(|site| {
            let k = layout.compute_site_coords(site);
            let mut m_p = mass;
            let mut s_sq = 0.0;
            for (mu, &k_mu) in k.iter().enumerate() {
                let p = 2.0 * PI * (k_mu as f64 + twists[mu]) / shape[mu] as f64;
                m_p += 1.0 - p.cos();
                let s: f64 = derivative_terms
                    .iter()
                    .map(|&(n, c)| c * (n as f64 * p).sin())
                    .sum();
                s_sq += s * s;
            }
            let denominator = m_p * m_p + s_sq;
            (denominator > 0.0).then(|| m_p / denominator)
        })
        .collect();

    let mut sum = 0.0;
    for term in terms {
        sum += term.ok_or_else(|| QuarkPropError::InvalidParameter {
            name: "mass",
            reason: format!("free operator is singular at mass {mass}"),
        })?;
    }
    Ok(sum / layout.volume() as f64)
}
