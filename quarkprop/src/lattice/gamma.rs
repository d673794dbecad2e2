// SPDX-License-Identifier: AGPL-3.0-only

//! Euclidean Dirac algebra in an even number of dimensions.
//!
//! Gamma matrices are Hermitian, square to one, and anticommute:
//!
//!   `{γ_μ, γ_ν} = 2 δ_μν`,  `γ_μ† = γ_μ`
//!
//! They are built recursively from Pauli matrices. In D = 2 the pair is
//! `(σ1, σ2)`; going from D to D + 2 maps `γ_i → γ_i ⊗ σ1` and appends
//! `1 ⊗ σ2`, `1 ⊗ σ3`. Spinors have `Ns = 2^(D/2)` components.
//!
//! The chirality matrix `γ_{D+1} = i^{D(D-1)/2} γ_0 ⋯ γ_{D-1}` is Hermitian,
//! squares to one, and anticommutes with every `γ_μ`. For D = 4 it is the
//! usual γ5, which makes Wilson-type operators γ5-Hermitian.

use nalgebra::DMatrix;
use num_complex::Complex64;

use super::constants::{C_I, C_ONE, C_ZERO};
use crate::error::{QuarkPropError, Result};

/// Spinor components for a `num_dims`-dimensional lattice.
#[must_use]
pub const fn num_spins(num_dims: usize) -> usize {
    1 << (num_dims / 2)
}

fn pauli() -> [DMatrix<Complex64>; 3] {
    [
        DMatrix::from_row_slice(2, 2, &[C_ZERO, C_ONE, C_ONE, C_ZERO]),
        DMatrix::from_row_slice(2, 2, &[C_ZERO, -C_I, C_I, C_ZERO]),
        DMatrix::from_row_slice(2, 2, &[C_ONE, C_ZERO, C_ZERO, -C_ONE]),
    ]
}

/// Euclidean gamma matrices `γ_0 … γ_{D-1}`.
///
/// # Errors
///
/// [`QuarkPropError::UnsupportedDimensions`] unless `num_dims` is even and non-zero.
pub fn euclidean_gammas(num_dims: usize) -> Result<Vec<DMatrix<Complex64>>> {
    if num_dims == 0 || num_dims % 2 != 0 {
        return Err(QuarkPropError::UnsupportedDimensions {
            action: "gamma matrices",
            num_dims,
        });
    }
    let [s1, s2, s3] = pauli();
    let mut gammas = vec![s1.clone(), s2.clone()];
    while gammas.len() < num_dims {
        let ns = gammas[0].nrows();
        let id = DMatrix::<Complex64>::identity(ns, ns);
        let mut next: Vec<DMatrix<Complex64>> = gammas.iter().map(|g| g.kronecker(&s1)).collect();
        next.push(id.kronecker(&s2));
        next.push(id.kronecker(&s3));
        gammas = next;
    }
    Ok(gammas)
}

/// Chirality matrix `γ_{D+1}` from a complete set of gammas.
#[must_use]
pub fn chirality(gammas: &[DMatrix<Complex64>]) -> DMatrix<Complex64> {
    let d = gammas.len();
    let ns = gammas.first().map_or(1, |g| g.nrows());
    let product = gammas
        .iter()
        .fold(DMatrix::<Complex64>::identity(ns, ns), |acc, g| acc * g);
    let phase = C_I.powu(((d * d.saturating_sub(1)) / 2) as u32);
    product * phase
}

/// Spin structures of one hopping term.
///
/// For hop count `n` with derivative coefficient `c` and Wilson weight `w`
/// the two orientations of direction μ carry
///
///   `S[2μ]   = -(w/2) 1 + (c/2) γ_μ`   (forward hop, scattered to x − n μ̂)
///   `S[2μ+1] = -(w/2) 1 - (c/2) γ_μ`   (backward hop, scattered to x + n μ̂)
///
/// so `c = w = 1` reproduces the Wilson hopping term `-½ (1 ∓ γ_μ)`.
#[must_use]
pub fn hopping_spin_structures(
    gammas: &[DMatrix<Complex64>],
    derivative_coefficient: f64,
    wilson_weight: f64,
) -> Vec<DMatrix<Complex64>> {
    let ns = gammas.first().map_or(1, |g| g.nrows());
    let wilson = DMatrix::<Complex64>::identity(ns, ns) * Complex64::from(-0.5 * wilson_weight);
    let half_c = Complex64::from(0.5 * derivative_coefficient);
    gammas
        .iter()
        .flat_map(|g| {
            let derivative = g * half_c;
            [&wilson + &derivative, &wilson - &derivative]
        })
        .collect()
}
