// SPDX-License-Identifier: AGPL-3.0-only

//! Centralized constants for the lattice modules.
//!
//! Colour count of QCD, complex unit constants, and the numerical guards
//! shared by `colour.rs`, `hopping.rs`, and `cg.rs`.

use num_complex::Complex64;

/// Number of colours in QCD (SU(3)).
pub const N_COLOURS: usize = 3;

/// Complex zero.
pub const C_ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Complex one.
pub const C_ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Imaginary unit.
pub const C_I: Complex64 = Complex64::new(0.0, 1.0);

/// Division guard for Gram-Schmidt reunitarization and pivoting.
///
/// Well below any norm a physical link or fermion field reaches.
pub const LATTICE_DIVISION_GUARD: f64 = 1e-30;

/// Relative breakdown guard for CG.
///
/// The iteration stops when `‖D p‖² ≤ CG_BREAKDOWN_GUARD · ‖p‖²`, i.e. the
/// search direction has (numerically) collapsed into the kernel of D.
pub const CG_BREAKDOWN_GUARD: f64 = 1e-28;
