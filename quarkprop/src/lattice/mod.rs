// SPDX-License-Identifier: AGPL-3.0-only

//! Lattice fermions: Wilson-type Dirac operators on SU(N) gauge fields.
//!
//! Every Wilson-type action is a mass diagonal plus a sum of hopping terms:
//!
//! | Action | Hopping terms `(hops, coefficient)` |
//! |--------|-------------------------------------|
//! | Mass | none |
//! | Wilson | `(1, 1)` |
//! | Hamber-Wu | `(1, 4/3)`, `(2, -1/6)` |
//! | Naik | `(1, 9/8)`, `(3, -1/24)` |
//!
//! The Wilson term `r (1 - cos p)` always sits on the nearest neighbours.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `layout` | Site ↔ coordinate maps, lexicographic and even-odd storage |
//! | `field` | Site-blocked lattice fields and BLAS-1 kernels |
//! | `colour` | Fixed-size colour vectors and matrices, SU(N) utilities |
//! | `gauge` | Link fields, plaquette, gauge transformations |
//! | `gamma` | Euclidean gamma matrices in even D |
//! | `hopping` | Multi-hop parallel transport with boundary phases |
//! | `action` | Fermion actions and γ5-hermiticity |
//! | `cg` | Conjugate gradient on the normal equations |
//! | `propagator` | Point-to-all propagators |
//! | `correlator` | Zero-momentum meson correlators |
//! | `free_field` | Momentum-space free propagator |
//!
//! # References
//!
//! - Gattringer & Lang, "Quantum Chromodynamics on the Lattice" (2010)
//! - Hamber & Wu, Phys. Lett. B 133, 351 (1983)
//! - Naik, Nucl. Phys. B 316, 211 (1989)

/// Fermion actions built on the hopping matrix.
pub mod action;
/// Conjugate gradient on `D†D`.
pub mod cg;
/// SU(N) colour vectors and matrices.
pub mod colour;
/// Colour count, complex constants, numerical guards.
pub mod constants;
/// Meson two-point functions.
pub mod correlator;
/// Lattice fields.
pub mod field;
/// Free-field momentum-space propagator.
pub mod free_field;
/// Euclidean gamma matrices.
pub mod gamma;
/// Gauge link fields.
pub mod gauge;
/// Multi-hop hopping matrix.
pub mod hopping;
/// Lattice layout.
pub mod layout;
/// Point-to-all propagators.
pub mod propagator;
