// SPDX-License-Identifier: AGPL-3.0-only

//! quarkprop: lattice fermion operators and quark propagators.
//!
//! Builds Wilson-type Dirac operators on a D-dimensional hypercubic lattice
//! from a generic multi-hop hopping matrix, and inverts them with conjugate
//! gradient on the normal equations.
//!
//! ## Modules
//!   - `lattice`: layout, fields, gauge links, hopping matrix, actions, CG
//!   - `config`: JSON run configuration and action construction
//!   - `error`: crate error type
//!   - `tolerances`: documented validation thresholds and reference values
//!   - `validation`: pass/fail harness for the validation binary
//!
//! ## Validation binary
//!   - `validate_wilson_cg`: free Wilson point-source solve against the
//!     momentum-space reference, operator identities on a random gauge field

pub mod config;
pub mod error;
pub mod lattice;
pub mod tolerances;
pub mod validation;
