// SPDX-License-Identifier: AGPL-3.0-only

//! Typed errors for lattice construction, operator assembly, and inversion.
//!
//! Construction-time contract violations (bad shapes, hop counts, phase
//! counts, mismatched fields) surface here. Numerical outcomes of the
//! solver (breakdown, iteration limit) are reported through
//! [`crate::lattice::cg::CgStatus`] instead.

use thiserror::Error;

/// Errors arising from lattice, operator, solver, or configuration setup.
#[derive(Debug, Error)]
pub enum QuarkPropError {
    /// A layout needs at least one dimension.
    #[error("lattice shape must have at least one dimension")]
    EmptyShape,

    /// Every lattice extent must be at least 1.
    #[error("lattice extent in dimension {dim} is zero")]
    ZeroExtent {
        /// Offending dimension.
        dim: usize,
    },

    /// Hop count must lie in `1..=min(shape)`.
    #[error("hop count {hops} is outside 1..={max}")]
    InvalidHopCount {
        /// Requested hop count.
        hops: usize,
        /// Smallest lattice extent.
        max: usize,
    },

    /// A direction index exceeded the number of dimensions.
    #[error("direction {direction} out of range for a {num_dims}-dimensional lattice")]
    DirectionOutOfRange {
        /// Requested direction.
        direction: usize,
        /// Lattice dimensionality.
        num_dims: usize,
    },

    /// One boundary phase per dimension is required.
    #[error("expected {expected} boundary phases, found {found}")]
    PhaseCount {
        /// Number of dimensions.
        expected: usize,
        /// Number of phases supplied.
        found: usize,
    },

    /// A field's per-site component count does not match what the operator needs.
    #[error("expected site size {expected}, found {found}")]
    SiteSizeMismatch {
        /// Required site size.
        expected: usize,
        /// Site size of the supplied field.
        found: usize,
    },

    /// Two fields (or a field and an operator) live on different layouts.
    #[error("fields are defined on different lattice layouts")]
    LayoutMismatch,

    /// The stencil needs one spin structure per direction and orientation.
    #[error("expected {expected} spin structures, found {found}")]
    SpinStructureCount {
        /// `2 * num_dims`.
        expected: usize,
        /// Number supplied.
        found: usize,
    },

    /// A spin structure has the wrong shape.
    #[error("spin structure {index} is {rows}x{cols}, expected {expected}x{expected}")]
    SpinStructureShape {
        /// Position in the spin-structure list.
        index: usize,
        /// Rows found.
        rows: usize,
        /// Columns found.
        cols: usize,
        /// Required square size.
        expected: usize,
    },

    /// The action cannot be built in this many dimensions.
    #[error("{action} action needs an even, non-zero number of dimensions, got {num_dims}")]
    UnsupportedDimensions {
        /// Action name.
        action: &'static str,
        /// Lattice dimensionality.
        num_dims: usize,
    },

    /// A numeric parameter is out of its allowed range.
    #[error("invalid {name}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Configuration text failed to parse.
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, QuarkPropError>;
