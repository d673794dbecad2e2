// SPDX-License-Identifier: AGPL-3.0-only

//! Inversion run configuration.
//!
//! A single JSON document describes the lattice, the action, and the solver
//! budget. Every field has a default, so `{}` is the free Wilson reference
//! run on 8×4×4×4 at m = 0.1:
//!
//! ```json
//! {
//!   "shape": [8, 4, 4, 4],
//!   "ordering": "lexicographic",
//!   "action": "wilson",
//!   "mass": 0.1,
//!   "twists": [0.0, 0.0, 0.0, 0.0],
//!   "max_iterations": 1000,
//!   "tolerance": 1e-8
//! }
//! ```

use std::sync::Arc;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{QuarkPropError, Result};
use crate::lattice::action::{
    phases_from_twists, FermionAction, HamberWuAction, MassAction, NaikAction, WilsonAction,
};
use crate::lattice::field::LatticeColourMatrix;
use crate::lattice::gamma::num_spins;
use crate::lattice::layout::{Layout, SiteOrdering};

/// Which fermion action to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// `D = m · 1`.
    Mass,
    /// Nearest-neighbour Wilson.
    #[default]
    Wilson,
    /// Wilson + Hamber-Wu derivative.
    HamberWu,
    /// Wilson + Naik derivative.
    Naik,
}

/// Boxed action as built from a configuration.
pub type DynAction<const NC: usize> = Box<dyn FermionAction<NC> + Send + Sync>;

/// Parameters of one inversion run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InverterConfig {
    /// Lattice extents; the last dimension runs fastest in memory.
    pub shape: Vec<usize>,
    /// Storage ordering of sites.
    pub ordering: SiteOrdering,
    /// Fermion action.
    pub action: ActionKind,
    /// Bare quark mass.
    pub mass: f64,
    /// Boundary twist per direction as a fraction of 2π (0.5 = antiperiodic).
    pub twists: Vec<f64>,
    /// CG iteration budget.
    pub max_iterations: usize,
    /// CG relative residual target.
    pub tolerance: f64,
}

impl Default for InverterConfig {
    fn default() -> Self {
        Self {
            shape: vec![8, 4, 4, 4],
            ordering: SiteOrdering::Lexicographic,
            action: ActionKind::Wilson,
            mass: 0.1,
            twists: vec![0.0; 4],
            max_iterations: 1000,
            tolerance: 1e-8,
        }
    }
}

impl InverterConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// [`QuarkPropError::ConfigParse`] for malformed JSON or unknown keys,
    /// then anything [`InverterConfig::validate`] rejects.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// [`QuarkPropError::ConfigParse`] if serialization fails (non-finite floats).
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check internal consistency before anything is allocated.
    ///
    /// # Errors
    ///
    /// Invalid shape, twist count ≠ dimension count, non-finite mass or
    /// twist, zero iteration budget, non-positive tolerance, or an odd
    /// dimension count for a Wilson-type action.
    pub fn validate(&self) -> Result<()> {
        if self.shape.is_empty() {
            return Err(QuarkPropError::EmptyShape);
        }
        if let Some(dim) = self.shape.iter().position(|&n| n == 0) {
            return Err(QuarkPropError::ZeroExtent { dim });
        }
        if self.twists.len() != self.shape.len() {
            return Err(QuarkPropError::PhaseCount {
                expected: self.shape.len(),
                found: self.twists.len(),
            });
        }
        if !self.mass.is_finite() {
            return Err(QuarkPropError::InvalidParameter {
                name: "mass",
                reason: format!("must be finite, got {}", self.mass),
            });
        }
        if self.twists.iter().any(|t| !t.is_finite()) {
            return Err(QuarkPropError::InvalidParameter {
                name: "twists",
                reason: "must be finite".to_string(),
            });
        }
        if self.max_iterations == 0 {
            return Err(QuarkPropError::InvalidParameter {
                name: "max_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(QuarkPropError::InvalidParameter {
                name: "tolerance",
                reason: format!("must be positive and finite, got {}", self.tolerance),
            });
        }
        if self.action != ActionKind::Mass && self.shape.len() % 2 != 0 {
            return Err(QuarkPropError::UnsupportedDimensions {
                action: self.action.name(),
                num_dims: self.shape.len(),
            });
        }
        Ok(())
    }

    /// Shared layout for the configured shape and ordering.
    ///
    /// # Errors
    ///
    /// Invalid shape.
    pub fn layout(&self) -> Result<Arc<Layout>> {
        Ok(Arc::new(Layout::with_ordering(&self.shape, self.ordering)?))
    }

    /// Boundary phases from the configured twists.
    #[must_use]
    pub fn phases(&self) -> Vec<Complex64> {
        phases_from_twists(&self.twists)
    }

    /// Spin components of the fermion fields for this configuration.
    #[must_use]
    pub fn num_spins(&self) -> usize {
        num_spins(self.shape.len())
    }

    /// Build the configured action on `gauge_field`.
    ///
    /// # Errors
    ///
    /// Any action construction error.
    pub fn build_action<const NC: usize>(
        &self,
        gauge_field: &LatticeColourMatrix<NC>,
    ) -> Result<DynAction<NC>> {
        let phases = self.phases();
        Ok(match self.action {
            ActionKind::Mass => Box::new(MassAction::with_twists(self.mass, &self.twists)?),
            ActionKind::Wilson => Box::new(WilsonAction::with_phases(self.mass, gauge_field, &phases)?),
            ActionKind::HamberWu => {
                Box::new(HamberWuAction::with_phases(self.mass, gauge_field, &phases)?)
            }
            ActionKind::Naik => Box::new(NaikAction::with_phases(self.mass, gauge_field, &phases)?),
        })
    }
}

impl ActionKind {
    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mass => "mass",
            Self::Wilson => "Wilson",
            Self::HamberWu => "Hamber-Wu",
            Self::Naik => "Naik",
        }
    }
}
