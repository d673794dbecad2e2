// SPDX-License-Identifier: AGPL-3.0-only

//! Gauge-field snapshots and gauge transformations.
//!
//! A gauge field is a [`LatticeColourMatrix`] with one link per direction
//! (`site_size == num_dims`). Links are stored as `U[(array_index, mu)]`.
//!
//! Only initial configurations are produced here: cold (all links unity)
//! and hot (independent random SU(NC) links). Importance sampling of the
//! gauge ensemble is out of scope; generated ensembles are expected to be
//! loaded into a field by the caller.
//!
//! Under a gauge rotation `g(x)`:
//!
//!   `U_μ(x) → g(x) U_μ(x) g(x+μ)†`,  `ψ(x) → g(x) ψ(x)`
//!
//! and every gauge-covariant operator obeys `D[U^g] (gψ) = g (D[U] ψ)`.
//!
//! # References
//!
//! - Wilson, PRD 10, 2445 (1974)
//! - Gattringer & Lang, "QCD on the Lattice" (2010), Ch. 3

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::colour::ColourMatrix;
use super::field::{LatticeColourMatrix, LatticeColourVector, LatticeField};
use super::layout::Layout;
use crate::error::{QuarkPropError, Result};

impl<const NC: usize> LatticeColourMatrix<NC> {
    /// Cold start: every link is the identity.
    #[must_use]
    pub fn cold_start(layout: Arc<Layout>) -> Self {
        let num_dims = layout.num_dims();
        Self::identities(layout, num_dims)
    }

    /// Hot start: independent random SU(NC) links, reproducible from `seed`.
    ///
    /// SU(1) is trivial, so for `NC = 1` this is the same field as
    /// [`LatticeColourMatrix::cold_start`].
    #[must_use]
    pub fn hot_start(layout: Arc<Layout>, seed: u64) -> Self {
        let num_dims = layout.num_dims();
        random_links(layout, num_dims, seed)
    }

    /// Link `U_mu(x)` at (possibly wrapped) coordinates.
    pub fn link(&self, coords: &[isize], mu: usize) -> ColourMatrix<NC> {
        *self.at_coords(coords, mu)
    }

    /// Plaquette `P_μν(x) = U_μ(x) U_ν(x+μ) U_μ(x+ν)† U_ν(x)†`.
    pub fn plaquette(&self, coords: &[isize], mu: usize, nu: usize) -> ColourMatrix<NC> {
        let mut x_mu = coords.to_vec();
        x_mu[mu] += 1;
        let mut x_nu = coords.to_vec();
        x_nu[nu] += 1;

        self.link(coords, mu)
            * self.link(&x_mu, nu)
            * self.link(&x_nu, mu).adjoint()
            * self.link(coords, nu).adjoint()
    }

    /// Average plaquette `<Re Tr P / NC>` over all sites and planes.
    ///
    /// 1.0 for a cold start, near 0 for a hot start. A one-dimensional
    /// lattice has no plaquettes and reports 1.0.
    #[must_use]
    pub fn average_plaquette(&self) -> f64 {
        let layout = self.layout();
        let num_dims = layout.num_dims();
        let planes = num_dims * num_dims.saturating_sub(1) / 2;
        if planes == 0 || NC == 0 {
            return 1.0;
        }
        let sum: f64 = (0..layout.volume())
            .map(|site| {
                let x = layout.compute_site_coords(site);
                let mut s = 0.0;
                for mu in 0..num_dims {
                    for nu in mu + 1..num_dims {
                        s += self.plaquette(&x, mu, nu).re_trace();
                    }
                }
                s
            })
            .sum();
        sum / (layout.volume() * planes * NC) as f64
    }

    /// Gauge-transformed copy `U_μ(x) → g(x) U_μ(x) g(x+μ)†`.
    ///
    /// # Errors
    ///
    /// [`QuarkPropError::SiteSizeMismatch`] if `self` is not a gauge field
    /// or `rotation` is not one matrix per site, and
    /// [`QuarkPropError::LayoutMismatch`] if their layouts differ.
    pub fn gauge_transformed(&self, rotation: &Self) -> Result<Self> {
        let layout = Arc::clone(self.layout());
        let num_dims = layout.num_dims();
        check_gauge_field(self)?;
        check_rotation(rotation, self)?;

        let mut out = self.clone();
        out.as_mut_slice()
            .par_chunks_mut(num_dims)
            .enumerate()
            .for_each(|(array_index, links)| {
                let site = layout.get_site_index(array_index);
                let g = rotation[(array_index, 0)];
                for (mu, link) in links.iter_mut().enumerate() {
                    let fwd = layout.get_array_index(layout.shift_site_unchecked(site, mu, 1));
                    *link = g * *link * rotation[(fwd, 0)].adjoint();
                }
            });
        Ok(out)
    }
}

/// Random SU(NC) rotation, one matrix per site.
#[must_use]
pub fn random_gauge_rotation<const NC: usize>(
    layout: Arc<Layout>,
    seed: u64,
) -> LatticeColourMatrix<NC> {
    random_links(layout, 1, seed)
}

/// Rotate a fermion field: `ψ(x) → g(x) ψ(x)` for every spin component.
///
/// # Errors
///
/// [`QuarkPropError::SiteSizeMismatch`] or [`QuarkPropError::LayoutMismatch`]
/// if `rotation` is not one matrix per site of the fermion's layout.
pub fn rotate_fermion<const NC: usize>(
    fermion: &LatticeColourVector<NC>,
    rotation: &LatticeColourMatrix<NC>,
) -> Result<LatticeColourVector<NC>> {
    check_rotation(rotation, fermion)?;
    let mut out = fermion.clone();
    let site_size = out.site_size();
    out.as_mut_slice()
        .par_chunks_mut(site_size.max(1))
        .enumerate()
        .for_each(|(array_index, spins)| {
            let g = rotation[(array_index, 0)];
            for v in spins {
                *v = g * *v;
            }
        });
    Ok(out)
}

pub(crate) fn check_gauge_field<const NC: usize>(gauge: &LatticeColourMatrix<NC>) -> Result<()> {
    if gauge.site_size() != gauge.num_dims() {
        return Err(QuarkPropError::SiteSizeMismatch {
            expected: gauge.num_dims(),
            found: gauge.site_size(),
        });
    }
    Ok(())
}

fn check_rotation<T, const NC: usize>(
    rotation: &LatticeColourMatrix<NC>,
    field: &LatticeField<T>,
) -> Result<()> {
    if rotation.site_size() != 1 {
        return Err(QuarkPropError::SiteSizeMismatch {
            expected: 1,
            found: rotation.site_size(),
        });
    }
    if !rotation.same_layout(field) {
        return Err(QuarkPropError::LayoutMismatch);
    }
    Ok(())
}

fn random_links<const NC: usize>(
    layout: Arc<Layout>,
    site_size: usize,
    seed: u64,
) -> LatticeColourMatrix<NC> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut field = LatticeColourMatrix::identities(layout, site_size);
    for u in field.as_mut_slice() {
        *u = ColourMatrix::random_special_unitary(&mut rng);
    }
    field
}
