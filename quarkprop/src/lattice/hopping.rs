// SPDX-License-Identifier: AGPL-3.0-only

//! Matrix-free hopping operator with a precomputed stencil.
//!
//! For a hop count `N` the operator couples each site to its `±N μ̂`
//! neighbours through path-ordered link products:
//!
//!   `B_μ(x) = U_μ(x-N) U_μ(x-N+1) ⋯ U_μ(x-1)`   (backward path, slot `2μ`)
//!   `F_μ(x) = U_μ(x) U_μ(x+1) ⋯ U_μ(x+N-1)`     (forward path, slot `2μ+1`)
//!
//! A boundary phase `φ_μ` multiplies a path once if it crosses the lattice
//! edge (`x_μ < N` for `B`, `x_μ + N ≥ L_μ` for `F`). Together with the spin
//! structures `S[2μ]`, `S[2μ+1]` the operator acts as
//!
//!   `(H ψ)(x) = Σ_μ S[2μ] F_μ(x) ψ(x+Nμ̂) + S[2μ+1] F_μ(x-Nμ̂)† ψ(x-Nμ̂)`
//!
//! Application is split in two phases so that the expensive part is a pure
//! per-site map:
//!
//! 1. **Contract** (parallel): at every site y build `S[2μ] B_μ(y) ψ(y)` and
//!    `S[2μ+1] F_μ(y)† ψ(y)` into a scratch buffer.
//! 2. **Scatter** (sequential, array order): add slot `2μ` to `out(y - Nμ̂)`
//!    and slot `2μ+1` to `out(y + Nμ̂)`.
//!
//! `B_μ(y) = F_μ(y - Nμ̂)`, so phase 2 reproduces the formula above while
//! phase 1 never reads another site's data.

use std::sync::Arc;

use nalgebra::DMatrix;
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::debug;

use super::colour::{ColourMatrix, ColourVector};
use super::field::{LatticeColourMatrix, LatticeColourVector};
use super::gamma::num_spins;
use super::gauge::check_gauge_field;
use super::layout::Layout;
use crate::error::{QuarkPropError, Result};

/// Non-zero entries `(row, col, value)` of one spin structure.
type SpinEntries = Vec<(usize, usize, Complex64)>;

/// Precomputed hopping stencil for one hop count.
#[derive(Clone, Debug)]
pub struct HoppingMatrix<const NC: usize> {
    layout: Arc<Layout>,
    num_hops: usize,
    num_spins: usize,
    scattered_gauge_field: LatticeColourMatrix<NC>,
    spin_structures: Vec<DMatrix<Complex64>>,
    spin_entries: Vec<SpinEntries>,
    neighbour_array_indices: Vec<usize>,
}

impl<const NC: usize> HoppingMatrix<NC> {
    /// Build the stencil from a gauge field, one boundary phase per
    /// dimension, a hop count, and `2D` spin structures of size `Ns × Ns`.
    ///
    /// # Errors
    ///
    /// Fails fast on any mismatch: gauge site size ≠ D, phase count ≠ D,
    /// hop count outside `1..=min(shape)`, spin-structure count ≠ 2D, or a
    /// spin structure that is not `Ns × Ns` with `Ns = 2^(D/2)`.
    pub fn new(
        gauge_field: &LatticeColourMatrix<NC>,
        phases: &[Complex64],
        num_hops: usize,
        spin_structures: Vec<DMatrix<Complex64>>,
    ) -> Result<Self> {
        let layout = Arc::clone(gauge_field.layout());
        let num_dims = layout.num_dims();
        let ns = num_spins(num_dims);

        check_gauge_field(gauge_field)?;
        if phases.len() != num_dims {
            return Err(QuarkPropError::PhaseCount {
                expected: num_dims,
                found: phases.len(),
            });
        }
        let max_hops = layout.shape().iter().copied().min().unwrap_or(0);
        if num_hops == 0 || num_hops > max_hops {
            return Err(QuarkPropError::InvalidHopCount {
                hops: num_hops,
                max: max_hops,
            });
        }
        if spin_structures.len() != 2 * num_dims {
            return Err(QuarkPropError::SpinStructureCount {
                expected: 2 * num_dims,
                found: spin_structures.len(),
            });
        }
        for (index, s) in spin_structures.iter().enumerate() {
            if s.nrows() != ns || s.ncols() != ns {
                return Err(QuarkPropError::SpinStructureShape {
                    index,
                    rows: s.nrows(),
                    cols: s.ncols(),
                    expected: ns,
                });
            }
        }

        let num_slots = 2 * num_dims;
        let mut scattered_gauge_field =
            LatticeColourMatrix::identities(Arc::clone(&layout), num_slots);
        let mut neighbour_array_indices = vec![0usize; layout.volume() * num_slots];
        let hops = num_hops as isize;

        scattered_gauge_field
            .as_mut_slice()
            .par_chunks_mut(num_slots)
            .zip(neighbour_array_indices.par_chunks_mut(num_slots))
            .enumerate()
            .for_each(|(array_index, (paths, neighbours))| {
                let site = layout.get_site_index(array_index);
                let coords = layout.compute_site_coords(site);
                for d in 0..num_dims {
                    let extent = layout.shape()[d] as isize;
                    let back_site = layout.shift_site_unchecked(site, d, -hops);
                    let fwd_site = layout.shift_site_unchecked(site, d, hops);

                    let mut backward = path_product(gauge_field, &layout, back_site, d, num_hops);
                    if coords[d] < hops {
                        backward = backward.scale_complex(phases[d]);
                    }
                    let mut forward = path_product(gauge_field, &layout, site, d, num_hops);
                    if coords[d] + hops >= extent {
                        forward = forward.scale_complex(phases[d]);
                    }

                    paths[2 * d] = backward;
                    paths[2 * d + 1] = forward;
                    neighbours[2 * d] = layout.get_array_index(back_site);
                    neighbours[2 * d + 1] = layout.get_array_index(fwd_site);
                }
            });

        let spin_entries = spin_structures
            .iter()
            .map(|s| {
                let mut entries = Vec::new();
                for row in 0..ns {
                    for col in 0..ns {
                        let v = s[(row, col)];
                        if v.norm_sqr() > 0.0 {
                            entries.push((row, col, v));
                        }
                    }
                }
                entries
            })
            .collect();

        debug!(
            shape = ?layout.shape(),
            num_hops,
            num_spins = ns,
            colours = NC,
            "built hopping matrix"
        );

        Ok(Self {
            layout,
            num_hops,
            num_spins: ns,
            scattered_gauge_field,
            spin_structures,
            spin_entries,
            neighbour_array_indices,
        })
    }

    /// Layout the stencil was built on.
    #[must_use]
    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    /// Hop count N.
    #[must_use]
    pub const fn num_hops(&self) -> usize {
        self.num_hops
    }

    /// Spin components per site of the fields this operator acts on.
    #[must_use]
    pub const fn num_spins(&self) -> usize {
        self.num_spins
    }

    /// The `2D` spin structures in slot order.
    #[must_use]
    pub fn spin_structures(&self) -> &[DMatrix<Complex64>] {
        &self.spin_structures
    }

    /// Path product at `array_index`; slot `2μ` backward, `2μ+1` forward.
    pub fn scattered_link(&self, array_index: usize, slot: usize) -> ColourMatrix<NC> {
        self.scattered_gauge_field[(array_index, slot)]
    }

    /// Array index `N` steps along `direction` from `array_index`.
    ///
    /// # Errors
    ///
    /// [`QuarkPropError::DirectionOutOfRange`] if `direction >= num_dims`.
    pub fn neighbour_array_index(
        &self,
        array_index: usize,
        direction: usize,
        forward: bool,
    ) -> Result<usize> {
        let num_dims = self.layout.num_dims();
        if direction >= num_dims {
            return Err(QuarkPropError::DirectionOutOfRange {
                direction,
                num_dims,
            });
        }
        let slot = 2 * direction + usize::from(forward);
        Ok(self.neighbour_array_indices[array_index * 2 * num_dims + slot])
    }

    /// Accept only fields on this layout with `Ns` components per site.
    ///
    /// # Errors
    ///
    /// [`QuarkPropError::LayoutMismatch`] or [`QuarkPropError::SiteSizeMismatch`].
    pub fn check_field(&self, field: &LatticeColourVector<NC>) -> Result<()> {
        if !field.same_layout(&self.scattered_gauge_field) {
            return Err(QuarkPropError::LayoutMismatch);
        }
        if field.site_size() != self.num_spins {
            return Err(QuarkPropError::SiteSizeMismatch {
                expected: self.num_spins,
                found: field.site_size(),
            });
        }
        Ok(())
    }

    /// Accumulate the hopping term: `out += H · fermion_in`.
    ///
    /// Both fields must pass [`HoppingMatrix::check_field`].
    pub fn apply_full(&self, out: &mut LatticeColourVector<NC>, fermion_in: &LatticeColourVector<NC>) {
        let ns = self.num_spins;
        let num_slots = self.spin_structures.len();
        let per_site = num_slots * ns;
        let volume = self.layout.volume();

        let mut pre_gather = vec![ColourVector::<NC>::zeros(); volume * per_site];
        pre_gather
            .par_chunks_mut(per_site)
            .enumerate()
            .for_each_init(
                || vec![ColourVector::<NC>::zeros(); ns],
                |transported, (array_index, buffer)| {
                    let psi = fermion_in.site(array_index);
                    for (slot, entries) in self.spin_entries.iter().enumerate() {
                        let path = self.scattered_gauge_field[(array_index, slot)];
                        let link = if slot % 2 == 0 { path } else { path.adjoint() };
                        for (t, &p) in transported.iter_mut().zip(psi) {
                            *t = link * p;
                        }
                        let dest = &mut buffer[slot * ns..(slot + 1) * ns];
                        for &(alpha, beta, coeff) in entries {
                            dest[alpha] += transported[beta] * coeff;
                        }
                    }
                },
            );

        let out_data = out.as_mut_slice();
        for array_index in 0..volume {
            for slot in 0..num_slots {
                let target = self.neighbour_array_indices[array_index * num_slots + slot];
                let src = array_index * per_site + slot * ns;
                for alpha in 0..ns {
                    out_data[target * ns + alpha] += pre_gather[src + alpha];
                }
            }
        }
    }
}

fn path_product<const NC: usize>(
    gauge_field: &LatticeColourMatrix<NC>,
    layout: &Layout,
    start_site: usize,
    direction: usize,
    num_hops: usize,
) -> ColourMatrix<NC> {
    (0..num_hops).fold(ColourMatrix::identity(), |acc, h| {
        let site = layout.shift_site_unchecked(start_site, direction, h as isize);
        acc * gauge_field[(layout.get_array_index(site), direction)]
    })
}
