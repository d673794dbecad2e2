// SPDX-License-Identifier: AGPL-3.0-only

//! Lattice fields: one flat arena of `volume × site_size` values.
//!
//! Element `(array_index, sub)` lives at `array_index * site_size + sub`.
//! The layout is shared through an `Arc`, so many fields (solution, residual,
//! search direction, gauge links) view the same geometry without copying it.
//!
//! | Alias | Element | Typical site size |
//! |-------|---------|-------------------|
//! | [`LatticeColourVector`] | [`ColourVector`] | number of spins |
//! | [`LatticeColourMatrix`] | [`ColourMatrix`] | D (gauge links), 2D (scattered paths) |

use std::ops::{Index, IndexMut};
use std::sync::Arc;

use num_complex::Complex64;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;

use super::colour::{ColourMatrix, ColourVector};
use super::constants::C_ZERO;
use super::layout::Layout;

/// Generic lattice field over a shared layout.
#[derive(Clone, Debug)]
pub struct LatticeField<T> {
    layout: Arc<Layout>,
    site_size: usize,
    data: Vec<T>,
}

/// Fermion field: `site_size` colour vectors per site.
pub type LatticeColourVector<const NC: usize> = LatticeField<ColourVector<NC>>;

/// Link field: `site_size` colour matrices per site.
pub type LatticeColourMatrix<const NC: usize> = LatticeField<ColourMatrix<NC>>;

impl<T: Clone> LatticeField<T> {
    /// Field with every element set to `fill`.
    #[must_use]
    pub fn filled(layout: Arc<Layout>, site_size: usize, fill: T) -> Self {
        let data = vec![fill; layout.volume() * site_size];
        Self {
            layout,
            site_size,
            data,
        }
    }
}

impl<T> LatticeField<T> {
    /// Shared layout.
    #[must_use]
    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    /// Total number of elements (`volume × site_size`).
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Number of sites.
    #[must_use]
    pub fn volume(&self) -> usize {
        self.layout.volume()
    }

    /// Number of lattice dimensions.
    #[must_use]
    pub fn num_dims(&self) -> usize {
        self.layout.num_dims()
    }

    /// Elements per site.
    #[must_use]
    pub const fn site_size(&self) -> usize {
        self.site_size
    }

    /// Elements of one site, by array index.
    #[must_use]
    pub fn site(&self, array_index: usize) -> &[T] {
        let start = array_index * self.site_size;
        &self.data[start..start + self.site_size]
    }

    /// Element at (possibly out-of-range, wrapped) coordinates.
    #[must_use]
    pub fn at_coords(&self, coords: &[isize], sub: usize) -> &T {
        &self[(self.layout.array_index_of(coords), sub)]
    }

    /// Mutable element at (possibly out-of-range, wrapped) coordinates.
    pub fn at_coords_mut(&mut self, coords: &[isize], sub: usize) -> &mut T {
        let array_index = self.layout.array_index_of(coords);
        &mut self[(array_index, sub)]
    }

    /// Flat array-ordered storage.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable flat array-ordered storage.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Whether `other` lives on the same (or an equal) layout.
    #[must_use]
    pub fn same_layout<U>(&self, other: &LatticeField<U>) -> bool {
        Arc::ptr_eq(&self.layout, &other.layout) || *self.layout == *other.layout
    }
}

impl<T> Index<usize> for LatticeField<T> {
    type Output = T;
    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T> IndexMut<usize> for LatticeField<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }
}

impl<T> Index<(usize, usize)> for LatticeField<T> {
    type Output = T;
    fn index(&self, (array_index, sub): (usize, usize)) -> &T {
        &self.data[array_index * self.site_size + sub]
    }
}

impl<T> IndexMut<(usize, usize)> for LatticeField<T> {
    fn index_mut(&mut self, (array_index, sub): (usize, usize)) -> &mut T {
        &mut self.data[array_index * self.site_size + sub]
    }
}

impl<const NC: usize> LatticeColourVector<NC> {
    /// Zero fermion field.
    #[must_use]
    pub fn zeros(layout: Arc<Layout>, site_size: usize) -> Self {
        Self::filled(layout, site_size, ColourVector::zeros())
    }

    /// Zero field with the same layout and site size as `self`.
    #[must_use]
    pub fn zeros_like(&self) -> Self {
        Self::zeros(Arc::clone(&self.layout), self.site_size)
    }

    /// Unit point source at `coords`, spin `spin`, colour `colour`.
    #[must_use]
    pub fn point_source(
        layout: Arc<Layout>,
        site_size: usize,
        coords: &[isize],
        spin: usize,
        colour: usize,
    ) -> Self {
        let mut field = Self::zeros(layout, site_size);
        *field.at_coords_mut(coords, spin) = ColourVector::unit(colour);
        field
    }

    /// Gaussian random field, reproducible from `seed`.
    #[must_use]
    pub fn random(layout: Arc<Layout>, site_size: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut field = Self::zeros(layout, site_size);
        for v in &mut field.data {
            for z in &mut v.0 {
                *z = Complex64::new(rng.sample(StandardNormal), rng.sample(StandardNormal));
            }
        }
        field
    }

    /// Inner product `<self|other> = Σ conj(self) · other`.
    ///
    /// Sequential so that the sum order does not depend on the thread pool.
    #[must_use]
    pub fn dot(&self, other: &Self) -> Complex64 {
        self.data
            .iter()
            .zip(&other.data)
            .fold(C_ZERO, |acc, (a, b)| acc + a.dot(b))
    }

    /// `‖self‖²`
    #[must_use]
    pub fn norm_sq(&self) -> f64 {
        self.data.iter().map(ColourVector::norm_sq).sum()
    }

    /// `self += a · x`
    pub fn axpy(&mut self, a: Complex64, x: &Self) {
        self.data
            .par_iter_mut()
            .zip(x.data.par_iter())
            .for_each(|(y, &xv)| *y += xv * a);
    }

    /// `self = x + a · self`
    pub fn xpay(&mut self, x: &Self, a: Complex64) {
        self.data
            .par_iter_mut()
            .zip(x.data.par_iter())
            .for_each(|(y, &xv)| *y = xv + *y * a);
    }

    /// `self *= s`
    pub fn scale(&mut self, s: f64) {
        self.data.par_iter_mut().for_each(|y| *y = y.scale(s));
    }

    /// Overwrite with the contents of `other` (same layout assumed).
    pub fn copy_from(&mut self, other: &Self) {
        self.data.copy_from_slice(&other.data);
    }

    /// Set every element to zero.
    pub fn set_zero(&mut self) {
        self.data.fill(ColourVector::zeros());
    }
}

impl<const NC: usize> LatticeColourMatrix<NC> {
    /// Field with every element the identity.
    #[must_use]
    pub fn identities(layout: Arc<Layout>, site_size: usize) -> Self {
        Self::filled(layout, site_size, ColourMatrix::identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::layout::SiteOrdering;
    use approx::assert_abs_diff_eq;

    fn layout() -> Arc<Layout> {
        Arc::new(Layout::new(&[4, 2, 2]).unwrap())
    }

    #[test]
    fn size_and_indexing_agree() {
        let mut f = LatticeColourVector::<3>::zeros(layout(), 2);
        assert_eq!(f.size(), 32);
        assert_eq!(f.volume(), 16);
        assert_eq!(f.num_dims(), 3);
        f[(5, 1)] = ColourVector::unit(2);
        assert_eq!(f[11], ColourVector::unit(2));
        assert_eq!(f.site(5)[1], ColourVector::unit(2));
    }

    #[test]
    fn at_coords_wraps_and_honours_ordering() {
        let layout = Arc::new(Layout::with_ordering(&[4, 4], SiteOrdering::EvenOdd).unwrap());
        let f = LatticeColourVector::<1>::point_source(Arc::clone(&layout), 1, &[-1, 5], 0, 0);
        let array = layout.array_index_of(&[3, 1]);
        assert_eq!(f[(array, 0)], ColourVector::unit(0));
        assert_abs_diff_eq!(f.norm_sq(), 1.0);
    }

    #[test]
    fn random_is_reproducible() {
        let a = LatticeColourVector::<3>::random(layout(), 4, 42);
        let b = LatticeColourVector::<3>::random(layout(), 4, 42);
        let c = LatticeColourVector::<3>::random(layout(), 4, 43);
        assert_eq!(a.as_slice(), b.as_slice());
        assert_ne!(a.as_slice(), c.as_slice());
    }

    #[test]
    fn dot_of_self_is_norm_sq() {
        let a = LatticeColourVector::<3>::random(layout(), 4, 1);
        let d = a.dot(&a);
        assert_abs_diff_eq!(d.re, a.norm_sq(), epsilon = 1e-10);
        assert_abs_diff_eq!(d.im, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn axpy_and_xpay() {
        let x = LatticeColourVector::<3>::random(layout(), 4, 2);
        let mut y = x.zeros_like();
        y.axpy(Complex64::new(2.0, 0.0), &x);
        assert_abs_diff_eq!(y.norm_sq(), 4.0 * x.norm_sq(), epsilon = 1e-10);

        // y = x + (-0.5) * (2x) = 0
        y.xpay(&x, Complex64::new(-0.5, 0.0));
        assert!(y.norm_sq() < 1e-20);

        let mut z = x.clone();
        z.scale(3.0);
        assert_abs_diff_eq!(z.norm_sq(), 9.0 * x.norm_sq(), epsilon = 1e-10);
        z.set_zero();
        assert_eq!(z.norm_sq(), 0.0);
    }

    #[test]
    fn same_layout_ignores_site_size() {
        let a = LatticeColourVector::<3>::zeros(layout(), 4);
        let c = LatticeColourVector::<3>::zeros(layout(), 2);
        let other = Arc::new(Layout::new(&[2, 4, 2]).unwrap());
        let d = LatticeColourVector::<3>::zeros(other, 4);
        let links = LatticeColourMatrix::<3>::identities(layout(), 3);
        assert!(a.same_layout(&c));
        assert!(a.same_layout(&links));
        assert!(!a.same_layout(&d));
    }
}
