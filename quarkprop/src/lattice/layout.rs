// SPDX-License-Identifier: AGPL-3.0-only

//! Lattice geometry: site index ↔ coordinates ↔ storage (array) index.
//!
//! A site index is lexicographic over the shape with the LAST dimension
//! running fastest:
//!
//!   `site = Σ_d x_d · stride_d`,  `stride_{D-1} = 1`,  `stride_d = stride_{d+1} · N_{d+1}`
//!
//! Fields are stored by array index, which is a permutation of the site
//! index chosen by [`SiteOrdering`]. Every consumer goes through
//! [`Layout::get_array_index`], so a non-trivial ordering changes storage
//! without changing any physics.
//!
//! Coordinates are signed so that backward steps can be expressed directly;
//! [`Layout::sanitize_site_coords`] wraps them periodically.

use serde::{Deserialize, Serialize};

use crate::error::{QuarkPropError, Result};

/// Storage permutation of lattice sites.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteOrdering {
    /// Array index equals site index.
    #[default]
    Lexicographic,
    /// Checkerboard: sites with even coordinate sum first, then odd,
    /// each block in lexicographic order.
    EvenOdd,
}

/// Shape, strides, and the site/array permutation of a D-dimensional lattice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    shape: Vec<usize>,
    strides: Vec<usize>,
    volume: usize,
    ordering: SiteOrdering,
    site_to_array: Vec<usize>,
    array_to_site: Vec<usize>,
}

impl Layout {
    /// Lexicographic layout over `shape`.
    ///
    /// # Errors
    ///
    /// [`QuarkPropError::EmptyShape`] for zero dimensions and
    /// [`QuarkPropError::ZeroExtent`] for any zero extent.
    pub fn new(shape: &[usize]) -> Result<Self> {
        Self::with_ordering(shape, SiteOrdering::Lexicographic)
    }

    /// Layout over `shape` with an explicit storage ordering.
    ///
    /// # Errors
    ///
    /// Same as [`Layout::new`].
    pub fn with_ordering(shape: &[usize], ordering: SiteOrdering) -> Result<Self> {
        if shape.is_empty() {
            return Err(QuarkPropError::EmptyShape);
        }
        if let Some(dim) = shape.iter().position(|&n| n == 0) {
            return Err(QuarkPropError::ZeroExtent { dim });
        }

        let mut strides = vec![1usize; shape.len()];
        for d in (0..shape.len() - 1).rev() {
            strides[d] = strides[d + 1] * shape[d + 1];
        }
        let volume: usize = shape.iter().product();

        let mut layout = Self {
            shape: shape.to_vec(),
            strides,
            volume,
            ordering,
            site_to_array: Vec::new(),
            array_to_site: Vec::new(),
        };

        let array_to_site: Vec<usize> = match ordering {
            SiteOrdering::Lexicographic => (0..volume).collect(),
            SiteOrdering::EvenOdd => {
                let (even, odd): (Vec<usize>, Vec<usize>) =
                    (0..volume).partition(|&site| layout.site_parity(site) == 0);
                even.into_iter().chain(odd).collect()
            }
        };
        let mut site_to_array = vec![0usize; volume];
        for (array, &site) in array_to_site.iter().enumerate() {
            site_to_array[site] = array;
        }
        layout.site_to_array = site_to_array;
        layout.array_to_site = array_to_site;
        Ok(layout)
    }

    /// Number of sites.
    #[must_use]
    pub const fn volume(&self) -> usize {
        self.volume
    }

    /// Number of dimensions D.
    #[must_use]
    pub fn num_dims(&self) -> usize {
        self.shape.len()
    }

    /// Extent in each dimension.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Storage ordering.
    #[must_use]
    pub const fn ordering(&self) -> SiteOrdering {
        self.ordering
    }

    /// Storage position of a lexicographic site.
    #[must_use]
    pub fn get_array_index(&self, site: usize) -> usize {
        self.site_to_array[site]
    }

    /// Lexicographic site stored at `array_index`.
    #[must_use]
    pub fn get_site_index(&self, array_index: usize) -> usize {
        self.array_to_site[array_index]
    }

    /// Coordinates of a lexicographic site, each in `[0, shape[d])`.
    #[must_use]
    pub fn compute_site_coords(&self, site: usize) -> Vec<isize> {
        let mut rem = site;
        self.strides
            .iter()
            .map(|&stride| {
                let x = rem / stride;
                rem %= stride;
                x as isize
            })
            .collect()
    }

    /// Wrap every coordinate into `[0, shape[d])`.
    pub fn sanitize_site_coords(&self, coords: &mut [isize]) {
        for (x, &n) in coords.iter_mut().zip(&self.shape) {
            *x = x.rem_euclid(n as isize);
        }
    }

    /// Lexicographic site of (possibly out-of-range) coordinates.
    #[must_use]
    pub fn site_index_of(&self, coords: &[isize]) -> usize {
        coords
            .iter()
            .zip(&self.shape)
            .zip(&self.strides)
            .map(|((&x, &n), &stride)| x.rem_euclid(n as isize) as usize * stride)
            .sum()
    }

    /// Array index of (possibly out-of-range) coordinates.
    #[must_use]
    pub fn array_index_of(&self, coords: &[isize]) -> usize {
        self.get_array_index(self.site_index_of(coords))
    }

    /// Site reached by moving `offset` steps along `direction`, wrapping periodically.
    ///
    /// # Errors
    ///
    /// [`QuarkPropError::DirectionOutOfRange`] if `direction >= num_dims`.
    pub fn shift_site(&self, site: usize, direction: usize, offset: isize) -> Result<usize> {
        if direction >= self.num_dims() {
            return Err(QuarkPropError::DirectionOutOfRange {
                direction,
                num_dims: self.num_dims(),
            });
        }
        Ok(self.shift_site_unchecked(site, direction, offset))
    }

    pub(crate) fn shift_site_unchecked(&self, site: usize, direction: usize, offset: isize) -> usize {
        let n = self.shape[direction] as isize;
        let stride = self.strides[direction];
        let x = ((site / stride) as isize) % n;
        let shifted = (x + offset).rem_euclid(n);
        (site as isize + (shifted - x) * stride as isize) as usize
    }

    /// Parity (0 or 1) of the coordinate sum of a lexicographic site.
    #[must_use]
    pub fn site_parity(&self, site: usize) -> usize {
        let sum: isize = self.compute_site_coords(site).iter().sum();
        (sum as usize) % 2
    }
}
