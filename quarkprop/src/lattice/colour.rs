// SPDX-License-Identifier: AGPL-3.0-only

//! Colour-space value types: NC-component vectors and NC×NC link matrices.
//!
//! A link `U_μ(x)` is an SU(NC) matrix, the parallel transporter along μ
//! from site x. Both types are `Copy` and sized at compile time through the
//! const parameter `NC`, so per-site arithmetic never allocates.
//!
//! Storage: row-major, `m[row][col]`.
//!
//! # References
//!
//! - Gattringer & Lang, "QCD on the Lattice" (2010), Ch. 2

use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub, SubAssign};

use num_complex::Complex64;
use rand::Rng;
use rand_distr::StandardNormal;

use super::constants::{C_ONE, C_ZERO, LATTICE_DIVISION_GUARD};

/// Colour vector: one complex amplitude per colour.
#[derive(Clone, Copy, Debug, PartialEq)]
#[must_use]
pub struct ColourVector<const NC: usize>(pub [Complex64; NC]);

impl<const NC: usize> ColourVector<NC> {
    /// All components zero.
    pub const fn zeros() -> Self {
        Self([C_ZERO; NC])
    }

    /// Unit vector along colour `c`.
    pub fn unit(c: usize) -> Self {
        let mut v = Self::zeros();
        v.0[c] = C_ONE;
        v
    }

    /// Hermitian inner product `Σ_c conj(self_c) · other_c`.
    #[must_use]
    pub fn dot(&self, other: &Self) -> Complex64 {
        self.0
            .iter()
            .zip(&other.0)
            .fold(C_ZERO, |acc, (a, b)| acc + a.conj() * b)
    }

    /// `Σ_c |v_c|²`
    #[must_use]
    pub fn norm_sq(&self) -> f64 {
        self.0.iter().map(Complex64::norm_sqr).sum()
    }

    /// Multiply every component by a real number.
    pub fn scale(self, s: f64) -> Self {
        Self(self.0.map(|z| z.scale(s)))
    }
}

impl<const NC: usize> Default for ColourVector<NC> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<const NC: usize> Index<usize> for ColourVector<NC> {
    type Output = Complex64;
    fn index(&self, c: usize) -> &Complex64 {
        &self.0[c]
    }
}

impl<const NC: usize> IndexMut<usize> for ColourVector<NC> {
    fn index_mut(&mut self, c: usize) -> &mut Complex64 {
        &mut self.0[c]
    }
}

impl<const NC: usize> Add for ColourVector<NC> {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<const NC: usize> AddAssign for ColourVector<NC> {
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}

impl<const NC: usize> Sub for ColourVector<NC> {
    type Output = Self;
    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

impl<const NC: usize> SubAssign for ColourVector<NC> {
    fn sub_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a -= b;
        }
    }
}

impl<const NC: usize> Neg for ColourVector<NC> {
    type Output = Self;
    fn neg(self) -> Self {
        Self(self.0.map(|z| -z))
    }
}

impl<const NC: usize> Mul<Complex64> for ColourVector<NC> {
    type Output = Self;
    fn mul(self, s: Complex64) -> Self {
        Self(self.0.map(|z| z * s))
    }
}

/// NC×NC complex matrix: gauge link, path product, or gauge rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[must_use]
pub struct ColourMatrix<const NC: usize> {
    /// Matrix elements m[row][col].
    pub m: [[Complex64; NC]; NC],
}

impl<const NC: usize> ColourMatrix<NC> {
    /// Zero matrix.
    pub const fn zeros() -> Self {
        Self {
            m: [[C_ZERO; NC]; NC],
        }
    }

    /// Identity matrix.
    pub fn identity() -> Self {
        let mut r = Self::zeros();
        for i in 0..NC {
            r.m[i][i] = C_ONE;
        }
        r
    }

    /// Conjugate transpose.
    pub fn adjoint(&self) -> Self {
        let mut r = Self::zeros();
        for i in 0..NC {
            for j in 0..NC {
                r.m[i][j] = self.m[j][i].conj();
            }
        }
        r
    }

    /// Tr(U)
    #[must_use]
    pub fn trace(&self) -> Complex64 {
        (0..NC).fold(C_ZERO, |acc, i| acc + self.m[i][i])
    }

    /// Real part of the trace.
    #[must_use]
    pub fn re_trace(&self) -> f64 {
        (0..NC).map(|i| self.m[i][i].re).sum()
    }

    /// Determinant by LU decomposition with partial pivoting.
    #[must_use]
    pub fn determinant(&self) -> Complex64 {
        let mut a = self.m;
        let mut det = C_ONE;
        for k in 0..NC {
            let pivot = (k..NC)
                .max_by(|&i, &j| a[i][k].norm_sqr().total_cmp(&a[j][k].norm_sqr()))
                .unwrap_or(k);
            if a[pivot][k].norm() < LATTICE_DIVISION_GUARD {
                return C_ZERO;
            }
            if pivot != k {
                a.swap(pivot, k);
                det = -det;
            }
            det *= a[k][k];
            let inv = C_ONE / a[k][k];
            for i in k + 1..NC {
                let factor = a[i][k] * inv;
                for j in k..NC {
                    let sub = factor * a[k][j];
                    a[i][j] -= sub;
                }
            }
        }
        det
    }

    /// Multiply every element by a complex number.
    pub fn scale_complex(&self, s: Complex64) -> Self {
        Self {
            m: self.m.map(|row| row.map(|z| z * s)),
        }
    }

    /// Frobenius norm squared: Σ |m_ij|²
    #[must_use]
    pub fn norm_sq(&self) -> f64 {
        self.m.iter().flatten().map(Complex64::norm_sqr).sum()
    }

    /// Project onto SU(NC): Gram-Schmidt on the rows, then rotate the last
    /// row so that det = 1.
    pub fn reunitarize(&self) -> Self {
        let mut u = self.m;
        for i in 0..NC {
            for k in 0..i {
                let overlap = (0..NC).fold(C_ZERO, |acc, j| acc + u[k][j].conj() * u[i][j]);
                for j in 0..NC {
                    let sub = overlap * u[k][j];
                    u[i][j] -= sub;
                }
            }
            let norm = u[i].iter().map(Complex64::norm_sqr).sum::<f64>().sqrt();
            if norm > LATTICE_DIVISION_GUARD {
                let inv = 1.0 / norm;
                for z in &mut u[i] {
                    *z = z.scale(inv);
                }
            }
        }
        let mut r = Self { m: u };
        let det = r.determinant();
        if NC > 0 && det.norm() > LATTICE_DIVISION_GUARD {
            let fix = det.conj() / det.norm();
            for z in &mut r.m[NC - 1] {
                *z *= fix;
            }
        }
        r
    }

    /// Random SU(NC) matrix: Gaussian entries projected onto the group.
    pub fn random_special_unitary<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut r = Self::zeros();
        for z in r.m.iter_mut().flatten() {
            *z = Complex64::new(rng.sample(StandardNormal), rng.sample(StandardNormal));
        }
        r.reunitarize()
    }
}

impl<const NC: usize> Default for ColourMatrix<NC> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<const NC: usize> Mul for ColourMatrix<NC> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let mut r = Self::zeros();
        for i in 0..NC {
            for j in 0..NC {
                r.m[i][j] = (0..NC).fold(C_ZERO, |acc, k| acc + self.m[i][k] * rhs.m[k][j]);
            }
        }
        r
    }
}

impl<const NC: usize> Mul<ColourVector<NC>> for ColourMatrix<NC> {
    type Output = ColourVector<NC>;
    fn mul(self, v: ColourVector<NC>) -> ColourVector<NC> {
        let mut r = ColourVector::zeros();
        for i in 0..NC {
            r.0[i] = (0..NC).fold(C_ZERO, |acc, k| acc + self.m[i][k] * v.0[k]);
        }
        r
    }
}

impl<const NC: usize> Add for ColourMatrix<NC> {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self {
        for (a, b) in self.m.iter_mut().flatten().zip(rhs.m.iter().flatten()) {
            *a += b;
        }
        self
    }
}

impl<const NC: usize> Sub for ColourMatrix<NC> {
    type Output = Self;
    fn sub(mut self, rhs: Self) -> Self {
        for (a, b) in self.m.iter_mut().flatten().zip(rhs.m.iter().flatten()) {
            *a -= b;
        }
        self
    }
}
