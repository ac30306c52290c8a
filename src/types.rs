use core::marker::PhantomData;

use zeroize::Zeroize;

use crate::Q;

/// An element of `Z_q`, stored as `u16` but reduced with `u32`/`u64` arithmetic.
///
/// Construction and arithmetic are branch-free with respect to the value of the
/// coefficient: `add`/`sub`/`mul` never take a data-dependent branch or index.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Z(u16);

#[allow(clippy::inline_always)]
impl Z {
    const M: u64 = 2u64.pow(32) / Self::Q64;
    #[allow(clippy::cast_possible_truncation)]
    const Q16: u16 = Q as u16;
    const Q64: u64 = Q as u64;

    pub(crate) const fn new(a: u16) -> Self { Self(a) }

    pub(crate) fn get_u16(self) -> u16 { self.0 }

    pub(crate) fn get_u32(self) -> u32 { u32::from(self.0) }

    pub(crate) fn set_u16(&mut self, a: u16) { self.0 = a; }

    #[inline(always)]
    pub(crate) fn add(self, other: Self) -> Self {
        let sum = self.0.wrapping_add(other.0);
        let (trial, borrow) = sum.overflowing_sub(Self::Q16);
        Self(if borrow { sum } else { trial })
    }

    #[inline(always)]
    pub(crate) fn sub(self, other: Self) -> Self {
        let (diff, borrow) = self.0.overflowing_sub(other.0);
        let trial = diff.wrapping_add(Self::Q16);
        Self(if borrow { trial } else { diff })
    }

    #[inline(always)]
    pub(crate) fn mul(self, other: Self) -> Self {
        let prod = u64::from(self.0) * u64::from(other.0);
        let quot = (prod * Self::M) >> 32;
        let rem = prod - quot * Self::Q64;
        let (diff, borrow) = rem.overflowing_sub(Self::Q64);
        #[allow(clippy::cast_possible_truncation)]
        let result = (if borrow { rem } else { diff }) as u16;
        Self(result)
    }
}

impl Zeroize for Z {
    fn zeroize(&mut self) { self.0.zeroize(); }
}

/// Marker for a polynomial whose coefficients are in standard (coefficient) basis.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Normal;

/// Marker for a polynomial whose coefficients are in NTT (frequency) basis.
#[derive(Clone, Copy, Debug)]
pub(crate) struct NttDomain;

/// A degree-256 polynomial over `Z_q`, tagged at compile time with its representation mode.
///
/// `ntt()`/`intt()` consume one mode and produce the other; there is no safe way to apply `ntt`
/// twice, or to pointwise-multiply a `Normal`-mode polynomial, because the types don't line up.
#[derive(Clone, Copy)]
pub(crate) struct Polynomial<Mode> {
    coeffs: [Z; 256],
    _mode: PhantomData<Mode>,
}

impl<Mode> Default for Polynomial<Mode> {
    fn default() -> Self { Self { coeffs: [Z::default(); 256], _mode: PhantomData } }
}

impl<Mode> Polynomial<Mode> {
    pub(crate) fn from_coeffs(coeffs: [Z; 256]) -> Self { Self { coeffs, _mode: PhantomData } }

    pub(crate) fn coeffs(&self) -> &[Z; 256] { &self.coeffs }

    pub(crate) fn coeffs_mut(&mut self) -> &mut [Z; 256] { &mut self.coeffs }

    pub(crate) fn into_coeffs(self) -> [Z; 256] { self.coeffs }

    pub(crate) fn add(&self, other: &Self) -> Self {
        Self::from_coeffs(core::array::from_fn(|i| self.coeffs[i].add(other.coeffs[i])))
    }

    pub(crate) fn sub(&self, other: &Self) -> Self {
        Self::from_coeffs(core::array::from_fn(|i| self.coeffs[i].sub(other.coeffs[i])))
    }
}

impl<Mode> Zeroize for Polynomial<Mode> {
    fn zeroize(&mut self) { self.coeffs.zeroize(); }
}

pub(crate) type PolyNormal = Polynomial<Normal>;
pub(crate) type PolyNtt = Polynomial<NttDomain>;

/// A vector of `K` polynomials sharing a representation mode.
#[derive(Clone)]
pub(crate) struct PolyVec<Mode, const K: usize> {
    polys: [Polynomial<Mode>; K],
}

impl<Mode, const K: usize> PolyVec<Mode, K> {
    pub(crate) fn from_fn(f: impl FnMut(usize) -> Polynomial<Mode>) -> Self {
        Self { polys: core::array::from_fn(f) }
    }

    pub(crate) fn from_array(polys: [Polynomial<Mode>; K]) -> Self { Self { polys } }

    pub(crate) fn as_slice(&self) -> &[Polynomial<Mode>; K] { &self.polys }

    pub(crate) fn as_slice_mut(&mut self) -> &mut [Polynomial<Mode>; K] { &mut self.polys }

    pub(crate) fn into_array(self) -> [Polynomial<Mode>; K] { self.polys }
}

impl<Mode: Copy, const K: usize> PolyVec<Mode, K> {
    pub(crate) fn sub(&self, other: &Self) -> Self {
        Self::from_fn(|i| self.polys[i].sub(&other.polys[i]))
    }
}

impl<Mode, const K: usize> Zeroize for PolyVec<Mode, K> {
    fn zeroize(&mut self) { self.polys.iter_mut().for_each(Zeroize::zeroize); }
}

/// A `K`x`K` matrix of NTT-domain polynomials, row-major.
pub(crate) struct Matrix<const K: usize> {
    rows: [[PolyNtt; K]; K],
}

impl<const K: usize> Matrix<K> {
    pub(crate) fn from_fn(mut f: impl FnMut(usize, usize) -> PolyNtt) -> Self {
        Self { rows: core::array::from_fn(|i| core::array::from_fn(|j| f(i, j))) }
    }

    pub(crate) fn at(&self, i: usize, j: usize) -> &PolyNtt { &self.rows[i][j] }
}
