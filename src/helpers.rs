use sha3::{Digest, Sha3_256, Sha3_512};

use crate::ntt::polymul;
use crate::types::{Matrix, NttDomain, PolyVec, Polynomial, Z};
use crate::xof::shake256_once;
use crate::Q;

/// If the condition is not met, return an error message. Borrowed from the `anyhow` crate.
macro_rules! ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return Err($msg);
        }
    };
}

pub(crate) use ensure;

/// Vector addition, element-wise over `K` polynomials.
#[must_use]
pub(crate) fn add_vecs<Mode, const K: usize>(
    vec_a: &PolyVec<Mode, K>, vec_b: &PolyVec<Mode, K>,
) -> PolyVec<Mode, K> {
    let (a, b) = (vec_a.as_slice(), vec_b.as_slice());
    PolyVec::from_fn(|k| a[k].add(&b[k]))
}

/// Matrix by vector multiplication: `w_hat = A_hat * u_hat`.
#[must_use]
pub(crate) fn mul_mat_vec<const K: usize>(
    a_hat: &Matrix<K>, u_hat: &PolyVec<NttDomain, K>,
) -> PolyVec<NttDomain, K> {
    let u = u_hat.as_slice();
    PolyVec::from_fn(|i| {
        (0..K).fold(Polynomial::default(), |acc, j| acc.add(&polymul(a_hat.at(i, j), &u[j])))
    })
}

/// Matrix-transpose by vector multiplication: `y_hat = A_hat^T * u_hat`.
#[must_use]
pub(crate) fn mul_mat_t_vec<const K: usize>(
    a_hat: &Matrix<K>, u_hat: &PolyVec<NttDomain, K>,
) -> PolyVec<NttDomain, K> {
    let u = u_hat.as_slice();
    PolyVec::from_fn(|i| {
        (0..K).fold(Polynomial::default(), |acc, j| acc.add(&polymul(a_hat.at(j, i), &u[j])))
    })
}

/// Vector dot product: `z_hat = u_hat^T * v_hat`.
#[must_use]
pub(crate) fn dot_t_prod<const K: usize>(
    u_hat: &PolyVec<NttDomain, K>, v_hat: &PolyVec<NttDomain, K>,
) -> Polynomial<NttDomain> {
    let (u, v) = (u_hat.as_slice(), v_hat.as_slice());
    (0..K).fold(Polynomial::default(), |acc, j| acc.add(&polymul(&u[j], &v[j])))
}

/// `PRF_η`: a fixed-input-length use of SHAKE256, producing `ETA_64 = 64·η` bytes of output.
#[must_use]
pub(crate) fn prf<const ETA_64: usize>(s: &[u8; 32], n: u8) -> [u8; ETA_64] {
    let mut out = [0u8; ETA_64];
    shake256_once(&[s, &[n]], &mut out);
    out
}

/// `G`: SHA3-512, producing two pseudorandom 32-byte outputs `(K̄, r)` from variable input.
#[must_use]
pub(crate) fn g(parts: &[&[u8]]) -> ([u8; 32], [u8; 32]) {
    let mut hasher = Sha3_512::new();
    parts.iter().for_each(|p| Digest::update(&mut hasher, p));
    let digest = hasher.finalize();
    let a = digest[0..32].try_into().expect("sha3-512 digest is 64 bytes");
    let b = digest[32..64].try_into().expect("sha3-512 digest is 64 bytes");
    (a, b)
}

/// `H`: SHA3-256, a single 32-byte output.
#[must_use]
pub(crate) fn h(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    Digest::update(&mut hasher, bytes);
    hasher.finalize().into()
}

/// `Compress_d(x) = ⌈(2^d/q)·x⌋ mod 2^d`, applied coefficient-wise, branch-free on the value.
///
/// Works for all odd `q` in `[17, 6307]`; avoids floating point via a precomputed multiplier.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn compress_vector(d: u32, inout: &mut [Z]) {
    const M: u32 = (((1u64 << 36) + Q as u64 - 1) / Q as u64) as u32;
    for x_ref in &mut *inout {
        let y = (x_ref.get_u32() << d) + (u32::from(Q) >> 1);
        let result = (u64::from(y) * u64::from(M)) >> 36;
        x_ref.set_u16(result as u16);
    }
}

/// `Decompress_d(y) = ⌈(q/2^d)·y⌋`, applied coefficient-wise, branch-free on the value.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn decompress_vector(d: u32, inout: &mut [Z]) {
    for y_ref in &mut *inout {
        let qy = u32::from(Q) * y_ref.get_u32() + (1 << d) - 1;
        y_ref.set_u16((qy >> d) as u16);
    }
}
