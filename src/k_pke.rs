use zeroize::Zeroize;

use crate::byte_fns::{byte_decode, byte_encode};
use crate::helpers::{add_vecs, compress_vector, decompress_vector, dot_t_prod, g, mul_mat_t_vec, mul_mat_vec, prf};
use crate::ntt::{intt, ntt};
use crate::sampling::{sample_ntt, sample_poly_cbd};
use crate::types::{Matrix, Normal, NttDomain, PolyVec, Polynomial};
use crate::xof::matrix_xof;

/// `K-PKE.KeyGen(d)`: uses 32 bytes of randomness to produce an encryption key and a
/// corresponding decryption key.
///
/// * Input: randomness `d ∈ B^32`.
/// * Output: `ek_pke ∈ B^{384k+32}` (public key), `dk_pke ∈ B^{384k}` (private key).
#[allow(clippy::similar_names)]
pub(crate) fn k_pke_key_gen<const K: usize, const ETA1_64: usize>(
    mut d: [u8; 32], ek_pke: &mut [u8], dk_pke: &mut [u8],
) {
    debug_assert_eq!(ek_pke.len(), 384 * K + 32, "K-PKE KeyGen: ek_pke not 384*K+32");
    debug_assert_eq!(dk_pke.len(), 384 * K, "K-PKE KeyGen: dk_pke not 384*K");

    let (rho, mut sigma) = g(&[&d]);
    d.zeroize();

    let mut n = 0u8;
    let a_hat = gen_a_hat::<K>(&rho);

    let mut s: PolyVec<Normal, K> = PolyVec::from_fn(|_| {
        let mut noise = prf::<ETA1_64>(&sigma, n);
        n += 1;
        let p = sample_poly_cbd(&noise);
        noise.zeroize();
        p
    });
    let mut e: PolyVec<Normal, K> = PolyVec::from_fn(|_| {
        let mut noise = prf::<ETA1_64>(&sigma, n);
        n += 1;
        let p = sample_poly_cbd(&noise);
        noise.zeroize();
        p
    });
    sigma.zeroize();

    let s_hat: PolyVec<NttDomain, K> = PolyVec::from_fn(|i| ntt(&s.as_slice()[i]));
    let e_hat: PolyVec<NttDomain, K> = PolyVec::from_fn(|i| ntt(&e.as_slice()[i]));
    s.zeroize();
    e.zeroize();

    let t_hat = add_vecs(&mul_mat_vec(&a_hat, &s_hat), &e_hat);

    for (i, chunk) in ek_pke.chunks_mut(384).enumerate().take(K) {
        byte_encode(12, &t_hat.as_slice()[i], chunk).expect("encode_12 on fresh t_hat never fails");
    }
    ek_pke[K * 384..].copy_from_slice(&rho);

    for (i, chunk) in dk_pke.chunks_mut(384).enumerate() {
        byte_encode(12, &s_hat.as_slice()[i], chunk).expect("encode_12 on fresh s_hat never fails");
    }
}

/// Regenerates `Â` from the public seed `ρ`, shared by keygen and encryption.
///
/// `Â[i][j]` is sampled from `SHAKE128(ρ ‖ j ‖ i)`: keygen multiplies it directly (`Â·ŝ`);
/// encryption's `u` step multiplies by its transpose (`Â^T·r̂`). The two routines agree on what
/// `Â` denotes because both are generated here, the same way, every time.
fn gen_a_hat<const K: usize>(rho: &[u8; 32]) -> Matrix<K> {
    #[allow(clippy::cast_possible_truncation)]
    Matrix::from_fn(|i, j| sample_ntt(matrix_xof(rho, j as u8, i as u8)))
}

fn decode_polyvec<Mode, const K: usize>(bytes: &[u8], l: u32) -> Result<PolyVec<Mode, K>, &'static str> {
    let step = 32 * l as usize;
    let mut polys: [Polynomial<Mode>; K] = [Polynomial::default(); K];
    for (i, chunk) in bytes.chunks(step).enumerate().take(K) {
        polys[i] = byte_decode(l, chunk)?;
    }
    Ok(PolyVec::from_array(polys))
}

/// `K-PKE.Encrypt(ek_pke, m, r)`: encrypts a 32-byte message under randomness `r`.
///
/// * Input: `ek_pke ∈ B^{384k+32}`, `m ∈ B^32`, `r ∈ B^32`.
/// * Output: `ct ∈ B^{32(d_u·k+d_v)}`.
///
/// Sampling order is part of the wire contract: `r` is sampled fully (all `k` polynomials)
/// before `e1`, and `e1` fully before `e2`; the PRF counter increments once per polynomial.
#[allow(clippy::many_single_char_names)]
pub(crate) fn k_pke_encrypt<const K: usize, const ETA1_64: usize, const ETA2_64: usize>(
    du: u32, dv: u32, ek_pke: &[u8], m: &[u8; 32], r: &[u8; 32], ct: &mut [u8],
) -> Result<(), &'static str> {
    debug_assert_eq!(ek_pke.len(), 384 * K + 32, "K-PKE Encrypt: ek len not 384*K+32");

    let mut n = 0u8;

    let t_hat: PolyVec<NttDomain, K> = decode_polyvec(&ek_pke[..384 * K], 12)?;
    let rho: [u8; 32] = ek_pke[384 * K..384 * K + 32].try_into().unwrap();

    let a_hat = gen_a_hat::<K>(&rho);

    let mut y: PolyVec<Normal, K> = PolyVec::from_fn(|_| {
        let mut noise = prf::<ETA1_64>(r, n);
        n += 1;
        let p = sample_poly_cbd(&noise);
        noise.zeroize();
        p
    });
    let e1: PolyVec<Normal, K> = PolyVec::from_fn(|_| {
        let mut noise = prf::<ETA2_64>(r, n);
        n += 1;
        let p = sample_poly_cbd(&noise);
        noise.zeroize();
        p
    });
    let mut noise2 = prf::<ETA2_64>(r, n);
    let e2 = sample_poly_cbd(&noise2);
    noise2.zeroize();

    let y_hat: PolyVec<NttDomain, K> = PolyVec::from_fn(|i| ntt(&y.as_slice()[i]));
    y.zeroize();

    let u_hat = mul_mat_t_vec(&a_hat, &y_hat);
    let u_normal: PolyVec<Normal, K> = PolyVec::from_fn(|i| intt(&u_hat.as_slice()[i]));
    let mut u = add_vecs(&u_normal, &e1).into_array();

    let mut mu_bytes = *m;
    let mut mu = byte_decode::<Normal>(1, &mu_bytes)?;
    mu_bytes.zeroize();
    decompress_vector(1, mu.coeffs_mut());

    let v_core = intt(&dot_t_prod(&t_hat, &y_hat));
    let mut v = v_core.add(&e2).add(&mu);

    let step = 32 * du as usize;
    for (i, chunk) in ct.chunks_mut(step).enumerate().take(K) {
        compress_vector(du, u[i].coeffs_mut());
        byte_encode(du, &u[i], chunk)?;
    }

    compress_vector(dv, v.coeffs_mut());
    byte_encode(dv, &v, &mut ct[K * step..])?;

    Ok(())
}

/// `K-PKE.Decrypt(dk_pke, ct)`: recovers the 32-byte plaintext (not necessarily the bytes that
/// were originally encrypted, under an adversarially-chosen ciphertext — this function never
/// fails; an invalid ciphertext simply decrypts to garbage, caught downstream by the FO
/// re-encryption check).
///
/// * Input: `dk_pke ∈ B^{384k}`, `ct ∈ B^{32(d_u·k+d_v)}`.
/// * Output: `m ∈ B^32`.
pub(crate) fn k_pke_decrypt<const K: usize>(du: u32, dv: u32, dk_pke: &[u8], ct: &[u8]) -> [u8; 32] {
    debug_assert_eq!(dk_pke.len(), 384 * K, "K-PKE Decrypt: dk len not 384*K");

    let step_u = 32 * du as usize;
    let c1 = &ct[0..step_u * K];
    let c2 = &ct[step_u * K..32 * (du as usize * K + dv as usize)];

    // Decode_du/Decode_dv never reject (every du/dv-bit pattern is a valid coefficient below
    // 2^du or 2^dv); only the trusted secret key's own Decode_12 below could ever fail.
    let mut u: PolyVec<Normal, K> = decode_polyvec(c1, du).expect("Decode_du never rejects");
    for p in u.as_slice_mut() {
        decompress_vector(du, p.coeffs_mut());
    }

    let mut v: Polynomial<Normal> = byte_decode(dv, c2).expect("Decode_dv never rejects");
    decompress_vector(dv, v.coeffs_mut());

    let s_hat: PolyVec<NttDomain, K> =
        decode_polyvec(dk_pke, 12).expect("own decapsulation key was produced by this crate's keygen");

    let ntt_u: PolyVec<NttDomain, K> = PolyVec::from_fn(|i| ntt(&u.as_slice()[i]));
    let w_hat = dot_t_prod(&s_hat, &ntt_u);
    let mut w = v.sub(&intt(&w_hat));

    compress_vector(1, w.coeffs_mut());
    let mut m = [0u8; 32];
    byte_encode(1, &w, &mut m).expect("Encode_1 of a freshly compressed poly never fails");
    u.zeroize();

    m
}
