use rand_core::CryptoRngCore;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

use crate::helpers::{g, h};
use crate::k_pke::{k_pke_decrypt, k_pke_encrypt, k_pke_key_gen};
use crate::xof::{session_xof, Squeezing};
use crate::KemError;

/// `KeyGen_internal(d, z)`: deterministic core of key generation. `ek` is the PKE encryption
/// key verbatim; `dk` bundles the PKE decryption key with `ek`, `H(ek)`, and the implicit-
/// rejection seed `z` so that decapsulation never needs to look anything up elsewhere.
pub(crate) fn kem_key_gen_internal<const K: usize, const ETA1_64: usize>(
    d: [u8; 32], z: [u8; 32], ek: &mut [u8], dk: &mut [u8],
) {
    debug_assert_eq!(ek.len(), 384 * K + 32, "KeyGen: ek len not 384*K+32");
    debug_assert_eq!(dk.len(), 768 * K + 96, "KeyGen: dk len not 768*K+96");

    let p1 = 384 * K;
    k_pke_key_gen::<K, ETA1_64>(d, ek, &mut dk[..p1]);

    let h_ek = h(ek);
    let p2 = p1 + ek.len();
    let p3 = p2 + h_ek.len();
    dk[p1..p2].copy_from_slice(ek);
    dk[p2..p3].copy_from_slice(&h_ek);
    dk[p3..].copy_from_slice(&z);
}

/// Entry point for key generation: draws `d` and `z` from `rng` and runs the internal algorithm.
pub(crate) fn kem_key_gen<const K: usize, const ETA1_64: usize>(
    rng: &mut impl CryptoRngCore, ek: &mut [u8], dk: &mut [u8],
) -> Result<(), KemError> {
    let mut d = [0u8; 32];
    rng.try_fill_bytes(&mut d).map_err(|_| KemError::RngFailure)?;
    let mut z = [0u8; 32];
    rng.try_fill_bytes(&mut z).map_err(|_| KemError::RngFailure)?;

    kem_key_gen_internal::<K, ETA1_64>(d, z, ek, dk);
    d.zeroize();
    z.zeroize();
    Ok(())
}

/// `Encaps(ek)`: samples a random message, derives `(K̄, r)` from `H(m) ‖ H(ek)`, encrypts under
/// the CPA scheme, and returns a SHAKE256 handle absorbing `K̄ ‖ H(c)` — not a fixed-size key, so
/// the caller chooses how many bytes of shared secret to squeeze.
pub(crate) fn kem_encapsulate<const K: usize, const ETA1_64: usize, const ETA2_64: usize>(
    rng: &mut impl CryptoRngCore, du: u32, dv: u32, ek: &[u8], ct: &mut [u8],
) -> Result<Squeezing<crate::xof::SessionReader>, KemError> {
    debug_assert_eq!(ek.len(), 384 * K + 32, "Encaps: ek len not 384*K+32");

    let mut m = [0u8; 32];
    rng.try_fill_bytes(&mut m).map_err(|_| KemError::RngFailure)?;

    let h_ek = h(ek);
    let h_m = h(&m);
    let (mut k_bar, mut r) = g(&[&h_m, &h_ek]);

    k_pke_encrypt::<K, ETA1_64, ETA2_64>(du, dv, ek, &m, &r, ct).map_err(|_| KemError::ModulusCheckFailed)?;
    m.zeroize();
    r.zeroize();

    let h_c = h(ct);
    let mut kdf_in = [0u8; 64];
    kdf_in[..32].copy_from_slice(&k_bar);
    kdf_in[32..].copy_from_slice(&h_c);
    k_bar.zeroize();

    let stream = session_xof(&kdf_in);
    kdf_in.zeroize();
    Ok(stream)
}

/// `Decaps(dk, c)`: re-derives the message and re-encrypts; if the re-encryption matches `c`,
/// absorbs `K̄ ‖ H(c)` as in encapsulation, otherwise absorbs `z ‖ H(c)` ("implicit rejection").
/// The selection between the two 32-byte halves is constant-time: there is no branch on whether
/// the ciphertext was genuine.
pub(crate) fn kem_decapsulate<const K: usize, const ETA1_64: usize, const ETA2_64: usize, const CT_LEN: usize>(
    du: u32, dv: u32, dk: &[u8], ct: &[u8; CT_LEN],
) -> Squeezing<crate::xof::SessionReader> {
    debug_assert_eq!(dk.len(), 768 * K + 96, "Decaps: dk len not 768*K+96");

    let dk_pke = &dk[0..384 * K];
    let ek_pke = &dk[384 * K..768 * K + 32];
    let h_ek = &dk[768 * K + 32..768 * K + 64];
    let z = &dk[768 * K + 64..768 * K + 96];

    let mut m_prime = k_pke_decrypt::<K>(du, dv, dk_pke, ct);
    let h_m_prime = h(&m_prime);
    let (mut k_bar_prime, mut r_prime) = g(&[&h_m_prime, h_ek]);
    m_prime.zeroize();

    let mut c_prime = [0u8; CT_LEN];
    // ek_pke here is the encapsulator's own encryption key, stored verbatim in dk at keygen
    // time; it always passes the modulus check, so re-encryption cannot fail.
    k_pke_encrypt::<K, ETA1_64, ETA2_64>(du, dv, ek_pke, &m_prime, &r_prime, &mut c_prime)
        .expect("dk's embedded ek was produced by this crate's own keygen");
    r_prime.zeroize();

    let reject: Choice = ct.ct_ne(&c_prime);
    for i in 0..32 {
        k_bar_prime[i].conditional_assign(&z[i], reject);
    }

    let h_c = h(ct);
    let mut kdf_in = [0u8; 64];
    kdf_in[..32].copy_from_slice(&k_bar_prime);
    kdf_in[32..].copy_from_slice(&h_c);
    k_bar_prime.zeroize();

    let stream = session_xof(&kdf_in);
    kdf_in.zeroize();
    stream
}

#[cfg(test)]
mod tests {
    use rand_core::SeedableRng;

    use super::{kem_decapsulate, kem_encapsulate, kem_key_gen};

    const ETA1_64: usize = 3 * 64;
    const ETA2_64: usize = 2 * 64;
    const DU: u32 = 10;
    const DV: u32 = 4;
    const K: usize = 2;
    const EK_LEN: usize = 800;
    const DK_LEN: usize = 1632;
    const CT_LEN: usize = 768;

    #[test]
    fn test_encapsulate_then_decapsulate_agree() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let mut ek = [0u8; EK_LEN];
        let mut dk = [0u8; DK_LEN];
        let mut ct = [0u8; CT_LEN];

        kem_key_gen::<K, ETA1_64>(&mut rng, &mut ek, &mut dk).unwrap();
        let mut stream_a = kem_encapsulate::<K, ETA1_64, ETA2_64>(&mut rng, DU, DV, &ek, &mut ct).unwrap();
        let mut stream_b = kem_decapsulate::<K, ETA1_64, ETA2_64, CT_LEN>(DU, DV, &dk, &ct);

        let mut out_a = [0u8; 32];
        let mut out_b = [0u8; 32];
        stream_a.squeeze(&mut out_a);
        stream_b.squeeze(&mut out_b);
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn test_bit_flipped_ciphertext_yields_different_deterministic_secret() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let mut ek = [0u8; EK_LEN];
        let mut dk = [0u8; DK_LEN];
        let mut ct = [0u8; CT_LEN];

        kem_key_gen::<K, ETA1_64>(&mut rng, &mut ek, &mut dk).unwrap();
        let mut stream_good = kem_encapsulate::<K, ETA1_64, ETA2_64>(&mut rng, DU, DV, &ek, &mut ct).unwrap();
        let mut good_secret = [0u8; 32];
        stream_good.squeeze(&mut good_secret);

        let mut flipped = ct;
        flipped[0] ^= 1;

        let mut stream_rejected_a = kem_decapsulate::<K, ETA1_64, ETA2_64, CT_LEN>(DU, DV, &dk, &flipped);
        let mut stream_rejected_b = kem_decapsulate::<K, ETA1_64, ETA2_64, CT_LEN>(DU, DV, &dk, &flipped);
        let mut rejected_a = [0u8; 32];
        let mut rejected_b = [0u8; 32];
        stream_rejected_a.squeeze(&mut rejected_a);
        stream_rejected_b.squeeze(&mut rejected_b);

        assert_ne!(good_secret, rejected_a);
        assert_eq!(rejected_a, rejected_b, "implicit rejection must be a deterministic function of (sk, ct)");
    }
}
