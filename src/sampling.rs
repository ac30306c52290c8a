use sha3::digest::XofReader;

use crate::types::{Normal, NttDomain, Polynomial, Z};
use crate::Q;

/// Uniform rejection sampling ("Parse") from a XOF stream into an NTT-domain polynomial.
///
/// Reads 3 bytes at a time, extracts two 12-bit candidates, and accepts each that is `< q`.
/// Continues until all 256 coefficients are produced. The rejection loop is data-dependent on
/// the stream, but the stream is seeded from `rho`, which already crosses the trust boundary in
/// the clear, so this does not need to run in constant time.
#[must_use]
pub(crate) fn sample_ntt(mut reader: impl XofReader) -> Polynomial<NttDomain> {
    let mut coeffs = [Z::default(); 256];
    let mut c = [0u8; 3];
    let mut j = 0usize;

    #[allow(clippy::cast_possible_truncation)]
    while j < 256 {
        reader.read(&mut c);

        let d1 = u32::from(c[0]) | ((u32::from(c[1]) & 0x0F) << 8);
        let d2 = (u32::from(c[1]) >> 4) | (u32::from(c[2]) << 4);

        if d1 < u32::from(Q) {
            coeffs[j].set_u16(d1 as u16);
            j += 1;
        }
        if d2 < u32::from(Q) && j < 256 {
            coeffs[j].set_u16(d2 as u16);
            j += 1;
        }
    }

    Polynomial::from_coeffs(coeffs)
}

/// Centered binomial sampling `CBD_η`: from `64·η` bytes, each of 256 output coefficients takes
/// `2η` consecutive bits split into two `η`-bit halves `a`, `b`, and outputs
/// `popcount(a) − popcount(b) mod q`.
#[must_use]
pub(crate) fn sample_poly_cbd(bytes: &[u8]) -> Polynomial<Normal> {
    let eta = bytes.len() / 64;
    debug_assert_eq!(bytes.len(), 64 * eta, "CBD: byte array not 64 * eta");

    let mut coeffs = [Z::default(); 256];
    let mut temp: u32 = 0;
    let mut bit_count = 0usize;
    let mut out_index = 0usize;

    for byte in bytes {
        temp |= u32::from(*byte) << bit_count;
        bit_count += 8;
        while bit_count >= 2 * eta {
            let a = count_ones(temp & ((1 << eta) - 1));
            let b = count_ones((temp >> eta) & ((1 << eta) - 1));
            coeffs[out_index] = Z::new(a).sub(Z::new(b));
            bit_count -= 2 * eta;
            temp >>= 2 * eta;
            out_index += 1;
        }
    }

    Polynomial::from_coeffs(coeffs)
}

#[allow(clippy::cast_possible_truncation)]
fn count_ones(x: u32) -> u16 {
    let x = (x & 0x5555_5555) + ((x >> 1) & 0x5555_5555);
    let x = (x & 0x3333_3333) + ((x >> 2) & 0x3333_3333);
    let x = (x & 0x0F0F_0F0F) + ((x >> 4) & 0x0F0F_0F0F);
    x as u16
}

#[cfg(test)]
mod tests {
    use super::sample_poly_cbd;

    #[test]
    fn test_cbd_support_bounded_by_eta() {
        let bytes = [0xA5u8; 64 * 3];
        let poly = sample_poly_cbd(&bytes);
        for c in poly.coeffs() {
            let v = c.get_u16();
            assert!(v <= 3 || v >= 3329 - 3, "CBD_3 coefficient {v} outside [-3, 3] mod q");
        }
    }

    #[test]
    fn test_cbd_all_zero_input_is_zero_poly() {
        let bytes = [0u8; 64 * 2];
        let poly = sample_poly_cbd(&bytes);
        assert!(poly.coeffs().iter().all(|c| c.get_u16() == 0));
    }
}
