use crate::helpers::ensure;
use crate::types::{Polynomial, Z};
use crate::Q;

/// `Encode_l(F)`: packs a length-256 array of `l`-bit integers into `32·l` bytes, little-endian
/// bit order. `l ∈ {1, 4, 5, 10, 11, 12}`; for `l == 12` the valid coefficient range is `[0, q)`,
/// otherwise `[0, 2^l)`. Generic over the polynomial's representation mode: packing bits cares
/// only about the coefficient values, never whether they are in coefficient or NTT form.
pub(crate) fn byte_encode<Mode>(l: u32, poly: &Polynomial<Mode>, bytes_b: &mut [u8]) -> Result<(), &'static str> {
    ensure!(bytes_b.len() == 32 * l as usize, "Encode: output length not 32*l");
    let m = if l < 12 { 1u64 << l } else { u64::from(Q) };

    let mut temp = 0u64;
    let mut bit_index = 0usize;
    let mut byte_index = 0usize;
    for coeff in poly.coeffs() {
        let value = u64::from(coeff.get_u16());
        ensure!(value < m, "Encode: coefficient out of range");
        temp |= value << bit_index;
        bit_index += l as usize;
        while bit_index >= 8 {
            bytes_b[byte_index] = temp as u8;
            temp >>= 8;
            byte_index += 1;
            bit_index -= 8;
        }
    }
    Ok(())
}

/// `Decode_l(B)`: the inverse of `byte_encode`, unpacking `32·l` bytes into 256 `l`-bit integers.
pub(crate) fn byte_decode<Mode>(l: u32, bytes_b: &[u8]) -> Result<Polynomial<Mode>, &'static str> {
    ensure!(bytes_b.len() == 32 * l as usize, "Decode: input length not 32*l");
    let m = if l < 12 { 1u64 << l } else { u64::from(Q) };
    let mask = (1u64 << l) - 1;

    let mut coeffs = [Z::default(); 256];
    let mut temp = 0u64;
    let mut bit_index = 0usize;
    let mut out_index = 0usize;
    for byte in bytes_b {
        temp |= u64::from(*byte) << bit_index;
        bit_index += 8;
        while bit_index >= l as usize && out_index < 256 {
            let value = temp & mask;
            ensure!(value < m, "Decode: integer out of range");
            #[allow(clippy::cast_possible_truncation)]
            coeffs[out_index].set_u16(value as u16);
            bit_index -= l as usize;
            temp >>= l;
            out_index += 1;
        }
    }
    Ok(Polynomial::from_coeffs(coeffs))
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use alloc::vec;
    use alloc::vec::Vec;

    use rand::{Rng, SeedableRng};

    use super::{byte_decode, byte_encode};
    use crate::types::Normal;

    #[test]
    fn test_decode_then_encode_is_identity_for_each_width() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        for l in [1u32, 4, 5, 10, 11] {
            for _ in 0..20 {
                let num_bytes = 32 * l as usize;
                let bytes1: Vec<u8> = (0..num_bytes).map(|_| rng.gen()).collect();
                let poly: crate::types::Polynomial<Normal> = byte_decode(l, &bytes1).unwrap();
                let mut bytes2 = vec![0u8; num_bytes];
                byte_encode(l, &poly, &mut bytes2).unwrap();
                assert_eq!(bytes1, bytes2, "round-trip mismatch at l={l}");
            }
        }
    }

    #[test]
    fn test_decode_12_rejects_out_of_range_coefficient() {
        // q = 3329; 12-bit packing can represent up to 4095, so an all-0xFF input decodes a
        // first coefficient of 0xFFF = 4095, which is >= q and must be rejected.
        let bytes = [0xFFu8; 32 * 12];
        let decoded: Result<crate::types::Polynomial<Normal>, _> = byte_decode(12, &bytes);
        assert!(decoded.is_err());
    }
}
