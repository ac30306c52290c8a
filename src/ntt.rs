use crate::types::{Normal, NttDomain, Polynomial, Z};
use crate::{Q, ZETA};

/// Forward NTT. Consumes a `Normal`-mode polynomial, produces an `NttDomain`-mode one.
///
/// Seven layers of Cooley-Tukey butterflies, operating in place on a copy of the input.
#[must_use]
pub(crate) fn ntt(f: &Polynomial<Normal>) -> Polynomial<NttDomain> {
    let mut f_hat: [Z; 256] = *f.coeffs();

    let mut i = 1;
    for len in [128, 64, 32, 16, 8, 4, 2] {
        for start in (0..256).step_by(2 * len) {
            let zeta = ZETA_TABLE[i << 1];
            i += 1;

            for j in start..(start + len) {
                let t = f_hat[j + len].mul(zeta);
                f_hat[j + len] = f_hat[j].sub(t);
                f_hat[j] = f_hat[j].add(t);
            }
        }
    }

    Polynomial::from_coeffs(f_hat)
}

/// Inverse NTT. Consumes an `NttDomain`-mode polynomial, produces a `Normal`-mode one.
///
/// Exact inverse of `ntt` on the full coefficient domain: applies the final scaling by
/// `n^{-1} mod q` (`3303 ≡ 128^{-1} mod q`) so `intt(ntt(p)) == p` for all `p`.
#[must_use]
pub(crate) fn intt(f_hat: &Polynomial<NttDomain>) -> Polynomial<Normal> {
    let mut f: [Z; 256] = *f_hat.coeffs();

    let mut i = 127;
    for len in [2, 4, 8, 16, 32, 64, 128] {
        for start in (0..256).step_by(2 * len) {
            let zeta = ZETA_TABLE[i << 1];
            i -= 1;

            for j in start..(start + len) {
                let t = f[j];
                f[j] = t.add(f[j + len]);
                f[j + len] = zeta.mul(f[j + len].sub(t));
            }
        }
    }

    let n_inv = Z::new(3303);
    f.iter_mut().for_each(|c| *c = c.mul(n_inv));

    Polynomial::from_coeffs(f)
}

/// Pointwise multiplication of two NTT-domain polynomials.
///
/// `X^256 + 1` factors into 128 quadratic factors over `Z_q`; "pointwise" multiplication is
/// 128 independent degree-one multiplications modulo distinct quadratics.
#[must_use]
pub(crate) fn polymul(
    f_hat: &Polynomial<NttDomain>, g_hat: &Polynomial<NttDomain>,
) -> Polynomial<NttDomain> {
    let mut h_hat = [Z::default(); 256];
    let f = f_hat.coeffs();
    let g = g_hat.coeffs();

    for i in 0..128 {
        let zeta = ZETA_TABLE[i ^ 0x80];
        let (c0, c1) = base_case_multiply(f[2 * i], f[2 * i + 1], g[2 * i], g[2 * i + 1], zeta);
        h_hat[2 * i] = c0;
        h_hat[2 * i + 1] = c1;
    }

    Polynomial::from_coeffs(h_hat)
}

/// Multiplies two degree-one polynomials `a0 + a1·X` and `b0 + b1·X` modulo `X^2 - γ`.
#[must_use]
fn base_case_multiply(a0: Z, a1: Z, b0: Z, b1: Z, gamma: Z) -> (Z, Z) {
    let c0 = a0.mul(b0).add(a1.mul(b1).mul(gamma));
    let c1 = a0.mul(b1).add(a1.mul(b0));
    (c0, c1)
}

// The zeta table is computed at compile time; not constant-time, but rho (hence A-hat, hence
// this table's usage pattern) already crosses the trust boundary in the clear.
#[allow(clippy::cast_possible_truncation)]
const fn gen_zeta_table() -> [Z; 256] {
    let mut result = [Z::new(0); 256];
    let mut x = 1u32;
    let mut i = 0u32;
    while i < 256 {
        result[(i as u8).reverse_bits() as usize] = Z::new(x as u16);
        x = (x * (ZETA as u32)) % (Q as u32);
        i += 1;
    }
    result
}

pub(crate) static ZETA_TABLE: [Z; 256] = gen_zeta_table();

#[cfg(test)]
mod tests {
    use super::{gen_zeta_table, intt, ntt};
    use crate::types::{Polynomial, Z};

    #[test]
    fn test_zeta_table_known_value() {
        let table = gen_zeta_table();
        assert_eq!(table[4].get_u16(), 2580);
    }

    #[test]
    fn test_ntt_is_involutive_with_inverse() {
        let coeffs: [Z; 256] = core::array::from_fn(|i| Z::new((i as u16 * 7 + 3) % 3329));
        let p = Polynomial::from_coeffs(coeffs);
        let round_tripped = intt(&ntt(&p));
        assert!(p.coeffs().iter().zip(round_tripped.coeffs()).all(|(a, b)| a.get_u16() == b.get_u16()));
    }
}
