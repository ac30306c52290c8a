#![no_std]
#![deny(clippy::pedantic)]
#![deny(warnings)]
#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

//!
//! Implements the Kyber Round-3 Module-Lattice-based Key-Encapsulation Mechanism.

use core::fmt;

// Functionality map:
//
// Encode_l / Decode_l                    --> byte_fns.rs
// SampleNTT (Parse) / SamplePolyCBD_eta  --> sampling.rs
// NTT / NTT^-1 / MultiplyNTTs            --> ntt.rs
// K-PKE.KeyGen / Encrypt / Decrypt       --> k_pke.rs
// KEM KeyGen / Encaps / Decaps           --> kem.rs
// PRF, G, H, Compress, Decompress        --> helpers.rs
// Absorb/squeeze state machine for XOFs  --> xof.rs
//
// The three parameter sets are modules in this file, with macro-injected code connecting
// them to the generic core in kem.rs.

mod byte_fns;
mod helpers;
mod k_pke;
mod kem;
mod ntt;
mod sampling;
mod types;
mod xof;

/// All functionality is covered by traits, so consumers can use trait objects if desired.
pub mod traits;

// Relevant to all parameter sets
const _N: u32 = 256;
const Q: u32 = 3329;
const ZETA: u32 = 17;

/// Errors returned at the public API boundary.
///
/// Never returned from decapsulation for an invalid ciphertext — that path always succeeds and
/// returns a [`SharedSecretStream`] whose contents are unrelated to the sender's, per implicit
/// rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KemError {
    /// A byte array handed to `try_from_bytes` was not the length the target type requires.
    InvalidLength,
    /// A public key failed the `Encode_12 ∘ Decode_12` modulus round-trip check.
    ModulusCheckFailed,
    /// The supplied random number generator failed to produce bytes.
    RngFailure,
}

impl fmt::Display for KemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::InvalidLength => "byte array has the wrong length",
            Self::ModulusCheckFailed => "public key failed the modulus round-trip check",
            Self::RngFailure => "random number generator failed",
        };
        f.write_str(msg)
    }
}

/// A squeeze-capable handle to the shared secret derived by `encapsulate`/`decapsulate`.
///
/// Wraps a SHAKE256 instance that has already absorbed the key-derivation input and
/// transitioned to squeezing. Not `Clone`: a squeeze stream is one-shot and forward-only, the
/// same way reading from a real SHAKE256 reader is.
pub struct SharedSecretStream(xof::Squeezing<xof::SessionReader>);

impl SharedSecretStream {
    /// Squeezes `out.len()` bytes of shared-secret material. May be called more than once to
    /// derive a longer stream; successive calls yield successive, non-overlapping output.
    pub fn squeeze(&mut self, out: &mut [u8]) { self.0.squeeze(out); }

    /// Convenience: squeezes exactly `N` bytes into a fresh array.
    #[must_use]
    pub fn squeeze_array<const LEN: usize>(&mut self) -> [u8; LEN] {
        let mut out = [0u8; LEN];
        self.squeeze(&mut out);
        out
    }
}

// This common functionality is injected into each parameter-set module.
macro_rules! functionality {
    () => {
        const ETA1_64: usize = ETA1 as usize * 64;
        const ETA2_64: usize = ETA2 as usize * 64;

        use rand_core::CryptoRngCore;
        use zeroize::{Zeroize, ZeroizeOnDrop};

        use crate::traits::{Decaps, Encaps, KeyGen, SerDes};
        use crate::types::{Normal, Polynomial};
        use crate::{kem, KemError, SharedSecretStream};

        /// Correctly sized encapsulation key specific to this security parameter set.
        #[derive(Clone, Zeroize, ZeroizeOnDrop)]
        pub struct EncapsKey([u8; EK_LEN]);

        /// Correctly sized decapsulation key specific to this security parameter set.
        #[derive(Clone, Zeroize, ZeroizeOnDrop)]
        pub struct DecapsKey([u8; DK_LEN]);

        /// Correctly sized ciphertext specific to this security parameter set.
        #[derive(Clone, Zeroize, ZeroizeOnDrop)]
        pub struct CipherText([u8; CT_LEN]);

        /// Zero-sized key-generation entry point; implements [`KeyGen`].
        pub struct KG();

        impl KeyGen for KG {
            type DecapsKey = DecapsKey;
            type EncapsKey = EncapsKey;

            fn try_keygen_with_rng(
                rng: &mut impl CryptoRngCore,
            ) -> Result<(EncapsKey, DecapsKey), KemError> {
                let (mut ek, mut dk) = ([0u8; EK_LEN], [0u8; DK_LEN]);
                kem::kem_key_gen::<K, ETA1_64>(rng, &mut ek, &mut dk)?;
                Ok((EncapsKey(ek), DecapsKey(dk)))
            }
        }

        impl Encaps for EncapsKey {
            type CipherText = CipherText;
            type SharedSecretStream = SharedSecretStream;

            fn try_encaps_with_rng(
                &self, rng: &mut impl CryptoRngCore,
            ) -> Result<(SharedSecretStream, CipherText), KemError> {
                let mut ct = [0u8; CT_LEN];
                let stream = kem::kem_encapsulate::<K, ETA1_64, ETA2_64>(rng, DU, DV, &self.0, &mut ct)?;
                Ok((SharedSecretStream(stream), CipherText(ct)))
            }
        }

        impl Decaps for DecapsKey {
            type CipherText = CipherText;
            type SharedSecretStream = SharedSecretStream;

            fn try_decaps(&self, ct: &CipherText) -> Result<SharedSecretStream, KemError> {
                let stream = kem::kem_decapsulate::<K, ETA1_64, ETA2_64, CT_LEN>(DU, DV, &self.0, &ct.0);
                Ok(SharedSecretStream(stream))
            }
        }

        impl SerDes for EncapsKey {
            type ByteArray = [u8; EK_LEN];

            fn into_bytes(self) -> Self::ByteArray { self.0 }

            fn try_from_bytes(ek: Self::ByteArray) -> Result<Self, KemError> {
                // Modulus check: ek must equal ByteEncode_12(ByteDecode_12(ek)).
                for i in 0..K {
                    let chunk = &ek[384 * i..384 * (i + 1)];
                    let decoded: Polynomial<Normal> =
                        crate::byte_fns::byte_decode(12, chunk).map_err(|_| KemError::ModulusCheckFailed)?;
                    let mut re_encoded = [0u8; 384];
                    crate::byte_fns::byte_encode(12, &decoded, &mut re_encoded)
                        .map_err(|_| KemError::ModulusCheckFailed)?;
                    if re_encoded != chunk {
                        return Err(KemError::ModulusCheckFailed);
                    }
                }
                Ok(EncapsKey(ek))
            }
        }

        impl SerDes for DecapsKey {
            type ByteArray = [u8; DK_LEN];

            fn into_bytes(self) -> Self::ByteArray { self.0 }

            fn try_from_bytes(dk: Self::ByteArray) -> Result<Self, KemError> { Ok(DecapsKey(dk)) }
        }

        impl SerDes for CipherText {
            type ByteArray = [u8; CT_LEN];

            fn into_bytes(self) -> Self::ByteArray { self.0 }

            fn try_from_bytes(ct: Self::ByteArray) -> Result<Self, KemError> { Ok(CipherText(ct)) }
        }
    };
}

/// Functionality for the Kyber512 parameter set (NIST security category 1).
#[cfg(feature = "kyber512")]
pub mod kyber512 {
    //! Typical usage flow:
    //! 1. The originator runs [`KG::try_keygen`] to get an encaps key and a decaps key.
    //! 2. The originator serializes the encaps key and sends it to the remote party.
    //! 3. The remote party deserializes it and runs `try_encaps` to get a shared-secret
    //!    stream and a ciphertext.
    //! 4. The remote party sends the ciphertext back to the originator.
    //! 5. The originator runs `try_decaps` on it to recover the same shared-secret stream.

    const K: usize = 2;
    const ETA1: u32 = 3;
    const ETA2: u32 = 2;
    const DU: u32 = 10;
    const DV: u32 = 4;

    /// Serialized encapsulation key length (bytes).
    pub const EK_LEN: usize = 800;
    /// Serialized decapsulation key length (bytes).
    pub const DK_LEN: usize = 1632;
    /// Serialized ciphertext length (bytes).
    pub const CT_LEN: usize = 768;

    functionality!();
}

/// Functionality for the Kyber768 parameter set (NIST security category 3).
#[cfg(feature = "kyber768")]
pub mod kyber768 {
    //! See [`crate::kyber512`] for the usage flow; the API is identical across parameter sets.

    const K: usize = 3;
    const ETA1: u32 = 2;
    const ETA2: u32 = 2;
    const DU: u32 = 10;
    const DV: u32 = 4;

    /// Serialized encapsulation key length (bytes).
    pub const EK_LEN: usize = 1184;
    /// Serialized decapsulation key length (bytes).
    pub const DK_LEN: usize = 2400;
    /// Serialized ciphertext length (bytes).
    pub const CT_LEN: usize = 1088;

    functionality!();
}

/// Functionality for the Kyber1024 parameter set (NIST security category 5).
#[cfg(feature = "kyber1024")]
pub mod kyber1024 {
    //! See [`crate::kyber512`] for the usage flow; the API is identical across parameter sets.

    const K: usize = 4;
    const ETA1: u32 = 2;
    const ETA2: u32 = 2;
    const DU: u32 = 11;
    const DV: u32 = 5;

    /// Serialized encapsulation key length (bytes).
    pub const EK_LEN: usize = 1568;
    /// Serialized decapsulation key length (bytes).
    pub const DK_LEN: usize = 3168;
    /// Serialized ciphertext length (bytes).
    pub const CT_LEN: usize = 1568;

    functionality!();
}
