use rand_core::CryptoRngCore;
#[cfg(feature = "default-rng")]
use rand_core::OsRng;

/// Generates an encapsulation/decapsulation key pair specific to a security parameter set.
///
/// Defined as a trait (rather than a free function per module) so that callers generic over
/// the parameter set can use `KG` as a trait object or type parameter.
pub trait KeyGen {
    /// The (public) encapsulation key sent from the originator to the remote party.
    type EncapsKey;
    /// The (private) decapsulation key retained by the originator.
    type DecapsKey;

    /// Generates a key pair using the OS default random number generator.
    ///
    /// # Errors
    /// Returns an error if the random number generator fails.
    #[cfg(feature = "default-rng")]
    fn try_keygen() -> Result<(Self::EncapsKey, Self::DecapsKey), crate::KemError> {
        Self::try_keygen_with_rng(&mut OsRng)
    }

    /// Generates a key pair using a caller-supplied random number generator.
    ///
    /// # Errors
    /// Returns an error if the random number generator fails.
    ///
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(feature = "kyber512")] {
    /// use rand_core::OsRng;
    /// use kyber_kem::kyber512;
    /// use kyber_kem::traits::{KeyGen, SerDes, Decaps, Encaps};
    ///
    /// let (ek, dk) = kyber512::KG::try_keygen_with_rng(&mut OsRng)?;
    /// let ek_bytes = ek.into_bytes();
    ///
    /// let ek_remote = kyber512::EncapsKey::try_from_bytes(ek_bytes)?;
    /// let (mut ss_sender, ct) = ek_remote.try_encaps_with_rng(&mut OsRng)?;
    /// let ct_bytes = ct.into_bytes();
    ///
    /// let ct_remote = kyber512::CipherText::try_from_bytes(ct_bytes)?;
    /// let mut ss_receiver = dk.try_decaps(&ct_remote)?;
    ///
    /// let (mut a, mut b) = ([0u8; 32], [0u8; 32]);
    /// ss_sender.squeeze(&mut a);
    /// ss_receiver.squeeze(&mut b);
    /// assert_eq!(a, b);
    /// # }
    /// # Ok(())}
    /// ```
    fn try_keygen_with_rng(
        rng: &mut impl CryptoRngCore,
    ) -> Result<(Self::EncapsKey, Self::DecapsKey), crate::KemError>;
}

/// Generates a shared-secret stream and a ciphertext from an encapsulation key.
pub trait Encaps {
    /// The ciphertext type transmitted to the decapsulating party.
    type CipherText;
    /// The squeeze-capable shared-secret handle.
    type SharedSecretStream;

    /// Encapsulates using the OS default random number generator.
    ///
    /// # Errors
    /// Returns an error if the random number generator fails.
    #[cfg(feature = "default-rng")]
    fn try_encaps(&self) -> Result<(Self::SharedSecretStream, Self::CipherText), crate::KemError> {
        self.try_encaps_with_rng(&mut OsRng)
    }

    /// Encapsulates using a caller-supplied random number generator.
    ///
    /// # Errors
    /// Returns an error if the random number generator fails or the encapsulation key fails
    /// its modulus check.
    fn try_encaps_with_rng(
        &self, rng: &mut impl CryptoRngCore,
    ) -> Result<(Self::SharedSecretStream, Self::CipherText), crate::KemError>;
}

/// Recovers a shared-secret stream from a decapsulation key and ciphertext.
pub trait Decaps {
    /// The ciphertext type received from the encapsulating party.
    type CipherText;
    /// The squeeze-capable shared-secret handle.
    type SharedSecretStream;

    /// Recovers the shared-secret stream. Never fails: an invalid ciphertext is handled by
    /// implicit rejection rather than an error, per the FO transform.
    fn try_decaps(&self, ct: &Self::CipherText) -> Result<Self::SharedSecretStream, crate::KemError>;
}

/// Serializes and deserializes cryptographic objects to/from fixed-size byte arrays.
pub trait SerDes {
    /// The fixed-size byte array type used for serialization.
    type ByteArray;

    /// Produces a byte array of fixed size specific to the struct being serialized.
    fn into_bytes(self) -> Self::ByteArray;

    /// Consumes a byte array of fixed size, performing the FIPS-style modulus-check
    /// validation for keys where it applies.
    ///
    /// # Errors
    /// Returns an error on malformed input (e.g. a public key that fails the encode-decode
    /// round-trip check).
    fn try_from_bytes(ba: Self::ByteArray) -> Result<Self, crate::KemError>
    where
        Self: Sized;
}
