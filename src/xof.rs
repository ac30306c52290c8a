//! Absorb-then-squeeze state machine for the extendable-output functions (SHAKE128/SHAKE256).
//!
//! `Absorbing<X>` only exposes `absorb`; `into_squeezing` consumes it and returns `Squeezing<R>`,
//! which only exposes `squeeze`. There is no type through which both operations are reachable, so
//! absorbing after a squeeze has started is not just forbidden by convention — it doesn't compile.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Shake128, Shake256};

/// The reader type produced by squeezing a SHAKE128 instance (used for matrix generation).
pub(crate) type MatrixReader = <Shake128 as ExtendableOutput>::Reader;

/// The reader type produced by squeezing a SHAKE256 instance (used for PRF and the session KDF).
pub(crate) type SessionReader = <Shake256 as ExtendableOutput>::Reader;

pub(crate) struct Absorbing<X>(X);

impl<X: Default> Absorbing<X> {
    pub(crate) fn new() -> Self { Self(X::default()) }
}

impl<X: Update> Absorbing<X> {
    pub(crate) fn absorb(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.update(bytes);
        self
    }
}

impl<X: ExtendableOutput> Absorbing<X> {
    pub(crate) fn into_squeezing(self) -> Squeezing<X::Reader> { Squeezing(self.0.finalize_xof()) }
}

pub(crate) struct Squeezing<R>(R);

impl<R: XofReader> Squeezing<R> {
    pub(crate) fn squeeze(&mut self, out: &mut [u8]) { self.0.read(out); }
}

/// Convenience: absorb a fixed set of byte slices with SHAKE128 and squeeze into `out`.
pub(crate) fn shake128_once(parts: &[&[u8]], out: &mut [u8]) {
    let mut absorbing = Absorbing::<Shake128>::new();
    for part in parts {
        absorbing.absorb(part);
    }
    absorbing.into_squeezing().squeeze(out);
}

/// Convenience: absorb a fixed set of byte slices with SHAKE256 and squeeze into `out`.
pub(crate) fn shake256_once(parts: &[&[u8]], out: &mut [u8]) {
    let mut absorbing = Absorbing::<Shake256>::new();
    for part in parts {
        absorbing.absorb(part);
    }
    absorbing.into_squeezing().squeeze(out);
}

/// Begins a SHAKE128 instance for matrix generation: absorbs the 34-byte `ρ ‖ i ‖ j` input and
/// transitions straight to squeezing, since matrix generation never needs more than one absorb.
pub(crate) fn matrix_xof(rho: &[u8; 32], i: u8, j: u8) -> Squeezing<MatrixReader> {
    let mut absorbing = Absorbing::<Shake128>::new();
    absorbing.absorb(rho).absorb(&[i]).absorb(&[j]);
    absorbing.into_squeezing()
}

/// Begins a SHAKE256 instance absorbing `kdf_in` and transitions to squeezing; this is the
/// session-key stream handle returned to callers of `encapsulate`/`decapsulate`.
pub(crate) fn session_xof(kdf_in: &[u8]) -> Squeezing<SessionReader> {
    let mut absorbing = Absorbing::<Shake256>::new();
    absorbing.absorb(kdf_in);
    absorbing.into_squeezing()
}
