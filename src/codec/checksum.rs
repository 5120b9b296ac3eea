//! Pluggable checksum policy
//!
//! The frame header reserves a 16-bit checksum over bytes `2..` of the encoded frame, but the
//! algorithm the satellite firmware uses is defined outside this crate. The link therefore
//! ships no built-in algorithm: a ground station that knows the firmware's checksum installs
//! it as a [`ChecksumPolicy`], and until then frames are accepted without validation.

use std::fmt;
use std::sync::Arc;

/// Computes the checksum for the bytes following the checksum field.
pub trait ChecksumPolicy: Send + Sync {
    /// Checksum over `covered`, which is the encoded frame without its first two bytes.
    fn compute(&self, covered: &[u8]) -> u16;
}

impl<T: ChecksumPolicy + ?Sized> ChecksumPolicy for Arc<T> {
    fn compute(&self, covered: &[u8]) -> u16 {
        (**self).compute(covered)
    }
}

/// Adapter turning a closure into a [`ChecksumPolicy`].
pub struct FnChecksum<F> {
    compute: F,
}

impl<F> FnChecksum<F>
where
    F: Fn(&[u8]) -> u16 + Send + Sync,
{
    pub fn new(compute: F) -> Self {
        Self { compute }
    }
}

impl<F> ChecksumPolicy for FnChecksum<F>
where
    F: Fn(&[u8]) -> u16 + Send + Sync,
{
    fn compute(&self, covered: &[u8]) -> u16 {
        (self.compute)(covered)
    }
}

impl<F> fmt::Debug for FnChecksum<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnChecksum").finish_non_exhaustive()
    }
}
