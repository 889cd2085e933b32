use cipher::StreamCipherError;
use core::fmt;

/// Failure reported by a CTR context or by the underlying tweakable primitive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The block cipher rejected the key length.
    InvalidKey,
    /// The tweak is longer than a block, or the schedule has no tweak slot.
    InvalidTweak,
    /// The counter seed is longer than a block.
    InvalidCounter,
    /// Input and output buffers differ in length.
    BufferMismatch,
    /// The context was never initialized or has already been cleaned up.
    Uninitialized,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            Error::InvalidKey => "Invalid Key Length",
            Error::InvalidTweak => "Invalid Tweak",
            Error::InvalidCounter => "Invalid Counter Length",
            Error::BufferMismatch => "Buffer Length Mismatch",
            Error::Uninitialized => "Uninitialized Context",
        })
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl std::error::Error for Error {}

impl From<Error> for StreamCipherError {
    fn from(_: Error) -> StreamCipherError {
        StreamCipherError
    }
}
