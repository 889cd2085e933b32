//! Keystream XOR backends.

use cfg_if::cfg_if;
use cipher::inout::InOutBuf;

mod soft;

pub use soft::Soft;

cfg_if! {
    if #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(tctr_force_soft)))] {
        mod sse2;
        pub use sse2::Sse2;
    }
}

/// Keystream application primitive of a CTR backend.
///
/// Everything else a context does is shared between backends, so this is
/// the only place where their behavior may be specialized. Implementations
/// must produce identical bytes.
pub trait CtrBackend {
    /// Human readable backend name.
    const NAME: &'static str;

    /// XOR `keystream` into `buf`, writing `in ^ keystream` to the output.
    ///
    /// `keystream.len()` must equal `buf.len()`.
    fn xor_keystream(buf: InOutBuf<'_, '_, u8>, keystream: &[u8]);
}
