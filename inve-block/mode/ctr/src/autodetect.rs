//! Runtime selection of the CTR backend.

use crate::{backends::Soft, CtrCore, Error, TweakBlockCipher};
use cipher::{inout::InOutBuf, Block, BlockSizeUser, StreamCipher, StreamCipherError};
use core::fmt;

#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(tctr_force_soft)))]
use crate::backends::Sse2;

enum Inner<C: TweakBlockCipher> {
    Soft(CtrCore<C, Soft>),
    #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(tctr_force_soft)))]
    Sse2(CtrCore<C, Sse2>),
}

macro_rules! dispatch {
    ($inner:expr, $core:ident => $body:expr) => {
        match $inner {
            Inner::Soft($core) => $body,
            #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(tctr_force_soft)))]
            Inner::Sse2($core) => $body,
        }
    };
}

/// CTR mode context with the fastest available backend bound at creation.
///
/// Every operation forwards to the backend chosen by [`TweakCtr::new`];
/// all backends produce identical output. After [`TweakCtr::cleanup`] the
/// context is wiped and every operation fails with [`Error::Uninitialized`].
///
/// The counter spans the whole block and wraps silently to zero on
/// overflow. Never encrypt more than `2^(8 * BLOCK_SIZE)` blocks under one
/// key, tweak and counter start.
pub struct TweakCtr<C: TweakBlockCipher> {
    inner: Option<Inner<C>>,
}

impl<C: TweakBlockCipher> TweakCtr<C> {
    /// Initialize a zeroed context, probing the CPU for a SIMD backend.
    pub fn new() -> Self {
        Self {
            inner: Some(Inner::detect()),
        }
    }

    /// Wipe the context. Calling this again is a no-op.
    pub fn cleanup(&mut self) {
        self.inner = None;
    }

    /// Whether the context is usable, i.e. not cleaned up.
    pub fn is_initialized(&self) -> bool {
        self.inner.is_some()
    }

    /// Name of the bound backend, or `None` after cleanup.
    pub fn backend_name(&self) -> Option<&'static str> {
        self.inner.as_ref().map(Inner::name)
    }

    /// Set an untweaked key. Discards buffered keystream.
    pub fn set_key(&mut self, key: &[u8]) -> Result<(), Error> {
        dispatch!(self.inner_mut()?, ctx => ctx.set_key(key))
    }

    /// Set a key with an all-zero tweak. Discards buffered keystream.
    pub fn set_tweaked_key(&mut self, key: &[u8]) -> Result<(), Error> {
        dispatch!(self.inner_mut()?, ctx => ctx.set_tweaked_key(key))
    }

    /// Change the tweak of a tweaked key. Discards buffered keystream.
    pub fn set_tweak(&mut self, tweak: Option<&[u8]>) -> Result<(), Error> {
        dispatch!(self.inner_mut()?, ctx => ctx.set_tweak(tweak))
    }

    /// Seed the counter, right-aligned; `None` zeroes it. Discards buffered
    /// keystream.
    pub fn set_counter(&mut self, counter: Option<&[u8]>) -> Result<(), Error> {
        dispatch!(self.inner_mut()?, ctx => ctx.set_counter(counter))
    }

    /// Apply keystream to `buf`, continuing where the previous call stopped.
    pub fn apply_keystream_inout(&mut self, buf: InOutBuf<'_, '_, u8>) -> Result<(), Error> {
        dispatch!(self.inner_mut()?, ctx => ctx.apply_keystream_inout(buf));
        Ok(())
    }

    /// Apply keystream to `buf` in place.
    pub fn apply_keystream(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        self.apply_keystream_inout(buf.into())
    }

    /// Apply keystream to `input`, writing the result into `output`.
    ///
    /// Both checks run before any byte is written.
    pub fn apply_keystream_b2b(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        let inner = self.inner_mut()?;
        let buf = InOutBuf::new(input, output).map_err(|_| Error::BufferMismatch)?;
        dispatch!(inner, ctx => ctx.apply_keystream_inout(buf));
        Ok(())
    }

    /// Counter value of the next keystream block to be generated.
    pub fn counter(&self) -> Result<&Block<C>, Error> {
        Ok(dispatch!(self.inner_ref()?, ctx => ctx.counter()))
    }

    /// Number of generated but not yet consumed keystream bytes.
    pub fn buffered_keystream(&self) -> Result<usize, Error> {
        Ok(dispatch!(self.inner_ref()?, ctx => ctx.buffered_keystream()))
    }

    fn inner_mut(&mut self) -> Result<&mut Inner<C>, Error> {
        self.inner.as_mut().ok_or(Error::Uninitialized)
    }

    fn inner_ref(&self) -> Result<&Inner<C>, Error> {
        self.inner.as_ref().ok_or(Error::Uninitialized)
    }
}

impl<C: TweakBlockCipher> Inner<C> {
    fn detect() -> Self {
        #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(tctr_force_soft)))]
        {
            if crate::sse2_cpuid::init().get() {
                return Inner::Sse2(CtrCore::new());
            }
        }
        Inner::Soft(CtrCore::new())
    }

    fn name(&self) -> &'static str {
        use crate::backends::CtrBackend;
        match self {
            Inner::Soft(_) => Soft::NAME,
            #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(tctr_force_soft)))]
            Inner::Sse2(_) => Sse2::NAME,
        }
    }
}

impl<C: TweakBlockCipher> Default for TweakCtr<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TweakBlockCipher> BlockSizeUser for TweakCtr<C> {
    type BlockSize = C::BlockSize;
}

impl<C: TweakBlockCipher> StreamCipher for TweakCtr<C> {
    fn try_apply_keystream_inout(
        &mut self,
        buf: InOutBuf<'_, '_, u8>,
    ) -> Result<(), StreamCipherError> {
        TweakCtr::apply_keystream_inout(self, buf).map_err(Into::into)
    }
}

impl<C: TweakBlockCipher> fmt::Debug for TweakCtr<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(inner) => dispatch!(inner, ctx => fmt::Debug::fmt(ctx, f)),
            None => f.write_str("TweakCtr { uninitialized }"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TweakCtr;
    use crate::{Error, Lrw};
    use aes::Aes128;
    use std::format;

    #[test]
    fn binds_a_backend() {
        let ctr = TweakCtr::<Lrw<Aes128>>::new();
        assert!(ctr.is_initialized());
        let name = ctr.backend_name().unwrap();
        assert!(name == "soft" || name == "sse2");
    }

    #[test]
    fn cleanup_is_idempotent() {
        let mut ctr = TweakCtr::<Lrw<Aes128>>::new();
        ctr.set_key(&[1u8; 16]).unwrap();
        ctr.cleanup();
        ctr.cleanup();
        assert!(!ctr.is_initialized());
        assert_eq!(ctr.backend_name(), None);
    }

    #[test]
    fn operations_fail_after_cleanup() {
        let mut ctr = TweakCtr::<Lrw<Aes128>>::new();
        ctr.cleanup();

        let mut buf = [0u8; 4];
        assert_eq!(ctr.set_key(&[1u8; 16]), Err(Error::Uninitialized));
        assert_eq!(ctr.set_tweaked_key(&[1u8; 16]), Err(Error::Uninitialized));
        assert_eq!(ctr.set_tweak(None), Err(Error::Uninitialized));
        assert_eq!(ctr.set_counter(None), Err(Error::Uninitialized));
        assert_eq!(ctr.apply_keystream(&mut buf), Err(Error::Uninitialized));
        assert_eq!(
            ctr.apply_keystream_b2b(&[1u8; 4], &mut buf),
            Err(Error::Uninitialized)
        );
        assert_eq!(ctr.counter(), Err(Error::Uninitialized));
        assert_eq!(ctr.buffered_keystream(), Err(Error::Uninitialized));
        assert_eq!(buf, [0u8; 4]);
    }

    #[test]
    fn debug_hides_state() {
        let mut ctr = TweakCtr::<Lrw<Aes128>>::new();
        ctr.set_key(&[0x77u8; 16]).unwrap();
        let shown = format!("{:?}", ctr);
        assert!(shown.ends_with("{ ... }"));
        ctr.cleanup();
        assert_eq!(format!("{:?}", ctr), "TweakCtr { uninitialized }");
    }
}
