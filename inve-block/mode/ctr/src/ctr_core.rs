use crate::{
    backends::{CtrBackend, Soft},
    Error, TweakBlockCipher,
};
use cipher::{
    inout::InOutBuf, typenum::Unsigned, Block, BlockSizeUser, StreamCipher, StreamCipherError,
};
use core::{fmt, marker::PhantomData};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// CTR mode state bound to a single backend.
///
/// The counter is a big-endian integer spanning the whole block. It wraps
/// to zero after `2^(8 * BLOCK_SIZE)` blocks without reporting an error;
/// callers must never exhaust the counter space under one key, as that
/// reuses keystream.
pub struct CtrCore<C, B = Soft>
where
    C: TweakBlockCipher,
    B: CtrBackend,
{
    cipher: C,
    counter: Block<C>,
    keystream: Block<C>,
    offset: usize,
    _backend: PhantomData<B>,
}

impl<C, B> CtrCore<C, B>
where
    C: TweakBlockCipher,
    B: CtrBackend,
{
    /// Create a zeroed context with no buffered keystream.
    pub fn new() -> Self {
        Self {
            cipher: C::default(),
            counter: Default::default(),
            keystream: Default::default(),
            offset: C::BlockSize::USIZE,
            _backend: PhantomData,
        }
    }

    /// Set an untweaked key. Discards buffered keystream.
    pub fn set_key(&mut self, key: &[u8]) -> Result<(), Error> {
        self.cipher.set_key(key)?;
        self.reset_keystream();
        Ok(())
    }

    /// Set a key with a tweak slot. Discards buffered keystream.
    pub fn set_tweaked_key(&mut self, key: &[u8]) -> Result<(), Error> {
        self.cipher.set_tweaked_key(key)?;
        self.reset_keystream();
        Ok(())
    }

    /// Change the tweak of a tweaked key. Discards buffered keystream.
    pub fn set_tweak(&mut self, tweak: Option<&[u8]>) -> Result<(), Error> {
        self.cipher.set_tweak(tweak)?;
        self.reset_keystream();
        Ok(())
    }

    /// Seed the counter and realign the keystream to a block boundary.
    ///
    /// The seed is right-aligned within the block with zero high-order
    /// bytes; `None` zeroes the counter.
    pub fn set_counter(&mut self, counter: Option<&[u8]>) -> Result<(), Error> {
        let seed = counter.unwrap_or(&[]);
        if seed.len() > self.counter.len() {
            return Err(Error::InvalidCounter);
        }
        let (high, low) = self.counter.split_at_mut(C::BlockSize::USIZE - seed.len());
        high.zeroize();
        low.copy_from_slice(seed);
        self.reset_keystream();
        Ok(())
    }

    /// Apply keystream to `buf`, continuing where the previous call stopped.
    pub fn apply_keystream_inout(&mut self, mut buf: InOutBuf<'_, '_, u8>) {
        let bs = C::BlockSize::USIZE;
        while !buf.is_empty() {
            if self.offset >= bs {
                self.gen_keystream_block();
                if buf.len() >= bs {
                    let (head, tail) = buf.split_at(bs);
                    B::xor_keystream(head, &self.keystream);
                    buf = tail;
                } else {
                    let n = buf.len();
                    B::xor_keystream(buf, &self.keystream[..n]);
                    self.offset = n;
                    break;
                }
            } else {
                let n = core::cmp::min(bs - self.offset, buf.len());
                let (head, tail) = buf.split_at(n);
                B::xor_keystream(head, &self.keystream[self.offset..self.offset + n]);
                self.offset += n;
                buf = tail;
            }
        }
    }

    /// Apply keystream to `buf` in place.
    #[inline]
    pub fn apply_keystream(&mut self, buf: &mut [u8]) {
        self.apply_keystream_inout(buf.into());
    }

    /// Apply keystream to `input`, writing the result into `output`.
    pub fn apply_keystream_b2b(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        let buf = InOutBuf::new(input, output).map_err(|_| Error::BufferMismatch)?;
        self.apply_keystream_inout(buf);
        Ok(())
    }

    /// Counter value of the next keystream block to be generated.
    pub fn counter(&self) -> &Block<C> {
        &self.counter
    }

    /// Number of generated but not yet consumed keystream bytes.
    pub fn buffered_keystream(&self) -> usize {
        C::BlockSize::USIZE - self.offset
    }

    fn gen_keystream_block(&mut self) {
        self.keystream.copy_from_slice(&self.counter);
        self.cipher.encrypt_block(&mut self.keystream);
        increment_be(&mut self.counter);
    }

    #[inline]
    fn reset_keystream(&mut self) {
        self.offset = C::BlockSize::USIZE;
    }
}

/// Add one to a big-endian integer, wrapping to zero on overflow.
///
/// The carry runs through every byte regardless of its value.
#[inline]
pub(crate) fn increment_be(counter: &mut [u8]) {
    let mut carry = 1u16;
    for byte in counter.iter_mut().rev() {
        carry += u16::from(*byte);
        *byte = carry as u8;
        carry >>= 8;
    }
}

impl<C, B> Default for CtrCore<C, B>
where
    C: TweakBlockCipher,
    B: CtrBackend,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C, B> BlockSizeUser for CtrCore<C, B>
where
    C: TweakBlockCipher,
    B: CtrBackend,
{
    type BlockSize = C::BlockSize;
}

impl<C, B> StreamCipher for CtrCore<C, B>
where
    C: TweakBlockCipher,
    B: CtrBackend,
{
    fn try_apply_keystream_inout(
        &mut self,
        buf: InOutBuf<'_, '_, u8>,
    ) -> Result<(), StreamCipherError> {
        self.apply_keystream_inout(buf);
        Ok(())
    }
}

impl<C, B> fmt::Debug for CtrCore<C, B>
where
    C: TweakBlockCipher,
    B: CtrBackend,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CtrCore<")?;
        f.write_str(B::NAME)?;
        f.write_str("> { ... }")
    }
}

impl<C, B> Drop for CtrCore<C, B>
where
    C: TweakBlockCipher,
    B: CtrBackend,
{
    fn drop(&mut self) {
        self.counter.as_mut_slice().zeroize();
        self.keystream.as_mut_slice().zeroize();
        self.offset.zeroize();
    }
}

impl<C, B> ZeroizeOnDrop for CtrCore<C, B>
where
    C: TweakBlockCipher,
    B: CtrBackend,
{
}
