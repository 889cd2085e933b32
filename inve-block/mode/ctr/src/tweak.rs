use crate::Error;
use cipher::{Block, BlockCipher, BlockEncrypt, BlockSizeUser, Key, KeyInit};
use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Block cipher whose key schedule can carry a tweak.
///
/// `Default` must produce the schedule of an all-zero key so that an unkeyed
/// context stays memory-safe. Implementors wipe their schedule on drop.
pub trait TweakBlockCipher: BlockSizeUser + Default + ZeroizeOnDrop {
    /// Expand `key` into a schedule without a tweak slot.
    fn set_key(&mut self, key: &[u8]) -> Result<(), Error>;

    /// Expand `key` into a schedule with a tweak slot, initially all zero.
    fn set_tweaked_key(&mut self, key: &[u8]) -> Result<(), Error>;

    /// Replace the tweak of a tweaked schedule.
    ///
    /// `None` selects the all-zero tweak; shorter tweaks are zero-padded on
    /// the right up to the block size.
    fn set_tweak(&mut self, tweak: Option<&[u8]>) -> Result<(), Error>;

    /// Encrypt a single block in place.
    fn encrypt_block(&self, block: &mut Block<Self>);
}

/// Tweakable block cipher built from an ordinary one with the first
/// Liskov-Rivest-Wagner construction: `E(K, T, M) = E_K(T ^ E_K(M))`.
///
/// A schedule set with [`TweakBlockCipher::set_key`] has no tweak and
/// encrypts with `E_K` alone.
pub struct Lrw<C>
where
    C: BlockCipher + BlockEncrypt + KeyInit + ZeroizeOnDrop,
{
    cipher: C,
    tweak: Option<Block<C>>,
}

impl<C> Lrw<C>
where
    C: BlockCipher + BlockEncrypt + KeyInit + ZeroizeOnDrop,
{
    fn rekey(&mut self, key: &[u8], tweaked: bool) -> Result<(), Error> {
        let cipher = C::new_from_slice(key).map_err(|_| Error::InvalidKey)?;
        self.cipher = cipher;
        self.wipe_tweak();
        self.tweak = if tweaked { Some(Block::<C>::default()) } else { None };
        Ok(())
    }

    fn wipe_tweak(&mut self) {
        if let Some(tweak) = self.tweak.as_mut() {
            tweak.as_mut_slice().zeroize();
        }
    }

    /// Whether the schedule carries a tweak slot.
    pub fn is_tweaked(&self) -> bool {
        self.tweak.is_some()
    }
}

impl<C> Default for Lrw<C>
where
    C: BlockCipher + BlockEncrypt + KeyInit + ZeroizeOnDrop,
{
    fn default() -> Self {
        Self {
            cipher: C::new(&Key::<C>::default()),
            tweak: None,
        }
    }
}

impl<C> BlockSizeUser for Lrw<C>
where
    C: BlockCipher + BlockEncrypt + KeyInit + ZeroizeOnDrop,
{
    type BlockSize = C::BlockSize;
}

impl<C> TweakBlockCipher for Lrw<C>
where
    C: BlockCipher + BlockEncrypt + KeyInit + ZeroizeOnDrop,
{
    fn set_key(&mut self, key: &[u8]) -> Result<(), Error> {
        self.rekey(key, false)
    }

    fn set_tweaked_key(&mut self, key: &[u8]) -> Result<(), Error> {
        self.rekey(key, true)
    }

    fn set_tweak(&mut self, tweak: Option<&[u8]>) -> Result<(), Error> {
        let slot = self.tweak.as_mut().ok_or(Error::InvalidTweak)?;
        let tweak = tweak.unwrap_or(&[]);
        if tweak.len() > slot.len() {
            return Err(Error::InvalidTweak);
        }
        let (head, tail) = slot.split_at_mut(tweak.len());
        head.copy_from_slice(tweak);
        tail.zeroize();
        Ok(())
    }

    #[inline]
    fn encrypt_block(&self, block: &mut Block<Self>) {
        self.cipher.encrypt_block(block);
        if let Some(tweak) = &self.tweak {
            block.iter_mut().zip(tweak.iter()).for_each(|(b, t)| *b ^= t);
            self.cipher.encrypt_block(block);
        }
    }
}

impl<C> fmt::Debug for Lrw<C>
where
    C: BlockCipher + BlockEncrypt + KeyInit + ZeroizeOnDrop,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Lrw { ... }")
    }
}

impl<C> Drop for Lrw<C>
where
    C: BlockCipher + BlockEncrypt + KeyInit + ZeroizeOnDrop,
{
    fn drop(&mut self) {
        self.wipe_tweak();
    }
}

impl<C> ZeroizeOnDrop for Lrw<C> where C: BlockCipher + BlockEncrypt + KeyInit + ZeroizeOnDrop {}

#[cfg(test)]
mod tests {
    use super::{Lrw, TweakBlockCipher};
    use crate::Error;
    use aes::Aes128;
    use cipher::{Block, BlockEncrypt, KeyInit};
    use magma::Magma;

    const KEY: [u8; 16] = [0x42; 16];

    #[test]
    fn untweaked_matches_inner_cipher() {
        let mut lrw = Lrw::<Aes128>::default();
        lrw.set_key(&KEY).unwrap();

        let mut block = Block::<Aes128>::from([7u8; 16]);
        let mut expected = block;
        Aes128::new(&KEY.into()).encrypt_block(&mut expected);
        lrw.encrypt_block(&mut block);
        assert_eq!(block, expected);
    }

    #[test]
    fn zero_tweak_encrypts_twice() {
        let mut lrw = Lrw::<Aes128>::default();
        lrw.set_tweaked_key(&KEY).unwrap();
        assert!(lrw.is_tweaked());

        let mut block = Block::<Aes128>::default();
        let mut expected = block;
        let aes = Aes128::new(&KEY.into());
        aes.encrypt_block(&mut expected);
        aes.encrypt_block(&mut expected);
        lrw.encrypt_block(&mut block);
        assert_eq!(block, expected);
    }

    #[test]
    fn tweak_is_zero_padded() {
        let mut short = Lrw::<Magma>::default();
        let mut full = Lrw::<Magma>::default();
        let key = [0x5a; 32];
        short.set_tweaked_key(&key).unwrap();
        full.set_tweaked_key(&key).unwrap();
        short.set_tweak(Some(&[1, 2, 3])).unwrap();
        full.set_tweak(Some(&[1, 2, 3, 0, 0, 0, 0, 0])).unwrap();

        let mut a = Block::<Magma>::from([9u8; 8]);
        let mut b = a;
        short.encrypt_block(&mut a);
        full.encrypt_block(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut lrw = Lrw::<Aes128>::default();
        assert_eq!(lrw.set_key(&[0u8; 15]), Err(Error::InvalidKey));
        assert_eq!(lrw.set_tweaked_key(&[0u8; 33]), Err(Error::InvalidKey));

        lrw.set_key(&KEY).unwrap();
        assert_eq!(lrw.set_tweak(Some(&[1])), Err(Error::InvalidTweak));

        lrw.set_tweaked_key(&KEY).unwrap();
        assert_eq!(lrw.set_tweak(Some(&[0u8; 17])), Err(Error::InvalidTweak));
        assert_eq!(lrw.set_tweak(Some(&[0u8; 16])), Ok(()));
        assert_eq!(lrw.set_tweak(None), Ok(()));
    }

    #[test]
    fn failed_rekey_keeps_schedule() {
        let mut lrw = Lrw::<Aes128>::default();
        lrw.set_tweaked_key(&KEY).unwrap();
        lrw.set_tweak(Some(b"tweak")).unwrap();

        let mut before = Block::<Aes128>::default();
        lrw.encrypt_block(&mut before);

        assert!(lrw.set_key(&[1u8; 3]).is_err());
        assert!(lrw.is_tweaked());
        let mut after = Block::<Aes128>::default();
        lrw.encrypt_block(&mut after);
        assert_eq!(before, after);
    }
}
