use super::CtrBackend;
use cipher::inout::InOutBuf;

/// Portable backend.
#[derive(Copy, Clone, Debug, Default)]
pub struct Soft;

impl CtrBackend for Soft {
    const NAME: &'static str = "soft";

    #[inline(always)]
    fn xor_keystream(mut buf: InOutBuf<'_, '_, u8>, keystream: &[u8]) {
        buf.xor_in2out(keystream);
    }
}
