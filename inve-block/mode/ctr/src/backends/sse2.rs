use super::{CtrBackend, Soft};
use crate::sse2_cpuid;
use cipher::inout::InOutBuf;

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

/// SSE2 backend.
///
/// Falls back to [`Soft`] when the running CPU lacks SSE2, so it is sound to
/// use on any x86 target.
#[derive(Copy, Clone, Debug, Default)]
pub struct Sse2;

impl CtrBackend for Sse2 {
    const NAME: &'static str = "sse2";

    #[inline]
    fn xor_keystream(buf: InOutBuf<'_, '_, u8>, keystream: &[u8]) {
        if sse2_cpuid::get() {
            unsafe { xor_keystream(buf, keystream) }
        } else {
            Soft::xor_keystream(buf, keystream)
        }
    }
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn xor_keystream(buf: InOutBuf<'_, '_, u8>, keystream: &[u8]) {
    let len = buf.len();
    assert_eq!(len, keystream.len());

    let (in_ptr, out_ptr) = buf.into_raw();
    let ks_ptr = keystream.as_ptr();

    let mut pos = 0;
    while pos + 16 <= len {
        let a = _mm_loadu_si128(in_ptr.add(pos) as *const __m128i);
        let k = _mm_loadu_si128(ks_ptr.add(pos) as *const __m128i);
        _mm_storeu_si128(out_ptr.add(pos) as *mut __m128i, _mm_xor_si128(a, k));
        pos += 16;
    }

    if pos + 8 <= len {
        let a = _mm_loadl_epi64(in_ptr.add(pos) as *const __m128i);
        let k = _mm_loadl_epi64(ks_ptr.add(pos) as *const __m128i);
        _mm_storel_epi64(out_ptr.add(pos) as *mut __m128i, _mm_xor_si128(a, k));
        pos += 8;
    }

    while pos < len {
        *out_ptr.add(pos) = *in_ptr.add(pos) ^ *ks_ptr.add(pos);
        pos += 1;
    }
}
