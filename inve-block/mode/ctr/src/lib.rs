//! Counter (CTR) mode over tweakable block ciphers.
//!
//! A context turns a fixed-width block cipher into a byte-stream cipher.
//! Keystream is buffered between calls, so encrypting a message in one call
//! or in any sequence of smaller calls yields the same bytes. Encryption and
//! decryption are the same operation.
//!
//! The block width follows the cipher: [`Ctr128`] and [`Ctr64`] name the
//! 16-byte and 8-byte instantiations of the same engine. [`TweakCtr`] picks
//! a SIMD backend at runtime when the CPU supports one; [`CtrCore`] binds a
//! backend statically.
//!
//! # ⚠️ Security Warning: Hazmat!
//!
//! This crate does not ensure ciphertexts are authentic. The counter wraps
//! silently to zero after `2^(8 * BLOCK_SIZE)` blocks, which repeats
//! keystream; callers must never get there under a single key and tweak.
//!
//! # Example
//! ```
//! use aes::Aes128;
//! use inve_tctr::{Ctr128, Lrw};
//!
//! let mut ctr = Ctr128::<Lrw<Aes128>>::new();
//! ctr.set_tweaked_key(&[0x42; 16]).unwrap();
//! ctr.set_tweak(Some(b"sector 7")).unwrap();
//! ctr.set_counter(Some(&[0x24; 8])).unwrap();
//!
//! let plaintext = *b"hello world! this is my plaintext.";
//! let mut buf = plaintext;
//! for chunk in buf.chunks_mut(5) {
//!     ctr.apply_keystream(chunk).unwrap();
//! }
//!
//! ctr.set_counter(Some(&[0x24; 8])).unwrap();
//! ctr.apply_keystream(&mut buf).unwrap();
//! assert_eq!(buf, plaintext);
//!
//! ctr.cleanup();
//! ```

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, rust_2018_idioms)]

#[cfg(any(feature = "std", test))]
extern crate std;

pub use cipher;

use cfg_if::cfg_if;

mod autodetect;
pub mod backends;
mod ctr_core;
mod errors;
mod tweak;

pub use autodetect::TweakCtr;
pub use backends::CtrBackend;
pub use ctr_core::CtrCore;
pub use errors::Error;
pub use tweak::{Lrw, TweakBlockCipher};

cfg_if! {
    if #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(tctr_force_soft)))] {
        cpufeatures::new!(sse2_cpuid, "sse2");
    }
}

/// Wide-block CTR mode with a 16-byte block and counter.
pub type Ctr128<C> = TweakCtr<C>;

/// Narrow-block CTR mode with an 8-byte block and counter.
pub type Ctr64<C> = TweakCtr<C>;

