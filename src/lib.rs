//! # retropack
//!
//! Compression codecs for data unpacked at load time by small decompression
//! routines on 8-bit machines.
//!
//! The primary codec is an optimal-parse LZ compressor writing the Pletter
//! stream format. Decoding runs the target machine's unpack routine on a
//! flag-accurate CPU model, so a stream that decodes here decodes the same
//! way on hardware.
//!
//! ## Features
//!
//! - **Optimal parsing** over seven offset windows with a bit-exact cost model
//! - **Elias-gamma LZ** in a mini and a full layout
//! - **Run-length** and raw baseline codecs
//! - **Stable codec ids** and a [`Registry`] for dispatch
//! - Optional **external compressor** binaries, verified by the in-crate decoders
//!
//! ## Example
//!
//! ```rust
//! use retropack::{Codec, PletterCodec};
//!
//! let data = b"ABCABCABCABC hello hello hello".to_vec();
//! let codec = PletterCodec::new();
//! let packed = codec.compress(&data).unwrap();
//! assert_eq!(codec.uncompress(&packed).unwrap(), data);
//! ```
//!
//! Picking the smallest encoding:
//!
//! ```rust
//! use retropack::Registry;
//!
//! let registry = Registry::builtin();
//! let data = vec![0u8; 512];
//! let (id, packed) = registry.compress_smallest(&data).unwrap();
//! assert_eq!(registry.uncompress(id.as_u8(), &packed).unwrap(), data);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bits;
pub mod codec;
pub mod compress;
pub mod cpu;
pub mod decode;
pub mod error;
pub mod registry;

pub use codec::{Codec, CodecId};
pub use compress::{
    EliasLzCodec, ExternalCodec, ExternalTool, ModeSelection, PletterCodec, RawCodec, RleCodec,
    Variant, MAX_INPUT_LEN,
};
pub use error::{Error, Result};
pub use registry::{Registry, RegistryOptions};
