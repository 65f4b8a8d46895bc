//! Compression codecs.
//!
//! [`raw`] and [`rle`] are plain byte-oriented codecs. [`pletter`] is the
//! optimal-parse primary codec and [`elias_lz`] encodes the two sibling LZ
//! layouts; both LZ formats decode through the CPU model in
//! [`crate::decode`]. [`external`] wraps out-of-process compressors.

pub mod elias_lz;
pub mod external;
pub mod index;
pub mod pletter;
pub mod raw;
pub mod rle;
mod suffix_min;

use crate::error::{Error, Result};

pub use elias_lz::{EliasLzCodec, Variant};
pub use external::{ExternalCodec, ExternalTool};
pub use pletter::{ModeSelection, PletterCodec};
pub use raw::RawCodec;
pub use rle::RleCodec;

/// Largest input the LZ encoders accept.
///
/// The decoders keep the compressed stream and the decoded output in one
/// 64KB address space. At this size the worst-case stream (9 bits per byte
/// plus framing) and the output still fit together.
pub const MAX_INPUT_LEN: usize = 30 * 1024;

pub(crate) fn check_input_len(data: &[u8]) -> Result<()> {
    if data.len() > MAX_INPUT_LEN {
        return Err(Error::InputTooLarge {
            len: data.len(),
            max: MAX_INPUT_LEN,
        });
    }
    Ok(())
}
