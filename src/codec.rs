//! The codec contract and stable codec ids.

use std::fmt;

use crate::error::{Error, Result};

/// Stable identifier persisted next to compressed data.
///
/// The numeric values never change between versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CodecId {
    /// Uncompressed bytes.
    Raw = 0,
    /// Mark-byte run-length encoding.
    Rle = 1,
    /// Optimal-parse LZ (Pletter stream format).
    Pletter = 2,
    /// Elias-gamma LZ, mini layout.
    EliasMini = 3,
    /// Elias-gamma LZ, full layout.
    EliasFull = 4,
    /// Pletter stream produced by an external tool.
    ExternalPletter = 5,
    /// Full-layout Elias-gamma LZ stream produced by an external tool.
    ExternalEliasFull = 6,
}

impl CodecId {
    /// All ids, in numeric order.
    pub const ALL: [CodecId; 7] = [
        CodecId::Raw,
        CodecId::Rle,
        CodecId::Pletter,
        CodecId::EliasMini,
        CodecId::EliasFull,
        CodecId::ExternalPletter,
        CodecId::ExternalEliasFull,
    ];

    /// Numeric value of the id.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for CodecId {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        CodecId::ALL
            .get(value as usize)
            .copied()
            .ok_or(Error::UnknownCodec(value))
    }
}

impl From<CodecId> for u8 {
    fn from(id: CodecId) -> u8 {
        id.as_u8()
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// A reversible byte-buffer compressor.
///
/// Implementations hold only configuration; every call allocates its own
/// working state, so one instance can serve concurrent callers.
pub trait Codec: Send + Sync {
    /// Identifier persisted with the compressed bytes.
    fn id(&self) -> CodecId;

    /// Short human-readable name.
    fn name(&self) -> &'static str;

    /// Compress `data`. Deterministic; defined for empty input.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Invert [`Codec::compress`].
    ///
    /// Fails with [`Error::MalformedStream`] when `data` does not follow the
    /// codec's framing.
    fn uncompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}


impl std::fmt::Debug for dyn Codec + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
