//! Error types for the retropack library.

use std::fmt;

/// Result type alias for retropack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while compressing or decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input is larger than the codec can represent.
    InputTooLarge {
        /// Input length in bytes.
        len: usize,
        /// Largest accepted length.
        max: usize,
    },
    /// The stream does not follow the codec's framing.
    MalformedStream(String),
    /// The cost pass picked a mode the emitter cannot represent.
    ///
    /// This is an internal defect, never the caller's fault.
    UnsupportedMode(u8),
    /// No codec is registered under this id.
    UnknownCodec(u8),
    /// The codec id is known but its implementation is not configured.
    CodecUnavailable(u8),
    /// An external compressor failed or produced unusable output.
    External(String),
}

impl Error {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedStream(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InputTooLarge { len, max } => {
                write!(f, "Input of {} bytes exceeds maximum of {} bytes", len, max)
            }
            Error::MalformedStream(msg) => {
                write!(f, "Malformed stream: {}", msg)
            }
            Error::UnsupportedMode(mode) => {
                write!(f, "Unsupported offset mode {}", mode)
            }
            Error::UnknownCodec(id) => {
                write!(f, "Unknown codec id {}", id)
            }
            Error::CodecUnavailable(id) => {
                write!(f, "Codec {} is not configured", id)
            }
            Error::External(msg) => {
                write!(f, "External compressor error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::InputTooLarge { len: 40000, max: 30720 };
        assert_eq!(
            err.to_string(),
            "Input of 40000 bytes exceeds maximum of 30720 bytes"
        );
        assert_eq!(
            Error::malformed("truncated stream").to_string(),
            "Malformed stream: truncated stream"
        );
        assert_eq!(Error::UnknownCodec(9).to_string(), "Unknown codec id 9");
    }
}
