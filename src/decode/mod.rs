//! Decoders for the LZ stream formats.
//!
//! Each decoder is the runtime unpack routine of its format, replayed
//! instruction by instruction on a fresh [`crate::cpu::CpuState`]. The
//! compressed stream is loaded at the top of the 64KB address space and
//! output is written upward from address 0, so everything the routine can
//! observe on hardware (flag side effects, overlapping copies, wrap-around)
//! behaves the same here. Where hardware would silently corrupt memory the
//! model reports [`crate::Error::MalformedStream`] instead.

mod machine;

pub mod elias_lz;
pub mod pletter;
