//! Bit-level output for the LZ stream formats.
//!
//! The 8-bit decoders keep a bit buffer in the accumulator and, once it runs
//! dry, load the next byte from the same pointer they read data bytes from.
//! The writer therefore reserves a *flag byte* in the output the moment the
//! first bit of a group is written; whole data bytes written afterwards land
//! behind it, and the flag byte is filled in MSB first as bits arrive.

/// A bit writer that packs bits MSB first into flag bytes interleaved with
/// data bytes.
#[derive(Debug)]
pub struct BitWriter {
    buffer: Vec<u8>,
    flag_index: usize,
    current_byte: u8,
    bit_count: u8,
}

impl BitWriter {
    /// Create a new bit writer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create a new bit writer with specified byte capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            flag_index: 0,
            current_byte: 0,
            bit_count: 0,
        }
    }

    /// Write a single flag bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        if self.bit_count == 0 {
            self.flag_index = self.buffer.len();
            self.buffer.push(0);
        }
        self.current_byte = (self.current_byte << 1) | bit as u8;
        self.bit_count += 1;

        if self.bit_count == 8 {
            self.buffer[self.flag_index] = self.current_byte;
            self.current_byte = 0;
            self.bit_count = 0;
        }
    }

    /// Write the low `num_bits` of `value`, most significant first.
    #[inline]
    pub fn write_bits(&mut self, value: u32, num_bits: u8) {
        debug_assert!(num_bits <= 32);
        for shift in (0..num_bits).rev() {
            self.write_bit((value >> shift) & 1 != 0);
        }
    }

    /// Append a whole data byte behind the current flag byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    /// Write `value` (>= 1) with nested continuation flags.
    ///
    /// Every bit below the leading one is preceded by a `1` flag; a `0` flag
    /// ends the code. Costs `2 * floor(log2 value) + 1` bits.
    pub fn write_nested(&mut self, value: u32) {
        debug_assert!(value >= 1);
        let top = 31 - value.leading_zeros();
        for shift in (0..top).rev() {
            self.write_bit(true);
            self.write_bit((value >> shift) & 1 != 0);
        }
        self.write_bit(false);
    }

    /// Write `value` (>= 1) as an Elias gamma code.
    ///
    /// `floor(log2 value)` zero bits, then the value itself MSB first.
    pub fn write_elias_gamma(&mut self, value: u32) {
        debug_assert!(value >= 1);
        let top = 31 - value.leading_zeros();
        for _ in 0..top {
            self.write_bit(false);
        }
        self.write_bits(value, top as u8 + 1);
    }

    /// Pads the pending flag byte with zeros.
    pub fn flush(&mut self) {
        if self.bit_count > 0 {
            self.buffer[self.flag_index] = self.current_byte << (8 - self.bit_count);
            self.current_byte = 0;
            self.bit_count = 0;
        }
    }

    /// Pad the last flag byte and return the stream.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.flush();
        self.buffer
    }

    /// Returns length in bytes, including a reserved partial flag byte.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of bits already placed in the pending flag byte (0-7).
    pub fn bit_count(&self) -> u8 {
        self.bit_count
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Bits used by [`BitWriter::write_nested`] (and [`BitWriter::write_elias_gamma`])
/// for `value`.
#[inline]
pub fn nested_code_bits(value: u32) -> u32 {
    debug_assert!(value >= 1);
    2 * (31 - value.leading_zeros()) + 1
}
