//! Mark-byte run-length encoding.
//!
//! ```text
//! [mark] body [mark][0]
//! ```
//!
//! Inside the body a triple `mark count value` expands to `count` copies of
//! `value` (count 1..=255); every other byte stands for itself. A count of
//! zero terminates the stream. The mark defaults to the least frequent byte
//! of the input, so few literal occurrences of it need escaping.

use tracing::debug;

use crate::codec::{Codec, CodecId};
use crate::error::{Error, Result};

/// Shortest run written as a triple.
pub const MIN_RUN: usize = 4;

/// Longest run a single triple covers.
const MAX_RUN: usize = 255;

/// Run-length codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct RleCodec {
    mark: Option<u8>,
    transparent: Option<u8>,
}

impl RleCodec {
    /// Codec choosing its mark from the input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Always use `mark` as the escape byte.
    pub fn with_mark(mut self, mark: u8) -> Self {
        self.mark = Some(mark);
        self
    }

    /// Encode every run of `value` as a triple, whatever its length.
    ///
    /// Useful for the transparent color of sprite data, which consumers skip
    /// over as whole runs.
    pub fn with_transparent(mut self, value: u8) -> Self {
        self.transparent = Some(value);
        self
    }

    fn encodes_as_run(&self, value: u8, run: usize, mark: u8) -> bool {
        run >= MIN_RUN || value == mark || self.transparent == Some(value)
    }
}

/// Least frequent byte of `data`, lowest value on ties.
pub fn least_frequent_byte(data: &[u8]) -> u8 {
    let mut counts = [0usize; 256];
    for &b in data {
        counts[b as usize] += 1;
    }
    let (value, _) = counts
        .iter()
        .enumerate()
        .min_by_key(|&(value, &count)| (count, value))
        .unwrap_or((0, &0));
    value as u8
}

impl Codec for RleCodec {
    fn id(&self) -> CodecId {
        CodecId::Rle
    }

    fn name(&self) -> &'static str {
        "rle"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mark = self.mark.unwrap_or_else(|| least_frequent_byte(data));
        let mut out = Vec::with_capacity(data.len() + 3);
        out.push(mark);

        let mut i = 0;
        while i < data.len() {
            let value = data[i];
            let run = data[i..]
                .iter()
                .take(MAX_RUN)
                .take_while(|&&b| b == value)
                .count();

            if self.encodes_as_run(value, run, mark) {
                out.extend_from_slice(&[mark, run as u8, value]);
            } else {
                out.extend(std::iter::repeat(value).take(run));
            }
            i += run;
        }

        out.extend_from_slice(&[mark, 0]);
        debug!(input = data.len(), output = out.len(), mark, "rle compress");
        Ok(out)
    }

    fn uncompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let (&mark, body) = data
            .split_first()
            .ok_or_else(|| Error::malformed("missing rle mark"))?;

        let mut out = Vec::with_capacity(body.len() * 2);
        let mut rest = body;
        loop {
            match rest {
                [] => return Err(Error::malformed("missing rle terminator")),
                [b, tail @ ..] if *b != mark => {
                    out.push(*b);
                    rest = tail;
                }
                [_, 0, tail @ ..] => {
                    if !tail.is_empty() {
                        return Err(Error::malformed(format!(
                            "{} bytes after rle terminator",
                            tail.len()
                        )));
                    }
                    return Ok(out);
                }
                [_, count, value, tail @ ..] => {
                    out.extend(std::iter::repeat(*value).take(*count as usize));
                    rest = tail;
                }
                _ => return Err(Error::malformed("truncated rle triple")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let codec = RleCodec::new();
        let stream = codec.compress(&[]).unwrap();
        assert_eq!(stream, vec![0, 0, 0]);
        assert!(codec.uncompress(&stream).unwrap().is_empty());
    }

    #[test]
    fn test_run_threshold() {
        let codec = RleCodec::new().with_mark(0xFF);
        assert_eq!(
            codec.compress(&[1, 1, 1, 2]).unwrap(),
            vec![0xFF, 1, 1, 1, 2, 0xFF, 0]
        );
        assert_eq!(
            codec.compress(&[1, 1, 1, 1, 2]).unwrap(),
            vec![0xFF, 0xFF, 4, 1, 2, 0xFF, 0]
        );
    }

    #[test]
    fn test_mark_is_always_escaped() {
        let codec = RleCodec::new().with_mark(7);
        let stream = codec.compress(&[7, 3, 7, 7]).unwrap();
        assert_eq!(stream, vec![7, 7, 1, 7, 3, 7, 2, 7, 7, 0]);
        assert_eq!(codec.uncompress(&stream).unwrap(), vec![7, 3, 7, 7]);
    }

    #[test]
    fn test_long_run_splits() {
        let codec = RleCodec::new().with_mark(0);
        let data = vec![9u8; 300];
        let stream = codec.compress(&data).unwrap();
        assert_eq!(stream, vec![0, 0, 255, 9, 0, 45, 9, 0, 0]);
        assert_eq!(codec.uncompress(&stream).unwrap(), data);
    }

    #[test]
    fn test_transparent_runs() {
        let codec = RleCodec::new().with_mark(0xFE).with_transparent(0);
        let stream = codec.compress(&[5, 0, 5]).unwrap();
        assert_eq!(stream, vec![0xFE, 5, 0xFE, 1, 0, 5, 0xFE, 0]);
    }

    #[test]
    fn test_least_frequent_byte() {
        assert_eq!(least_frequent_byte(&[]), 0);
        let all: Vec<u8> = (0..=255).collect();
        assert_eq!(least_frequent_byte(&all), 0);
        let mut data = all.clone();
        data.extend(0..10);
        assert_eq!(least_frequent_byte(&data), 10);
    }

    #[test]
    fn test_malformed_streams() {
        let codec = RleCodec::new();
        for stream in [&[][..], &[5], &[5, 1, 2], &[5, 5, 3], &[5, 5, 0, 1]] {
            let err = codec.uncompress(stream).unwrap_err();
            assert!(matches!(err, Error::MalformedStream(_)), "{:?}", stream);
        }
    }
}
