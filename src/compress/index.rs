//! Previous-occurrence index shared by the LZ encoders.
//!
//! Every position is chained to the closest earlier position starting with
//! the same two bytes, found through a 65536-bucket table keyed by those
//! bytes. Runs of one repeated byte are precomputed so match extension can
//! skip across them instead of comparing byte by byte, and so a chain walk
//! can cross an earlier run in one step.

/// Number of buckets, one per two-byte prefix.
const HASH_SIZE: usize = 1 << 16;

/// Marks the end of a chain.
const NONE: u32 = u32::MAX;

/// A back reference: copy `length` bytes from `offset` bytes earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Match {
    /// Bytes copied.
    pub length: u32,
    /// Distance back from the current position, 0 when there is no match.
    pub offset: u32,
}

/// Two-byte previous-occurrence chains and run boundaries.
#[derive(Debug)]
pub struct MatchIndex {
    prev: Vec<u32>,
    runs: Vec<u32>,
    starts: Vec<u32>,
}

impl MatchIndex {
    /// Build the index for `data`.
    pub fn new(data: &[u8]) -> Self {
        let n = data.len();
        let mut head = vec![NONE; HASH_SIZE];
        let mut prev = vec![NONE; n];

        for i in 0..n {
            // The byte past the end reads as zero.
            let next = data.get(i + 1).copied().unwrap_or(0);
            let key = data[i] as usize | (next as usize) << 8;
            prev[i] = head[key];
            head[key] = i as u32;
        }

        let mut runs = vec![0u32; n];
        let mut run = 0u32;
        for i in (0..n).rev() {
            run = if i + 1 < n && data[i + 1] == data[i] { run + 1 } else { 1 };
            runs[i] = run;
        }

        let mut starts = vec![0u32; n];
        for i in 1..n {
            starts[i] = if data[i - 1] == data[i] { starts[i - 1] } else { i as u32 };
        }

        Self { prev, runs, starts }
    }

    /// Closest earlier position sharing the two-byte prefix of `pos`.
    #[inline]
    pub fn prev(&self, pos: usize) -> Option<usize> {
        match self.prev[pos] {
            NONE => None,
            p => Some(p as usize),
        }
    }

    /// Number of bytes equal to `data[pos]` starting at `pos`.
    #[inline]
    pub fn run_length(&self, pos: usize) -> usize {
        self.runs[pos] as usize
    }

    /// First position of the run of equal bytes containing `pos`.
    #[inline]
    pub fn run_start(&self, pos: usize) -> usize {
        self.starts[pos] as usize
    }

    /// Length of the common prefix of `data[candidate..]` and `data[pos..]`,
    /// bounded by the end of input (`candidate < pos`).
    #[inline]
    pub fn match_length(&self, data: &[u8], candidate: usize, pos: usize) -> usize {
        debug_assert!(candidate < pos);
        let n = data.len();
        let mut length = 0;
        while pos + length < n && data[candidate + length] == data[pos + length] {
            let run = self.runs[pos + length];
            if run > 1 {
                length += run.min(self.runs[candidate + length]) as usize;
            } else {
                length += 1;
            }
        }
        length
    }

    /// Longest match at every position for each offset window.
    ///
    /// `windows` must be increasing. Window `k > 0` starts from the best
    /// match of window `k - 1` and resumes the chain walk from that match's
    /// position, so lengths never decrease with the window. Only strictly
    /// longer matches replace the current one, which keeps the closest of
    /// equally long candidates.
    ///
    /// When the chain enters an earlier run of the byte at `i`, it would
    /// visit that run's positions one by one with match lengths that rise
    /// until the run is as long as the one at `i` and stay flat after. Only
    /// the first position reaching the peak is checked.
    pub fn longest_matches<const N: usize>(
        &self,
        data: &[u8],
        windows: &[usize; N],
    ) -> Vec<[Match; N]> {
        let n = data.len();
        let mut found = vec![[Match::default(); N]; n];

        for (k, &window) in windows.iter().enumerate() {
            for (i, matches) in found.iter_mut().enumerate() {
                let mut pos = i;
                if k > 0 {
                    matches[k] = matches[k - 1];
                    pos = i - matches[k].offset as usize;
                }

                // Nothing beats a match that already reaches the end of input.
                let limit = (n - i) as u32;
                while matches[k].length < limit {
                    let Some(mut candidate) = self.prev(pos) else {
                        break;
                    };
                    if i - candidate > window {
                        break;
                    }
                    pos = candidate;
                    if self.runs[candidate] > 1 {
                        // The chain runs down to the run start through
                        // consecutive positions.
                        let floor = self.run_start(candidate).max(i.saturating_sub(window));
                        let short = self.runs[i].saturating_sub(self.runs[candidate]) as usize;
                        candidate = candidate.saturating_sub(short).max(floor);
                        pos = floor;
                    }

                    let length = self.match_length(data, candidate, i) as u32;
                    if length > matches[k].length {
                        matches[k] = Match {
                            length,
                            offset: (i - candidate) as u32,
                        };
                    }
                }
            }
        }

        found
    }
}
