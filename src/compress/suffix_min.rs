//! Range minimum over the backward cost table.
//!
//! Both LZ parses code `len - 1` in `2 * floor(log2(len - 1)) + 1` bits, so
//! every length in `2^t + 1..=2^(t+1)` costs the same. The cheapest prefix
//! of a match is then one range-minimum query per tier over the already
//! final suffix costs, found with a sparse table grown from the end of input
//! toward the front.

/// Sparse table of cost minima. Level `k` holds, per position `p`, the
/// position in `p..p + 2^k` with the smallest cost, the later one on ties.
#[derive(Debug)]
pub(crate) struct SuffixMin {
    costs: Vec<u32>,
    levels: Vec<Vec<u32>>,
}

impl SuffixMin {
    /// Table for positions `0..len`.
    pub fn new(len: usize) -> Self {
        let depth = (usize::BITS - len.max(1).leading_zeros()) as usize;
        Self {
            costs: vec![0; len],
            levels: vec![vec![0; len]; depth],
        }
    }

    /// Record the final cost of `pos`. Every position after `pos` must
    /// already be recorded.
    pub fn set(&mut self, pos: usize, cost: u32) {
        let len = self.costs.len();
        self.costs[pos] = cost;
        self.levels[0][pos] = pos as u32;
        for k in 1..self.levels.len() {
            if pos + (1 << k) > len {
                break;
            }
            let first = self.levels[k - 1][pos];
            let second = self.levels[k - 1][pos + (1 << (k - 1))];
            let min = self.pick(first, second);
            self.levels[k][pos] = min;
        }
    }

    /// Cost recorded for `pos`.
    #[inline]
    pub fn cost(&self, pos: usize) -> u32 {
        self.costs[pos]
    }

    /// Position in `lo..=hi` with the smallest cost, the latest on ties.
    pub fn argmin(&self, lo: usize, hi: usize) -> usize {
        debug_assert!(lo <= hi && hi < self.costs.len());
        let k = (hi - lo + 1).ilog2() as usize;
        let first = self.levels[k][lo];
        let second = self.levels[k][hi + 1 - (1 << k)];
        self.pick(first, second) as usize
    }

    /// `second` is never before `first`, so preferring it on equal cost
    /// keeps the latest minimum.
    #[inline]
    fn pick(&self, first: u32, second: u32) -> u32 {
        if self.costs[second as usize] <= self.costs[first as usize] {
            second
        } else {
            first
        }
    }
}

/// Match lengths sharing one code length, as inclusive `(lo, hi)` ranges,
/// longest first, for a match of up to `max` bytes.
pub(crate) fn length_tiers(max: usize) -> impl Iterator<Item = (usize, usize)> {
    let tiers = if max < 2 { 0 } else { (max - 1).ilog2() + 1 };
    (0..tiers)
        .rev()
        .map(move |t| ((1usize << t) + 1, (1usize << (t + 1)).min(max)))
}
