//! Streaming quantile estimation.
//!
//! Targeted biased-quantile summary (Cormode, Korn, Muthukrishnan and
//! Srivastava). The estimator keeps an ordered list of markers. A marker stands
//! in for `width` observations no larger than its value; summing widths gives
//! the smallest rank its value can have, and `delta` bounds how much larger the
//! true rank may be. For a single objective `(φ, ε)` the allowed imprecision
//! at rank `r` out of `n` observations is
//!
//! ```text
//! f(r, n) = 2εr / φ            if r >= φn
//!         = 2ε(n - r) / (1 - φ) otherwise
//! ```
//!
//! Raw observations are buffered and merged in sorted batches. Adjacent
//! markers are folded together after every merge while the folded marker's
//! whole rank span fits `f` at its point nearest `φn`, so the marker that
//! answers a query never spans more than `2εn` ranks.

use crate::metric::Objective;

/// Raw observations held back before a sorted merge.
pub const BUFFER_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Marker {
    value: f64,
    width: f64,
    delta: f64,
}

impl Marker {
    fn raw(value: f64) -> Self {
        Self {
            value,
            width: 1.0,
            delta: 0.0,
        }
    }
}

/// Rank estimator for one `(quantile, error)` objective.
#[derive(Debug, Clone)]
pub struct QuantileEstimator {
    objective: Objective,
    markers: Vec<Marker>,
    buffer: Vec<f64>,
    capacity: usize,
    /// Observations folded into `markers`.
    n: f64,
}

impl QuantileEstimator {
    pub fn new(objective: Objective) -> Self {
        Self::with_buffer(objective, BUFFER_CAPACITY)
    }

    /// Estimator merging every `capacity` observations (at least one).
    pub fn with_buffer(objective: Objective, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            objective,
            markers: Vec::new(),
            buffer: Vec::with_capacity(capacity),
            capacity,
            n: 0.0,
        }
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Record one observation. NaN carries no rank and is ignored.
    pub fn insert(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.buffer.push(value);
        if self.buffer.len() >= self.capacity {
            self.flush();
        }
    }

    /// Observations seen so far (buffered ones included).
    pub fn count(&self) -> u64 {
        self.n as u64 + self.buffer.len() as u64
    }

    /// Markers currently retained; bounded independently of `count`.
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Value of the marker whose rank range lies closest to `φn`, NaN when
    /// empty.
    pub fn query(&mut self) -> f64 {
        self.flush();
        let target = self.objective.quantile * self.n;

        let mut best = (f64::INFINITY, f64::NAN);
        let mut rank = 0.0;
        for m in &self.markers {
            rank += m.width;
            // Worst distance between the target and any rank `m` may hold.
            let distance = (target - rank).max(rank + m.delta - target);
            if distance < best.0 {
                best = (distance, m.value);
            }
        }
        best.1
    }

    /// Combine two estimators for the same objective into a new one.
    pub fn merged(older: &Self, newer: &Self) -> Self {
        let mut out = Self::with_buffer(older.objective, older.capacity);
        out.markers = merge_markers(&older.markers, &newer.markers);
        out.n = older.n + newer.n;
        out.compress();
        out.buffer
            .extend(older.buffer.iter().chain(&newer.buffer).copied());
        out.flush();
        out
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        self.buffer.sort_by(f64::total_cmp);
        let batch: Vec<Marker> = self.buffer.drain(..).map(Marker::raw).collect();
        self.n += batch.len() as f64;
        self.markers = merge_markers(&self.markers, &batch);
        self.compress();
    }

    fn invariant(&self, rank: f64) -> f64 {
        let Objective { quantile, error } = self.objective;
        if quantile * self.n <= rank {
            2.0 * error * rank / quantile
        } else {
            2.0 * error * (self.n - rank) / (1.0 - quantile)
        }
    }

    /// Tightest `f` anywhere in the rank span `[start, end]`.
    fn allowed(&self, start: f64, end: f64) -> f64 {
        let target = self.objective.quantile * self.n;
        self.invariant(target.max(start).min(end))
    }

    /// Fold each marker into its right neighbour while the result still fits.
    /// The first marker is never folded, so the minimum keeps an exact rank
    /// and smaller values arriving later need no extra slack.
    fn compress(&mut self) {
        let Some((first, rest)) = self.markers.split_first() else {
            return;
        };
        let Some((last, middle)) = rest.split_last() else {
            return;
        };

        let mut kept = Vec::with_capacity(self.markers.len());
        let mut x = *last;
        // Ranks strictly below `x`.
        let mut below = self.n - x.width;
        for c in middle.iter().rev() {
            let start = below - c.width;
            let span = c.width + x.width + x.delta;
            if span <= self.allowed(start, start + span) {
                x.width += c.width;
            } else {
                kept.push(x);
                x = *c;
            }
            below = start;
        }
        kept.push(x);
        kept.push(*first);
        kept.reverse();
        self.markers = kept;
    }
}

/// Interleave two marker lists by value.
///
/// Up to `next.width + next.delta - 1` observations of the other list, where
/// `next` is its first marker not yet emitted, may rank below the emitted
/// marker without being counted in its widths; that goes into its `delta`.
fn merge_markers(a: &[Marker], b: &[Marker]) -> Vec<Marker> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    loop {
        let (mut marker, next) = match (a.get(i), b.get(j)) {
            (Some(x), Some(y)) if x.value <= y.value => {
                i += 1;
                (*x, Some(y))
            }
            (Some(x), Some(y)) => {
                j += 1;
                (*y, Some(x))
            }
            (Some(x), None) => {
                i += 1;
                (*x, None)
            }
            (None, Some(y)) => {
                j += 1;
                (*y, None)
            }
            (None, None) => break,
        };
        if let Some(next) = next {
            marker.delta += next.width + next.delta - 1.0;
        }
        out.push(marker);
    }
    out
}
