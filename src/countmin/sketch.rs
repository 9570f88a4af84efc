// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::f64::consts::E;

use crate::error::Error;
use crate::error::try_zeroed;
use crate::hash::DoubleHash;

/// Count-Min sketch for approximate frequency estimation.
///
/// Counters live in one flat row-major array of `depth * width` cells. Row `r` addresses
/// column `derive(item, r) mod width`.
///
/// Estimates never undercount: for every item, `estimate(item)` is at least the total weight
/// applied to it. With probability `confidence()`, the overcount is at most
/// `relative_error() * total_weight()`.
///
/// Counters are 64-bit and saturate at `u64::MAX` instead of wrapping, so the estimate stays
/// an upper bound even under sustained high-frequency updates.
#[derive(Debug, Clone, PartialEq)]
pub struct CountMinSketch {
    width: usize,
    depth: usize,
    total_weight: u64,
    saturated: bool,
    counters: Vec<u64>,
}

impl CountMinSketch {
    /// Creates a sketch with `width` counters per row and `depth` rows.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if either
    /// dimension is zero or the grid size overflows, and
    /// [`ErrorKind::AllocationFailed`](crate::error::ErrorKind::AllocationFailed) if the
    /// counters cannot be allocated.
    pub fn new(width: usize, depth: usize) -> Result<Self, Error> {
        if width == 0 {
            return Err(Error::invalid_config("width must be at least 1"));
        }
        if depth == 0 {
            return Err(Error::invalid_config("depth must be at least 1"));
        }
        let num_counters = width.checked_mul(depth).ok_or_else(|| {
            Error::invalid_config("counter grid is too large")
                .with_context("width", width)
                .with_context("depth", depth)
        })?;
        let counters = try_zeroed(num_counters, "count-min counters")?;

        tracing::debug!(width, depth, "created count-min sketch");
        Ok(CountMinSketch {
            width,
            depth,
            total_weight: 0,
            saturated: false,
            counters,
        })
    }

    /// Creates a sketch whose estimates exceed the true count by at most
    /// `epsilon * total_weight` with probability `1 - delta`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) unless both
    /// `epsilon` and `delta` are in `(0, 1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::countmin::CountMinSketch;
    /// let sketch = CountMinSketch::with_accuracy(0.01, 0.01).unwrap();
    /// assert_eq!(sketch.width(), 272);
    /// assert_eq!(sketch.depth(), 5);
    /// ```
    pub fn with_accuracy(epsilon: f64, delta: f64) -> Result<Self, Error> {
        if !(epsilon > 0.0 && epsilon < 1.0) {
            return Err(Error::invalid_config("epsilon must be between 0.0 and 1.0 (exclusive)")
                .with_context("epsilon", epsilon));
        }
        if !(delta > 0.0 && delta < 1.0) {
            return Err(Error::invalid_config("delta must be between 0.0 and 1.0 (exclusive)")
                .with_context("delta", delta));
        }
        Self::new(Self::suggest_width(epsilon), Self::suggest_depth(delta))
    }

    /// Suggests the number of counters per row for relative error `epsilon`.
    ///
    /// Formula: `w = ceil(e / epsilon)`
    pub fn suggest_width(epsilon: f64) -> usize {
        (E / epsilon).ceil() as usize
    }

    /// Suggests the number of rows for failure probability `delta`.
    ///
    /// Formula: `d = ceil(ln(1 / delta))`, at least 1
    pub fn suggest_depth(delta: f64) -> usize {
        ((1.0 / delta).ln().ceil() as usize).max(1)
    }

    /// Returns the number of counters per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the total weight inserted, saturating at `u64::MAX`.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Returns true if no weight has been inserted.
    pub fn is_empty(&self) -> bool {
        self.total_weight == 0
    }

    /// Returns true once any counter has saturated at `u64::MAX`.
    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    /// Returns the relative error `epsilon = e / width` of the estimates.
    pub fn relative_error(&self) -> f64 {
        E / self.width as f64
    }

    /// Returns the probability `1 - e^(-depth)` that an estimate is within the error bound.
    pub fn confidence(&self) -> f64 {
        1.0 - (-(self.depth as f64)).exp()
    }

    /// Returns the memory footprint of the sketch in bytes.
    pub fn memory_usage(&self) -> usize {
        size_of::<Self>() + self.counters.len() * size_of::<u64>()
    }

    /// Adds one occurrence of `item`.
    pub fn update(&mut self, item: impl AsRef<[u8]>) {
        self.update_with_weight(item, 1);
    }

    /// Adds `weight` occurrences of `item`.
    pub fn update_with_weight(&mut self, item: impl AsRef<[u8]>, weight: u64) {
        let hashes = DoubleHash::new(item.as_ref());
        let mut overflowed = false;
        for row in 0..self.depth {
            let cell = self.cell_index(&hashes, row);
            let counter = &mut self.counters[cell];
            match counter.checked_add(weight) {
                Some(sum) => *counter = sum,
                None => {
                    *counter = u64::MAX;
                    overflowed = true;
                }
            }
        }
        self.total_weight = self.total_weight.saturating_add(weight);
        if overflowed {
            self.mark_saturated();
        }
    }

    /// Returns the estimated frequency of `item`: the minimum of its counters across rows.
    ///
    /// Never less than the true frequency.
    pub fn estimate(&self, item: impl AsRef<[u8]>) -> u64 {
        let hashes = DoubleHash::new(item.as_ref());
        (0..self.depth)
            .map(|row| self.counters[self.cell_index(&hashes, row)])
            .min()
            .unwrap_or(0)
    }

    /// Returns a lower bound on the true frequency of `item`, holding with probability
    /// [`confidence()`](Self::confidence).
    pub fn lower_bound(&self, item: impl AsRef<[u8]>) -> u64 {
        let error = (self.relative_error() * self.total_weight as f64) as u64;
        self.estimate(item).saturating_sub(error)
    }

    /// Returns an upper bound on the true frequency of `item`. This bound always holds.
    pub fn upper_bound(&self, item: impl AsRef<[u8]>) -> u64 {
        self.estimate(item)
    }

    /// Merges another sketch into this one by adding counters cell by cell.
    ///
    /// Merging is not idempotent: merging a sketch with a copy of itself doubles every count.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IncompatibleSketches`](crate::error::ErrorKind::IncompatibleSketches)
    /// if the sketches differ in width or depth.
    pub fn merge(&mut self, other: &CountMinSketch) -> Result<(), Error> {
        if self.width != other.width || self.depth != other.depth {
            return Err(Error::incompatible(
                "count-min",
                format!("{}x{}", self.depth, self.width),
                format!("{}x{}", other.depth, other.width),
            ));
        }

        let mut overflowed = other.saturated;
        for (counter, other_counter) in self.counters.iter_mut().zip(&other.counters) {
            match counter.checked_add(*other_counter) {
                Some(sum) => *counter = sum,
                None => {
                    *counter = u64::MAX;
                    overflowed = true;
                }
            }
        }
        self.total_weight = self.total_weight.saturating_add(other.total_weight);
        if overflowed {
            self.mark_saturated();
        }

        tracing::debug!(width = self.width, depth = self.depth, "merged count-min sketches");
        Ok(())
    }

    fn cell_index(&self, hashes: &DoubleHash, row: usize) -> usize {
        let col = (hashes.index(row as u64) % self.width as u64) as usize;
        row * self.width + col
    }

    fn mark_saturated(&mut self) {
        if !self.saturated {
            self.saturated = true;
            tracing::warn!(
                width = self.width,
                depth = self.depth,
                "count-min counter saturated at u64::MAX"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_basic() {
        let mut cms = CountMinSketch::with_accuracy(0.01, 0.01).unwrap();

        cms.update_with_weight("apple", 5);
        cms.update_with_weight("banana", 3);
        cms.update("cherry");
        cms.update_with_weight("apple", 2);

        assert!(cms.estimate("apple") >= 7);
        assert!(cms.estimate("banana") >= 3);
        assert!(cms.estimate("cherry") >= 1);
        assert_eq!(cms.total_weight(), 11);
    }

    #[test]
    fn test_empty() {
        let cms = CountMinSketch::new(64, 3).unwrap();
        assert!(cms.is_empty());
        assert_eq!(cms.estimate("anything"), 0);
        assert_eq!(cms.lower_bound("anything"), 0);
        assert_eq!(cms.total_weight(), 0);
    }

    #[test]
    fn test_suggestions() {
        assert_eq!(CountMinSketch::suggest_width(0.01), 272);
        assert_eq!(CountMinSketch::suggest_depth(0.01), 5);
        assert_eq!(CountMinSketch::suggest_depth(0.5), 1);
        assert_eq!(CountMinSketch::suggest_depth(0.9), 1);
    }

    #[test]
    fn test_single_cell_grid_counts_everything() {
        let mut cms = CountMinSketch::new(1, 1).unwrap();
        cms.update("a");
        cms.update("b");
        assert_eq!(cms.estimate("c"), 2);
    }

    #[test]
    fn test_layout_is_row_major() {
        let mut cms = CountMinSketch::new(8, 4).unwrap();
        cms.update("x");
        for row in 0..4 {
            let set: u64 = cms.counters[row * 8..(row + 1) * 8].iter().sum();
            assert_eq!(set, 1);
        }
    }

    #[test]
    fn test_saturates_instead_of_wrapping() {
        let mut cms = CountMinSketch::new(16, 2).unwrap();
        cms.update_with_weight("hot", u64::MAX - 1);
        assert!(!cms.is_saturated());

        cms.update_with_weight("hot", 5);
        assert!(cms.is_saturated());
        assert_eq!(cms.estimate("hot"), u64::MAX);
        assert_eq!(cms.total_weight(), u64::MAX);
    }

    #[test]
    fn test_bounds() {
        let mut cms = CountMinSketch::new(100, 3).unwrap();
        for i in 0..1000 {
            cms.update(format!("item_{i}"));
        }
        cms.update_with_weight("heavy", 500);

        let estimate = cms.estimate("heavy");
        assert_eq!(cms.upper_bound("heavy"), estimate);
        assert!(cms.lower_bound("heavy") <= estimate);
        assert!(cms.lower_bound("heavy") <= 500);
    }

    #[test]
    fn test_accuracy_parameters() {
        let cms = CountMinSketch::new(272, 5).unwrap();
        assert!((cms.relative_error() - 0.01).abs() < 1e-4);
        assert!(cms.confidence() > 0.99);
    }

    #[test]
    fn test_merge_incompatible() {
        let mut cms1 = CountMinSketch::new(1000, 5).unwrap();
        let cms2 = CountMinSketch::new(2000, 5).unwrap();

        let err = cms1.merge(&cms2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleSketches);
    }

    #[test]
    fn test_merge_saturates() {
        let mut cms1 = CountMinSketch::new(4, 1).unwrap();
        let mut cms2 = CountMinSketch::new(4, 1).unwrap();
        cms1.update_with_weight("a", u64::MAX);
        cms2.update_with_weight("a", 1);

        cms1.merge(&cms2).unwrap();
        assert_eq!(cms1.estimate("a"), u64::MAX);
        assert!(cms1.is_saturated());
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            CountMinSketch::new(0, 3).unwrap_err().kind(),
            ErrorKind::ConfigInvalid
        );
        assert_eq!(
            CountMinSketch::new(3, 0).unwrap_err().kind(),
            ErrorKind::ConfigInvalid
        );
        assert_eq!(
            CountMinSketch::new(usize::MAX, 2).unwrap_err().kind(),
            ErrorKind::ConfigInvalid
        );
        for (epsilon, delta) in [(0.0, 0.1), (1.0, 0.1), (0.1, 0.0), (0.1, 1.0), (f64::NAN, 0.1)] {
            let err = CountMinSketch::with_accuracy(epsilon, delta).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        }
    }
}
