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

use std::f64::consts::LN_2;

use crate::error::Error;
use crate::error::try_zeroed;
use crate::hash::DoubleHash;

/// A Bloom filter for probabilistic set membership testing.
///
/// Provides fast membership queries with:
/// - No false negatives (inserted items always return `true`)
/// - Tunable false positive rate
/// - Constant space usage
///
/// Bits are only ever set, never cleared: the filter supports neither removal nor reset.
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilter {
    /// Number of hash functions to use (k)
    num_hashes: u32,
    /// Total number of bits in the filter (m)
    capacity_bits: u64,
    /// Number of insert calls observed (n), duplicates included
    num_items: u64,
    /// Count of bits set to 1 (for statistics)
    num_bits_set: u64,
    /// Bit array packed into u64 words
    /// Length = ceil(capacity_bits / 64)
    bit_array: Vec<u64>,
}

impl BloomFilter {
    /// Creates a filter with exactly `num_bits` bits and `num_hashes` hash functions.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if either
    /// parameter is zero, and
    /// [`ErrorKind::AllocationFailed`](crate::error::ErrorKind::AllocationFailed) if the bit
    /// array cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::bloom::BloomFilter;
    /// let filter = BloomFilter::new(10_000, 7).unwrap();
    /// assert_eq!(filter.capacity(), 10_000);
    /// assert!(BloomFilter::new(0, 7).is_err());
    /// ```
    pub fn new(num_bits: u64, num_hashes: u32) -> Result<Self, Error> {
        if num_bits == 0 {
            return Err(Error::invalid_config("num_bits must be at least 1"));
        }
        if num_hashes == 0 {
            return Err(Error::invalid_config("num_hashes must be at least 1"));
        }

        let num_words = usize::try_from(num_bits.div_ceil(64)).map_err(|_| {
            Error::invalid_config("num_bits exceeds addressable memory")
                .with_context("num_bits", num_bits)
        })?;
        let bit_array = try_zeroed(num_words, "bloom filter bit array")?;

        tracing::debug!(num_bits, num_hashes, "created bloom filter");
        Ok(BloomFilter {
            num_hashes,
            capacity_bits: num_bits,
            num_items: 0,
            num_bits_set: 0,
            bit_array,
        })
    }

    /// Creates a filter sized for `expected_items` insertions at false positive
    /// probability `fpp`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// `expected_items` is zero or `fpp` is not in `(0, 1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::bloom::BloomFilter;
    /// let filter = BloomFilter::with_accuracy(1000, 0.01).unwrap();
    /// assert_eq!(filter.capacity(), 9586);
    /// assert_eq!(filter.num_hashes(), 7);
    /// ```
    pub fn with_accuracy(expected_items: u64, fpp: f64) -> Result<Self, Error> {
        BloomFilterBuilder::with_accuracy(expected_items, fpp).build()
    }

    /// Returns a builder for creating a Bloom filter.
    pub fn builder() -> BloomFilterBuilder {
        BloomFilterBuilder::default()
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether an item is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Item was **possibly** inserted (or false positive)
    /// - `false`: Item was **definitely not** inserted
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::bloom::BloomFilter;
    /// let mut filter = BloomFilter::with_accuracy(100, 0.01).unwrap();
    /// filter.insert("apple");
    ///
    /// assert!(filter.contains("apple"));
    /// assert!(!filter.contains("grape")); // never inserted (probably)
    /// ```
    pub fn contains(&self, item: impl AsRef<[u8]>) -> bool {
        let hashes = DoubleHash::new(item.as_ref());
        self.check_bits(&hashes)
    }

    /// Tests and inserts an item in a single operation.
    ///
    /// Returns whether the item was possibly already in the set before insertion.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::bloom::BloomFilter;
    /// let mut filter = BloomFilter::with_accuracy(100, 0.01).unwrap();
    ///
    /// assert!(!filter.contains_and_insert("apple")); // first insertion
    /// assert!(filter.contains_and_insert("apple"));
    /// ```
    pub fn contains_and_insert(&mut self, item: impl AsRef<[u8]>) -> bool {
        let hashes = DoubleHash::new(item.as_ref());
        let was_present = self.check_bits(&hashes);
        self.set_bits(&hashes);
        self.num_items = self.num_items.saturating_add(1);
        was_present
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Inserts an item into the filter.
    ///
    /// After insertion, `contains(item)` will always return `true`. Every call counts towards
    /// [`len()`](Self::len), including repeated insertions of the same item.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::bloom::BloomFilter;
    /// let mut filter = BloomFilter::with_accuracy(100, 0.01).unwrap();
    ///
    /// filter.insert("apple");
    /// filter.insert(b"raw bytes");
    /// filter.insert(42_u64.to_le_bytes());
    ///
    /// assert!(filter.contains("apple"));
    /// assert_eq!(filter.len(), 3);
    /// ```
    pub fn insert(&mut self, item: impl AsRef<[u8]>) {
        let hashes = DoubleHash::new(item.as_ref());
        self.set_bits(&hashes);
        self.num_items = self.num_items.saturating_add(1);
    }

    // ========================================================================
    // Set Operations
    // ========================================================================

    /// Merges another filter into this one via bitwise OR (union).
    ///
    /// After merging, this filter will recognize items from either filter (plus any false
    /// positives from either). The insertion count becomes the sum of both counts.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IncompatibleSketches`](crate::error::ErrorKind::IncompatibleSketches)
    /// if the filters differ in size or number of hash functions.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::bloom::BloomFilter;
    /// let mut f1 = BloomFilter::with_accuracy(100, 0.01).unwrap();
    /// let mut f2 = BloomFilter::with_accuracy(100, 0.01).unwrap();
    ///
    /// f1.insert("a");
    /// f2.insert("b");
    ///
    /// f1.union(&f2).unwrap();
    /// assert!(f1.contains("a"));
    /// assert!(f1.contains("b"));
    /// ```
    pub fn union(&mut self, other: &BloomFilter) -> Result<(), Error> {
        if !self.is_compatible(other) {
            return Err(Error::incompatible(
                "bloom",
                format!("bits={}, hashes={}", self.capacity_bits, self.num_hashes),
                format!("bits={}, hashes={}", other.capacity_bits, other.num_hashes),
            ));
        }

        for (word, other_word) in self.bit_array.iter_mut().zip(&other.bit_array) {
            *word |= *other_word;
        }
        self.num_items = self.num_items.saturating_add(other.num_items);
        self.recount_bits_set();

        tracing::debug!(
            num_bits = self.capacity_bits,
            num_hashes = self.num_hashes,
            "merged bloom filters"
        );
        Ok(())
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns whether nothing has been inserted into the filter.
    pub fn is_empty(&self) -> bool {
        self.num_items == 0
    }

    /// Returns the number of insert calls applied to the filter.
    pub fn len(&self) -> u64 {
        self.num_items
    }

    /// Returns the number of bits set to 1.
    ///
    /// Useful for monitoring filter saturation.
    pub fn bits_used(&self) -> u64 {
        self.num_bits_set
    }

    /// Returns the total number of bits in the filter (capacity).
    pub fn capacity(&self) -> u64 {
        self.capacity_bits
    }

    /// Returns the number of hash functions used.
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Returns the current load factor (fraction of bits set).
    ///
    /// Values above 0.5 indicate degraded false positive rates.
    pub fn load_factor(&self) -> f64 {
        self.num_bits_set as f64 / self.capacity_bits as f64
    }

    /// Estimates the current false positive probability.
    ///
    /// Based on the formula: `(1 - e^(-k*n/m))^k`
    /// where:
    /// - k = num_hashes
    /// - n = number of insert calls
    /// - m = capacity_bits
    ///
    /// Recomputed from the current insertion count on every call. After [`union`](Self::union)
    /// the counts of both filters are summed, so items present in both are counted twice and
    /// the result is an upper bound rather than an estimate. `load_factor().powi(k)` tracks
    /// the bit array directly.
    pub fn estimated_fpp(&self) -> f64 {
        let k = self.num_hashes as f64;
        let n = self.num_items as f64;
        let m = self.capacity_bits as f64;

        (1.0 - (-k * n / m).exp()).powf(k)
    }

    /// Returns the memory footprint of the filter in bytes.
    pub fn memory_usage(&self) -> usize {
        size_of::<Self>() + self.bit_array.len() * size_of::<u64>()
    }

    /// Checks if two filters are compatible for merging.
    ///
    /// Filters are compatible if they have the same capacity and number of hash functions.
    pub fn is_compatible(&self, other: &BloomFilter) -> bool {
        self.capacity_bits == other.capacity_bits && self.num_hashes == other.num_hashes
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    /// Checks if all k bits are set for the given hash values.
    fn check_bits(&self, hashes: &DoubleHash) -> bool {
        (0..self.num_hashes).all(|i| self.get_bit(self.compute_bit_index(hashes, i)))
    }

    /// Sets all k bits for the given hash values.
    fn set_bits(&mut self, hashes: &DoubleHash) {
        for i in 0..self.num_hashes {
            let bit_index = self.compute_bit_index(hashes, i);
            self.set_bit(bit_index);
        }
    }

    /// Computes a bit index using double hashing (Kirsch-Mitzenmacher).
    /// Formula: (h1 + i * h2) mod capacity_bits
    fn compute_bit_index(&self, hashes: &DoubleHash, i: u32) -> u64 {
        hashes.index(u64::from(i)) % self.capacity_bits
    }

    /// Gets the value of a single bit.
    fn get_bit(&self, bit_index: u64) -> bool {
        let word_index = (bit_index / 64) as usize;
        let mask = 1u64 << (bit_index % 64);
        (self.bit_array[word_index] & mask) != 0
    }

    /// Sets a single bit and updates the count if it wasn't already set.
    fn set_bit(&mut self, bit_index: u64) {
        let word_index = (bit_index / 64) as usize;
        let mask = 1u64 << (bit_index % 64);

        if (self.bit_array[word_index] & mask) == 0 {
            self.bit_array[word_index] |= mask;
            self.num_bits_set += 1;
        }
    }

    /// Recounts all set bits (used after set operations).
    fn recount_bits_set(&mut self) {
        self.num_bits_set = self
            .bit_array
            .iter()
            .map(|word| word.count_ones() as u64)
            .sum();
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): Specify target items and false positive rate
///   (recommended)
/// - [`with_size()`](Self::with_size): Specify exact bit count and hash functions (manual)
///
/// Parameters are validated by [`build()`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct BloomFilterBuilder {
    num_bits: Option<u64>,
    num_hashes: Option<u32>,
    invalid: Option<&'static str>,
}

impl BloomFilterBuilder {
    /// Creates a builder with optimal parameters for a target accuracy.
    ///
    /// # Arguments
    ///
    /// - `max_items`: Maximum expected number of distinct items
    /// - `fpp`: Target false positive probability (e.g., 0.01 for 1%)
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::bloom::BloomFilterBuilder;
    /// // Optimal for 10,000 items with 1% FPP
    /// let filter = BloomFilterBuilder::with_accuracy(10_000, 0.01).build().unwrap();
    /// assert_eq!(filter.num_hashes(), 7);
    /// ```
    pub fn with_accuracy(max_items: u64, fpp: f64) -> Self {
        if max_items == 0 {
            return Self::invalid("max_items must be greater than 0");
        }
        if !(fpp > 0.0 && fpp < 1.0) {
            return Self::invalid("fpp must be between 0.0 and 1.0 (exclusive)");
        }

        let num_bits = Self::suggest_num_bits(max_items, fpp);
        let num_hashes = Self::suggest_num_hashes(max_items, num_bits);
        Self::with_size(num_bits, num_hashes)
    }

    /// Creates a builder with manual size specification.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_size(10_000, 7).build().unwrap();
    /// assert_eq!(filter.capacity(), 10_000);
    /// ```
    pub fn with_size(num_bits: u64, num_hashes: u32) -> Self {
        BloomFilterBuilder {
            num_bits: Some(num_bits),
            num_hashes: Some(num_hashes),
            invalid: None,
        }
    }

    /// Builds the Bloom filter.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if the
    /// accuracy targets were invalid or neither `with_accuracy()` nor `with_size()` was
    /// called, and otherwise any error from [`BloomFilter::new`].
    pub fn build(self) -> Result<BloomFilter, Error> {
        if let Some(reason) = self.invalid {
            return Err(Error::invalid_config(reason));
        }
        match (self.num_bits, self.num_hashes) {
            (Some(num_bits), Some(num_hashes)) => BloomFilter::new(num_bits, num_hashes),
            _ => Err(Error::invalid_config(
                "must call with_accuracy() or with_size() before build()",
            )),
        }
    }

    // ========================================================================
    // Static Suggestion Methods
    // ========================================================================

    /// Suggests optimal number of bits given max items and target FPP.
    ///
    /// Formula: `m = ceil(-n * ln(p) / (ln(2)^2))`
    /// where n = max_items, p = fpp
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::bloom::BloomFilterBuilder;
    /// assert_eq!(BloomFilterBuilder::suggest_num_bits(1000, 0.01), 9586);
    /// ```
    pub fn suggest_num_bits(max_items: u64, fpp: f64) -> u64 {
        let n = max_items as f64;
        (-n * fpp.ln() / (LN_2 * LN_2)).ceil() as u64
    }

    /// Suggests optimal number of hash functions given max items and bit count.
    ///
    /// Formula: `k = ceil((m/n) * ln(2))`, at least 1
    /// where m = num_bits, n = max_items
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::bloom::BloomFilterBuilder;
    /// assert_eq!(BloomFilterBuilder::suggest_num_hashes(1000, 9586), 7);
    /// ```
    pub fn suggest_num_hashes(max_items: u64, num_bits: u64) -> u32 {
        let m = num_bits as f64;
        let n = max_items as f64;

        let k = (m / n * LN_2).ceil() as u32;
        k.max(1)
    }

    fn invalid(reason: &'static str) -> Self {
        BloomFilterBuilder {
            num_bits: None,
            num_hashes: None,
            invalid: Some(reason),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
