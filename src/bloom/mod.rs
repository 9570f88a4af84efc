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

//! Bloom filter for approximate set membership.
//!
//! A Bloom filter answers "have I seen this item?" with either **definitely not** or
//! **possibly**. Inserted items are never reported absent; items that were never inserted are
//! reported present with a probability that grows as the filter fills up.
//!
//! # Usage
//!
//! ```rust
//! use streamsketch::bloom::BloomFilter;
//!
//! let mut filter = BloomFilter::with_accuracy(1000, 0.01).unwrap();
//!
//! filter.insert("apple");
//! filter.insert("banana");
//!
//! assert!(filter.contains("apple"));
//! assert!(filter.estimated_fpp() < 0.01);
//! ```
//!
//! # Sizing
//!
//! For `n` expected items and a target false positive probability `p`, the optimal filter has
//! `m = ceil(-n ln p / (ln 2)^2)` bits and `k = ceil(m/n ln 2)` hash functions:
//!
//! ```rust
//! use streamsketch::bloom::BloomFilterBuilder;
//!
//! let num_bits = BloomFilterBuilder::suggest_num_bits(1000, 0.01);
//! let num_hashes = BloomFilterBuilder::suggest_num_hashes(1000, num_bits);
//!
//! let _filter = BloomFilterBuilder::with_size(num_bits, num_hashes).build().unwrap();
//! ```

mod sketch;

pub use self::sketch::BloomFilter;
pub use self::sketch::BloomFilterBuilder;
