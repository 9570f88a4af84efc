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

//! Fixed-memory sketches for summarizing item streams.
//!
//! - [`bloom`]: approximate set membership with no false negatives
//! - [`countmin`]: approximate frequencies that never undercount
//! - [`hll`]: approximate distinct counts
//!
//! All sketches take items as raw bytes (`impl AsRef<[u8]>`), are built once with fixed
//! parameters, and can be merged with compatible sketches built on other workers. A sketch
//! is a plain owned value without internal locking; share one across threads behind a lock.
//!
//! ```
//! use streamsketch::bloom::BloomFilter;
//! use streamsketch::countmin::CountMinSketch;
//! use streamsketch::hll::HyperLogLog;
//!
//! let mut seen = BloomFilter::with_accuracy(1000, 0.01).unwrap();
//! let mut freq = CountMinSketch::with_accuracy(0.01, 0.01).unwrap();
//! let mut distinct = HyperLogLog::new(12).unwrap();
//!
//! for word in ["to", "be", "or", "not", "to", "be"] {
//!     seen.insert(word);
//!     freq.update(word);
//!     distinct.update(word);
//! }
//!
//! assert!(seen.contains("not"));
//! assert!(freq.estimate("to") >= 2);
//! assert_eq!(distinct.count(), 4);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod bloom;
pub mod common;
pub mod countmin;
pub mod error;
pub mod hash;
pub mod hll;
