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

//! HyperLogLog sketch for approximate distinct counting.
//!
//! A sketch with `k = 2^lg_k` one-byte registers estimates the number of distinct items in a
//! stream with relative standard error about `1.04 / sqrt(k)`. Precision `lg_k` ranges over
//! `[4, 18]`.
//!
//! # Registers
//!
//! Each item is hashed once. The top `lg_k` bits of the hash select a register; the rank of
//! the item is one plus the length of the run of zeros that follows. A register keeps the
//! largest rank it has seen, so duplicates never change the sketch.
//!
//! # Usage
//!
//! ```rust
//! use streamsketch::hll::HyperLogLog;
//!
//! let mut hll = HyperLogLog::new(14).unwrap();
//! for i in 0..10_000u32 {
//!     hll.update(i.to_string());
//! }
//!
//! let estimate = hll.estimate();
//! assert!((estimate - 10_000.0).abs() < 500.0);
//! ```

mod estimator;
mod sketch;

pub use self::sketch::HyperLogLog;

/// Smallest supported precision.
pub const MIN_LG_K: u8 = 4;
/// Largest supported precision.
pub const MAX_LG_K: u8 = 18;

/// Computes the smallest precision whose relative standard error is at most `target_error`,
/// clamped to the supported range.
///
/// HLL error is approximately 1.04 / sqrt(2^p). A target that is NaN or not positive asks for
/// the best available accuracy and yields [`MAX_LG_K`].
pub fn precision_for_error(target_error: f64) -> u8 {
    if !(target_error > 0.0) {
        return MAX_LG_K;
    }
    // m = (1.04 / error)^2, p = log2(m)
    let m = (1.04 / target_error).powi(2);
    let p = m.log2().ceil();
    p.clamp(MIN_LG_K as f64, MAX_LG_K as f64) as u8
}

/// Computes the relative standard error for a given precision.
///
/// `lg_k` is clamped to `[MIN_LG_K, MAX_LG_K]` first.
pub fn error_for_precision(lg_k: u8) -> f64 {
    let lg_k = lg_k.clamp(MIN_LG_K, MAX_LG_K);
    let m = (1u64 << lg_k) as f64;
    1.04 / m.sqrt()
}
