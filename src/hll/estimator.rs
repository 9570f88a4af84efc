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

//! Cardinality estimators over a register array.
//!
//! The estimate switches between two regimes:
//! - **Raw HLL**: `alpha * k^2 / sum(2^-register)`, the bias-corrected harmonic mean
//! - **Linear counting**: `k * ln(k / zeros)`, used while the raw estimate is at most `2.5k`
//!   and some register is still zero

/// Bias correction factor for `2^lg_config_k` registers.
///
/// Correction factors for small k are empirical constants.
pub(super) fn alpha(lg_config_k: u8) -> f64 {
    let k = (1u32 << lg_config_k) as f64;
    match lg_config_k {
        4 => 0.673,
        5 => 0.697,
        6 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / k),
    }
}

/// Get raw HLL estimate using standard HyperLogLog formula
///
/// Formula: alpha * k^2 / sum(1/2^register)
pub(super) fn raw_estimate(lg_config_k: u8, registers: &[u8]) -> f64 {
    let k = (1u32 << lg_config_k) as f64;
    let kxq: f64 = registers.iter().map(|&value| inv_pow2(value)).sum();
    alpha(lg_config_k) * k * k / kxq
}

/// Get linear counting (bitmap) estimate for small cardinalities.
pub(super) fn linear_counting(lg_config_k: u8, num_zeros: u32) -> f64 {
    let k = (1u32 << lg_config_k) as f64;
    k * (k / num_zeros as f64).ln()
}

/// Get the cardinality estimate, applying the small-range correction when it applies.
///
/// No large-range correction is applied: with 64-bit hashes collisions stay negligible far
/// beyond practical stream sizes.
pub(super) fn estimate(lg_config_k: u8, registers: &[u8], num_zeros: u32) -> f64 {
    let k = (1u32 << lg_config_k) as f64;
    let raw = raw_estimate(lg_config_k, registers);
    if raw <= 2.5 * k && num_zeros > 0 {
        linear_counting(lg_config_k, num_zeros)
    } else {
        raw
    }
}

/// Compute 1 / 2^value (inverse power of 2)
#[inline]
fn inv_pow2(value: u8) -> f64 {
    if value <= 63 {
        1.0 / (1u64 << value) as f64
    } else {
        f64::exp2(-(value as f64))
    }
}
