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

//! Deterministic random sources for generating synthetic streams.
//!
//! The sketches themselves never draw random numbers. Generators are always constructed
//! explicitly from a caller-supplied seed, so every synthetic stream is reproducible.
//!
//! ```
//! use streamsketch::common::random::{RandomSource, XorShift64};
//!
//! let mut a = XorShift64::seeded(42);
//! let mut b = XorShift64::seeded(42);
//! assert_eq!(a.next_u64(), b.next_u64());
//! ```

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random number source for synthetic data.
pub trait RandomSource {
    /// Returns the next random 64-bit value.
    fn next_u64(&mut self) -> u64;

    /// Returns a random boolean value.
    fn next_bool(&mut self) -> bool {
        (self.next_u64() & 1) != 0
    }

    /// Returns a value in `[0, bound)`.
    ///
    /// # Panics
    ///
    /// Panics if `bound` is zero.
    fn next_below(&mut self, bound: u64) -> u64 {
        assert!(bound > 0, "bound must be positive");
        // multiply-shift keeps the high bits, which are the well-mixed ones
        ((self.next_u64() as u128 * bound as u128) >> 64) as u64
    }

    /// Returns a random ASCII alphanumeric string of `len` characters.
    fn next_alphanumeric(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| ALPHANUMERIC[self.next_below(ALPHANUMERIC.len() as u64) as usize] as char)
            .collect()
    }
}

/// Xorshift-based random generator.
#[derive(Debug, Clone, Copy)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Creates a new generator using the provided seed.
    ///
    /// A zero seed is replaced by a fixed non-zero constant, since zero is a fixed point of
    /// the xorshift recurrence.
    pub fn seeded(seed: u64) -> Self {
        let state = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self { state }
    }
}

impl RandomSource for XorShift64 {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}
