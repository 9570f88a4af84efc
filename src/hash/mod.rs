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

//! Hashing substrate shared by all sketches.
//!
//! Every sketch addresses its storage through a single 64-bit mixing function,
//! [`hash64`]. Sketches that need `k` hash functions per item derive them with the
//! Kirsch-Mitzenmacher construction `h1 + i * h2`, where `h1 = hash64(item, 0)` and
//! `h2 = hash64(item, h1)`, so each operation costs two real hash computations
//! regardless of `k`.
//!
//! ```
//! use streamsketch::hash::{derive, DoubleHash};
//!
//! let hashes = DoubleHash::new(b"apple");
//! assert_eq!(hashes.index(3), derive(b"apple", 3));
//! ```

mod murmurhash;

pub use self::murmurhash::murmurhash64a;

/// Seed used by the HyperLogLog hash.
pub const HLL_SEED: u64 = 0x5f61767a;

/// Hashes `bytes` with the given seed.
#[inline]
pub fn hash64(bytes: &[u8], seed: u64) -> u64 {
    murmurhash64a(bytes, seed)
}

/// Returns the `i`-th derived hash of `bytes`.
///
/// Recomputes both base hashes; use [`DoubleHash`] when deriving several values for the same
/// item.
pub fn derive(bytes: &[u8], i: u64) -> u64 {
    DoubleHash::new(bytes).index(i)
}

/// The two base hashes of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleHash {
    h1: u64,
    h2: u64,
}

impl DoubleHash {
    /// Computes both base hashes of `bytes`.
    pub fn new(bytes: &[u8]) -> Self {
        let h1 = hash64(bytes, 0);
        let h2 = hash64(bytes, h1);
        Self { h1, h2 }
    }

    /// Returns `h1 + i * h2` with wrapping arithmetic.
    #[inline]
    pub fn index(&self, i: u64) -> u64 {
        self.h1.wrapping_add(i.wrapping_mul(self.h2))
    }

    /// Returns the first base hash.
    pub fn h1(&self) -> u64 {
        self.h1
    }

    /// Returns the second base hash.
    pub fn h2(&self) -> u64 {
        self.h2
    }
}
