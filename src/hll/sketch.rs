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

use crate::error::Error;
use crate::error::try_zeroed;
use crate::hash::HLL_SEED;
use crate::hash::hash64;
use crate::hll::MAX_LG_K;
use crate::hll::MIN_LG_K;
use crate::hll::estimator;

/// HyperLogLog sketch for distinct counting.
///
/// Holds `2^lg_k` one-byte registers. Each register keeps the highest rank observed among the
/// items hashed into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperLogLog {
    lg_config_k: u8,
    /// Count of registers still at zero
    num_zeros: u32,
    registers: Box<[u8]>,
}

impl HyperLogLog {
    /// Creates an empty sketch with `2^lg_config_k` registers.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// `lg_config_k` is outside `[4, 18]`, and
    /// [`ErrorKind::AllocationFailed`](crate::error::ErrorKind::AllocationFailed) if the
    /// registers cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::hll::HyperLogLog;
    /// let hll = HyperLogLog::new(14).unwrap();
    /// assert_eq!(hll.num_registers(), 16384);
    /// assert!(HyperLogLog::new(3).is_err());
    /// ```
    pub fn new(lg_config_k: u8) -> Result<Self, Error> {
        if !(MIN_LG_K..=MAX_LG_K).contains(&lg_config_k) {
            return Err(Error::invalid_config(format!(
                "lg_k must be in [{MIN_LG_K}, {MAX_LG_K}]"
            ))
            .with_context("lg_k", lg_config_k));
        }

        let k = 1usize << lg_config_k;
        let registers = try_zeroed(k, "hyperloglog registers")?;

        tracing::debug!(lg_k = lg_config_k, "created hyperloglog sketch");
        Ok(HyperLogLog {
            lg_config_k,
            num_zeros: k as u32,
            registers: registers.into_boxed_slice(),
        })
    }

    /// Adds an item to the sketch.
    ///
    /// The top `lg_k` bits of the item's hash select a register; the rank is one plus the
    /// number of leading zeros in the remaining bits.
    pub fn update(&mut self, item: impl AsRef<[u8]>) {
        let hash = hash64(item.as_ref(), HLL_SEED);
        let (slot, rank) = self.slot_and_rank(hash);

        let old_value = self.registers[slot];
        if rank > old_value {
            if old_value == 0 {
                self.num_zeros -= 1;
            }
            self.registers[slot] = rank;
        }
    }

    /// Returns the estimated number of distinct items.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::hll::HyperLogLog;
    /// let mut hll = HyperLogLog::new(12).unwrap();
    /// for user in ["alice", "bob", "carol", "alice"] {
    ///     hll.update(user);
    /// }
    /// assert!((hll.estimate() - 3.0).abs() < 0.5);
    /// ```
    pub fn estimate(&self) -> f64 {
        estimator::estimate(self.lg_config_k, &self.registers, self.num_zeros)
    }

    /// Returns the estimate truncated to an integer.
    pub fn count(&self) -> u64 {
        self.estimate() as u64
    }

    /// Returns the uncorrected HLL estimate, without the small-range correction.
    pub fn raw_estimate(&self) -> f64 {
        estimator::raw_estimate(self.lg_config_k, &self.registers)
    }

    /// Returns the relative standard error `1.04 / sqrt(k)` of the estimate.
    pub fn relative_error(&self) -> f64 {
        crate::hll::error_for_precision(self.lg_config_k)
    }

    /// Merges another sketch into this one by taking the register-wise maximum.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IncompatibleSketches`](crate::error::ErrorKind::IncompatibleSketches)
    /// if the sketches have different precision.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::hll::HyperLogLog;
    /// let mut worker1 = HyperLogLog::new(14).unwrap();
    /// let mut worker2 = HyperLogLog::new(14).unwrap();
    ///
    /// worker1.update("user_a");
    /// worker2.update("user_b");
    ///
    /// worker1.merge(&worker2).unwrap();
    /// assert_eq!(worker1.count(), 2);
    /// ```
    pub fn merge(&mut self, other: &HyperLogLog) -> Result<(), Error> {
        if self.lg_config_k != other.lg_config_k {
            return Err(Error::incompatible(
                "hyperloglog",
                format!("lg_k={}", self.lg_config_k),
                format!("lg_k={}", other.lg_config_k),
            ));
        }

        for (value, &other_value) in self.registers.iter_mut().zip(other.registers.iter()) {
            if other_value > *value {
                if *value == 0 {
                    self.num_zeros -= 1;
                }
                *value = other_value;
            }
        }

        tracing::debug!(lg_k = self.lg_config_k, "merged hyperloglog sketches");
        Ok(())
    }

    /// Returns log2 of the number of registers.
    pub fn lg_config_k(&self) -> u8 {
        self.lg_config_k
    }

    /// Returns the number of registers.
    pub fn num_registers(&self) -> usize {
        self.registers.len()
    }

    /// Returns the number of registers still at zero.
    pub fn num_zeros(&self) -> u32 {
        self.num_zeros
    }

    /// Returns the value of register `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= num_registers()`.
    pub fn register(&self, slot: usize) -> u8 {
        self.registers[slot]
    }

    /// Returns true if no item has been added.
    pub fn is_empty(&self) -> bool {
        self.num_zeros as usize == self.registers.len()
    }

    /// Returns the memory footprint of the sketch in bytes.
    pub fn memory_usage(&self) -> usize {
        size_of::<Self>() + self.registers.len()
    }

    /// Splits a hash into its register slot and rank.
    ///
    /// A sentinel bit just below the residual bits bounds the rank at `64 - lg_k + 1`.
    fn slot_and_rank(&self, hash: u64) -> (usize, u8) {
        let lg_k = u32::from(self.lg_config_k);
        let slot = (hash >> (64 - lg_k)) as usize;
        let residual = (hash << lg_k) | (1u64 << (lg_k - 1));
        let rank = residual.leading_zeros() as u8 + 1;
        (slot, rank)
    }
}
