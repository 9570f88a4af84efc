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

//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::collections::HashSet;

use streamsketch::common::random::RandomSource;
use streamsketch::common::random::XorShift64;

pub const FRUITS: [&str; 20] = [
    "apple",
    "banana",
    "cherry",
    "date",
    "elderberry",
    "fig",
    "grape",
    "honeydew",
    "kiwi",
    "lemon",
    "mango",
    "nectarine",
    "orange",
    "papaya",
    "quince",
    "raspberry",
    "strawberry",
    "tangerine",
    "ugli",
    "watermelon",
];

/// Exact frequency table used as ground truth for sketch estimates.
#[derive(Debug, Default, Clone)]
pub struct ExactCounter {
    counts: HashMap<Vec<u8>, u64>,
    total: u64,
}

impl ExactCounter {
    pub fn update(&mut self, item: impl AsRef<[u8]>, weight: u64) {
        *self.counts.entry(item.as_ref().to_vec()).or_default() += weight;
        self.total += weight;
    }

    pub fn count(&self, item: impl AsRef<[u8]>) -> u64 {
        self.counts.get(item.as_ref()).copied().unwrap_or(0)
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], u64)> {
        self.counts.iter().map(|(item, &count)| (item.as_slice(), count))
    }
}

/// Returns `count` distinct words: the fruit names first, then `word_0000`, `word_0001`, ...
pub fn words(count: usize) -> Vec<String> {
    FRUITS
        .iter()
        .map(|fruit| fruit.to_string())
        .chain((0..).map(|i| format!("word_{i:04}")))
        .take(count)
        .collect()
}

/// Returns `count` distinct random alphanumeric strings of length `len`, none of which is in
/// `exclude`.
pub fn random_strings(seed: u64, count: usize, len: usize, exclude: &HashSet<String>) -> Vec<String> {
    let mut rng = XorShift64::seeded(seed);
    let mut seen = HashSet::with_capacity(count);
    let mut strings = Vec::with_capacity(count);
    while strings.len() < count {
        let s = rng.next_alphanumeric(len);
        if exclude.contains(&s) || !seen.insert(s.clone()) {
            continue;
        }
        strings.push(s);
    }
    strings
}

/// Returns a skewed stream of `len` keys drawn from `key_0` to `key_{universe - 1}`, where
/// small key numbers are much more frequent.
pub fn skewed_keys(seed: u64, len: usize, universe: u64) -> Vec<String> {
    let mut rng = XorShift64::seeded(seed);
    (0..len)
        .map(|_| {
            let cap = rng.next_below(universe) + 1;
            format!("key_{}", rng.next_below(cap))
        })
        .collect()
}
