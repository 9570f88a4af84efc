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

mod common;

use googletest::assert_that;
use googletest::prelude::ge;
use googletest::prelude::le;
use streamsketch::countmin::CountMinSketch;
use streamsketch::error::ErrorKind;

use crate::common::ExactCounter;
use crate::common::skewed_keys;

const STREAM_SEED: u64 = 0xc0ffee;
const STREAM_LEN: usize = 100_000;
const UNIVERSE: u64 = 1000;

fn build_stream() -> (CountMinSketch, ExactCounter) {
    let mut sketch = CountMinSketch::with_accuracy(0.01, 0.01).unwrap();
    let mut exact = ExactCounter::default();
    for key in skewed_keys(STREAM_SEED, STREAM_LEN, UNIVERSE) {
        sketch.update(&key);
        exact.update(&key, 1);
    }
    (sketch, exact)
}

#[test]
fn test_empty() {
    let sketch = CountMinSketch::with_accuracy(0.01, 0.01).unwrap();
    assert!(sketch.is_empty());
    assert_eq!(sketch.width(), 272);
    assert_eq!(sketch.depth(), 5);
    assert_eq!(sketch.total_weight(), 0);
    assert_eq!(sketch.estimate("apple"), 0);
    assert_eq!(sketch.lower_bound("apple"), 0);
    assert_eq!(sketch.upper_bound("apple"), 0);
}

#[test]
fn test_never_underestimates() {
    let (sketch, exact) = build_stream();
    assert_eq!(sketch.total_weight(), exact.total());

    for (item, count) in exact.iter() {
        assert_that!(sketch.estimate(item), ge(count));
        assert_that!(sketch.lower_bound(item), le(count));
        assert_eq!(sketch.upper_bound(item), sketch.estimate(item));
    }
}

#[test]
fn test_error_within_bound() {
    let (sketch, exact) = build_stream();
    let bound = sketch.relative_error() * sketch.total_weight() as f64;

    let within = exact
        .iter()
        .filter(|&(item, count)| (sketch.estimate(item) - count) as f64 <= bound)
        .count();
    let fraction = within as f64 / exact.distinct() as f64;
    assert_that!(fraction, ge(sketch.confidence()));
}

#[test]
fn test_unseen_items_stay_small() {
    let (sketch, _) = build_stream();
    let bound = (sketch.relative_error() * sketch.total_weight() as f64) as u64;

    let within = (0..1000)
        .filter(|i| sketch.estimate(format!("absent_{i}")) <= bound)
        .count();
    assert_that!(within, ge(990));
}

#[test]
fn test_weighted_updates() {
    let mut sketch = CountMinSketch::new(64, 4).unwrap();
    sketch.update_with_weight("apple", 10);
    sketch.update_with_weight("banana", 3);
    sketch.update("apple");
    sketch.update_with_weight("cherry", 0);

    assert_eq!(sketch.total_weight(), 14);
    assert_that!(sketch.estimate("apple"), ge(11));
    assert_that!(sketch.estimate("banana"), ge(3));
    assert!(!sketch.is_empty());
}

#[test]
fn test_merge_equals_combined_stream() {
    let (combined, _) = build_stream();

    let mut even = CountMinSketch::with_accuracy(0.01, 0.01).unwrap();
    let mut odd = CountMinSketch::with_accuracy(0.01, 0.01).unwrap();
    for (i, key) in skewed_keys(STREAM_SEED, STREAM_LEN, UNIVERSE).iter().enumerate() {
        if i % 2 == 0 {
            even.update(key);
        } else {
            odd.update(key);
        }
    }

    let snapshot = even.clone();
    even.merge(&odd).unwrap();
    assert_eq!(even, combined);
    for i in 0..50 {
        let key = format!("key_{i}");
        assert_that!(
            even.estimate(&key),
            ge(snapshot.estimate(&key) + odd.estimate(&key))
        );
    }
}

#[test]
fn test_merge_is_commutative() {
    let mut a = CountMinSketch::new(100, 3).unwrap();
    let mut b = CountMinSketch::new(100, 3).unwrap();
    for key in skewed_keys(1, 2000, 100) {
        a.update(key);
    }
    for key in skewed_keys(2, 2000, 100) {
        b.update(key);
    }

    let mut ab = a.clone();
    ab.merge(&b).unwrap();
    let mut ba = b.clone();
    ba.merge(&a).unwrap();
    assert_eq!(ab, ba);
}

#[test]
fn test_merge_with_itself_doubles() {
    let (mut sketch, exact) = build_stream();
    let copy = sketch.clone();

    sketch.merge(&copy).unwrap();
    assert_eq!(sketch.total_weight(), 2 * copy.total_weight());
    for (item, _) in exact.iter() {
        assert_eq!(sketch.estimate(item), 2 * copy.estimate(item));
    }
}

#[test]
fn test_merge_incompatible() {
    let mut sketch = CountMinSketch::new(100, 3).unwrap();
    for other in [
        CountMinSketch::new(101, 3).unwrap(),
        CountMinSketch::new(100, 4).unwrap(),
    ] {
        let err = sketch.merge(&other).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleSketches);
    }
}

#[test]
fn test_counters_saturate() {
    let mut sketch = CountMinSketch::new(16, 2).unwrap();
    sketch.update_with_weight("apple", u64::MAX - 1);
    assert!(!sketch.is_saturated());

    sketch.update_with_weight("apple", 5);
    assert!(sketch.is_saturated());
    assert_eq!(sketch.estimate("apple"), u64::MAX);
    assert_eq!(sketch.total_weight(), u64::MAX);
}

#[test]
fn test_invalid_configuration() {
    for (epsilon, delta) in [(0.0, 0.01), (1.5, 0.01), (0.01, 0.0), (0.01, 1.0), (f64::NAN, 0.1)] {
        let err = CountMinSketch::with_accuracy(epsilon, delta).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
    assert!(CountMinSketch::new(0, 3).is_err());
    assert!(CountMinSketch::new(3, 0).is_err());
}
