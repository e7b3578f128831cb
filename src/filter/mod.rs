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

//! d-left counting Bloom filter.
//!
//! # Overview
//!
//! The filter is a set of `d` parallel sub-tables, each with `m` buckets. An
//! element hashes to one bucket row shared by all tables (`hash mod m`) and
//! is stored in whichever table's bucket on that row currently holds the
//! fewest fingerprints. This least-loaded ("d-left") placement bounds the
//! maximum occupancy on a row, which keeps fingerprints wide and false
//! positives rare for a given bit budget.
//!
//! # Bucket layout
//!
//! Each bucket spans `bits_per_bucket + counter_width` bits (a whole number
//! of bytes), laid out most-significant-bit first:
//!
//! 1. a `counter_width`-bit occupancy counter `k`,
//! 2. zero-valued padding when `bits_per_bucket` is not divisible by the
//!    current fingerprint width,
//! 3. `k` fingerprints of `floor(bits_per_bucket / k)` bits each, oldest
//!    first, the most recent at the least-significant end.
//!
//! The fingerprint width is a pure function of occupancy, so inserting into a
//! non-empty bucket re-encodes every stored fingerprint at the new, narrower
//! width. Fingerprints are `hash mod 2^width`, which makes narrowing exact
//! low-bit truncation: a fingerprint stored at a wider width keeps matching
//! the same element after any number of re-encodes.

mod bucket;
mod sketch;

pub use sketch::CountingBloomFilter;

pub(crate) const BITS_IN_BYTE: u32 = 8;

/// Fingerprint width for a bucket holding `occupancy` fingerprints.
///
/// Undefined for an empty bucket; may legitimately reach zero when the
/// counter range exceeds `bits_per_bucket`, which insertion treats as
/// overflow.
#[inline]
pub(crate) fn fingerprint_width(bits_per_bucket: u32, occupancy: u32) -> u32 {
    debug_assert!(occupancy >= 1);
    bits_per_bucket / occupancy
}

/// Mask covering the low `width` bits, `1 <= width <= 64`.
#[inline]
pub(crate) fn bitmask(width: u32) -> u64 {
    debug_assert!((1..=u64::BITS).contains(&width));
    u64::MAX >> (u64::BITS - width)
}

/// Reduce a 64-bit element hash to a `width`-bit fingerprint.
///
/// Equivalent to `hash mod 2^width`. Because `2^w'` divides `2^w` for
/// `w' < w`, re-deriving at a narrower width agrees with truncating a value
/// derived at a wider one, the property the re-encoding on insert relies on.
#[inline]
pub(crate) fn fingerprint(hash: u64, width: u32) -> u64 {
    hash & bitmask(width)
}
