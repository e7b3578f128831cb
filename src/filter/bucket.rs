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

//! Bucket codec: the physical bit layout of the filter's backing buffer.
//!
//! All shift/mask arithmetic in the crate lives here. A bucket is read into a
//! right-aligned `u64` word and written back as whole big-endian bytes, so
//! the counter occupies the top `counter_width` bits of the word and the
//! fingerprints pack against the least-significant end. Padding bits between
//! the counter and the fingerprints are zeroed on every encode, which keeps
//! dumps and byte-level comparisons deterministic.

use byteorder::BigEndian;
use byteorder::ByteOrder;

use crate::error::InsertError;
use crate::filter::BITS_IN_BYTE;
use crate::filter::bitmask;
use crate::filter::fingerprint;
use crate::filter::fingerprint_width;

/// The backing buffer of all sub-tables plus the layout parameters needed to
/// address and decode it. Construction assumes parameters already validated
/// by `CountingBloomFilter::new`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BucketArray {
    num_tables: usize,
    buckets_per_table: usize,
    bits_per_bucket: u32,
    counter_width: u32,
    /// Whole bytes per bucket: `(bits_per_bucket + counter_width) / 8`
    bucket_bytes: usize,
    /// Whole bytes per sub-table: `buckets_per_table * bucket_bytes`
    table_bytes: usize,
    /// Zero-filled at construction, mutated only by [`BucketArray::push`]
    bytes: Box<[u8]>,
}

impl BucketArray {
    pub(crate) fn new(
        num_tables: usize,
        buckets_per_table: usize,
        bits_per_bucket: u32,
        counter_width: u32,
    ) -> Self {
        let bucket_bytes = ((bits_per_bucket + counter_width) / BITS_IN_BYTE) as usize;
        let table_bytes = buckets_per_table * bucket_bytes;
        Self {
            num_tables,
            buckets_per_table,
            bits_per_bucket,
            counter_width,
            bucket_bytes,
            table_bytes,
            bytes: vec![0u8; num_tables * table_bytes].into_boxed_slice(),
        }
    }

    pub(crate) fn num_tables(&self) -> usize {
        self.num_tables
    }

    pub(crate) fn buckets_per_table(&self) -> usize {
        self.buckets_per_table
    }

    pub(crate) fn bits_per_bucket(&self) -> u32 {
        self.bits_per_bucket
    }

    pub(crate) fn counter_width(&self) -> u32 {
        self.counter_width
    }

    pub(crate) fn bucket_bytes(&self) -> usize {
        self.bucket_bytes
    }

    pub(crate) fn table_bytes(&self) -> usize {
        self.table_bytes
    }

    /// Largest occupancy the counter field can represent: `2^counter_width - 1`.
    pub(crate) fn max_occupancy(&self) -> u32 {
        (1u32 << self.counter_width) - 1
    }

    /// Byte offset of bucket `(table, bucket)` in the backing buffer.
    #[inline]
    fn offset(&self, table: usize, bucket: usize) -> usize {
        assert!(table < self.num_tables, "table index out of range");
        assert!(bucket < self.buckets_per_table, "bucket index out of range");
        table * self.table_bytes + bucket * self.bucket_bytes
    }

    /// Occupancy counter: the top `counter_width` bits of the bucket's first
    /// byte.
    #[inline]
    pub(crate) fn occupancy(&self, table: usize, bucket: usize) -> u32 {
        let first = self.bytes[self.offset(table, bucket)];
        u32::from(first >> (BITS_IN_BYTE - self.counter_width))
    }

    /// The full bucket span as a right-aligned word.
    #[inline]
    pub(crate) fn word(&self, table: usize, bucket: usize) -> u64 {
        let off = self.offset(table, bucket);
        BigEndian::read_uint(&self.bytes[off..off + self.bucket_bytes], self.bucket_bytes)
    }

    #[inline]
    fn write_word(&mut self, table: usize, bucket: usize, word: u64) {
        let off = self.offset(table, bucket);
        BigEndian::write_uint(
            &mut self.bytes[off..off + self.bucket_bytes],
            word,
            self.bucket_bytes,
        );
    }

    /// Whether the bucket holds a fingerprint matching `hash` at the bucket's
    /// current fingerprint width.
    pub(crate) fn contains(&self, table: usize, bucket: usize, hash: u64) -> bool {
        let occupancy = self.occupancy(table, bucket);
        if occupancy == 0 {
            return false;
        }

        let width = fingerprint_width(self.bits_per_bucket, occupancy);
        debug_assert!(width >= 1, "stored occupancy implies a positive width");
        let target = fingerprint(hash, width);
        let word = self.word(table, bucket);

        (0..occupancy).any(|index| decode_fingerprint(word, occupancy, width, index) == target)
    }

    /// Append `hash`'s fingerprint to the bucket, re-encoding the existing
    /// fingerprints at the narrower width implied by the new occupancy.
    ///
    /// Fails with [`InsertError::Overflow`] when the counter field cannot
    /// represent one more element, or when one more element would shrink the
    /// fingerprint width to zero bits; the bucket is left unmodified.
    pub(crate) fn push(&mut self, table: usize, bucket: usize, hash: u64) -> Result<(), InsertError> {
        let occupancy = self.occupancy(table, bucket);
        if occupancy + 1 > self.max_occupancy() {
            return Err(InsertError::Overflow);
        }
        let new_width = fingerprint_width(self.bits_per_bucket, occupancy + 1);
        if new_width == 0 {
            return Err(InsertError::Overflow);
        }

        // Re-truncate the stored fingerprints to the new width, oldest first.
        // Masking to `new_width` equals re-deriving `hash mod 2^new_width`.
        let word = self.word(table, bucket);
        let mut payload = 0u64;
        if occupancy > 0 {
            let old_width = fingerprint_width(self.bits_per_bucket, occupancy);
            for index in 0..occupancy {
                let stored = decode_fingerprint(word, occupancy, old_width, index);
                payload = (payload << new_width) | (stored & bitmask(new_width));
            }
        }
        payload = (payload << new_width) | fingerprint(hash, new_width);

        // Counter above the payload bits; the gap in between encodes as zero.
        let new_word = (u64::from(occupancy + 1) << self.bits_per_bucket) | payload;
        self.write_word(table, bucket, new_word);
        Ok(())
    }
}

/// Extract the `index`-th fingerprint (0 = oldest, most significant) of
/// `width` bits from a bucket word holding `occupancy` fingerprints.
#[inline]
pub(crate) fn decode_fingerprint(word: u64, occupancy: u32, width: u32, index: u32) -> u64 {
    debug_assert!(index < occupancy);
    (word >> ((occupancy - 1 - index) * width)) & bitmask(width)
}
