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

use std::fmt;

use crate::error::ConfigError;
use crate::error::InsertError;
use crate::filter::BITS_IN_BYTE;
use crate::filter::bucket::BucketArray;
use crate::hash::element_hash;

/// A d-left counting Bloom filter for probabilistic set membership testing.
///
/// Provides membership queries over byte-string elements with:
/// - No false negatives for successfully inserted elements
/// - A false positive rate that grows with bucket occupancy
/// - A fixed byte buffer sized entirely at construction
///
/// Elements hash to one bucket row shared by all sub-tables and are placed in
/// the least-loaded table's bucket on that row. Each insertion into a
/// non-empty bucket re-encodes the stored fingerprints at a narrower width
/// (see the [module documentation](super)).
///
/// # Examples
///
/// ```
/// use dlcbf::filter::CountingBloomFilter;
///
/// let mut filter = CountingBloomFilter::new(3, 16, 60, 4).unwrap();
/// filter.insert(b"apple").unwrap();
///
/// assert!(filter.query(b"apple")); // true - was inserted
/// assert!(!filter.query(b"grape")); // false - never inserted (probably)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CountingBloomFilter {
    buckets: BucketArray,
    /// Count of successfully stored fingerprints (duplicates excluded)
    num_items: u64,
}

impl Default for CountingBloomFilter {
    /// The demo configuration: 3 tables of 16 buckets, 60 fingerprint bits
    /// and a 4-bit counter per bucket.
    fn default() -> Self {
        CountingBloomFilter::new(
            Self::DEFAULT_NUM_TABLES,
            Self::DEFAULT_BUCKETS_PER_TABLE,
            Self::DEFAULT_BITS_PER_BUCKET,
            Self::DEFAULT_COUNTER_WIDTH,
        )
        .expect("default configuration is valid")
    }
}

impl CountingBloomFilter {
    /// Default number of sub-tables (`d`).
    pub const DEFAULT_NUM_TABLES: usize = 3;
    /// Default buckets per sub-table (`m`).
    pub const DEFAULT_BUCKETS_PER_TABLE: usize = 16;
    /// Default fingerprint bits per bucket (`b`).
    pub const DEFAULT_BITS_PER_BUCKET: u32 = 60;
    /// Default occupancy counter bits per bucket (`c`).
    pub const DEFAULT_COUNTER_WIDTH: u32 = 4;

    /// Creates a filter with the given layout. All parameters are immutable
    /// after construction.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidAlignment`] when `bits_per_bucket +
    ///   counter_width` is not a multiple of 8
    /// - [`ConfigError::InvalidCounterWidth`] when `counter_width` is outside
    ///   `1..=7`
    /// - [`ConfigError::InvalidBitsPerBucket`] when `bits_per_bucket` exceeds
    ///   64
    ///
    /// # Panics
    ///
    /// If `num_tables` or `buckets_per_table` is zero.
    pub fn new(
        num_tables: usize,
        buckets_per_table: usize,
        bits_per_bucket: u32,
        counter_width: u32,
    ) -> Result<Self, ConfigError> {
        assert!(num_tables >= 1, "num_tables must be at least 1");
        assert!(buckets_per_table >= 1, "buckets_per_table must be at least 1");

        if (bits_per_bucket + counter_width) % BITS_IN_BYTE != 0 {
            return Err(ConfigError::InvalidAlignment);
        }
        if !(1..BITS_IN_BYTE).contains(&counter_width) {
            return Err(ConfigError::InvalidCounterWidth);
        }
        if bits_per_bucket > u64::BITS {
            return Err(ConfigError::InvalidBitsPerBucket);
        }

        Ok(CountingBloomFilter {
            buckets: BucketArray::new(num_tables, buckets_per_table, bits_per_bucket, counter_width),
            num_items: 0,
        })
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether an element is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Element was **possibly** inserted (or a fingerprint collision)
    /// - `false`: Element was **definitely not** inserted
    ///
    /// Never fails and never mutates the filter.
    pub fn query(&self, element: &[u8]) -> bool {
        self.contains_hash(element_hash(element))
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Inserts an element into the filter.
    ///
    /// Inserting an element that already queries `true` is a no-op: no
    /// counter moves and no fingerprint narrows, so repeated inserts of the
    /// same key cannot degrade the filter. Multiplicities are not tracked.
    ///
    /// # Errors
    ///
    /// [`InsertError::Overflow`] when the destination bucket cannot hold one
    /// more fingerprint. The filter is left unmodified and remains valid; the
    /// rejected element stays unrepresented.
    ///
    /// # Examples
    ///
    /// ```
    /// use dlcbf::filter::CountingBloomFilter;
    ///
    /// let mut filter = CountingBloomFilter::default();
    /// filter.insert(b"apple").unwrap();
    /// filter.insert(b"apple").unwrap(); // no-op
    /// assert_eq!(filter.num_items(), 1);
    /// ```
    pub fn insert(&mut self, element: &[u8]) -> Result<(), InsertError> {
        let hash = element_hash(element);
        if self.contains_hash(hash) {
            return Ok(());
        }

        let row = self.bucket_row(hash);
        let table = self.emptiest_table(row);
        self.buckets.push(table, row, hash)?;
        self.num_items += 1;
        Ok(())
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns whether the filter holds no fingerprints.
    pub fn is_empty(&self) -> bool {
        self.num_items == 0
    }

    /// Number of fingerprints stored across all tables (duplicate inserts do
    /// not count).
    pub fn num_items(&self) -> u64 {
        self.num_items
    }

    /// Number of sub-tables (`d`).
    pub fn num_tables(&self) -> usize {
        self.buckets.num_tables()
    }

    /// Buckets per sub-table (`m`).
    pub fn buckets_per_table(&self) -> usize {
        self.buckets.buckets_per_table()
    }

    /// Fingerprint bits per bucket (`b`).
    pub fn bits_per_bucket(&self) -> u32 {
        self.buckets.bits_per_bucket()
    }

    /// Occupancy counter bits per bucket (`c`).
    pub fn counter_width(&self) -> u32 {
        self.buckets.counter_width()
    }

    /// Bytes occupied by one bucket.
    pub fn bucket_size_bytes(&self) -> usize {
        self.buckets.bucket_bytes()
    }

    /// Bytes occupied by one sub-table.
    pub fn table_size_bytes(&self) -> usize {
        self.buckets.table_bytes()
    }

    /// Largest occupancy a single bucket can report.
    pub fn max_bucket_occupancy(&self) -> u32 {
        self.buckets.max_occupancy()
    }

    /// Number of fingerprints currently in bucket `(table, bucket)`.
    ///
    /// # Panics
    ///
    /// If `table` or `bucket` is out of range.
    pub fn occupancy(&self, table: usize, bucket: usize) -> u32 {
        self.buckets.occupancy(table, bucket)
    }

    /// Raw contents of bucket `(table, bucket)` as a right-aligned word.
    /// Diagnostic only; the encoding is described in the
    /// [module documentation](super).
    pub fn raw_bucket(&self, table: usize, bucket: usize) -> u64 {
        self.buckets.word(table, bucket)
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    /// The bucket row an element occupies in every sub-table.
    #[inline]
    fn bucket_row(&self, hash: u64) -> usize {
        (hash % self.buckets.buckets_per_table() as u64) as usize
    }

    /// d-left selection: the sub-table whose bucket on `row` holds the fewest
    /// fingerprints, ties broken by the lowest table index.
    fn emptiest_table(&self, row: usize) -> usize {
        let mut best_table = 0;
        let mut best_occupancy = self.buckets.occupancy(0, row);
        for table in 1..self.buckets.num_tables() {
            let occupancy = self.buckets.occupancy(table, row);
            if occupancy < best_occupancy {
                best_table = table;
                best_occupancy = occupancy;
            }
        }
        best_table
    }

    fn contains_hash(&self, hash: u64) -> bool {
        let row = self.bucket_row(hash);
        (0..self.buckets.num_tables()).any(|table| self.buckets.contains(table, row, hash))
    }
}

impl fmt::Display for CountingBloomFilter {
    /// Human-readable table dump: one line per bucket with its occupancy and
    /// raw contents. Presentation only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_digits = self.bucket_size_bytes() * 2;
        for table in 0..self.num_tables() {
            writeln!(f, "table {table}:")?;
            for bucket in 0..self.buckets_per_table() {
                writeln!(
                    f,
                    "  bucket {bucket}: occupancy={} raw=0x{:0width$x}",
                    self.occupancy(table, bucket),
                    self.raw_bucket(table, bucket),
                    width = hex_digits,
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_validates_alignment() {
        // 61 + 4 = 65 bits: not byte aligned
        assert_eq!(
            CountingBloomFilter::new(3, 16, 61, 4).err(),
            Some(ConfigError::InvalidAlignment)
        );
        // 60 + 4 = 64 bits: aligned
        assert!(CountingBloomFilter::new(3, 16, 60, 4).is_ok());
    }

    #[test]
    fn test_construction_validates_counter_width() {
        assert_eq!(
            CountingBloomFilter::new(3, 16, 64, 0).err(),
            Some(ConfigError::InvalidCounterWidth)
        );
        assert_eq!(
            CountingBloomFilter::new(3, 16, 56, 8).err(),
            Some(ConfigError::InvalidCounterWidth)
        );
        assert!(CountingBloomFilter::new(3, 16, 60, 4).is_ok());
    }

    #[test]
    fn test_construction_validates_bits_per_bucket() {
        // 65 + 7 = 72 bits is byte aligned but exceeds the bucket word
        assert_eq!(
            CountingBloomFilter::new(3, 16, 65, 7).err(),
            Some(ConfigError::InvalidBitsPerBucket)
        );
    }

    #[test]
    #[should_panic(expected = "num_tables must be at least 1")]
    fn test_zero_tables_rejected() {
        let _ = CountingBloomFilter::new(0, 16, 60, 4);
    }

    #[test]
    fn test_default_configuration() {
        let filter = CountingBloomFilter::default();
        assert_eq!(filter.num_tables(), 3);
        assert_eq!(filter.buckets_per_table(), 16);
        assert_eq!(filter.bits_per_bucket(), 60);
        assert_eq!(filter.counter_width(), 4);
        assert_eq!(filter.bucket_size_bytes(), 8);
        assert_eq!(filter.table_size_bytes(), 128);
        assert_eq!(filter.max_bucket_occupancy(), 15);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_insert_and_query() {
        let mut filter = CountingBloomFilter::default();

        assert!(!filter.query(b"apple"));
        filter.insert(b"apple").unwrap();
        assert!(filter.query(b"apple"));
        assert!(!filter.is_empty());
        assert_eq!(filter.num_items(), 1);
    }

    #[test]
    fn test_duplicate_insert_is_a_noop() {
        let mut filter = CountingBloomFilter::default();
        filter.insert(b"apple").unwrap();

        let occupancies: Vec<u32> = (0..3).map(|t| (0..16).map(|b| filter.occupancy(t, b)).sum()).collect();

        filter.insert(b"apple").unwrap();
        assert_eq!(filter.num_items(), 1);
        for (table, total) in occupancies.iter().enumerate() {
            let after: u32 = (0..16).map(|b| filter.occupancy(table, b)).sum();
            assert_eq!(after, *total);
        }
    }

    #[test]
    fn test_placement_balances_tables() {
        // a single bucket row forces every element onto the same row; the
        // d-left choice must spread them one per table
        let mut filter = CountingBloomFilter::new(3, 1, 60, 4).unwrap();
        filter.insert(b"first").unwrap();
        filter.insert(b"second").unwrap();
        filter.insert(b"third").unwrap();

        for table in 0..3 {
            assert_eq!(filter.occupancy(table, 0), 1);
        }

        // all tables tied at 1: the tie breaks to the lowest index
        filter.insert(b"fourth").unwrap();
        assert_eq!(filter.occupancy(0, 0), 2);
        assert_eq!(filter.occupancy(1, 0), 1);
        assert_eq!(filter.occupancy(2, 0), 1);
    }

    #[test]
    fn test_overflow_rejects_insert_and_keeps_filter_valid() {
        // one table, one bucket, 1-bit counter: capacity of exactly one
        let mut filter = CountingBloomFilter::new(1, 1, 7, 1).unwrap();
        filter.insert(b"first").unwrap();
        let raw = filter.raw_bucket(0, 0);

        // a probe whose 7-bit fingerprint aliases the stored one is accepted
        // as a duplicate, so scan until one misses and overflows
        let saw_overflow = (0..100).any(|probe| {
            filter.insert(format!("probe-{probe}").as_bytes()) == Err(InsertError::Overflow)
        });
        assert!(saw_overflow);

        assert_eq!(filter.raw_bucket(0, 0), raw);
        assert_eq!(filter.occupancy(0, 0), 1);
        assert_eq!(filter.num_items(), 1);
        assert!(filter.query(b"first"));
    }

    #[test]
    fn test_no_false_negatives_through_width_shrink() {
        // drive one bucket from width 60 down to width 4
        let mut filter = CountingBloomFilter::new(1, 1, 60, 4).unwrap();
        let mut inserted: Vec<String> = Vec::new();

        let mut next = 0;
        while filter.occupancy(0, 0) < filter.max_bucket_occupancy() {
            assert!(next < 1000, "bucket failed to fill");
            let element = format!("element-{next}");
            filter.insert(element.as_bytes()).unwrap();
            inserted.push(element);
            next += 1;

            // nothing inserted so far may be lost as the width narrows
            for earlier in &inserted {
                assert!(filter.query(earlier.as_bytes()), "{earlier} lost");
            }
        }

        // counter saturated at 15: any element that does not alias a stored
        // fingerprint must now be rejected
        let saw_overflow = (0..1000).any(|probe| {
            filter.insert(format!("extra-{probe}").as_bytes()) == Err(InsertError::Overflow)
        });
        assert!(saw_overflow);
        assert_eq!(filter.occupancy(0, 0), 15);
    }

    #[test]
    fn test_display_dump() {
        let mut filter = CountingBloomFilter::new(2, 2, 12, 4).unwrap();
        filter.insert(b"apple").unwrap();

        let dump = filter.to_string();
        assert!(dump.contains("table 0:"));
        assert!(dump.contains("table 1:"));
        assert!(dump.contains("occupancy=1"));
        // 2-byte buckets render as 4 hex digits
        assert!(dump.contains("raw=0x0000"));
    }
}
