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

//! Error types for filter construction and updates

use std::fmt;

/// Errors rejecting an invalid filter configuration at construction time.
///
/// A rejected configuration produces no filter instance; every variant is a
/// caller mistake, not a runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigError {
    /// `bits_per_bucket + counter_width` is not a multiple of 8, so buckets
    /// would not occupy a whole number of bytes.
    InvalidAlignment,
    /// `counter_width` is outside `1..=7`.
    InvalidCounterWidth,
    /// `bits_per_bucket` exceeds the 64-bit word used for bucket arithmetic.
    InvalidBitsPerBucket,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidAlignment => {
                write!(f, "bits per bucket plus counter width must be byte aligned")
            }
            ConfigError::InvalidCounterWidth => {
                write!(f, "counter width must be between 1 and 7")
            }
            ConfigError::InvalidBitsPerBucket => {
                write!(f, "bits per bucket cannot exceed 64")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors returned by [`CountingBloomFilter::insert`].
///
/// [`CountingBloomFilter::insert`]: crate::filter::CountingBloomFilter::insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertError {
    /// The destination bucket cannot hold one more fingerprint: either its
    /// occupancy counter field is saturated, or another fingerprint would
    /// shrink the fingerprint width to zero bits.
    ///
    /// The insertion is rejected and the filter is left unmodified; the
    /// filter remains valid for further operations. Repeated overflows
    /// indicate a filter that is undersized for its load (too few tables,
    /// too few buckets, or too narrow a counter).
    Overflow,
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::Overflow => write!(f, "bucket occupancy counter overflow"),
        }
    }
}

impl std::error::Error for InsertError {}
