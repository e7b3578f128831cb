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

//! A d-left counting Bloom filter with dynamic bit reassignment.
//!
//! This crate provides an approximate-membership data structure over a fixed
//! bit budget. Elements are reduced to short fingerprints and placed into one
//! of `d` parallel sub-tables; each bucket stores an occupancy counter plus a
//! variable number of variable-width fingerprints. When a bucket's occupancy
//! grows, the stored fingerprints are re-encoded at a narrower width so the
//! new element fits into the same bit budget. This "dynamic bit reassignment"
//! lets the structure pack more elements per bit than a fixed-width counting
//! filter.
//!
//! See the [`filter`] module for the data structure itself.
//!
//! # Example
//!
//! ```
//! use dlcbf::filter::CountingBloomFilter;
//!
//! let mut filter = CountingBloomFilter::default();
//! filter.insert(b"apple").unwrap();
//!
//! assert!(filter.query(b"apple"));
//! assert!(!filter.query(b"grape"));
//! ```

pub mod error;
pub mod filter;

mod hash;
