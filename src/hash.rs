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

//! Element hashing.
//!
//! Every filter operation derives all of its addressing (bucket row and
//! fingerprint) from a single MurmurHash3 x64-128 evaluation of the element
//! bytes. Only `h1` is used; 64 well-mixed bits cover the widest possible
//! fingerprint plus the row index.

const DEFAULT_SEED: u32 = 9001;

/// Hash an element's bytes to the 64-bit value all addressing is derived from.
#[inline]
pub(crate) fn element_hash(element: &[u8]) -> u64 {
    let (h1, _h2) = mur3::murmurhash3_x64_128(element, DEFAULT_SEED);
    h1
}
