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

//! A cheaply-cloneable, immutable owned byte buffer.

use bytes::Bytes;
use std::ops::Deref;

/// An owned, reference-counted byte buffer. Cloning is O(1); it is the unit
/// of ownership for decompressed page payloads and dictionary pages.
#[derive(Debug, Clone)]
pub struct ByteBufferPtr {
    data: Bytes,
}

impl ByteBufferPtr {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data: Bytes::from(data) }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a new `ByteBufferPtr` sharing the underlying allocation,
    /// covering `[start, start+len)`.
    pub fn slice(&self, start: usize, len: usize) -> Self {
        Self { data: self.data.slice(start..start + len) }
    }

    pub fn start(&self) -> usize {
        0
    }
}

impl From<Bytes> for ByteBufferPtr {
    fn from(data: Bytes) -> Self {
        Self { data }
    }
}

impl From<Vec<u8>> for ByteBufferPtr {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl AsRef<[u8]> for ByteBufferPtr {
    fn as_ref(&self) -> &[u8] {
        self.data.as_ref()
    }
}

impl Deref for ByteBufferPtr {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.data.as_ref()
    }
}
