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

//! The three recognized reader options: decode pool size, target batch
//! size, and whether to prefer `libdeflate` for GZIP. Builder shape follows
//! `ReadOptionsBuilder`'s fluent `with_*`/`build()` pattern.

const DEFAULT_BATCH_SIZE: usize = 262_144;

/// Immutable, shared (`Arc`-friendly by convention of its callers) set of
/// reader options. Constructed exclusively through [`ReaderPropertiesBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderProperties {
    thread_count: usize,
    batch_size: usize,
    use_libdeflate: bool,
}

impl ReaderProperties {
    pub fn builder() -> ReaderPropertiesBuilder {
        ReaderPropertiesBuilder::new()
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn use_libdeflate(&self) -> bool {
        self.use_libdeflate
    }
}

impl Default for ReaderProperties {
    fn default() -> Self {
        ReaderPropertiesBuilder::new().build()
    }
}

/// Builder for [`ReaderProperties`]. `thread_count` defaults to the number
/// of available processors, `batch_size` to 262,144 records, and
/// `use_libdeflate` to `true`.
#[derive(Debug, Clone)]
pub struct ReaderPropertiesBuilder {
    thread_count: usize,
    batch_size: usize,
    use_libdeflate: bool,
}

impl ReaderPropertiesBuilder {
    fn new() -> Self {
        ReaderPropertiesBuilder {
            thread_count: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            batch_size: DEFAULT_BATCH_SIZE,
            use_libdeflate: true,
        }
    }

    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count.max(1);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_use_libdeflate(mut self, use_libdeflate: bool) -> Self {
        self.use_libdeflate = use_libdeflate;
        self
    }

    pub fn build(self) -> ReaderProperties {
        ReaderProperties {
            thread_count: self.thread_count,
            batch_size: self.batch_size,
            use_libdeflate: self.use_libdeflate,
        }
    }
}
