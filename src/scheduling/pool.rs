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

//! The two cooperating thread pools of the concurrency model: a fixed-size
//! **decode pool**, sized by [`ReaderProperties::thread_count`], for
//! per-column page scans and batch reads, and a small **common pool**,
//! kept separate, for the batch-aggregation task that joins per-column
//! futures and computes a `BatchIndex`. Keeping the two apart means a
//! column prefetch can never be stuck behind an aggregator that is itself
//! waiting on a prefetch.

use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};

use crate::errors::Result;
use crate::file::properties::ReaderProperties;
use crate::general_err;

/// Common-pool size is small and fixed: its tasks only join futures and
/// copy already-decoded arrays, never perform I/O or decompression.
const COMMON_POOL_THREADS: usize = 2;

/// Owns both runtimes for the lifetime of a `FileManager`/`PipelinedRowReader`.
/// Cheaply `Clone`-able via `Arc` so every task can hold its own handle.
pub struct Pools {
    decode: Runtime,
    common: Runtime,
}

impl Pools {
    pub fn new(properties: &ReaderProperties) -> Result<Arc<Self>> {
        let decode = Builder::new_multi_thread()
            .worker_threads(properties.thread_count())
            .thread_name("parquet-decode")
            .enable_all()
            .build()
            .map_err(|e| general_err!("failed to start decode pool: {}", e))?;
        let common = Builder::new_multi_thread()
            .worker_threads(COMMON_POOL_THREADS)
            .thread_name("parquet-batch")
            .enable_all()
            .build()
            .map_err(|e| general_err!("failed to start batch-aggregation pool: {}", e))?;
        Ok(Arc::new(Pools { decode, common }))
    }

    /// Handle to the decode pool: per-column page scans and batch reads.
    pub fn decode_handle(&self) -> &Handle {
        self.decode.handle()
    }

    /// Handle to the common pool: the batch task that aggregates
    /// per-column futures and builds the `BatchIndex`.
    pub fn common_handle(&self) -> &Handle {
        self.common.handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pools_start_with_configured_sizes() {
        let props = ReaderProperties::builder().with_thread_count(3).build();
        let pools = Pools::new(&props).unwrap();
        // Both handles are usable immediately; a trivial task round-trips.
        let decode_ok = pools.decode_handle().block_on(async { 1 + 1 });
        let common_ok = pools.common_handle().block_on(async { 2 + 2 });
        assert_eq!(decode_ok, 2);
        assert_eq!(common_ok, 4);
    }
}
