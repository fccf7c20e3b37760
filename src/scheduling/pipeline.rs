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

//! The pool-backed twin of [`crate::row::RowReader`]: instead of pulling
//! each batch synchronously on the caller's thread, a `PipelinedRowReader`
//! keeps one batch prefetched ahead at all times. Per-column `next_batch()`
//! calls run as decode-pool tasks (a fork-join barrier across columns);
//! the `BatchIndex` they feed is then built as a single common-pool task,
//! matching the decode/common pool split of spec §5. `next()` only ever
//! suspends on the already-in-flight prefetch for the batch it returns,
//! immediately launching the one after.
//!
//! `BatchIndex`'s column data is fully owned (cloned out of each
//! `ColumnReader`'s current batch, see `row::batch_index::BatchIndex::build`),
//! so a prefetched batch is independent of the `ColumnReader`s that
//! produced it and safe to read from a different thread than the one that
//! later calls `next_batch()` again on those same readers.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::column::page::PageReader;
use crate::column::reader::ColumnReader;
use crate::errors::Result;
use crate::general_err;
use crate::row::batch_index::BatchIndex;
use crate::row::cursor::StructCursor;
use crate::row::field_desc::{build_projected_fields, FieldDesc};
use crate::schema::projection::ProjectedSchema;
use crate::schema::types::SchemaDescriptor;
use crate::scheduling::pool::Pools;

type PreparedBatch = (Vec<ColumnReader>, Option<BatchIndex>);

async fn prepare_next_batch(pools: Arc<Pools>, readers: Vec<ColumnReader>) -> Result<PreparedBatch> {
    let decode = pools.decode_handle().clone();
    let mut tasks = Vec::with_capacity(readers.len());
    for mut reader in readers {
        tasks.push(decode.spawn_blocking(move || -> Result<(ColumnReader, bool)> {
            let got = reader.next_batch()?;
            Ok((reader, got))
        }));
    }
    let mut rebuilt = Vec::with_capacity(tasks.len());
    let mut all_available = true;
    for t in tasks {
        let (reader, got) = t.await.map_err(|e| general_err!("decode task panicked: {}", e))??;
        all_available &= got;
        rebuilt.push(reader);
    }
    if !all_available {
        return Ok((rebuilt, None));
    }

    let common = pools.common_handle().clone();
    let (rebuilt, index) = common
        .spawn_blocking(move || -> Result<PreparedBatch> {
            let refs: Vec<&ColumnReader> = rebuilt.iter().collect();
            let index = BatchIndex::build(&refs)?;
            drop(refs);
            Ok((rebuilt, Some(index)))
        })
        .await
        .map_err(|e| general_err!("batch aggregation task panicked: {}", e))??;
    Ok((rebuilt, index))
}

/// Row-oriented reader over projected columns, pipelined one batch ahead
/// via the decode/common pool split.
pub struct PipelinedRowReader {
    fields: Vec<(String, FieldDesc)>,
    pools: Arc<Pools>,
    readers: Vec<ColumnReader>,
    current: Option<BatchIndex>,
    prefetch: Option<JoinHandle<Result<PreparedBatch>>>,
    row_idx: usize,
    row_count: usize,
}

impl PipelinedRowReader {
    pub fn try_new(
        schema: &SchemaDescriptor,
        projection: &ProjectedSchema,
        page_readers: Vec<Box<dyn PageReader>>,
        batch_size: usize,
        pools: Arc<Pools>,
    ) -> Result<Self> {
        if page_readers.len() != projection.len() {
            return Err(general_err!(
                "expected {} page readers for {} projected columns, got {}",
                projection.len(),
                projection.len(),
                page_readers.len()
            ));
        }
        let fields = build_projected_fields(schema, projection)?;
        let mut readers = Vec::with_capacity(page_readers.len());
        for (pc, pr) in projection.columns().iter().zip(page_readers) {
            readers.push(ColumnReader::try_new(pc.descriptor.clone(), pr, batch_size)?);
        }
        let mut this =
            PipelinedRowReader { fields, pools, readers, current: None, prefetch: None, row_idx: 0, row_count: 0 };
        this.launch_prefetch();
        Ok(this)
    }

    fn launch_prefetch(&mut self) {
        let readers = std::mem::take(&mut self.readers);
        let pools = self.pools.clone();
        self.prefetch = Some(pools.common_handle().spawn(prepare_next_batch(pools.clone(), readers)));
    }

    /// Joins the already-launched prefetch for the next batch (or, on the
    /// very first call, whatever prefetch `try_new` launched), installs
    /// it, and immediately launches the one after.
    async fn advance_batch(&mut self) -> Result<()> {
        let handle = self.prefetch.take().expect("a prefetch is always launched after consuming the previous one");
        let (readers, index) = handle.await.map_err(|e| general_err!("batch prefetch task panicked: {}", e))??;
        self.readers = readers;
        self.row_idx = 0;
        match index {
            Some(index) => {
                self.row_count = index.record_count();
                self.current = Some(index);
                self.launch_prefetch();
            }
            None => {
                self.row_count = 0;
                self.current = None;
            }
        }
        Ok(())
    }

    pub fn has_next(&self) -> bool {
        self.row_idx < self.row_count
    }

    /// Advances to and returns the next row, crossing a batch boundary by
    /// joining the already-in-flight prefetch if needed.
    pub async fn next(&mut self) -> Result<StructCursor<'_>> {
        if !self.has_next() {
            self.advance_batch().await?;
        }
        if !self.has_next() {
            return Err(general_err!("no more rows"));
        }
        let idx = self.row_idx;
        self.row_idx += 1;
        let batch = self.current.as_ref().expect("has_next implies a current batch");
        Ok(StructCursor::new_record(batch, &self.fields, idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::{Encoding, Repetition};
    use crate::column::page::Page;
    use crate::file::properties::ReaderProperties;
    use crate::format::SchemaElement;
    use crate::schema::from_thrift::schema_from_thrift;
    use crate::util::memory::ByteBufferPtr;
    use crate::util::test_common::write_plain_i32;

    fn elem(name: &str, ty: Option<i32>, rep: Option<i32>, num_children: Option<i32>) -> SchemaElement {
        SchemaElement {
            type_: ty,
            type_length: None,
            repetition_type: rep,
            name: name.to_string(),
            num_children,
            converted_type: None,
            scale: None,
            precision: None,
            field_id: None,
            logical_type: None,
        }
    }

    struct OnePage(Option<Page>);

    impl Iterator for OnePage {
        type Item = Result<Page>;
        fn next(&mut self) -> Option<Self::Item> {
            self.get_next_page().transpose()
        }
    }

    impl PageReader for OnePage {
        fn get_next_page(&mut self) -> Result<Option<Page>> {
            Ok(self.0.take())
        }
    }

    fn page_of(values: &[i32]) -> Box<dyn PageReader> {
        let payload = write_plain_i32(values);
        Box::new(OnePage(Some(Page::DataPage {
            buf: ByteBufferPtr::new(payload),
            num_values: values.len() as u32,
            encoding: Encoding::PLAIN,
            def_level_encoding: Encoding::RLE,
            rep_level_encoding: Encoding::RLE,
        })))
    }

    #[test]
    fn test_pipelined_reader_delivers_rows_in_order() {
        let mut root = elem("schema", None, None, Some(1));
        root.num_children = Some(1);
        let elements = vec![root, elem("a", Some(1), Some(Repetition::REQUIRED as i32), None)];
        let schema = schema_from_thrift(&elements).unwrap();
        let projection = ProjectedSchema::all(&schema);
        let pools = Pools::new(&ReaderProperties::default()).unwrap();

        let seen = pools.common_handle().block_on(async {
            let mut reader =
                PipelinedRowReader::try_new(&schema, &projection, vec![page_of(&[7, 8, 9])], 10, pools.clone())
                    .unwrap();
            let mut seen = Vec::new();
            loop {
                match reader.next().await {
                    Ok(row) => seen.push(row.get("a").unwrap().unwrap().as_i32().unwrap()),
                    Err(_) => break,
                }
            }
            seen
        });
        assert_eq!(seen, vec![7, 8, 9]);
    }
}
