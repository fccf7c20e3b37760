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

//! Batch-oriented column value iteration: pulls pages from a [`PageReader`],
//! splits each page into its level/value sub-streams, decodes values through
//! the right [`Decoder`], and assembles whole top-level records into a
//! [`TypedBatch`]. Nested-level bookkeeping (offsets, null bitmaps per level)
//! is computed lazily from the current batch via `crate::levels`.

use std::cell::RefCell;

use crate::basic::{Encoding, Type};
use crate::data_type::{
    BoolType, ByteArray, ByteArrayType, DataType, DoubleType, FixedLenByteArray,
    FixedLenByteArrayType, FloatType, Int32Type, Int64Type, Int96, Int96Type,
};
use crate::encodings::decoding::{Decoder, DecoderFactory, DictDecoder};
use crate::encodings::levels::LevelDecoder;
use crate::errors::{ParquetError, Result};
use crate::levels::{compute_column_levels, BitSet, ColumnLevels};
use crate::schema::types::ColumnDescriptor;
use crate::util::memory::ByteBufferPtr;
use crate::{corrupt_page_err, general_err};

use super::page::{Page, PageReader};

fn read_u32_le(bytes: &[u8], pos: usize) -> Result<u32> {
    let end = pos
        .checked_add(4)
        .filter(|&e| e <= bytes.len())
        .ok_or_else(|| corrupt_page_err!("page truncated while reading a level stream length"))?;
    Ok(u32::from_le_bytes(bytes[pos..end].try_into().unwrap()))
}

fn slice_of(bytes: &[u8], pos: usize, len: usize) -> Result<&[u8]> {
    let end = pos
        .checked_add(len)
        .filter(|&e| e <= bytes.len())
        .ok_or_else(|| corrupt_page_err!("page truncated while reading a {}-byte section", len))?;
    Ok(&bytes[pos..end])
}

/// One physical type's decoded values plus the level/offset bookkeeping a
/// nested reader needs, already flattened to a requested batch's worth of
/// whole top-level records.
#[derive(Debug, Clone)]
pub struct ColumnBatch<V> {
    pub values: Vec<V>,
    /// `None` iff the column has no optional ancestor (`max_def_level == 0`).
    pub def_levels: Option<Vec<i32>>,
    /// `None` iff the column has no repeated ancestor (`max_rep_level == 0`).
    pub rep_levels: Option<Vec<i32>>,
    /// Leaf value index of each record's first entry. `None` when flat.
    pub record_offsets: Option<Vec<i32>>,
    pub record_count: usize,
    pub value_count: usize,
    pub max_def_level: i32,
    pub max_rep_level: i32,
}

impl<V> ColumnBatch<V> {
    fn levels_input(&self) -> (Option<&[i32]>, Option<&[i32]>, usize, i32, i32) {
        (
            self.rep_levels.as_deref(),
            self.def_levels.as_deref(),
            self.value_count,
            self.max_rep_level,
            self.max_def_level,
        )
    }
}

fn convert_batch<U, V>(b: ColumnBatch<U>, f: impl Fn(U) -> V) -> ColumnBatch<V> {
    ColumnBatch {
        values: b.values.into_iter().map(f).collect(),
        def_levels: b.def_levels,
        rep_levels: b.rep_levels,
        record_offsets: b.record_offsets,
        record_count: b.record_count,
        value_count: b.value_count,
        max_def_level: b.max_def_level,
        max_rep_level: b.max_rep_level,
    }
}

/// The six value families a `ColumnReader` batch can hold. `INT96` and
/// `FIXED_LEN_BYTE_ARRAY` columns surface here as `ByteCol`: neither has a
/// dedicated typed getter, and both are meant to be consumed as raw bytes
/// (by a row-level logical-type conversion, for `INT96` timestamps) rather
/// than through a numeric accessor.
#[derive(Debug, Clone)]
pub enum TypedBatch {
    IntCol(ColumnBatch<i32>),
    LongCol(ColumnBatch<i64>),
    FloatCol(ColumnBatch<f32>),
    DoubleCol(ColumnBatch<f64>),
    BoolCol(ColumnBatch<bool>),
    ByteCol(ColumnBatch<ByteArray>),
}

impl TypedBatch {
    fn record_count(&self) -> usize {
        match self {
            TypedBatch::IntCol(b) => b.record_count,
            TypedBatch::LongCol(b) => b.record_count,
            TypedBatch::FloatCol(b) => b.record_count,
            TypedBatch::DoubleCol(b) => b.record_count,
            TypedBatch::BoolCol(b) => b.record_count,
            TypedBatch::ByteCol(b) => b.record_count,
        }
    }

    fn max_rep_level(&self) -> i32 {
        match self {
            TypedBatch::IntCol(b) => b.max_rep_level,
            TypedBatch::LongCol(b) => b.max_rep_level,
            TypedBatch::FloatCol(b) => b.max_rep_level,
            TypedBatch::DoubleCol(b) => b.max_rep_level,
            TypedBatch::BoolCol(b) => b.max_rep_level,
            TypedBatch::ByteCol(b) => b.max_rep_level,
        }
    }

    fn levels_input(&self) -> (Option<&[i32]>, Option<&[i32]>, usize, i32, i32) {
        match self {
            TypedBatch::IntCol(b) => b.levels_input(),
            TypedBatch::LongCol(b) => b.levels_input(),
            TypedBatch::FloatCol(b) => b.levels_input(),
            TypedBatch::DoubleCol(b) => b.levels_input(),
            TypedBatch::BoolCol(b) => b.levels_input(),
            TypedBatch::ByteCol(b) => b.levels_input(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            TypedBatch::IntCol(_) => "INT32",
            TypedBatch::LongCol(_) => "INT64",
            TypedBatch::FloatCol(_) => "FLOAT",
            TypedBatch::DoubleCol(_) => "DOUBLE",
            TypedBatch::BoolCol(_) => "BOOLEAN",
            TypedBatch::ByteCol(_) => "BYTE_ARRAY",
        }
    }
}

/// Tracks one page's fully decoded values alongside its level streams, and
/// how much of it this reader has already handed out. Both level arrays are
/// always populated here (filled with zeros/`max_def_level` when the column
/// has no repeated/optional ancestor) so the record-segmentation logic below
/// never needs to branch on `R == 0` / `D == 0`.
struct PageState<T: DataType> {
    values: Vec<T::T>,
    def_levels: Vec<i32>,
    rep_levels: Vec<i32>,
    /// Value indices where a new top-level record begins (`rep_levels[i] ==
    /// 0`); equal to every index when the column is flat.
    record_starts: Vec<usize>,
    pos: usize,
    next_record_idx: usize,
    len: usize,
}

/// Drives one column chunk's [`PageReader`] into successive [`ColumnBatch`]es
/// of `T::T`. Dictionary pages are consumed transparently; a dictionary-
/// encoded data page with no preceding dictionary page is a corrupt file.
pub struct GenericColumnReader<T: DataType + DecoderFactory> {
    descr: ColumnDescriptor,
    page_reader: Box<dyn PageReader>,
    dictionary: Option<Vec<T::T>>,
    cur_page: Option<PageState<T>>,
}

impl<T: DataType + DecoderFactory> GenericColumnReader<T> {
    pub fn new(descr: ColumnDescriptor, page_reader: Box<dyn PageReader>) -> Self {
        GenericColumnReader { descr, page_reader, dictionary: None, cur_page: None }
    }

    /// `PLAIN_DICTIONARY`/`RLE_DICTIONARY` never go through
    /// `DecoderFactory::build_decoder`: that trait returns a type-erased
    /// `Box<dyn Decoder<T>>`, and dictionary population
    /// (`DictDecoder::set_dictionary`) is not part of the `Decoder` contract,
    /// so the dictionary has to be wired in here, before erasure.
    fn build_value_decoder(&self, encoding: Encoding) -> Result<Box<dyn Decoder<T>>> {
        match encoding {
            Encoding::RLE_DICTIONARY | Encoding::PLAIN_DICTIONARY => {
                let dict = self.dictionary.clone().ok_or_else(|| {
                    corrupt_page_err!("dictionary-encoded page with no preceding dictionary page")
                })?;
                let mut decoder = DictDecoder::<T>::new();
                decoder.set_dictionary(dict);
                Ok(Box::new(decoder))
            }
            other => T::build_decoder(&self.descr, other),
        }
    }

    fn decode_values(
        &self,
        value_bytes: &[u8],
        def_levels: &[i32],
        num_values: usize,
        encoding: Encoding,
    ) -> Result<Vec<T::T>> {
        let max_def = self.descr.max_def_level;
        let non_null_count = if max_def > 0 {
            def_levels.iter().filter(|&&d| d == max_def).count()
        } else {
            num_values
        };

        let mut decoder = self.build_value_decoder(encoding)?;
        decoder.set_data(ByteBufferPtr::new(value_bytes.to_vec()), non_null_count)?;
        let mut tmp = vec![T::T::default(); non_null_count];
        let got = decoder.get(&mut tmp)?;
        if got != non_null_count {
            return Err(general_err!(
                "page declared {} non-null values but decoder produced {}",
                non_null_count,
                got
            ));
        }
        if max_def == 0 {
            return Ok(tmp);
        }

        let mut out = vec![T::T::default(); num_values];
        let mut ti = 0;
        for (i, slot) in out.iter_mut().enumerate() {
            if def_levels[i] == max_def {
                *slot = tmp[ti].clone();
                ti += 1;
            }
        }
        Ok(out)
    }

    fn finish_page_state(&self, values: Vec<T::T>, def_levels: Vec<i32>, rep_levels: Vec<i32>, num_values: usize) -> PageState<T> {
        let record_starts: Vec<usize> = if self.descr.max_rep_level > 0 {
            (0..num_values).filter(|&i| rep_levels[i] == 0).collect()
        } else {
            (0..num_values).collect()
        };
        PageState { values, def_levels, rep_levels, record_starts, pos: 0, next_record_idx: 0, len: num_values }
    }

    /// DATA_PAGE (v1): each present level stream is a 4-byte little-endian
    /// length followed by that many RLE-hybrid-encoded bytes, rep before def,
    /// then the value bytes in the page's declared `encoding`.
    fn load_page_v1(
        &mut self,
        buf: ByteBufferPtr,
        num_values: usize,
        encoding: Encoding,
        def_level_encoding: Encoding,
        rep_level_encoding: Encoding,
    ) -> Result<PageState<T>> {
        let bytes = buf.as_ref();
        let mut pos = 0usize;

        let rep_levels = if self.descr.max_rep_level > 0 {
            let len = read_u32_le(bytes, pos)? as usize;
            pos += 4;
            let slice = slice_of(bytes, pos, len)?;
            pos += len;
            let mut dec = LevelDecoder::new(rep_level_encoding, self.descr.max_rep_level, slice)?;
            let mut out = vec![0i16; num_values];
            dec.get_batch(&mut out)?;
            out.into_iter().map(i32::from).collect()
        } else {
            vec![0i32; num_values]
        };

        let def_levels = if self.descr.max_def_level > 0 {
            let len = read_u32_le(bytes, pos)? as usize;
            pos += 4;
            let slice = slice_of(bytes, pos, len)?;
            pos += len;
            let mut dec = LevelDecoder::new(def_level_encoding, self.descr.max_def_level, slice)?;
            let mut out = vec![0i16; num_values];
            dec.get_batch(&mut out)?;
            out.into_iter().map(i32::from).collect()
        } else {
            vec![self.descr.max_def_level; num_values]
        };

        let value_bytes = slice_of(bytes, pos, bytes.len() - pos)?;
        let values = self.decode_values(value_bytes, &def_levels, num_values, encoding)?;
        Ok(self.finish_page_state(values, def_levels, rep_levels, num_values))
    }

    /// DATA_PAGE_V2: level streams carry no length prefix (the header already
    /// states their byte lengths) and are always the RLE/bit-packing hybrid.
    #[allow(clippy::too_many_arguments)]
    fn load_page_v2(
        &mut self,
        buf: ByteBufferPtr,
        num_values: usize,
        encoding: Encoding,
        def_levels_byte_len: usize,
        rep_levels_byte_len: usize,
    ) -> Result<PageState<T>> {
        let bytes = buf.as_ref();
        let mut pos = 0usize;

        let rep_levels = if self.descr.max_rep_level > 0 {
            let slice = slice_of(bytes, pos, rep_levels_byte_len)?;
            let mut dec = LevelDecoder::new(Encoding::RLE, self.descr.max_rep_level, slice)?;
            let mut out = vec![0i16; num_values];
            dec.get_batch(&mut out)?;
            out.into_iter().map(i32::from).collect()
        } else {
            vec![0i32; num_values]
        };
        pos += rep_levels_byte_len;

        let def_levels = if self.descr.max_def_level > 0 {
            let slice = slice_of(bytes, pos, def_levels_byte_len)?;
            let mut dec = LevelDecoder::new(Encoding::RLE, self.descr.max_def_level, slice)?;
            let mut out = vec![0i16; num_values];
            dec.get_batch(&mut out)?;
            out.into_iter().map(i32::from).collect()
        } else {
            vec![self.descr.max_def_level; num_values]
        };
        pos += def_levels_byte_len;

        let value_bytes = slice_of(bytes, pos, bytes.len() - pos)?;
        let values = self.decode_values(value_bytes, &def_levels, num_values, encoding)?;
        Ok(self.finish_page_state(values, def_levels, rep_levels, num_values))
    }

    /// Reads up to `max_records` whole top-level records. Stops early once a
    /// page boundary or the page source is exhausted; never splits a
    /// top-level record across two calls. A returned batch with
    /// `record_count == 0` means the column chunk is exhausted.
    pub fn read_batch(&mut self, max_records: usize) -> Result<ColumnBatch<T::T>> {
        let mut values = Vec::new();
        let mut def_levels = Vec::new();
        let mut rep_levels = Vec::new();
        let mut record_offsets = Vec::new();
        let mut record_count = 0usize;
        let mut value_count = 0usize;

        while record_count < max_records {
            if self.cur_page.is_none() {
                match self.page_reader.get_next_page()? {
                    None => break,
                    Some(Page::DictionaryPage { buf, num_values, .. }) => {
                        let (vals, _) =
                            T::decode_plain(buf.as_ref(), num_values as usize, self.descr.primitive.type_length)?;
                        self.dictionary = Some(vals);
                        continue;
                    }
                    Some(Page::DataPage { buf, num_values, encoding, def_level_encoding, rep_level_encoding }) => {
                        self.cur_page = Some(self.load_page_v1(
                            buf,
                            num_values as usize,
                            encoding,
                            def_level_encoding,
                            rep_level_encoding,
                        )?);
                    }
                    Some(Page::DataPageV2 { buf, num_values, encoding, def_levels_byte_len, rep_levels_byte_len, .. }) => {
                        self.cur_page = Some(self.load_page_v2(
                            buf,
                            num_values as usize,
                            encoding,
                            def_levels_byte_len as usize,
                            rep_levels_byte_len as usize,
                        )?);
                    }
                }
            }

            let state = self.cur_page.as_mut().expect("just populated above");
            let remaining_records = state.record_starts.len() - state.next_record_idx;
            let take_records = remaining_records.min(max_records - record_count);
            let end_pos = if state.next_record_idx + take_records == state.record_starts.len() {
                state.len
            } else {
                state.record_starts[state.next_record_idx + take_records]
            };

            for idx in state.next_record_idx..state.next_record_idx + take_records {
                record_offsets.push((value_count + (state.record_starts[idx] - state.pos)) as i32);
            }

            values.extend_from_slice(&state.values[state.pos..end_pos]);
            def_levels.extend_from_slice(&state.def_levels[state.pos..end_pos]);
            rep_levels.extend_from_slice(&state.rep_levels[state.pos..end_pos]);

            value_count += end_pos - state.pos;
            record_count += take_records;
            state.pos = end_pos;
            state.next_record_idx += take_records;

            if state.pos >= state.len {
                self.cur_page = None;
            }
        }

        Ok(ColumnBatch {
            values,
            def_levels: if self.descr.max_def_level > 0 { Some(def_levels) } else { None },
            rep_levels: if self.descr.max_rep_level > 0 { Some(rep_levels) } else { None },
            record_offsets: if self.descr.max_rep_level > 0 { Some(record_offsets) } else { None },
            record_count,
            value_count,
            max_def_level: self.descr.max_def_level,
            max_rep_level: self.descr.max_rep_level,
        })
    }
}

enum ColumnReaderInner {
    Bool(GenericColumnReader<BoolType>),
    Int32(GenericColumnReader<Int32Type>),
    Int64(GenericColumnReader<Int64Type>),
    Int96(GenericColumnReader<Int96Type>),
    Float(GenericColumnReader<FloatType>),
    Double(GenericColumnReader<DoubleType>),
    ByteArray(GenericColumnReader<ByteArrayType>),
    FixedLenByteArray(GenericColumnReader<FixedLenByteArrayType>),
}

fn int96_to_bytes(v: Int96) -> ByteArray {
    let mut out = Vec::with_capacity(12);
    for word in v.data() {
        out.extend_from_slice(&word.to_le_bytes());
    }
    ByteArray::from(out)
}

fn flba_to_bytes(v: FixedLenByteArray) -> ByteArray {
    ByteArray::from(v.data().to_vec())
}

fn to_typed<V>(b: ColumnBatch<V>, wrap: impl Fn(ColumnBatch<V>) -> TypedBatch) -> Option<TypedBatch> {
    if b.record_count == 0 {
        None
    } else {
        Some(wrap(b))
    }
}

/// Public, type-erased column value iterator: `next_batch` pulls the next
/// chunk of whole top-level records, after which the typed/nested accessors
/// below read out of that batch until the next call.
pub struct ColumnReader {
    inner: ColumnReaderInner,
    descr: ColumnDescriptor,
    batch_size: usize,
    current: Option<TypedBatch>,
    levels_cache: RefCell<Option<ColumnLevels>>,
}

impl ColumnReader {
    pub fn try_new(descr: ColumnDescriptor, page_reader: Box<dyn PageReader>, batch_size: usize) -> Result<Self> {
        let inner = match descr.physical_type() {
            Type::BOOLEAN => ColumnReaderInner::Bool(GenericColumnReader::new(descr.clone(), page_reader)),
            Type::INT32 => ColumnReaderInner::Int32(GenericColumnReader::new(descr.clone(), page_reader)),
            Type::INT64 => ColumnReaderInner::Int64(GenericColumnReader::new(descr.clone(), page_reader)),
            Type::INT96 => ColumnReaderInner::Int96(GenericColumnReader::new(descr.clone(), page_reader)),
            Type::FLOAT => ColumnReaderInner::Float(GenericColumnReader::new(descr.clone(), page_reader)),
            Type::DOUBLE => ColumnReaderInner::Double(GenericColumnReader::new(descr.clone(), page_reader)),
            Type::BYTE_ARRAY => ColumnReaderInner::ByteArray(GenericColumnReader::new(descr.clone(), page_reader)),
            Type::FIXED_LEN_BYTE_ARRAY => {
                ColumnReaderInner::FixedLenByteArray(GenericColumnReader::new(descr.clone(), page_reader))
            }
        };
        Ok(ColumnReader { inner, descr, batch_size, current: None, levels_cache: RefCell::new(None) })
    }

    /// Pulls the next batch of up to `batch_size` top-level records. Returns
    /// `false` once the column chunk is exhausted (no batch is loaded in
    /// that case; the typed accessors will error until the next `true`).
    pub fn next_batch(&mut self) -> Result<bool> {
        *self.levels_cache.borrow_mut() = None;
        let batch_size = self.batch_size;
        let typed = match &mut self.inner {
            ColumnReaderInner::Bool(r) => to_typed(r.read_batch(batch_size)?, TypedBatch::BoolCol),
            ColumnReaderInner::Int32(r) => to_typed(r.read_batch(batch_size)?, TypedBatch::IntCol),
            ColumnReaderInner::Int64(r) => to_typed(r.read_batch(batch_size)?, TypedBatch::LongCol),
            ColumnReaderInner::Float(r) => to_typed(r.read_batch(batch_size)?, TypedBatch::FloatCol),
            ColumnReaderInner::Double(r) => to_typed(r.read_batch(batch_size)?, TypedBatch::DoubleCol),
            ColumnReaderInner::ByteArray(r) => to_typed(r.read_batch(batch_size)?, TypedBatch::ByteCol),
            ColumnReaderInner::Int96(r) => {
                to_typed(convert_batch(r.read_batch(batch_size)?, int96_to_bytes), TypedBatch::ByteCol)
            }
            ColumnReaderInner::FixedLenByteArray(r) => {
                to_typed(convert_batch(r.read_batch(batch_size)?, flba_to_bytes), TypedBatch::ByteCol)
            }
        };
        let has = typed.is_some();
        self.current = typed;
        Ok(has)
    }

    fn current(&self) -> Result<&TypedBatch> {
        self.current.as_ref().ok_or_else(|| general_err!("no batch loaded; call next_batch() first"))
    }

    fn type_mismatch(&self, wanted: &str) -> ParquetError {
        ParquetError::TypeMismatch(format!(
            "column {:?} holds {} values, not {}",
            self.descr.path,
            self.current.as_ref().map(TypedBatch::type_name).unwrap_or("<none>"),
            wanted
        ))
    }

    pub fn get_ints(&self) -> Result<&[i32]> {
        match self.current()? {
            TypedBatch::IntCol(b) => Ok(&b.values),
            _ => Err(self.type_mismatch("INT32")),
        }
    }

    pub fn get_longs(&self) -> Result<&[i64]> {
        match self.current()? {
            TypedBatch::LongCol(b) => Ok(&b.values),
            _ => Err(self.type_mismatch("INT64")),
        }
    }

    pub fn get_floats(&self) -> Result<&[f32]> {
        match self.current()? {
            TypedBatch::FloatCol(b) => Ok(&b.values),
            _ => Err(self.type_mismatch("FLOAT")),
        }
    }

    pub fn get_doubles(&self) -> Result<&[f64]> {
        match self.current()? {
            TypedBatch::DoubleCol(b) => Ok(&b.values),
            _ => Err(self.type_mismatch("DOUBLE")),
        }
    }

    pub fn get_booleans(&self) -> Result<&[bool]> {
        match self.current()? {
            TypedBatch::BoolCol(b) => Ok(&b.values),
            _ => Err(self.type_mismatch("BOOLEAN")),
        }
    }

    pub fn get_binaries(&self) -> Result<&[ByteArray]> {
        match self.current()? {
            TypedBatch::ByteCol(b) => Ok(&b.values),
            _ => Err(self.type_mismatch("BYTE_ARRAY")),
        }
    }

    /// Materializes each non-null entry as UTF-8; null slots (per
    /// [`Self::get_element_nulls`]) come back as `None`.
    pub fn get_strings(&self) -> Result<Vec<Option<String>>> {
        let nulls = self.get_element_nulls()?;
        match self.current()? {
            TypedBatch::ByteCol(b) => b
                .values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    if nulls.as_ref().map(|n| n.test(i)).unwrap_or(false) {
                        Ok(None)
                    } else {
                        Ok(Some(v.as_utf8()?.to_string()))
                    }
                })
                .collect(),
            _ => Err(self.type_mismatch("BYTE_ARRAY")),
        }
    }

    fn ensure_levels(&self) -> Result<()> {
        if self.levels_cache.borrow().is_some() {
            return Ok(());
        }
        let batch = self.current()?;
        let (rep, def, value_count, max_rep, max_def) = batch.levels_input();
        let computed = compute_column_levels(rep, def, value_count, max_rep, max_def);
        *self.levels_cache.borrow_mut() = Some(computed);
        Ok(())
    }

    /// Leaf null bitmap for the current batch; `None` when the column has no
    /// optional ancestor.
    pub fn get_element_nulls(&self) -> Result<Option<BitSet>> {
        self.ensure_levels()?;
        Ok(self.levels_cache.borrow().as_ref().unwrap().element_nulls.clone())
    }

    /// Null bitmap for nesting level `k` (`0 <= k < nesting_depth`).
    pub fn get_level_nulls(&self, k: usize) -> Result<Option<BitSet>> {
        if self.get_nesting_depth() == 0 {
            return Err(general_err!("column has no repeated ancestor; there is no level {} to query", k));
        }
        self.ensure_levels()?;
        let cache = self.levels_cache.borrow();
        let levels = cache.as_ref().unwrap();
        levels
            .level_nulls
            .get(k)
            .cloned()
            .ok_or_else(|| ParquetError::OutOfBounds(format!("level {} out of range (depth {})", k, levels.level_nulls.len())))
    }

    /// Offset array for nesting level `k` (`0 <= k < nesting_depth`).
    pub fn get_offsets(&self, k: usize) -> Result<Vec<i32>> {
        if self.get_nesting_depth() == 0 {
            return Err(general_err!("column has no repeated ancestor; there is no level {} to query", k));
        }
        self.ensure_levels()?;
        let cache = self.levels_cache.borrow();
        let levels = cache.as_ref().unwrap();
        levels
            .multi_level_offsets
            .get(k)
            .cloned()
            .ok_or_else(|| ParquetError::OutOfBounds(format!("level {} out of range (depth {})", k, levels.multi_level_offsets.len())))
    }

    pub fn get_nesting_depth(&self) -> i32 {
        self.descr.max_rep_level
    }

    pub fn record_count(&self) -> usize {
        self.current.as_ref().map(TypedBatch::record_count).unwrap_or(0)
    }

    /// The schema position this reader was built against. A `RowReader`
    /// assembling several columns into one batch uses this to align each
    /// column's output against the projected field map it was constructed
    /// from, rather than threading schema state through twice.
    pub fn column_descriptor(&self) -> &ColumnDescriptor {
        &self.descr
    }

    /// The current batch, type-erased. A `RowReader` assembling several
    /// columns' batches into one `BatchIndex` matches on this directly
    /// rather than going through one typed getter per physical type.
    pub fn current_batch(&self) -> Result<&TypedBatch> {
        self.current()
    }

    /// First value index of each top-level record in the current batch.
    /// `None` when the column is flat (every record is exactly one value, so
    /// `record_offsets[i] == i`).
    pub fn record_offsets(&self) -> Result<Option<&[i32]>> {
        match self.current()? {
            TypedBatch::IntCol(b) => Ok(b.record_offsets.as_deref()),
            TypedBatch::LongCol(b) => Ok(b.record_offsets.as_deref()),
            TypedBatch::FloatCol(b) => Ok(b.record_offsets.as_deref()),
            TypedBatch::DoubleCol(b) => Ok(b.record_offsets.as_deref()),
            TypedBatch::BoolCol(b) => Ok(b.record_offsets.as_deref()),
            TypedBatch::ByteCol(b) => Ok(b.record_offsets.as_deref()),
        }
    }

    /// Raw per-value definition levels for the current batch, `None` when
    /// the column has no optional ancestor. A `RowReader` uses this
    /// directly to test nullity against an arbitrary ancestor's own
    /// definition-level threshold (a struct or list/map boundary short of
    /// this column's full `max_def_level`), which the summarized
    /// [`Self::get_element_nulls`]/[`Self::get_level_nulls`] bitmaps (fixed
    /// at this column's own thresholds) cannot answer.
    pub fn current_def_levels(&self) -> Result<Option<&[i32]>> {
        match self.current()? {
            TypedBatch::IntCol(b) => Ok(b.def_levels.as_deref()),
            TypedBatch::LongCol(b) => Ok(b.def_levels.as_deref()),
            TypedBatch::FloatCol(b) => Ok(b.def_levels.as_deref()),
            TypedBatch::DoubleCol(b) => Ok(b.def_levels.as_deref()),
            TypedBatch::BoolCol(b) => Ok(b.def_levels.as_deref()),
            TypedBatch::ByteCol(b) => Ok(b.def_levels.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::{Repetition, Type as PhysicalType};
    use crate::column::page::{Page, PageReader};
    use crate::schema::types::{BasicTypeInfo, PrimitiveNode};
    use crate::util::test_common::write_plain_i32;
    use std::sync::Arc;

    fn descr(max_def: i32, max_rep: i32) -> ColumnDescriptor {
        let primitive = Arc::new(PrimitiveNode {
            info: BasicTypeInfo { name: "x".to_string(), repetition: Some(Repetition::OPTIONAL), id: None, logical_type: None },
            physical_type: PhysicalType::INT32,
            type_length: 0,
            precision: 0,
            scale: 0,
            column_index: 0,
            max_rep_level: max_rep,
            max_def_level: max_def,
        });
        ColumnDescriptor { path: vec!["x".to_string()], primitive, max_def_level: max_def, max_rep_level: max_rep, column_index: 0 }
    }

    /// A `PageReader` that yields one pre-built `DataPage` then nothing.
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

    #[test]
    fn test_flat_column_read_batch_splits_on_batch_size() {
        let payload = write_plain_i32(&[10, 20, 30, 40]);
        let page = Page::DataPage {
            buf: ByteBufferPtr::new(payload),
            num_values: 4,
            encoding: Encoding::PLAIN,
            def_level_encoding: Encoding::RLE,
            rep_level_encoding: Encoding::RLE,
        };
        let mut reader = GenericColumnReader::<Int32Type>::new(descr(0, 0), Box::new(OnePage(Some(page))));

        let first = reader.read_batch(3).unwrap();
        assert_eq!(first.values, vec![10, 20, 30]);
        assert_eq!(first.record_count, 3);
        assert!(first.def_levels.is_none());

        let second = reader.read_batch(3).unwrap();
        assert_eq!(second.values, vec![40]);
        assert_eq!(second.record_count, 1);

        let third = reader.read_batch(3).unwrap();
        assert_eq!(third.record_count, 0);
    }

    #[test]
    fn test_optional_column_scatters_nulls_by_def_level() {
        // 3 values declared, 1 present (def==1), values bytes hold only that one.
        let payload = write_plain_i32(&[42]);

        // defs = [0, 1, 0]: not a single RLE run, so encode as one
        // bit-packed group of 8 (only the first 3 slots are meaningful).
        let mut defs_buf = Vec::new();
        defs_buf.push((1u8 << 1) | 1); // 1 group of 8, bit-packed
        crate::util::bit_util::pack_bits(&[0, 1, 0, 0, 0, 0, 0, 0], 1, &mut defs_buf);

        let mut page_buf = Vec::new();
        page_buf.extend_from_slice(&(defs_buf.len() as u32).to_le_bytes());
        page_buf.extend_from_slice(&defs_buf);
        page_buf.extend_from_slice(&payload);

        let page = Page::DataPage {
            buf: ByteBufferPtr::new(page_buf),
            num_values: 3,
            encoding: Encoding::PLAIN,
            def_level_encoding: Encoding::RLE,
            rep_level_encoding: Encoding::RLE,
        };
        let mut reader = GenericColumnReader::<Int32Type>::new(descr(1, 0), Box::new(OnePage(Some(page))));
        let batch = reader.read_batch(3).unwrap();
        assert_eq!(batch.record_count, 3);
        assert_eq!(batch.def_levels.unwrap(), vec![0, 1, 0]);
        assert_eq!(batch.values, vec![0, 42, 0]);
    }

    #[test]
    fn test_column_reader_rejects_accessor_of_wrong_type() {
        let payload = write_plain_i32(&[1, 2]);
        let page = Page::DataPage {
            buf: ByteBufferPtr::new(payload),
            num_values: 2,
            encoding: Encoding::PLAIN,
            def_level_encoding: Encoding::RLE,
            rep_level_encoding: Encoding::RLE,
        };
        let d = descr(0, 0);
        let mut reader = ColumnReader::try_new(d, Box::new(OnePage(Some(page))), 10).unwrap();
        assert!(reader.next_batch().unwrap());
        assert_eq!(reader.get_ints().unwrap(), &[1, 2]);
        assert!(reader.get_longs().is_err());
        assert!(!reader.next_batch().unwrap());
    }
}
