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

//! Iterates pages within one column chunk's byte range, handling
//! decompression and v1/v2 layout differences. Yields decoded [`Page`]
//! items; value/level decoding itself happens one layer up in
//! `column::reader`.

use crate::basic::{Compression, Encoding, Type};
use crate::compression::{create_codec, Codec};
use crate::eof_err;
use crate::errors::Result;
use crate::format::PageHeader;
use crate::thrift::CompactProtocolReader;
use crate::util::memory::ByteBufferPtr;

/// One decoded page. Dictionary and data pages carry their payload
/// pre-decompressed; v2's level prefix is never compressed so it is left in
/// place ahead of the (possibly decompressed) values.
#[derive(Debug, Clone)]
pub enum Page {
    DictionaryPage {
        buf: ByteBufferPtr,
        num_values: u32,
        encoding: Encoding,
        is_sorted: bool,
    },
    DataPage {
        buf: ByteBufferPtr,
        num_values: u32,
        encoding: Encoding,
        def_level_encoding: Encoding,
        rep_level_encoding: Encoding,
    },
    DataPageV2 {
        buf: ByteBufferPtr,
        num_values: u32,
        num_nulls: u32,
        num_rows: u32,
        encoding: Encoding,
        def_levels_byte_len: u32,
        rep_levels_byte_len: u32,
    },
}

impl Page {
    pub fn num_values(&self) -> u32 {
        match self {
            Page::DictionaryPage { num_values, .. } => *num_values,
            Page::DataPage { num_values, .. } => *num_values,
            Page::DataPageV2 { num_values, .. } => *num_values,
        }
    }

    pub fn encoding(&self) -> Encoding {
        match self {
            Page::DictionaryPage { encoding, .. } => *encoding,
            Page::DataPage { encoding, .. } => *encoding,
            Page::DataPageV2 { encoding, .. } => *encoding,
        }
    }
}

/// Lightweight page metadata, available without fully decoding/decompressing
/// a page's payload; used by callers deciding whether to skip a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMetadata {
    pub num_rows: usize,
    pub is_dict: bool,
}

/// Iterates decoded pages of one column chunk.
pub trait PageReader: Iterator<Item = Result<Page>> + Send {
    fn get_next_page(&mut self) -> Result<Option<Page>>;
}

/// Reads [`PageHeader`]s and page payloads out of an in-memory column chunk
/// byte range (the expected real-world source is a whole-file
/// memory-mapping, sliced to `[chunk_start, chunk_end)`; `ByteBufferPtr`
/// clones are O(1) so this owns its own slice independent of the mapping's
/// other readers).
pub struct SerializedPageReader {
    buf: ByteBufferPtr,
    pos: usize,
    decompressor: Option<Box<dyn Codec>>,
    seen_num_values: i64,
    total_num_values: i64,
    physical_type: Type,
    has_dictionary_page_to_read: bool,
}

impl SerializedPageReader {
    pub fn new(
        buf: ByteBufferPtr,
        total_num_values: i64,
        compression: Compression,
        physical_type: Type,
        has_dictionary_page_to_read: bool,
    ) -> Result<Self> {
        let decompressor = create_codec(compression)?;
        Ok(Self {
            buf,
            pos: 0,
            decompressor,
            seen_num_values: 0,
            total_num_values,
            physical_type,
            has_dictionary_page_to_read,
        })
    }

    fn read_page_header(&mut self) -> Result<PageHeader> {
        let mut r = CompactProtocolReader::new(&self.buf[self.pos..]);
        let header = PageHeader::decode(&mut r)?;
        self.pos += r.bytes_consumed();
        Ok(header)
    }

    fn read_page_bytes(&mut self, n: usize) -> Result<ByteBufferPtr> {
        if self.pos + n > self.buf.len() {
            return Err(eof_err!(
                "page claims {} bytes but only {} remain in column chunk",
                n,
                self.buf.len() - self.pos
            ));
        }
        let out = self.buf.slice(self.pos, n);
        self.pos += n;
        Ok(out)
    }
}

impl Iterator for SerializedPageReader {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        self.get_next_page().transpose()
    }
}

impl PageReader for SerializedPageReader {
    fn get_next_page(&mut self) -> Result<Option<Page>> {
        while self.seen_num_values < self.total_num_values || self.has_dictionary_page_to_read {
            if self.pos >= self.buf.len() {
                return Ok(None);
            }
            let header = self.read_page_header()?;
            let raw = self.read_page_bytes(header.compressed_page_size as usize)?;

            match crate::basic::page_type_from_thrift(header.type_)? {
                crate::basic::PageType::DICTIONARY_PAGE => {
                    self.has_dictionary_page_to_read = false;
                    return Ok(Some(decode_page(header, raw, self.physical_type, self.decompressor.as_mut())?));
                }
                crate::basic::PageType::DATA_PAGE | crate::basic::PageType::DATA_PAGE_V2 => {
                    let page = decode_page(header, raw, self.physical_type, self.decompressor.as_mut())?;
                    self.seen_num_values += page.num_values() as i64;
                    return Ok(Some(page));
                }
                crate::basic::PageType::INDEX_PAGE => {
                    // Page index (column/offset index) is a deferred feature;
                    // skip and continue to the next page.
                    continue;
                }
            }
        }
        Ok(None)
    }
}

/// Decompresses (if needed) and tags a raw page payload with its header
/// fields. DATA_PAGE_V2's level prefix is never compressed; only the bytes
/// after it are run through the codec, and only when `is_compressed` is true
/// and the payload is non-empty (an all-null page may have a zero-length
/// values section, which must not be handed to the decompressor).
fn decode_page(
    header: PageHeader,
    buffer: ByteBufferPtr,
    physical_type: Type,
    decompressor: Option<&mut Box<dyn Codec>>,
) -> Result<Page> {
    let mut levels_prefix = 0usize;
    let mut can_decompress = true;
    if let Some(ref v2) = header.data_page_header_v2 {
        levels_prefix = (v2.definition_levels_byte_length + v2.repetition_levels_byte_length) as usize;
        can_decompress = v2.is_compressed.unwrap_or(true);
    }

    let buffer = match decompressor {
        Some(decompressor) if can_decompress && buffer.len() > levels_prefix => {
            let uncompressed_size = header.uncompressed_page_size as usize;
            let mut out = Vec::with_capacity(uncompressed_size);
            out.extend_from_slice(&buffer.as_ref()[..levels_prefix]);
            decompressor.decompress(&buffer.as_ref()[levels_prefix..], &mut out)?;
            if out.len() != uncompressed_size {
                return Err(crate::general_err!(
                    "decompressed page size {} does not match header's {}",
                    out.len(),
                    uncompressed_size
                ));
            }
            ByteBufferPtr::new(out)
        }
        _ => buffer,
    };

    Ok(match crate::basic::page_type_from_thrift(header.type_)? {
        crate::basic::PageType::DICTIONARY_PAGE => {
            let dict = header
                .dictionary_page_header
                .ok_or_else(|| crate::corrupt_metadata_err!("PageHeader type DICTIONARY_PAGE missing its header"))?;
            Page::DictionaryPage {
                buf: buffer,
                num_values: dict.num_values as u32,
                encoding: crate::basic::encoding_from_thrift(dict.encoding)?,
                is_sorted: dict.is_sorted.unwrap_or(false),
            }
        }
        crate::basic::PageType::DATA_PAGE => {
            let _ = physical_type;
            let d = header
                .data_page_header
                .ok_or_else(|| crate::corrupt_metadata_err!("PageHeader type DATA_PAGE missing its header"))?;
            Page::DataPage {
                buf: buffer,
                num_values: d.num_values as u32,
                encoding: crate::basic::encoding_from_thrift(d.encoding)?,
                def_level_encoding: crate::basic::encoding_from_thrift(d.definition_level_encoding)?,
                rep_level_encoding: crate::basic::encoding_from_thrift(d.repetition_level_encoding)?,
            }
        }
        crate::basic::PageType::DATA_PAGE_V2 => {
            let d = header
                .data_page_header_v2
                .ok_or_else(|| crate::corrupt_metadata_err!("PageHeader type DATA_PAGE_V2 missing its header"))?;
            Page::DataPageV2 {
                buf: buffer,
                num_values: d.num_values as u32,
                num_nulls: d.num_nulls as u32,
                num_rows: d.num_rows as u32,
                encoding: crate::basic::encoding_from_thrift(d.encoding)?,
                def_levels_byte_len: d.definition_levels_byte_length as u32,
                rep_levels_byte_len: d.repetition_levels_byte_length as u32,
            }
        }
        crate::basic::PageType::INDEX_PAGE => {
            return Err(crate::corrupt_page_err!("unexpected INDEX_PAGE in data position"));
        }
    })
}
