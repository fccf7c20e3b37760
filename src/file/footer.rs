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

//! Parses the trailing `PAR1`-delimited footer: magic bytes, the
//! little-endian `i32` footer length, and the Thrift Compact `FileMetaData`
//! blob it frames.

use crate::corrupt_metadata_err;
use crate::errors::Result;
use crate::file::metadata::ParquetMetaData;
use crate::file::reader::{ChunkReader, Length};
use crate::format::FileMetaData as ThriftFileMetaData;
use crate::thrift::CompactProtocolReader;

pub const PARQUET_MAGIC: [u8; 4] = [b'P', b'A', b'R', b'1'];
/// Magic (4) + footer length (4).
const FOOTER_SUFFIX_LEN: u64 = 8;

/// Reads and decodes the footer of a Parquet file accessible through `R`.
/// Verifies both the leading and trailing `PAR1` magic bytes before
/// trusting the footer length.
pub fn parse_metadata<R: ChunkReader>(chunk_reader: &R) -> Result<ParquetMetaData> {
    let file_size = chunk_reader.len();
    if file_size < (PARQUET_MAGIC.len() as u64 * 2) + FOOTER_SUFFIX_LEN {
        return Err(corrupt_metadata_err!(
            "file too small to be a valid Parquet file: {} bytes",
            file_size
        ));
    }

    let head_magic = chunk_reader.get_bytes(0, PARQUET_MAGIC.len())?;
    if head_magic.as_ref() != &PARQUET_MAGIC {
        return Err(corrupt_metadata_err!("invalid leading magic bytes"));
    }

    let suffix = chunk_reader.get_bytes(file_size - FOOTER_SUFFIX_LEN, FOOTER_SUFFIX_LEN as usize)?;
    let suffix = suffix.as_ref();
    if &suffix[4..8] != &PARQUET_MAGIC {
        return Err(corrupt_metadata_err!("invalid trailing magic bytes"));
    }
    let footer_len = i32::from_le_bytes([suffix[0], suffix[1], suffix[2], suffix[3]]);
    if footer_len < 0 {
        return Err(corrupt_metadata_err!("negative footer length {}", footer_len));
    }
    let footer_len = footer_len as u64;
    let metadata_start = file_size
        .checked_sub(FOOTER_SUFFIX_LEN + footer_len)
        .ok_or_else(|| corrupt_metadata_err!("footer length {} exceeds file size {}", footer_len, file_size))?;
    if metadata_start < PARQUET_MAGIC.len() as u64 {
        return Err(corrupt_metadata_err!("footer length {} overruns leading magic", footer_len));
    }

    let metadata_buf = chunk_reader.get_bytes(metadata_start, footer_len as usize)?;
    let mut protocol = CompactProtocolReader::new(metadata_buf.as_ref());
    let thrift_metadata = ThriftFileMetaData::decode(&mut protocol)?;
    ParquetMetaData::from_thrift(thrift_metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal hand-rolled compact-protocol byte builders, mirroring the
    // conventions `format::mod`'s own tests use (delta field ids, zigzag
    // varints), kept local since this crate has no encoder.

    fn varint(mut v: u64) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let mut byte = (v & 0x7F) as u8;
            v >>= 7;
            if v != 0 {
                byte |= 0x80;
            }
            out.push(byte);
            if v == 0 {
                break;
            }
        }
        out
    }

    fn zigzag(v: i64) -> u64 {
        ((v << 1) ^ (v >> 63)) as u64
    }

    struct StructWriter {
        buf: Vec<u8>,
        last_field_id: i16,
    }

    impl StructWriter {
        fn new() -> Self {
            StructWriter { buf: Vec::new(), last_field_id: 0 }
        }

        fn field_header(&mut self, id: i16, type_code: u8) {
            let delta = id - self.last_field_id;
            self.last_field_id = id;
            assert!((1..=15).contains(&delta), "test fixture needs small positive deltas");
            self.buf.push(((delta as u8) << 4) | type_code);
        }

        fn i32_field(&mut self, id: i16, v: i32) {
            self.field_header(id, 0x05);
            self.buf.extend(varint(zigzag(v as i64)));
        }

        fn i64_field(&mut self, id: i16, v: i64) {
            self.field_header(id, 0x06);
            self.buf.extend(varint(zigzag(v)));
        }

        fn string_field(&mut self, id: i16, s: &str) {
            self.field_header(id, 0x08);
            self.buf.extend(varint(s.len() as u64));
            self.buf.extend_from_slice(s.as_bytes());
        }

        /// Emits the field header for a list of `len` elements of `elem_type_code`.
        fn list_field_header(&mut self, id: i16, len: usize, elem_type_code: u8) {
            self.field_header(id, 0x09);
            assert!(len < 15, "test fixture needs a short list");
            self.buf.push(((len as u8) << 4) | elem_type_code);
        }

        fn i32_list_elem(&mut self, v: i32) {
            self.buf.extend(varint(zigzag(v as i64)));
        }

        fn string_list_elem(&mut self, s: &str) {
            self.buf.extend(varint(s.len() as u64));
            self.buf.extend_from_slice(s.as_bytes());
        }

        fn nested(&mut self, id: i16, inner: StructWriter) {
            self.field_header(id, 0x0C);
            self.buf.extend(inner.finish());
        }

        fn finish(mut self) -> Vec<u8> {
            self.buf.push(0x00);
            self.buf
        }
    }

    /// Hand-assembles the minimal `FileMetaData` fixture used by
    /// `test_round_trip_minimal_metadata`: one required INT64 column `id`,
    /// one row group of 3 rows.
    fn build_minimal_metadata_bytes() -> Vec<u8> {
        let mut root = StructWriter::new();
        root.i32_field(1, 1); // version

        root.list_field_header(2, 2, 0x0C); // schema: 2 struct elements
        let mut message_elem = StructWriter::new();
        message_elem.string_field(4, "schema");
        message_elem.i32_field(5, 1); // num_children
        root.buf.extend(message_elem.finish());

        let mut id_elem = StructWriter::new();
        id_elem.i32_field(1, 2); // type = INT64
        id_elem.i32_field(3, 0); // repetition = REQUIRED
        id_elem.string_field(4, "id");
        root.buf.extend(id_elem.finish());

        root.i64_field(3, 3); // num_rows

        root.list_field_header(4, 1, 0x0C); // row_groups: 1 struct element
        let mut row_group = StructWriter::new();

        row_group.list_field_header(1, 1, 0x0C); // columns: 1 struct element
        let mut column_chunk = StructWriter::new();
        column_chunk.i64_field(2, 0); // file_offset
        let mut column_meta = StructWriter::new();
        column_meta.i32_field(1, 2); // type = INT64
        column_meta.list_field_header(2, 1, 0x05); // encodings: [PLAIN]
        column_meta.i32_list_elem(0);
        column_meta.list_field_header(3, 1, 0x08); // path_in_schema: ["id"]
        column_meta.string_list_elem("id");
        column_meta.i32_field(4, 0); // codec = UNCOMPRESSED
        column_meta.i64_field(5, 3); // num_values
        column_meta.i64_field(6, 30); // total_uncompressed_size
        column_meta.i64_field(7, 30); // total_compressed_size
        column_meta.i64_field(9, 4); // data_page_offset
        column_chunk.nested(3, column_meta);
        row_group.buf.extend(column_chunk.finish());

        row_group.i64_field(2, 30); // total_byte_size
        row_group.i64_field(3, 3); // num_rows
        root.buf.extend(row_group.finish());

        root.finish()
    }

    #[test]
    fn test_rejects_missing_magic() {
        struct NoMagic;
        impl Length for NoMagic {
            fn len(&self) -> u64 {
                16
            }
        }
        impl ChunkReader for NoMagic {
            fn get_bytes(&self, _start: u64, length: usize) -> Result<crate::util::memory::ByteBufferPtr> {
                Ok(crate::util::memory::ByteBufferPtr::new(vec![0u8; length]))
            }
        }
        let err = parse_metadata(&NoMagic).unwrap_err();
        assert!(matches!(err, crate::errors::ParquetError::CorruptMetadata(_)));
    }

    #[test]
    fn test_rejects_too_small_file() {
        struct Tiny;
        impl Length for Tiny {
            fn len(&self) -> u64 {
                4
            }
        }
        impl ChunkReader for Tiny {
            fn get_bytes(&self, _start: u64, length: usize) -> Result<crate::util::memory::ByteBufferPtr> {
                Ok(crate::util::memory::ByteBufferPtr::new(vec![0u8; length]))
            }
        }
        let err = parse_metadata(&Tiny).unwrap_err();
        assert!(matches!(err, crate::errors::ParquetError::CorruptMetadata(_)));
    }

    #[test]
    fn test_round_trip_minimal_metadata() {
        let footer_bytes = build_minimal_metadata_bytes();
        let mut file_bytes = Vec::new();
        file_bytes.extend_from_slice(&PARQUET_MAGIC);
        file_bytes.extend_from_slice(&footer_bytes);
        file_bytes.extend_from_slice(&(footer_bytes.len() as i32).to_le_bytes());
        file_bytes.extend_from_slice(&PARQUET_MAGIC);

        let parsed = parse_metadata(&file_bytes).unwrap();
        assert_eq!(parsed.file_metadata().num_rows(), 3);
        assert_eq!(parsed.file_metadata().schema_descr().num_columns(), 1);
        assert_eq!(parsed.num_row_groups(), 1);
        assert_eq!(parsed.row_group(0).num_rows(), 3);
        assert_eq!(parsed.row_group(0).column(0).num_values(), 3);
        assert_eq!(parsed.row_group(0).column(0).data_page_offset(), 4);
    }
}
