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

//! Basic Parquet enums, mirroring the `parquet.thrift` definitions.

use std::fmt;

use crate::errors::ParquetError;

/// Physical type of a leaf (primitive) column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Type {
    BOOLEAN,
    INT32,
    INT64,
    INT96,
    FLOAT,
    DOUBLE,
    BYTE_ARRAY,
    FIXED_LEN_BYTE_ARRAY,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Whether a schema node is required, optional, or repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repetition {
    REQUIRED,
    OPTIONAL,
    REPEATED,
}

/// Encodings recognized for data and dictionary pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Encoding {
    PLAIN,
    PLAIN_DICTIONARY,
    RLE,
    BIT_PACKED,
    DELTA_BINARY_PACKED,
    DELTA_LENGTH_BYTE_ARRAY,
    DELTA_BYTE_ARRAY,
    RLE_DICTIONARY,
    BYTE_STREAM_SPLIT,
}

impl Encoding {
    /// True for the two dictionary-indexed encodings.
    pub fn is_dictionary(&self) -> bool {
        matches!(self, Encoding::PLAIN_DICTIONARY | Encoding::RLE_DICTIONARY)
    }
}

/// Compression codec tags. LZO is deliberately absent: requesting it is an
/// [`crate::errors::ParquetError::UnsupportedCodec`], it is never fabricated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    UNCOMPRESSED,
    SNAPPY,
    GZIP,
    LZ4,
    LZ4_RAW,
    ZSTD,
    BROTLI,
}

#[allow(non_camel_case_types)]
impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Kind of a page within a column chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum PageType {
    DATA_PAGE,
    INDEX_PAGE,
    DICTIONARY_PAGE,
    DATA_PAGE_V2,
}

/// Unit carried by TIME/TIMESTAMP logical types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Millis,
    Micros,
    Nanos,
}

/// The logical-type sum from spec §2: a richer interpretation layered over
/// a primitive's physical storage.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalType {
    String,
    Enum,
    Uuid,
    Date,
    Time { unit: TimeUnit, is_adjusted_to_utc: bool },
    Timestamp { unit: TimeUnit, is_adjusted_to_utc: bool },
    Decimal { precision: i32, scale: i32 },
    Json,
    Bson,
    Integer { bit_width: u8, is_signed: bool },
}

/// Column sort order, used only to report metadata; this crate does not
/// filter or sort using it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOrder {
    TYPE_DEFINED_ORDER(SortOrder),
    UNDEFINED,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    SIGNED,
    UNSIGNED,
    UNDEFINED,
}

pub(crate) fn codec_from_thrift(v: i32) -> Result<Compression, ParquetError> {
    Ok(match v {
        0 => Compression::UNCOMPRESSED,
        1 => Compression::SNAPPY,
        2 => Compression::GZIP,
        // LZO (3) is explicitly unsupported; never fabricate a fallback.
        3 => return Err(ParquetError::UnsupportedCodec("LZO".to_string())),
        4 => Compression::BROTLI,
        5 => Compression::LZ4,
        6 => Compression::ZSTD,
        7 => Compression::LZ4_RAW,
        other => return Err(ParquetError::UnsupportedCodec(format!("codec id {other}"))),
    })
}

pub(crate) fn encoding_from_thrift(v: i32) -> Result<Encoding, ParquetError> {
    Ok(match v {
        0 => Encoding::PLAIN,
        2 => Encoding::PLAIN_DICTIONARY,
        3 => Encoding::RLE,
        4 => Encoding::BIT_PACKED,
        5 => Encoding::DELTA_BINARY_PACKED,
        6 => Encoding::DELTA_LENGTH_BYTE_ARRAY,
        7 => Encoding::DELTA_BYTE_ARRAY,
        8 => Encoding::RLE_DICTIONARY,
        9 => Encoding::BYTE_STREAM_SPLIT,
        other => {
            return Err(ParquetError::UnsupportedEncoding(format!(
                "encoding id {other}"
            )))
        }
    })
}

pub(crate) fn repetition_from_thrift(v: i32) -> Result<Repetition, ParquetError> {
    Ok(match v {
        0 => Repetition::REQUIRED,
        1 => Repetition::OPTIONAL,
        2 => Repetition::REPEATED,
        other => {
            return Err(crate::corrupt_metadata_err!(
                "invalid field repetition type {}",
                other
            ))
        }
    })
}

pub(crate) fn physical_type_from_thrift(v: i32) -> Result<Type, ParquetError> {
    Ok(match v {
        0 => Type::BOOLEAN,
        1 => Type::INT32,
        2 => Type::INT64,
        3 => Type::INT96,
        4 => Type::FLOAT,
        5 => Type::DOUBLE,
        6 => Type::BYTE_ARRAY,
        7 => Type::FIXED_LEN_BYTE_ARRAY,
        other => return Err(crate::corrupt_metadata_err!("invalid physical type {}", other)),
    })
}

pub(crate) fn page_type_from_thrift(v: i32) -> Result<PageType, ParquetError> {
    Ok(match v {
        0 => PageType::DATA_PAGE,
        1 => PageType::INDEX_PAGE,
        2 => PageType::DICTIONARY_PAGE,
        3 => PageType::DATA_PAGE_V2,
        other => return Err(crate::corrupt_page_err!("invalid page type {}", other)),
    })
}
