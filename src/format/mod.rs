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

//! Hand-decoded mirrors of the `parquet.thrift` records, built directly on
//! [`crate::thrift`]. There is no Thrift IDL codegen step in this crate: the
//! struct shapes below are transcribed from the published `parquet.thrift`
//! and decoded field-by-field against [`CompactProtocolReader`].

use crate::corrupt_metadata_err;
use crate::errors::Result;
use crate::thrift::{CompactProtocolReader, CompactType, FieldHeader};

/// Reads field headers in a loop, dispatching `body` for recognized ids and
/// skipping the body of anything else. Wraps the begin/end struct pair.
fn read_struct<'a>(
    r: &mut CompactProtocolReader<'a>,
    mut body: impl FnMut(&mut CompactProtocolReader<'a>, FieldHeader) -> Result<bool>,
) -> Result<()> {
    r.read_struct_begin();
    loop {
        match r.read_field_begin()? {
            None => break,
            Some(fh) => {
                if !body(r, fh)? {
                    r.skip_field(fh.field_type)?;
                }
            }
        }
    }
    r.read_struct_end();
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Option<String>,
}

impl KeyValue {
    fn decode(r: &mut CompactProtocolReader) -> Result<Self> {
        let mut key = None;
        let mut value = None;
        read_struct(r, |r, fh| {
            match fh.id {
                1 => key = Some(r.read_string()?),
                2 => value = Some(r.read_string()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(KeyValue {
            key: key.ok_or_else(|| corrupt_metadata_err!("KeyValue missing key"))?,
            value,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub max: Option<Vec<u8>>,
    pub min: Option<Vec<u8>>,
    pub null_count: Option<i64>,
    pub distinct_count: Option<i64>,
    pub max_value: Option<Vec<u8>>,
    pub min_value: Option<Vec<u8>>,
}

impl Statistics {
    fn decode(r: &mut CompactProtocolReader) -> Result<Self> {
        let mut s = Statistics::default();
        read_struct(r, |r, fh| {
            match fh.id {
                1 => s.max = Some(r.read_binary()?),
                2 => s.min = Some(r.read_binary()?),
                3 => s.null_count = Some(r.read_i64()?),
                4 => s.distinct_count = Some(r.read_i64()?),
                5 => s.max_value = Some(r.read_binary()?),
                6 => s.min_value = Some(r.read_binary()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnitThrift {
    Millis,
    Micros,
    Nanos,
}

fn decode_time_unit(r: &mut CompactProtocolReader) -> Result<TimeUnitThrift> {
    let mut unit = None;
    read_struct(r, |r, fh| {
        match fh.id {
            1 => {
                read_struct(r, |_, _| Ok(false))?;
                unit = Some(TimeUnitThrift::Millis);
            }
            2 => {
                read_struct(r, |_, _| Ok(false))?;
                unit = Some(TimeUnitThrift::Micros);
            }
            3 => {
                read_struct(r, |_, _| Ok(false))?;
                unit = Some(TimeUnitThrift::Nanos);
            }
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    unit.ok_or_else(|| corrupt_metadata_err!("TimeUnit union had no recognized branch"))
}

/// The Thrift `LogicalType` union from `parquet.thrift`.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalTypeThrift {
    String,
    Map,
    List,
    Enum,
    Decimal { scale: i32, precision: i32 },
    Date,
    Time { is_adjusted_to_utc: bool, unit: TimeUnitThrift },
    Timestamp { is_adjusted_to_utc: bool, unit: TimeUnitThrift },
    Integer { bit_width: i8, is_signed: bool },
    Null,
    Json,
    Bson,
    Uuid,
}

fn decode_logical_type(r: &mut CompactProtocolReader) -> Result<LogicalTypeThrift> {
    let mut result = None;
    read_struct(r, |r, fh| {
        match fh.id {
            1 => {
                read_struct(r, |_, _| Ok(false))?;
                result = Some(LogicalTypeThrift::String);
            }
            2 => {
                read_struct(r, |_, _| Ok(false))?;
                result = Some(LogicalTypeThrift::Map);
            }
            3 => {
                read_struct(r, |_, _| Ok(false))?;
                result = Some(LogicalTypeThrift::List);
            }
            4 => {
                read_struct(r, |_, _| Ok(false))?;
                result = Some(LogicalTypeThrift::Enum);
            }
            5 => {
                let mut scale = 0;
                let mut precision = 0;
                read_struct(r, |r, fh| {
                    match fh.id {
                        1 => scale = r.read_i32()?,
                        2 => precision = r.read_i32()?,
                        _ => return Ok(false),
                    }
                    Ok(true)
                })?;
                result = Some(LogicalTypeThrift::Decimal { scale, precision });
            }
            6 => {
                read_struct(r, |_, _| Ok(false))?;
                result = Some(LogicalTypeThrift::Date);
            }
            7 => {
                let mut is_adjusted_to_utc = false;
                let mut unit = TimeUnitThrift::Millis;
                read_struct(r, |r, fh| {
                    match fh.id {
                        1 => is_adjusted_to_utc = fh.bool_value.unwrap_or(false),
                        2 => unit = decode_time_unit(r)?,
                        _ => return Ok(false),
                    }
                    Ok(true)
                })?;
                result = Some(LogicalTypeThrift::Time { is_adjusted_to_utc, unit });
            }
            8 => {
                let mut is_adjusted_to_utc = false;
                let mut unit = TimeUnitThrift::Millis;
                read_struct(r, |r, fh| {
                    match fh.id {
                        1 => is_adjusted_to_utc = fh.bool_value.unwrap_or(false),
                        2 => unit = decode_time_unit(r)?,
                        _ => return Ok(false),
                    }
                    Ok(true)
                })?;
                result = Some(LogicalTypeThrift::Timestamp { is_adjusted_to_utc, unit });
            }
            10 => {
                let mut bit_width = 0i8;
                let mut is_signed = false;
                read_struct(r, |r, fh| {
                    match fh.id {
                        1 => bit_width = r.read_byte_value()? as i8,
                        2 => is_signed = fh.bool_value.unwrap_or(false),
                        _ => return Ok(false),
                    }
                    Ok(true)
                })?;
                result = Some(LogicalTypeThrift::Integer { bit_width, is_signed });
            }
            11 => {
                read_struct(r, |_, _| Ok(false))?;
                result = Some(LogicalTypeThrift::Null);
            }
            12 => {
                read_struct(r, |_, _| Ok(false))?;
                result = Some(LogicalTypeThrift::Json);
            }
            13 => {
                read_struct(r, |_, _| Ok(false))?;
                result = Some(LogicalTypeThrift::Bson);
            }
            14 => {
                read_struct(r, |_, _| Ok(false))?;
                result = Some(LogicalTypeThrift::Uuid);
            }
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    result.ok_or_else(|| corrupt_metadata_err!("LogicalType union had no recognized branch"))
}

#[derive(Debug, Clone)]
pub struct SchemaElement {
    pub type_: Option<i32>,
    pub type_length: Option<i32>,
    pub repetition_type: Option<i32>,
    pub name: String,
    pub num_children: Option<i32>,
    pub converted_type: Option<i32>,
    pub scale: Option<i32>,
    pub precision: Option<i32>,
    pub field_id: Option<i32>,
    pub logical_type: Option<LogicalTypeThrift>,
}

impl SchemaElement {
    fn decode(r: &mut CompactProtocolReader) -> Result<Self> {
        let mut type_ = None;
        let mut type_length = None;
        let mut repetition_type = None;
        let mut name = None;
        let mut num_children = None;
        let mut converted_type = None;
        let mut scale = None;
        let mut precision = None;
        let mut field_id = None;
        let mut logical_type = None;
        read_struct(r, |r, fh| {
            match fh.id {
                1 => type_ = Some(r.read_i32()?),
                2 => type_length = Some(r.read_i32()?),
                3 => repetition_type = Some(r.read_i32()?),
                4 => name = Some(r.read_string()?),
                5 => num_children = Some(r.read_i32()?),
                6 => converted_type = Some(r.read_i32()?),
                7 => scale = Some(r.read_i32()?),
                8 => precision = Some(r.read_i32()?),
                9 => field_id = Some(r.read_i32()?),
                10 => logical_type = Some(decode_logical_type(r)?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(SchemaElement {
            type_,
            type_length,
            repetition_type,
            name: name.ok_or_else(|| corrupt_metadata_err!("SchemaElement missing name"))?,
            num_children,
            converted_type,
            scale,
            precision,
            field_id,
            logical_type,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ColumnMetaData {
    pub type_: i32,
    pub encodings: Vec<i32>,
    pub path_in_schema: Vec<String>,
    pub codec: i32,
    pub num_values: i64,
    pub total_uncompressed_size: i64,
    pub total_compressed_size: i64,
    pub key_value_metadata: Option<Vec<KeyValue>>,
    pub data_page_offset: i64,
    pub index_page_offset: Option<i64>,
    pub dictionary_page_offset: Option<i64>,
    pub statistics: Option<Statistics>,
    pub bloom_filter_offset: Option<i64>,
    pub bloom_filter_length: Option<i32>,
}

impl ColumnMetaData {
    fn decode(r: &mut CompactProtocolReader) -> Result<Self> {
        let mut type_ = None;
        let mut encodings = Vec::new();
        let mut path_in_schema = Vec::new();
        let mut codec = None;
        let mut num_values = None;
        let mut total_uncompressed_size = None;
        let mut total_compressed_size = None;
        let mut key_value_metadata = None;
        let mut data_page_offset = None;
        let mut index_page_offset = None;
        let mut dictionary_page_offset = None;
        let mut statistics = None;
        let mut bloom_filter_offset = None;
        let mut bloom_filter_length = None;
        read_struct(r, |r, fh| {
            match fh.id {
                1 => type_ = Some(r.read_i32()?),
                2 => {
                    let (elem_ty, len) = r.read_list_begin()?;
                    for _ in 0..len {
                        encodings.push(read_enum(r, elem_ty)?);
                    }
                }
                3 => {
                    let (elem_ty, len) = r.read_list_begin()?;
                    for _ in 0..len {
                        path_in_schema.push(read_string_elem(r, elem_ty)?);
                    }
                }
                4 => codec = Some(r.read_i32()?),
                5 => num_values = Some(r.read_i64()?),
                6 => total_uncompressed_size = Some(r.read_i64()?),
                7 => total_compressed_size = Some(r.read_i64()?),
                8 => {
                    let (elem_ty, len) = r.read_list_begin()?;
                    let mut v = Vec::with_capacity(len);
                    for _ in 0..len {
                        debug_assert_eq!(elem_ty, CompactType::Struct);
                        v.push(KeyValue::decode(r)?);
                    }
                    key_value_metadata = Some(v);
                }
                9 => data_page_offset = Some(r.read_i64()?),
                10 => index_page_offset = Some(r.read_i64()?),
                11 => dictionary_page_offset = Some(r.read_i64()?),
                12 => statistics = Some(Statistics::decode(r)?),
                14 => bloom_filter_offset = Some(r.read_i64()?),
                15 => bloom_filter_length = Some(r.read_i32()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(ColumnMetaData {
            type_: type_.ok_or_else(|| corrupt_metadata_err!("ColumnMetaData missing type"))?,
            encodings,
            path_in_schema,
            codec: codec.ok_or_else(|| corrupt_metadata_err!("ColumnMetaData missing codec"))?,
            num_values: num_values
                .ok_or_else(|| corrupt_metadata_err!("ColumnMetaData missing num_values"))?,
            total_uncompressed_size: total_uncompressed_size.ok_or_else(|| {
                corrupt_metadata_err!("ColumnMetaData missing total_uncompressed_size")
            })?,
            total_compressed_size: total_compressed_size.ok_or_else(|| {
                corrupt_metadata_err!("ColumnMetaData missing total_compressed_size")
            })?,
            key_value_metadata,
            data_page_offset: data_page_offset
                .ok_or_else(|| corrupt_metadata_err!("ColumnMetaData missing data_page_offset"))?,
            index_page_offset,
            dictionary_page_offset,
            statistics,
            bloom_filter_offset,
            bloom_filter_length,
        })
    }
}

fn read_enum(r: &mut CompactProtocolReader, elem_ty: CompactType) -> Result<i32> {
    match elem_ty {
        CompactType::I32 => r.read_i32(),
        CompactType::Byte => Ok(r.read_byte_value()? as i32),
        other => Err(corrupt_metadata_err!("unexpected enum element type {:?}", other)),
    }
}

fn read_string_elem(r: &mut CompactProtocolReader, elem_ty: CompactType) -> Result<String> {
    match elem_ty {
        CompactType::Binary => r.read_string(),
        other => Err(corrupt_metadata_err!("unexpected string element type {:?}", other)),
    }
}

#[derive(Debug, Clone)]
pub struct ColumnChunk {
    pub file_path: Option<String>,
    pub file_offset: i64,
    pub meta_data: Option<ColumnMetaData>,
    pub offset_index_offset: Option<i64>,
    pub offset_index_length: Option<i32>,
    pub column_index_offset: Option<i64>,
    pub column_index_length: Option<i32>,
}

impl ColumnChunk {
    fn decode(r: &mut CompactProtocolReader) -> Result<Self> {
        let mut file_path = None;
        let mut file_offset = None;
        let mut meta_data = None;
        let mut offset_index_offset = None;
        let mut offset_index_length = None;
        let mut column_index_offset = None;
        let mut column_index_length = None;
        read_struct(r, |r, fh| {
            match fh.id {
                1 => file_path = Some(r.read_string()?),
                2 => file_offset = Some(r.read_i64()?),
                3 => meta_data = Some(ColumnMetaData::decode(r)?),
                4 => offset_index_offset = Some(r.read_i64()?),
                5 => offset_index_length = Some(r.read_i32()?),
                6 => column_index_offset = Some(r.read_i64()?),
                7 => column_index_length = Some(r.read_i32()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(ColumnChunk {
            file_path,
            file_offset: file_offset
                .ok_or_else(|| corrupt_metadata_err!("ColumnChunk missing file_offset"))?,
            meta_data,
            offset_index_offset,
            offset_index_length,
            column_index_offset,
            column_index_length,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RowGroup {
    pub columns: Vec<ColumnChunk>,
    pub total_byte_size: i64,
    pub num_rows: i64,
    pub file_offset: Option<i64>,
    pub total_compressed_size: Option<i64>,
    pub ordinal: Option<i16>,
}

impl RowGroup {
    fn decode(r: &mut CompactProtocolReader) -> Result<Self> {
        let mut columns = Vec::new();
        let mut total_byte_size = None;
        let mut num_rows = None;
        let mut file_offset = None;
        let mut total_compressed_size = None;
        let mut ordinal = None;
        read_struct(r, |r, fh| {
            match fh.id {
                1 => {
                    let (elem_ty, len) = r.read_list_begin()?;
                    debug_assert_eq!(elem_ty, CompactType::Struct);
                    for _ in 0..len {
                        columns.push(ColumnChunk::decode(r)?);
                    }
                }
                2 => total_byte_size = Some(r.read_i64()?),
                3 => num_rows = Some(r.read_i64()?),
                5 => file_offset = Some(r.read_i64()?),
                6 => total_compressed_size = Some(r.read_i64()?),
                7 => ordinal = Some(r.read_i16()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(RowGroup {
            columns,
            total_byte_size: total_byte_size
                .ok_or_else(|| corrupt_metadata_err!("RowGroup missing total_byte_size"))?,
            num_rows: num_rows.ok_or_else(|| corrupt_metadata_err!("RowGroup missing num_rows"))?,
            file_offset,
            total_compressed_size,
            ordinal,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FileMetaData {
    pub version: i32,
    pub schema: Vec<SchemaElement>,
    pub num_rows: i64,
    pub row_groups: Vec<RowGroup>,
    pub key_value_metadata: Option<Vec<KeyValue>>,
    pub created_by: Option<String>,
}

impl FileMetaData {
    pub fn decode(r: &mut CompactProtocolReader) -> Result<Self> {
        let mut version = None;
        let mut schema = Vec::new();
        let mut num_rows = None;
        let mut row_groups = Vec::new();
        let mut key_value_metadata = None;
        let mut created_by = None;
        read_struct(r, |r, fh| {
            match fh.id {
                1 => version = Some(r.read_i32()?),
                2 => {
                    let (elem_ty, len) = r.read_list_begin()?;
                    debug_assert_eq!(elem_ty, CompactType::Struct);
                    for _ in 0..len {
                        schema.push(SchemaElement::decode(r)?);
                    }
                }
                3 => num_rows = Some(r.read_i64()?),
                4 => {
                    let (elem_ty, len) = r.read_list_begin()?;
                    debug_assert_eq!(elem_ty, CompactType::Struct);
                    for _ in 0..len {
                        row_groups.push(RowGroup::decode(r)?);
                    }
                }
                5 => {
                    let (elem_ty, len) = r.read_list_begin()?;
                    let mut v = Vec::with_capacity(len);
                    for _ in 0..len {
                        debug_assert_eq!(elem_ty, CompactType::Struct);
                        v.push(KeyValue::decode(r)?);
                    }
                    key_value_metadata = Some(v);
                }
                6 => created_by = Some(r.read_string()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(FileMetaData {
            version: version.ok_or_else(|| corrupt_metadata_err!("FileMetaData missing version"))?,
            schema,
            num_rows: num_rows
                .ok_or_else(|| corrupt_metadata_err!("FileMetaData missing num_rows"))?,
            row_groups,
            key_value_metadata,
            created_by,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DataPageHeader {
    pub num_values: i32,
    pub encoding: i32,
    pub definition_level_encoding: i32,
    pub repetition_level_encoding: i32,
    pub statistics: Option<Statistics>,
}

#[derive(Debug, Clone)]
pub struct DataPageHeaderV2 {
    pub num_values: i32,
    pub num_nulls: i32,
    pub num_rows: i32,
    pub encoding: i32,
    pub definition_levels_byte_length: i32,
    pub repetition_levels_byte_length: i32,
    pub is_compressed: Option<bool>,
    pub statistics: Option<Statistics>,
}

#[derive(Debug, Clone)]
pub struct DictionaryPageHeader {
    pub num_values: i32,
    pub encoding: i32,
    pub is_sorted: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct PageHeader {
    pub type_: i32,
    pub uncompressed_page_size: i32,
    pub compressed_page_size: i32,
    pub data_page_header: Option<DataPageHeader>,
    pub dictionary_page_header: Option<DictionaryPageHeader>,
    pub data_page_header_v2: Option<DataPageHeaderV2>,
}

impl PageHeader {
    pub fn decode(r: &mut CompactProtocolReader) -> Result<Self> {
        let mut type_ = None;
        let mut uncompressed_page_size = None;
        let mut compressed_page_size = None;
        let mut data_page_header = None;
        let mut dictionary_page_header = None;
        let mut data_page_header_v2 = None;
        read_struct(r, |r, fh| {
            match fh.id {
                1 => type_ = Some(r.read_i32()?),
                2 => uncompressed_page_size = Some(r.read_i32()?),
                3 => compressed_page_size = Some(r.read_i32()?),
                5 => {
                    let mut num_values = None;
                    let mut encoding = None;
                    let mut def_enc = None;
                    let mut rep_enc = None;
                    let mut statistics = None;
                    read_struct(r, |r, fh| {
                        match fh.id {
                            1 => num_values = Some(r.read_i32()?),
                            2 => encoding = Some(r.read_i32()?),
                            3 => def_enc = Some(r.read_i32()?),
                            4 => rep_enc = Some(r.read_i32()?),
                            5 => statistics = Some(Statistics::decode(r)?),
                            _ => return Ok(false),
                        }
                        Ok(true)
                    })?;
                    data_page_header = Some(DataPageHeader {
                        num_values: num_values
                            .ok_or_else(|| corrupt_metadata_err!("DataPageHeader missing num_values"))?,
                        encoding: encoding
                            .ok_or_else(|| corrupt_metadata_err!("DataPageHeader missing encoding"))?,
                        definition_level_encoding: def_enc.unwrap_or(3),
                        repetition_level_encoding: rep_enc.unwrap_or(3),
                        statistics,
                    });
                }
                7 => {
                    let mut num_values = None;
                    let mut encoding = None;
                    let mut is_sorted = None;
                    read_struct(r, |r, fh| {
                        match fh.id {
                            1 => num_values = Some(r.read_i32()?),
                            2 => encoding = Some(r.read_i32()?),
                            3 => is_sorted = Some(fh.bool_value.unwrap_or(false)),
                            _ => return Ok(false),
                        }
                        Ok(true)
                    })?;
                    dictionary_page_header = Some(DictionaryPageHeader {
                        num_values: num_values.ok_or_else(|| {
                            corrupt_metadata_err!("DictionaryPageHeader missing num_values")
                        })?,
                        encoding: encoding.ok_or_else(|| {
                            corrupt_metadata_err!("DictionaryPageHeader missing encoding")
                        })?,
                        is_sorted,
                    });
                }
                8 => {
                    let mut num_values = None;
                    let mut num_nulls = None;
                    let mut num_rows = None;
                    let mut encoding = None;
                    let mut def_len = None;
                    let mut rep_len = None;
                    let mut is_compressed = None;
                    let mut statistics = None;
                    read_struct(r, |r, fh| {
                        match fh.id {
                            1 => num_values = Some(r.read_i32()?),
                            2 => num_nulls = Some(r.read_i32()?),
                            3 => num_rows = Some(r.read_i32()?),
                            4 => encoding = Some(r.read_i32()?),
                            5 => def_len = Some(r.read_i32()?),
                            6 => rep_len = Some(r.read_i32()?),
                            7 => is_compressed = Some(fh.bool_value.unwrap_or(true)),
                            8 => statistics = Some(Statistics::decode(r)?),
                            _ => return Ok(false),
                        }
                        Ok(true)
                    })?;
                    data_page_header_v2 = Some(DataPageHeaderV2 {
                        num_values: num_values.ok_or_else(|| {
                            corrupt_metadata_err!("DataPageHeaderV2 missing num_values")
                        })?,
                        num_nulls: num_nulls.unwrap_or(0),
                        num_rows: num_rows.unwrap_or(0),
                        encoding: encoding
                            .ok_or_else(|| corrupt_metadata_err!("DataPageHeaderV2 missing encoding"))?,
                        definition_levels_byte_length: def_len.unwrap_or(0),
                        repetition_levels_byte_length: rep_len.unwrap_or(0),
                        is_compressed,
                        statistics,
                    });
                }
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(PageHeader {
            type_: type_.ok_or_else(|| corrupt_metadata_err!("PageHeader missing type"))?,
            uncompressed_page_size: uncompressed_page_size
                .ok_or_else(|| corrupt_metadata_err!("PageHeader missing uncompressed_page_size"))?,
            compressed_page_size: compressed_page_size
                .ok_or_else(|| corrupt_metadata_err!("PageHeader missing compressed_page_size"))?,
            data_page_header,
            dictionary_page_header,
            data_page_header_v2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    /// Hand-assembles a minimal DictionaryPageHeader-bearing PageHeader:
    /// field 1 (i32 type=2 DICTIONARY_PAGE), field 2 uncompressed=10,
    /// field 3 compressed=10, field 7 (struct) { 1: num_values=4, 2:
    /// encoding=0 PLAIN }, stop.
    #[test]
    fn test_decode_dictionary_page_header() {
        let mut buf = Vec::new();
        buf.push((1u8 << 4) | 0x05);
        buf.extend(varint(zigzag(2)));
        buf.push((1u8 << 4) | 0x05);
        buf.extend(varint(zigzag(10)));
        buf.push((1u8 << 4) | 0x05);
        buf.extend(varint(zigzag(10)));
        buf.push((4u8 << 4) | 0x0C); // delta 4 -> field 7, struct
        buf.push((1u8 << 4) | 0x05);
        buf.extend(varint(zigzag(4)));
        buf.push((1u8 << 4) | 0x05);
        buf.extend(varint(zigzag(0)));
        buf.push(0x00); // inner stop
        buf.push(0x00); // outer stop

        let mut r = CompactProtocolReader::new(&buf);
        let header = PageHeader::decode(&mut r).unwrap();
        assert_eq!(header.type_, 2);
        assert_eq!(header.uncompressed_page_size, 10);
        assert_eq!(header.compressed_page_size, 10);
        let dict = header.dictionary_page_header.unwrap();
        assert_eq!(dict.num_values, 4);
        assert_eq!(dict.encoding, 0);
    }
}
