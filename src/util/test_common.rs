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

//! In-memory fixture builders. This crate ships no binary `.parquet` test
//! corpus and no Thrift encoder (it only ever reads files), so tests
//! hand-assemble the exact byte layouts they need directly, using these
//! helpers for the repetitive parts: varint/zigzag framing, PLAIN pages,
//! RLE/bit-packed runs, and length-prefixed level streams.

use crate::util::bit_util;

/// The 4-byte magic both bracketing a Parquet file.
pub const PARQUET_MAGIC: &[u8; 4] = b"PAR1";

pub fn varint(mut v: u64) -> Vec<u8> {
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

pub fn zigzag(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

pub fn zigzag_varint(v: i64) -> Vec<u8> {
    varint(zigzag(v))
}

/// A PLAIN-encoded page body for fixed-width little-endian values.
pub fn write_plain_i32(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn write_plain_i64(values: &[i64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn write_plain_f64(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn write_plain_bool(values: &[bool]) -> Vec<u8> {
    let mut out = vec![0u8; bit_util::ceil8(values.len())];
    for (i, &v) in values.iter().enumerate() {
        if v {
            out[i / 8] |= 1 << (i % 8);
        }
    }
    out
}

/// A PLAIN-encoded page body for BYTE_ARRAY values: 4-byte little-endian
/// length then raw bytes, repeated.
pub fn write_plain_byte_array(values: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    for v in values {
        out.extend_from_slice(&(v.len() as u32).to_le_bytes());
        out.extend_from_slice(v.as_bytes());
    }
    out
}

/// One bit-packed run (no RLE runs), used when a dictionary-index or level
/// stream is small enough to fit in a single group; pads `values` up to the
/// next multiple of 8 with zeros, as the format requires.
pub fn write_bit_packed_run(values: &[u32], bit_width: usize) -> Vec<u8> {
    let groups = (values.len() + 7) / 8;
    let mut padded = values.to_vec();
    padded.resize(groups * 8, 0);
    let mut out = vec![((groups as u8) << 1) | 1];
    bit_util::pack_bits(&padded, bit_width, &mut out);
    out
}

/// One RLE run: `count` repeats of `value`, at `bit_width` bits (rounded up
/// to whole bytes for the repeated value itself).
pub fn write_rle_run(value: u32, count: usize, bit_width: usize) -> Vec<u8> {
    let mut out = varint((count as u64) << 1);
    let width_bytes = bit_util::ceil8(bit_width);
    out.extend_from_slice(&value.to_le_bytes()[..width_bytes.max(1)]);
    out
}

/// A complete dictionary-indices page body: leading bit-width byte, then
/// the RLE/bit-packed stream produced by `body_builder`.
pub fn write_dict_index_page(bit_width: u8, body: Vec<u8>) -> Vec<u8> {
    let mut out = vec![bit_width];
    out.extend(body);
    out
}

/// A DATA_PAGE (v1) repetition/definition level stream: 4-byte little-endian
/// length prefix, then the RLE-encoded body at `bit_width =
/// num_required_bits(max_level)`.
pub fn write_levels_v1(levels: &[i16], max_level: i32) -> Vec<u8> {
    let bit_width = bit_util::num_required_bits(max_level as u64) as usize;
    if bit_width == 0 {
        return Vec::new();
    }
    let values: Vec<u32> = levels.iter().map(|&l| l as u32).collect();
    let body = write_bit_packed_run(&values, bit_width);
    let mut out = (body.len() as u32).to_le_bytes().to_vec();
    out.extend(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_zigzag_roundtrip() {
        for v in [-5i64, 0, 5, 1_000_000] {
            let bytes = zigzag_varint(v);
            let mut r = crate::thrift::CompactProtocolReader::new(&bytes);
            assert_eq!(r.read_i64().unwrap(), v);
        }
    }

    #[test]
    fn test_write_plain_bool_bit_order() {
        let bits = write_plain_bool(&[true, false, true, true]);
        assert_eq!(bits[0], 0b0000_1101);
    }
}
