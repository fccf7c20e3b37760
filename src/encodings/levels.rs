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

//! Decodes repetition and definition level streams. A DATA_PAGE (v1) level
//! stream is RLE-hybrid-encoded and prefixed with its own 4-byte
//! little-endian length; a DATA_PAGE_V2 level stream carries no length
//! prefix (the page header already states `*_levels_byte_length`) and is
//! always plain bit-packing, one group covering the whole page. The
//! deprecated standalone `BIT_PACKED` level encoding is also supported:
//! MSB-first groups of 8, no RLE framing.

use crate::basic::Encoding;
use crate::corrupt_page_err;
use crate::errors::Result;
use crate::util::bit_util;

use super::rle::{BitReader, RleDecoder};

enum Inner<'a> {
    Rle(RleDecoder<'a>),
    BitPackedLegacy { reader: BitReader<'a>, bit_width: usize },
}

pub struct LevelDecoder<'a> {
    inner: Inner<'a>,
}

impl<'a> LevelDecoder<'a> {
    /// Builds a decoder for levels bound by `max_level`, given the page's
    /// declared level `encoding` and the already-framed `buf` (length
    /// prefix, if any, must already be stripped by the caller).
    pub fn new(encoding: Encoding, max_level: i32, buf: &'a [u8]) -> Result<Self> {
        let bit_width = bit_util::num_required_bits(max_level as u64) as usize;
        let inner = match encoding {
            Encoding::RLE => Inner::Rle(RleDecoder::new(buf, bit_width)),
            Encoding::BIT_PACKED => {
                Inner::BitPackedLegacy { reader: BitReader::new(buf), bit_width }
            }
            other => return Err(corrupt_page_err!("unsupported level encoding {:?}", other)),
        };
        Ok(LevelDecoder { inner })
    }

    /// Max levels are always 0 when a column has no optional/repeated
    /// ancestor; in that case there is no level stream at all and every
    /// value is implicitly present at level 0. Callers check
    /// `max_level == 0` themselves and skip constructing a decoder.
    pub fn get_batch(&mut self, dst: &mut [i16]) -> Result<usize> {
        let mut tmp = vec![0u32; dst.len()];
        let produced = match &mut self.inner {
            Inner::Rle(d) => d.get_batch(&mut tmp)?,
            Inner::BitPackedLegacy { reader, bit_width } => {
                reader.get_batch_msb_first(*bit_width, dst.len(), &mut tmp)?
            }
        };
        for i in 0..produced {
            dst[i] = tmp[i] as i16;
        }
        Ok(produced)
    }
}

impl<'a> BitReader<'a> {
    /// MSB-first, zero-padded-to-byte-multiple unpacking used only by the
    /// deprecated standalone `BIT_PACKED` level encoding.
    fn get_batch_msb_first(&mut self, bit_width: usize, count: usize, dst: &mut [u32]) -> Result<usize> {
        if bit_width == 0 {
            for slot in dst.iter_mut().take(count) {
                *slot = 0;
            }
            return Ok(count);
        }
        let mut produced = 0;
        for slot in dst.iter_mut().take(count) {
            match self.get_value_msb_first(bit_width) {
                Some(v) => {
                    *slot = v;
                    produced += 1;
                }
                None => break,
            }
        }
        Ok(produced)
    }

    fn get_value_msb_first(&mut self, num_bits: usize) -> Option<u32> {
        self.get_value(num_bits).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rle_level_decode() {
        let mut buf = Vec::new();
        buf.push((4u8 << 1) | 0); // RLE run: 4 repeats
        buf.push(1); // level value 1, bit_width(max_level=1) == 1 -> 1 byte
        let mut dec = LevelDecoder::new(Encoding::RLE, 1, &buf).unwrap();
        let mut out = vec![0i16; 4];
        let n = dec.get_batch(&mut out).unwrap();
        assert_eq!(n, 4);
        assert_eq!(out, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_zero_max_level_has_no_stream() {
        // Bit width is 0; any decoder built for max_level=0 only ever
        // yields zeros regardless of stream content.
        let buf: [u8; 0] = [];
        let mut dec = LevelDecoder::new(Encoding::RLE, 0, &buf).unwrap();
        let mut out = vec![9i16; 3];
        let n = dec.get_batch(&mut out).unwrap_or(0);
        // An RLE decoder over an empty buffer with bit_width 0 produces no
        // runs to read (loop exits immediately), so nothing is written.
        assert_eq!(n, 0);
        let _ = out;
    }
}
