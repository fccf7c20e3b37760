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

//! The hybrid RLE / bit-packing run sequence used for dictionary indices,
//! boolean values, and repetition/definition levels.
//!
//! The stream is a sequence of runs. Each run starts with a ULEB128 header
//! `h`; `h & 1 == 0` means an RLE run of `h >> 1` repeats of one bit-packed
//! value, `h & 1 == 1` means a bit-packed run of `(h >> 1) * 8` values
//! packed contiguously at the stream's fixed bit width.

use crate::corrupt_page_err;
use crate::errors::Result;
use crate::util::bit_util;

/// A little-endian bit cursor over a byte slice, used to read ULEB128
/// varints and fixed-width bit-packed groups.
pub struct BitReader<'a> {
    buf: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        BitReader { buf, byte_pos: 0, bit_pos: 0 }
    }

    fn at_byte_boundary(&self) -> bool {
        self.bit_pos == 0
    }

    /// Reads a ULEB128 varint; only valid at a byte boundary.
    pub fn get_vlq_int(&mut self) -> Result<u64> {
        debug_assert!(self.at_byte_boundary());
        let mut result: u64 = 0;
        let mut shift = 0;
        loop {
            let byte = *self
                .buf
                .get(self.byte_pos)
                .ok_or_else(|| crate::eof_err!("unexpected end of RLE stream reading varint"))?;
            self.byte_pos += 1;
            result |= ((byte & 0x7F) as u64) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift > 63 {
                return Err(corrupt_page_err!("RLE varint overflow"));
            }
        }
        Ok(result)
    }

    /// Reads `num_bits` bits (0..=32) into a `u32`, LSB-first.
    pub fn get_value(&mut self, num_bits: usize) -> Result<u32> {
        if num_bits == 0 {
            return Ok(0);
        }
        let total_bits_available = (self.buf.len() - self.byte_pos) * 8 - self.bit_pos as usize;
        if num_bits > total_bits_available {
            return Err(crate::eof_err!("RLE stream ran out of bits"));
        }
        let mut value: u64 = 0;
        for b in 0..num_bits {
            let global_bit = self.byte_pos * 8 + self.bit_pos as usize + b;
            let byte = self.buf[global_bit / 8];
            let bit = (byte >> (global_bit % 8)) & 1;
            value |= (bit as u64) << b;
        }
        let new_global = self.byte_pos * 8 + self.bit_pos as usize + num_bits;
        self.byte_pos = new_global / 8;
        self.bit_pos = (new_global % 8) as u8;
        Ok(value as u32)
    }

    /// Unpacks `count` values of `bit_width` bits directly from the byte
    /// stream (caller guarantees we are at a byte boundary, as every
    /// bit-packed run is).
    fn get_batch(&mut self, bit_width: usize, count: usize, dst: &mut [u32]) -> Result<usize> {
        debug_assert!(self.at_byte_boundary());
        let remaining_bytes = self.buf.len() - self.byte_pos;
        let produced = bit_util::unpack_bits(
            &self.buf[self.byte_pos..],
            bit_width,
            count,
            dst,
        );
        let consumed_bits = produced * bit_width;
        let consumed_bytes = bit_util::ceil8(consumed_bits).min(remaining_bytes);
        self.byte_pos += consumed_bytes;
        self.bit_pos = 0;
        Ok(produced)
    }

    pub fn bytes_consumed(&self) -> usize {
        self.byte_pos + if self.bit_pos > 0 { 1 } else { 0 }
    }
}

#[derive(Clone, Copy)]
enum RunState {
    Exhausted,
    Rle { value: u32, remaining: usize },
    BitPacked { remaining: usize },
}

/// A decoder's position in its run sequence, independent of the byte slice
/// it reads from. Lets a caller that can't hold a borrow across calls (its
/// buffer is owned elsewhere) drop the decoder between calls and rebuild it
/// from this plus a fresh borrow, instead of faking a `'static` lifetime.
#[derive(Clone, Copy)]
pub(crate) struct RleCursor {
    byte_pos: usize,
    bit_pos: u8,
    state: RunState,
}

impl RleCursor {
    pub(crate) fn start() -> Self {
        RleCursor { byte_pos: 0, bit_pos: 0, state: RunState::Exhausted }
    }
}

/// Decodes a hybrid RLE/bit-packing run sequence at a fixed `bit_width`.
pub struct RleDecoder<'a> {
    reader: BitReader<'a>,
    bit_width: usize,
    state: RunState,
}

impl<'a> RleDecoder<'a> {
    pub fn new(buf: &'a [u8], bit_width: usize) -> Self {
        RleDecoder { reader: BitReader::new(buf), bit_width, state: RunState::Exhausted }
    }

    /// Rebuilds a decoder over a fresh borrow of the same logical stream,
    /// resuming at `cursor` rather than the start.
    pub(crate) fn resume(buf: &'a [u8], bit_width: usize, cursor: RleCursor) -> Self {
        RleDecoder {
            reader: BitReader { buf, byte_pos: cursor.byte_pos, bit_pos: cursor.bit_pos },
            bit_width,
            state: cursor.state,
        }
    }

    /// Captures this decoder's position so it can be dropped and later
    /// resumed via [`Self::resume`] against the same byte stream.
    pub(crate) fn cursor(&self) -> RleCursor {
        RleCursor { byte_pos: self.reader.byte_pos, bit_pos: self.reader.bit_pos, state: self.state }
    }

    fn load_next_run(&mut self) -> Result<()> {
        let header = self.reader.get_vlq_int()?;
        if header & 1 == 0 {
            let count = (header >> 1) as usize;
            let value = if self.bit_width == 0 { 0 } else { self.reader.get_value(self.bit_width)? };
            self.state = RunState::Rle { value, remaining: count };
        } else {
            let count = (header >> 1) as usize * 8;
            self.state = RunState::BitPacked { remaining: count };
        }
        Ok(())
    }

    /// Fills `dst` with up to `dst.len()` decoded values, returning how many
    /// were actually produced (fewer than requested only at end of stream).
    pub fn get_batch(&mut self, dst: &mut [u32]) -> Result<usize> {
        let mut produced = 0;
        while produced < dst.len() {
            match self.state {
                RunState::Exhausted => {
                    if self.reader.byte_pos >= self.reader.buf.len() {
                        break;
                    }
                    self.load_next_run()?;
                }
                RunState::Rle { value, remaining } => {
                    if remaining == 0 {
                        self.state = RunState::Exhausted;
                        continue;
                    }
                    let take = remaining.min(dst.len() - produced);
                    for slot in &mut dst[produced..produced + take] {
                        *slot = value;
                    }
                    produced += take;
                    self.state = RunState::Rle { value, remaining: remaining - take };
                }
                RunState::BitPacked { remaining } => {
                    if remaining == 0 {
                        self.state = RunState::Exhausted;
                        continue;
                    }
                    let take = remaining.min(dst.len() - produced);
                    let got = self.reader.get_batch(self.bit_width, take, &mut dst[produced..produced + take])?;
                    produced += got;
                    self.state = RunState::BitPacked { remaining: remaining - got };
                    if got < take {
                        break;
                    }
                }
            }
        }
        Ok(produced)
    }
}
