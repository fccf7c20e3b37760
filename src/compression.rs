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

//! Compression codecs. Each decoder sees only a `Decompressor` capability —
//! a `(src, expected_uncompressed_size) -> bytes` function — keyed by the
//! codec carried in `ColumnMetaData`. LZO is intentionally absent: it fails
//! with [`ParquetError::UnsupportedCodec`] rather than being faked.

use crate::basic::Compression;
use crate::errors::{ParquetError, Result};

/// A decompression capability for one codec. Implementations may keep
/// per-thread scratch state (e.g. a reusable zstd decoding context); any
/// such workspace must release on every exit path, including decoder
/// failure.
pub trait Codec: Send {
    /// Decompresses `input_buf` into `output_buf`, appending to whatever
    /// `output_buf` already holds. `uncompressed_size` is a hint some
    /// backends use to pre-size their output buffer; it is not validated
    /// against this call's actual output (the caller checks the overall
    /// page's uncompressed length after this returns).
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()>;
}

/// Builds a decompressor for `codec`, or `None` for `UNCOMPRESSED`.
pub fn create_codec(codec: Compression) -> Result<Option<Box<dyn Codec>>> {
    match codec {
        Compression::UNCOMPRESSED => Ok(None),
        Compression::SNAPPY => Ok(Some(Box::new(SnappyCodec))),
        Compression::GZIP => Ok(Some(Box::new(GzipCodec))),
        Compression::LZ4 => Ok(Some(Box::new(Lz4HadoopCodec))),
        Compression::LZ4_RAW => Ok(Some(Box::new(Lz4RawCodec))),
        Compression::ZSTD => Ok(Some(Box::new(ZstdCodec))),
        Compression::BROTLI => Ok(Some(Box::new(BrotliCodec))),
    }
}

#[cfg(feature = "snap")]
struct SnappyCodec;

#[cfg(feature = "snap")]
impl Codec for SnappyCodec {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
        let len = snap::raw::decompress_len(input_buf)
            .map_err(|e| crate::corrupt_page_err!("snappy: {}", e))?;
        let offset = output_buf.len();
        output_buf.resize(offset + len, 0);
        snap::raw::Decoder::new()
            .decompress(input_buf, &mut output_buf[offset..])
            .map_err(|e| crate::corrupt_page_err!("snappy: {}", e))?;
        Ok(())
    }
}

#[cfg(not(feature = "snap"))]
struct SnappyCodec;

#[cfg(not(feature = "snap"))]
impl Codec for SnappyCodec {
    fn decompress(&mut self, _input_buf: &[u8], _output_buf: &mut Vec<u8>) -> Result<()> {
        Err(ParquetError::UnsupportedCodec("SNAPPY (feature disabled)".to_string()))
    }
}

#[cfg(feature = "flate2")]
struct GzipCodec;

#[cfg(feature = "flate2")]
impl Codec for GzipCodec {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
        use std::io::Read;
        let mut decoder = flate2::read::MultiGzDecoder::new(input_buf);
        decoder.read_to_end(output_buf)?;
        Ok(())
    }
}

#[cfg(not(feature = "flate2"))]
struct GzipCodec;

#[cfg(not(feature = "flate2"))]
impl Codec for GzipCodec {
    fn decompress(&mut self, _input_buf: &[u8], _output_buf: &mut Vec<u8>) -> Result<()> {
        Err(ParquetError::UnsupportedCodec("GZIP (feature disabled)".to_string()))
    }
}

/// Whether to prefer a faster GZIP backend (`libdeflate`-style) over the
/// standard `flate2` one; see `ReaderProperties::use_libdeflate`. No
/// `libdeflate`-backed crate is wired up today, so this is always a no-op
/// fallback to [`GzipCodec`] — requesting it never errors, it just declines
/// the faster path, matching spec §6's "false or unavailable" wording.
pub fn create_gzip_codec(_prefer_libdeflate: bool) -> Box<dyn Codec> {
    Box::new(GzipCodec)
}

#[cfg(feature = "lz4")]
struct Lz4HadoopCodec;

#[cfg(feature = "lz4")]
impl Codec for Lz4HadoopCodec {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
        // Hadoop's LZ4 framing prefixes each block with big-endian
        // (uncompressed_len, compressed_len) u32 pairs.
        let mut offset = 0usize;
        loop {
            if offset == input_buf.len() {
                break;
            }
            if offset + 8 > input_buf.len() {
                return Err(crate::corrupt_page_err!("truncated LZ4 block header"));
            }
            let uncompressed_len =
                u32::from_be_bytes(input_buf[offset..offset + 4].try_into().unwrap()) as usize;
            let compressed_len =
                u32::from_be_bytes(input_buf[offset + 4..offset + 8].try_into().unwrap()) as usize;
            offset += 8;
            if offset + compressed_len > input_buf.len() {
                return Err(crate::corrupt_page_err!("truncated LZ4 block body"));
            }
            let block = &input_buf[offset..offset + compressed_len];
            let decoded = lz4::block::decompress(block, Some(uncompressed_len as i32))
                .map_err(|e| crate::corrupt_page_err!("lz4: {}", e))?;
            output_buf.extend_from_slice(&decoded);
            offset += compressed_len;
        }
        Ok(())
    }
}

#[cfg(not(feature = "lz4"))]
struct Lz4HadoopCodec;

#[cfg(not(feature = "lz4"))]
impl Codec for Lz4HadoopCodec {
    fn decompress(&mut self, _input_buf: &[u8], _output_buf: &mut Vec<u8>) -> Result<()> {
        Err(ParquetError::UnsupportedCodec("LZ4 (feature disabled)".to_string()))
    }
}

#[cfg(feature = "lz4")]
struct Lz4RawCodec;

#[cfg(feature = "lz4")]
impl Codec for Lz4RawCodec {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
        let offset = output_buf.len();
        // The caller always knows the expected uncompressed size for a
        // page; LZ4_RAW carries no embedded length, so the decompressor
        // must be called through `decompress_page` which knows it.
        let decoded = lz4::block::decompress(input_buf, None)
            .map_err(|e| crate::corrupt_page_err!("lz4_raw: {}", e))?;
        output_buf.truncate(offset);
        output_buf.extend_from_slice(&decoded);
        Ok(())
    }
}

#[cfg(not(feature = "lz4"))]
struct Lz4RawCodec;

#[cfg(not(feature = "lz4"))]
impl Codec for Lz4RawCodec {
    fn decompress(&mut self, _input_buf: &[u8], _output_buf: &mut Vec<u8>) -> Result<()> {
        Err(ParquetError::UnsupportedCodec("LZ4_RAW (feature disabled)".to_string()))
    }
}

#[cfg(feature = "zstd")]
struct ZstdCodec;

#[cfg(feature = "zstd")]
impl Codec for ZstdCodec {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
        let mut decoder = zstd::Decoder::new(input_buf)
            .map_err(|e| crate::corrupt_page_err!("zstd: {}", e))?;
        std::io::copy(&mut decoder, output_buf).map_err(ParquetError::from)?;
        Ok(())
    }
}

#[cfg(not(feature = "zstd"))]
struct ZstdCodec;

#[cfg(not(feature = "zstd"))]
impl Codec for ZstdCodec {
    fn decompress(&mut self, _input_buf: &[u8], _output_buf: &mut Vec<u8>) -> Result<()> {
        Err(ParquetError::UnsupportedCodec("ZSTD (feature disabled)".to_string()))
    }
}

#[cfg(feature = "brotli")]
struct BrotliCodec;

#[cfg(feature = "brotli")]
impl Codec for BrotliCodec {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
        let mut decoder = brotli::Decompressor::new(input_buf, 4096);
        std::io::Read::read_to_end(&mut decoder, output_buf).map_err(ParquetError::from)?;
        Ok(())
    }
}

#[cfg(not(feature = "brotli"))]
struct BrotliCodec;

#[cfg(not(feature = "brotli"))]
impl Codec for BrotliCodec {
    fn decompress(&mut self, _input_buf: &[u8], _output_buf: &mut Vec<u8>) -> Result<()> {
        Err(ParquetError::UnsupportedCodec("BROTLI (feature disabled)".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lzo_is_never_fabricated() {
        // LZO has no `Compression` variant at all; the thrift decode path
        // (`basic::codec_from_thrift`) is where it is rejected, which this
        // test documents at the boundary this module consumes.
        assert!(crate::basic::codec_from_thrift(3).is_err());
    }

    #[cfg(feature = "snap")]
    #[test]
    fn test_snappy_roundtrip() {
        let original = b"the quick brown fox jumps over the lazy dog, again and again";
        let compressed = snap::raw::Encoder::new().compress_vec(original).unwrap();
        let mut codec = create_codec(Compression::SNAPPY).unwrap().unwrap();
        let mut out = Vec::new();
        codec.decompress(&compressed, &mut out).unwrap();
        assert_eq!(out, original);
    }
}
