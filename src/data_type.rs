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

//! Physical value types and the `DataType` marker trait that ties a
//! [`Type`](crate::basic::Type) variant to its Rust representation. Decoders,
//! column readers, and typed batches are all generic over `T: DataType`
//! rather than matching on `Type` at every call site.

use std::cmp::Ordering;
use std::fmt;

use crate::basic::Type;
use crate::errors::Result;
use crate::util::memory::ByteBufferPtr;

/// A variable-length byte sequence: BYTE_ARRAY physical values, used for
/// both opaque binary and (after a UTF-8 check) STRING-annotated columns.
#[derive(Clone, Default, Eq)]
pub struct ByteArray {
    data: Option<ByteBufferPtr>,
}

impl ByteArray {
    pub fn new() -> Self {
        ByteArray { data: None }
    }

    pub fn len(&self) -> usize {
        self.data.as_ref().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_ref().map(|d| d.as_ref()).unwrap_or(&[])
    }

    pub fn as_utf8(&self) -> crate::errors::Result<&str> {
        Ok(std::str::from_utf8(self.data())?)
    }

    pub fn set_data(&mut self, data: ByteBufferPtr) {
        self.data = Some(data);
    }
}

impl From<ByteBufferPtr> for ByteArray {
    fn from(data: ByteBufferPtr) -> Self {
        ByteArray { data: Some(data) }
    }
}

impl From<Vec<u8>> for ByteArray {
    fn from(data: Vec<u8>) -> Self {
        ByteArray { data: Some(ByteBufferPtr::new(data)) }
    }
}

impl From<&str> for ByteArray {
    fn from(s: &str) -> Self {
        ByteArray { data: Some(ByteBufferPtr::new(s.as_bytes().to_vec())) }
    }
}

impl PartialEq for ByteArray {
    fn eq(&self, other: &Self) -> bool {
        self.data() == other.data()
    }
}

impl PartialOrd for ByteArray {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.data().cmp(other.data()))
    }
}

impl fmt::Debug for ByteArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteArray").field("data", &self.data()).finish()
    }
}

/// A fixed-length byte sequence whose width comes from the schema
/// (`PrimitiveNode::type_length`), not from the value itself.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct FixedLenByteArray(ByteArray);

impl FixedLenByteArray {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        self.0.data()
    }
}

impl From<ByteArray> for FixedLenByteArray {
    fn from(b: ByteArray) -> Self {
        FixedLenByteArray(b)
    }
}

impl From<ByteBufferPtr> for FixedLenByteArray {
    fn from(data: ByteBufferPtr) -> Self {
        FixedLenByteArray(ByteArray::from(data))
    }
}

impl PartialOrd for FixedLenByteArray {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

/// The 96-bit INT96 physical type. Legacy timestamp storage: the low two
/// `u32`s are nanoseconds-of-day, the high `u32` is a Julian day number.
/// Interpreting that split into a calendar instant is the concern of
/// `schema::logical`, not this struct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Int96 {
    value: [u32; 3],
}

impl Int96 {
    pub fn new(v0: u32, v1: u32, v2: u32) -> Self {
        Int96 { value: [v0, v1, v2] }
    }

    pub fn data(&self) -> &[u32; 3] {
        &self.value
    }

    pub fn julian_day(&self) -> i32 {
        self.value[2] as i32
    }

    pub fn nanoseconds_of_day(&self) -> i64 {
        ((self.value[1] as i64) << 32) | self.value[0] as i64
    }
}

/// Ties a [`Type`] tag to its Rust value representation, so decoders,
/// column readers, and batches can be written once and instantiated per
/// physical type instead of branching on `Type` at every call site.
pub trait DataType: 'static + Send + Sync {
    type T: std::fmt::Debug + Clone + PartialOrd + Send + Default;

    fn get_physical_type() -> Type;

    /// Bit/byte width of one fixed-size value, or `None` for the two
    /// variable-length types (BYTE_ARRAY, FIXED_LEN_BYTE_ARRAY — the latter
    /// is fixed per-column but not per-`DataType`).
    fn get_type_size() -> Option<usize>;

    /// Reads up to `num_values` PLAIN-encoded values out of `buf`, starting
    /// at its front. `type_length` is only consulted by
    /// `FixedLenByteArrayType`. Returns the decoded values and the number of
    /// bytes consumed.
    fn decode_plain(buf: &[u8], num_values: usize, type_length: i32) -> Result<(Vec<Self::T>, usize)>;
}

macro_rules! make_fixed_width_type {
    ($name:ident, $physical_ty:expr, $native_ty:ty, $size:expr, $from_bytes:expr) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name {}

        impl DataType for $name {
            type T = $native_ty;

            fn get_physical_type() -> Type {
                $physical_ty
            }

            fn get_type_size() -> Option<usize> {
                $size
            }

            fn decode_plain(buf: &[u8], num_values: usize, _type_length: i32) -> Result<(Vec<Self::T>, usize)> {
                let width = $size.unwrap();
                if buf.len() < num_values * width {
                    return Err(crate::eof_err!(
                        "PLAIN stream has {} bytes, need {} for {} values of width {}",
                        buf.len(),
                        num_values * width,
                        num_values,
                        width
                    ));
                }
                let decode_one: fn(&[u8]) -> $native_ty = $from_bytes;
                let mut out = Vec::with_capacity(num_values);
                for i in 0..num_values {
                    out.push(decode_one(&buf[i * width..i * width + width]));
                }
                Ok((out, num_values * width))
            }
        }
    };
}

/// Implemented by the two integer physical types so the delta-encoding
/// family (`DELTA_BINARY_PACKED`) can be written once, generic over
/// `T: DeltaInt`, instead of duplicated for INT32 and INT64.
pub trait DeltaInt: DataType {
    fn from_i64(v: i64) -> Self::T;
    fn to_i64(v: &Self::T) -> i64;
}

make_fixed_width_type!(Int32Type, Type::INT32, i32, Some(4), |b| i32::from_le_bytes(b.try_into().unwrap()));
make_fixed_width_type!(Int64Type, Type::INT64, i64, Some(8), |b| i64::from_le_bytes(b.try_into().unwrap()));

impl DeltaInt for Int32Type {
    fn from_i64(v: i64) -> i32 {
        v as i32
    }
    fn to_i64(v: &i32) -> i64 {
        *v as i64
    }
}

impl DeltaInt for Int64Type {
    fn from_i64(v: i64) -> i64 {
        v
    }
    fn to_i64(v: &i64) -> i64 {
        *v
    }
}
make_fixed_width_type!(FloatType, Type::FLOAT, f32, Some(4), |b| f32::from_le_bytes(b.try_into().unwrap()));
make_fixed_width_type!(DoubleType, Type::DOUBLE, f64, Some(8), |b| f64::from_le_bytes(b.try_into().unwrap()));
make_fixed_width_type!(Int96Type, Type::INT96, Int96, Some(12), |b| Int96::new(
    u32::from_le_bytes(b[0..4].try_into().unwrap()),
    u32::from_le_bytes(b[4..8].try_into().unwrap()),
    u32::from_le_bytes(b[8..12].try_into().unwrap()),
));

/// BOOLEAN is PLAIN-encoded as a bit-packed LSB-first stream, unlike every
/// other fixed-width type, so it gets its own `decode_plain` rather than
/// going through `make_fixed_width_type!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolType {}

impl DataType for BoolType {
    type T = bool;

    fn get_physical_type() -> Type {
        Type::BOOLEAN
    }

    fn get_type_size() -> Option<usize> {
        Some(1)
    }

    fn decode_plain(buf: &[u8], num_values: usize, _type_length: i32) -> Result<(Vec<Self::T>, usize)> {
        let needed_bytes = crate::util::bit_util::ceil8(num_values);
        if buf.len() < needed_bytes {
            return Err(crate::eof_err!("PLAIN boolean stream truncated"));
        }
        let mut out = Vec::with_capacity(num_values);
        for i in 0..num_values {
            let byte = buf[i / 8];
            out.push((byte >> (i % 8)) & 1 == 1);
        }
        Ok((out, needed_bytes))
    }
}

/// Implemented by the two binary physical types so the delta-length and
/// delta-byte-array encoding families can be written once, generic over
/// `T: BinaryLike`.
pub trait BinaryLike: DataType {
    fn from_owned_bytes(b: Vec<u8>) -> Self::T;
    fn as_bytes(v: &Self::T) -> &[u8];
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ByteArrayType {}

impl DataType for ByteArrayType {
    type T = ByteArray;

    fn get_physical_type() -> Type {
        Type::BYTE_ARRAY
    }

    fn get_type_size() -> Option<usize> {
        None
    }

    fn decode_plain(buf: &[u8], num_values: usize, _type_length: i32) -> Result<(Vec<Self::T>, usize)> {
        let mut out = Vec::with_capacity(num_values);
        let mut pos = 0usize;
        for _ in 0..num_values {
            if pos + 4 > buf.len() {
                return Err(crate::eof_err!("PLAIN byte array stream truncated reading length"));
            }
            let len = u32::from_le_bytes(buf[pos..pos + 4].try_into().unwrap()) as usize;
            pos += 4;
            if pos + len > buf.len() {
                return Err(crate::eof_err!("PLAIN byte array stream truncated reading value"));
            }
            out.push(ByteArray::from(buf[pos..pos + len].to_vec()));
            pos += len;
        }
        Ok((out, pos))
    }
}

impl BinaryLike for ByteArrayType {
    fn from_owned_bytes(b: Vec<u8>) -> ByteArray {
        ByteArray::from(b)
    }
    fn as_bytes(v: &ByteArray) -> &[u8] {
        v.data()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLenByteArrayType {}

impl DataType for FixedLenByteArrayType {
    type T = FixedLenByteArray;

    fn get_physical_type() -> Type {
        Type::FIXED_LEN_BYTE_ARRAY
    }

    fn get_type_size() -> Option<usize> {
        None
    }

    fn decode_plain(buf: &[u8], num_values: usize, type_length: i32) -> Result<(Vec<Self::T>, usize)> {
        let width = type_length as usize;
        if buf.len() < num_values * width {
            return Err(crate::eof_err!("PLAIN fixed_len_byte_array stream truncated"));
        }
        let mut out = Vec::with_capacity(num_values);
        for i in 0..num_values {
            out.push(FixedLenByteArray::from(ByteArray::from(buf[i * width..i * width + width].to_vec())));
        }
        Ok((out, num_values * width))
    }
}

impl BinaryLike for FixedLenByteArrayType {
    fn from_owned_bytes(b: Vec<u8>) -> FixedLenByteArray {
        FixedLenByteArray::from(ByteArray::from(b))
    }
    fn as_bytes(v: &FixedLenByteArray) -> &[u8] {
        v.data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_array_eq_and_utf8() {
        let a: ByteArray = "hello".into();
        let b: ByteArray = "hello".into();
        assert_eq!(a, b);
        assert_eq!(a.as_utf8().unwrap(), "hello");
    }

    #[test]
    fn test_int96_field_split() {
        let v = Int96::new(0x1111_1111, 0x2222_2222, 42);
        assert_eq!(v.julian_day(), 42);
        assert_eq!(v.nanoseconds_of_day(), 0x2222_2222_1111_1111);
    }

    #[test]
    fn test_physical_type_tags() {
        assert_eq!(Int32Type::get_physical_type(), Type::INT32);
        assert_eq!(ByteArrayType::get_physical_type(), Type::BYTE_ARRAY);
        assert_eq!(Int32Type::get_type_size(), Some(4));
        assert_eq!(ByteArrayType::get_type_size(), None);
    }

    #[test]
    fn test_decode_plain_int32() {
        let buf: Vec<u8> = vec![1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0];
        let (values, consumed) = Int32Type::decode_plain(&buf, 3, 0).unwrap();
        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(consumed, 12);
    }

    #[test]
    fn test_decode_plain_bool_bit_order() {
        let buf = vec![0b0000_0101u8];
        let (values, consumed) = BoolType::decode_plain(&buf, 3, 0).unwrap();
        assert_eq!(values, vec![true, false, true]);
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_decode_plain_byte_array() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&3u32.to_le_bytes());
        buf.extend_from_slice(b"abc");
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(b"de");
        let (values, consumed) = ByteArrayType::decode_plain(&buf, 2, 0).unwrap();
        assert_eq!(values[0].data(), b"abc");
        assert_eq!(values[1].data(), b"de");
        assert_eq!(consumed, buf.len());
    }

    #[test]
    fn test_decode_plain_fixed_len_byte_array() {
        let buf = vec![1, 2, 3, 4, 5, 6];
        let (values, consumed) = FixedLenByteArrayType::decode_plain(&buf, 2, 3).unwrap();
        assert_eq!(values[0].data(), &[1, 2, 3]);
        assert_eq!(values[1].data(), &[4, 5, 6]);
        assert_eq!(consumed, 6);
    }
}
