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

//! Materializes logical-type *values* on demand, as `RowReader` accessors
//! need them: DATE/TIME/TIMESTAMP/DECIMAL/UUID conversions layered over a
//! leaf's stored physical value. Resolving a `SchemaElement`'s thrift
//! `logical_type`/`converted_type` pair into a [`crate::basic::LogicalType`]
//! tag happens in `schema::from_thrift`; this module only converts already
//! typed physical values.

use chrono::{NaiveDate, NaiveDateTime};
use num_bigint::BigInt;

use crate::basic::TimeUnit;
use crate::data_type::Int96;

/// Days since the Unix epoch, as stored by a DATE-annotated `INT32` column.
pub fn date_from_i32(days: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap() + chrono::Duration::days(days as i64)
}

/// Time of day from a TIME-annotated `INT32` (millis) or `INT64`
/// (micros/nanos) column.
pub fn time_of_day_nanos(value: i64, unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Millis => value * 1_000_000,
        TimeUnit::Micros => value * 1_000,
        TimeUnit::Nanos => value,
    }
}

/// An instant derived from a TIMESTAMP-annotated `INT64` column at the
/// recorded unit, expressed as nanoseconds since the Unix epoch (matches
/// `chrono`'s internal resolution; callers needing wall-clock fields go
/// through [`timestamp_to_naive_datetime`]).
pub fn timestamp_to_epoch_nanos(value: i64, unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Millis => value.saturating_mul(1_000_000),
        TimeUnit::Micros => value.saturating_mul(1_000),
        TimeUnit::Nanos => value,
    }
}

pub fn timestamp_to_naive_datetime(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let (secs, nanos) = match unit {
        TimeUnit::Millis => (value.div_euclid(1_000), (value.rem_euclid(1_000) * 1_000_000) as u32),
        TimeUnit::Micros => (value.div_euclid(1_000_000), (value.rem_euclid(1_000_000) * 1_000) as u32),
        TimeUnit::Nanos => (value.div_euclid(1_000_000_000), value.rem_euclid(1_000_000_000) as u32),
    };
    NaiveDateTime::from_timestamp_opt(secs, nanos)
}

/// INT96 legacy timestamp: 8 bytes of nanoseconds-of-day + 4-byte Julian day
/// number, the convention `parquet-mr` used before the TIMESTAMP logical
/// type existed. Returns nanoseconds since the Unix epoch.
pub fn int96_to_epoch_nanos(v: &Int96) -> i64 {
    const JULIAN_DAY_OF_EPOCH: i64 = 2_440_588;
    const NANOS_PER_DAY: i64 = 86_400_000_000_000;
    let days_since_epoch = v.julian_day() as i64 - JULIAN_DAY_OF_EPOCH;
    days_since_epoch * NANOS_PER_DAY + v.nanoseconds_of_day()
}

/// DECIMAL stored as `INT32`/`INT64`: the physical value directly is the
/// unscaled integer; callers divide by `10^scale` themselves or use
/// [`decimal_to_big_decimal_parts`] for an exact representation.
pub fn decimal_to_big_decimal_parts(unscaled: i64, scale: i32) -> (BigInt, i32) {
    (BigInt::from(unscaled), scale)
}

/// DECIMAL stored as `BYTE_ARRAY`/`FIXED_LEN_BYTE_ARRAY`: the bytes are a
/// two's-complement big-endian integer.
pub fn decimal_bytes_to_big_int(bytes: &[u8]) -> BigInt {
    if bytes.is_empty() {
        return BigInt::from(0);
    }
    BigInt::from_signed_bytes_be(bytes)
}

/// UUID logical type: 16-byte `FIXED_LEN_BYTE_ARRAY`, big-endian per RFC 4122.
pub fn uuid_from_fixed_len_bytes(bytes: &[u8]) -> Option<[u8; 16]> {
    if bytes.len() != 16 {
        return None;
    }
    let mut out = [0u8; 16];
    out.copy_from_slice(bytes);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_from_i32_epoch() {
        assert_eq!(date_from_i32(0), NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        assert_eq!(date_from_i32(1), NaiveDate::from_ymd_opt(1970, 1, 2).unwrap());
    }

    #[test]
    fn test_timestamp_millis_roundtrip_via_naive() {
        let ndt = timestamp_to_naive_datetime(1_000, TimeUnit::Millis).unwrap();
        assert_eq!(ndt.and_utc().timestamp(), 1);
    }

    #[test]
    fn test_int96_epoch_nanos_at_julian_epoch() {
        let v = Int96::new(0, 0, 2_440_588);
        assert_eq!(int96_to_epoch_nanos(&v), 0);
    }

    #[test]
    fn test_decimal_bytes_negative() {
        let bytes = [0xFFu8, 0xFF, 0xFF, 0xFF]; // -1 in two's complement
        assert_eq!(decimal_bytes_to_big_int(&bytes), BigInt::from(-1));
    }

    #[test]
    fn test_uuid_rejects_wrong_length() {
        assert!(uuid_from_fixed_len_bytes(&[0u8; 15]).is_none());
    }
}
