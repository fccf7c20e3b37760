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

//! Common Result and Error types for the crate.

use std::error::Error;
use std::fmt;

use thiserror::Error as ThisError;

/// The error taxonomy for this crate. Variants correspond to the kinds
/// named in the design, not to individual call sites.
#[derive(ThisError, Debug)]
pub enum ParquetError {
    /// The underlying byte source failed to satisfy a read request.
    #[error("IO failure: {0}")]
    IoFailure(String),
    /// Thrift decode failure, bad magic, or inconsistent sizes in the footer.
    #[error("corrupt metadata: {0}")]
    CorruptMetadata(String),
    /// Unexpected page type, truncated payload, bad encoding header, or
    /// index out of dictionary range.
    #[error("corrupt page: {0}")]
    CorruptPage(String),
    /// A requested compression codec has no available implementation.
    #[error("unsupported codec: {0}")]
    UnsupportedCodec(String),
    /// A requested encoding has no available decoder.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),
    /// A multi-file read found a file missing a projected column, or one
    /// whose physical type does not match the reference schema.
    #[error("schema incompatible: {0}")]
    SchemaIncompatible(String),
    /// A typed accessor was called against a column of a different
    /// physical type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// A primitive accessor was used on a field that is null at the
    /// current row.
    #[error("null value: {0}")]
    NullValue(String),
    /// An index fell outside `[0, size)`.
    #[error("index out of bounds: {0}")]
    OutOfBounds(String),
    /// General catch-all, used by call sites that do not cleanly map to
    /// one of the above (kept for compatibility with call sites ported
    /// from the wider Parquet ecosystem).
    #[error("{0}")]
    General(String),
}

impl From<std::io::Error> for ParquetError {
    fn from(e: std::io::Error) -> ParquetError {
        ParquetError::IoFailure(e.to_string())
    }
}

impl From<std::str::Utf8Error> for ParquetError {
    fn from(e: std::str::Utf8Error) -> ParquetError {
        ParquetError::General(format!("invalid UTF-8: {e}"))
    }
}

/// Convenience `Result` alias used throughout the crate.
pub type Result<T, E = ParquetError> = std::result::Result<T, E>;

/// Helper for building dynamic errors with a formatted message, kept
/// separate from [`ParquetError`] so callers that just want `Box<dyn Error>`
/// (e.g. compression backends) are not forced to depend on our error type.
#[derive(Debug)]
pub struct BoxedError(pub String);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for BoxedError {}

/// Builds a [`ParquetError::General`] from a format string, analogous to
/// the `general_err!` macro used throughout the wider Parquet ecosystem.
#[macro_export]
macro_rules! general_err {
    ($fmt:expr) => (
        $crate::errors::ParquetError::General(format!($fmt))
    );
    ($fmt:expr, $($args:expr),*) => (
        $crate::errors::ParquetError::General(format!($fmt, $($args),*))
    );
}

/// Builds an [`ParquetError::IoFailure`] describing an unexpected
/// end-of-file condition.
#[macro_export]
macro_rules! eof_err {
    ($fmt:expr) => (
        $crate::errors::ParquetError::IoFailure(format!(concat!("EOF: ", $fmt)))
    );
    ($fmt:expr, $($args:expr),*) => (
        $crate::errors::ParquetError::IoFailure(format!(concat!("EOF: ", $fmt), $($args),*))
    );
}

/// Builds a [`ParquetError::CorruptPage`] with a formatted message.
#[macro_export]
macro_rules! corrupt_page_err {
    ($fmt:expr) => (
        $crate::errors::ParquetError::CorruptPage(format!($fmt))
    );
    ($fmt:expr, $($args:expr),*) => (
        $crate::errors::ParquetError::CorruptPage(format!($fmt, $($args),*))
    );
}

/// Builds a [`ParquetError::CorruptMetadata`] with a formatted message.
#[macro_export]
macro_rules! corrupt_metadata_err {
    ($fmt:expr) => (
        $crate::errors::ParquetError::CorruptMetadata(format!($fmt))
    );
    ($fmt:expr, $($args:expr),*) => (
        $crate::errors::ParquetError::CorruptMetadata(format!($fmt, $($args),*))
    );
}
