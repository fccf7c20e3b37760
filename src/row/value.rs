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

//! A type-erased single value, read out of a [`crate::row::batch_index::BatchIndex`]
//! by nested-mode cursors where a field's physical type is only known once
//! the schema is resolved, unlike flat mode's directly typed accessors.

use crate::data_type::ByteArray;
use crate::errors::{ParquetError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Bytes(ByteArray),
}

impl Value {
    fn mismatch(&self, wanted: &str) -> ParquetError {
        let got = match self {
            Value::Int(_) => "INT32",
            Value::Long(_) => "INT64",
            Value::Float(_) => "FLOAT",
            Value::Double(_) => "DOUBLE",
            Value::Bool(_) => "BOOLEAN",
            Value::Bytes(_) => "BYTE_ARRAY",
        };
        ParquetError::TypeMismatch(format!("value holds {}, not {}", got, wanted))
    }

    pub fn as_i32(&self) -> Result<i32> {
        match self {
            Value::Int(v) => Ok(*v),
            _ => Err(self.mismatch("INT32")),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Value::Long(v) => Ok(*v),
            _ => Err(self.mismatch("INT64")),
        }
    }

    pub fn as_f32(&self) -> Result<f32> {
        match self {
            Value::Float(v) => Ok(*v),
            _ => Err(self.mismatch("FLOAT")),
        }
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Value::Double(v) => Ok(*v),
            _ => Err(self.mismatch("DOUBLE")),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(v) => Ok(*v),
            _ => Err(self.mismatch("BOOLEAN")),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            Value::Bytes(v) => Ok(v.data()),
            _ => Err(self.mismatch("BYTE_ARRAY")),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::Bytes(v) => v.as_utf8(),
            _ => Err(self.mismatch("BYTE_ARRAY")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessor_type_mismatch() {
        let v = Value::Int(7);
        assert_eq!(v.as_i32().unwrap(), 7);
        assert!(v.as_i64().is_err());
    }

    #[test]
    fn test_value_bytes_as_str() {
        let v = Value::Bytes(ByteArray::from("hi"));
        assert_eq!(v.as_str().unwrap(), "hi");
    }
}
