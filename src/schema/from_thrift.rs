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

//! Builds a [`SchemaNode`] tree out of the flat, pre-order
//! `Vec<SchemaElement>` that `FileMetaData` carries, assigning each
//! primitive leaf its Dremel `(max_rep_level, max_def_level)` and a global
//! `column_index` in flattening order.

use std::sync::Arc;

use crate::basic::{self, LogicalType, Repetition, TimeUnit, Type};
use crate::corrupt_metadata_err;
use crate::errors::Result;
use crate::format::{LogicalTypeThrift, SchemaElement, TimeUnitThrift};
use crate::schema::types::{BasicTypeInfo, GroupKind, GroupNode, PrimitiveNode, SchemaDescriptor, SchemaNode};

fn convert_time_unit(u: TimeUnitThrift) -> TimeUnit {
    match u {
        TimeUnitThrift::Millis => TimeUnit::Millis,
        TimeUnitThrift::Micros => TimeUnit::Micros,
        TimeUnitThrift::Nanos => TimeUnit::Nanos,
    }
}

/// Maps the Thrift `LogicalType` union (preferred) or, failing that, the
/// legacy `ConvertedType` enum (files from older `parquet-mr` carry only
/// this) onto our [`LogicalType`] sum.
fn resolve_logical_type(elem: &SchemaElement) -> Option<LogicalType> {
    if let Some(lt) = &elem.logical_type {
        return Some(match lt {
            LogicalTypeThrift::String => LogicalType::String,
            LogicalTypeThrift::Enum => LogicalType::Enum,
            LogicalTypeThrift::Uuid => LogicalType::Uuid,
            LogicalTypeThrift::Date => LogicalType::Date,
            LogicalTypeThrift::Time { is_adjusted_to_utc, unit } => LogicalType::Time {
                unit: convert_time_unit(*unit),
                is_adjusted_to_utc: *is_adjusted_to_utc,
            },
            LogicalTypeThrift::Timestamp { is_adjusted_to_utc, unit } => LogicalType::Timestamp {
                unit: convert_time_unit(*unit),
                is_adjusted_to_utc: *is_adjusted_to_utc,
            },
            LogicalTypeThrift::Decimal { scale, precision } => {
                LogicalType::Decimal { precision: *precision, scale: *scale }
            }
            LogicalTypeThrift::Json => LogicalType::Json,
            LogicalTypeThrift::Bson => LogicalType::Bson,
            LogicalTypeThrift::Integer { bit_width, is_signed } => {
                LogicalType::Integer { bit_width: *bit_width as u8, is_signed: *is_signed }
            }
            LogicalTypeThrift::Map | LogicalTypeThrift::List | LogicalTypeThrift::Null => return None,
        });
    }
    // Fall back to the deprecated ConvertedType enum.
    match elem.converted_type {
        Some(0) => Some(LogicalType::String),                       // UTF8
        Some(4) => Some(LogicalType::Enum),                         // ENUM
        Some(5) => Some(LogicalType::Decimal {
            precision: elem.precision.unwrap_or(0),
            scale: elem.scale.unwrap_or(0),
        }), // DECIMAL
        Some(6) => Some(LogicalType::Date),                         // DATE
        Some(7) => Some(LogicalType::Time { unit: TimeUnit::Millis, is_adjusted_to_utc: true }),
        Some(8) => Some(LogicalType::Time { unit: TimeUnit::Micros, is_adjusted_to_utc: true }),
        Some(9) => Some(LogicalType::Timestamp { unit: TimeUnit::Millis, is_adjusted_to_utc: true }),
        Some(10) => Some(LogicalType::Timestamp { unit: TimeUnit::Micros, is_adjusted_to_utc: true }),
        Some(15) => Some(LogicalType::Integer { bit_width: 8, is_signed: true }),
        Some(16) => Some(LogicalType::Integer { bit_width: 16, is_signed: true }),
        Some(17) => Some(LogicalType::Integer { bit_width: 32, is_signed: true }),
        Some(18) => Some(LogicalType::Integer { bit_width: 64, is_signed: true }),
        Some(11) => Some(LogicalType::Integer { bit_width: 8, is_signed: false }),
        Some(12) => Some(LogicalType::Integer { bit_width: 16, is_signed: false }),
        Some(13) => Some(LogicalType::Integer { bit_width: 32, is_signed: false }),
        Some(14) => Some(LogicalType::Integer { bit_width: 64, is_signed: false }),
        Some(19) => Some(LogicalType::Json),
        Some(20) => Some(LogicalType::Bson),
        _ => None,
    }
}

fn group_kind(elem: &SchemaElement) -> GroupKind {
    if let Some(LogicalTypeThrift::Map) = elem.logical_type {
        return GroupKind::Map;
    }
    if let Some(LogicalTypeThrift::List) = elem.logical_type {
        return GroupKind::List;
    }
    match elem.converted_type {
        Some(1) | Some(2) => GroupKind::Map, // MAP, MAP_KEY_VALUE
        Some(3) => GroupKind::List,          // LIST
        _ => GroupKind::Struct,
    }
}

struct Builder<'a> {
    elements: &'a [SchemaElement],
    pos: usize,
    next_column_index: usize,
}

impl<'a> Builder<'a> {
    fn build_child(&mut self, parent_max_rep: i32, parent_max_def: i32) -> Result<SchemaNode> {
        let elem = self
            .elements
            .get(self.pos)
            .ok_or_else(|| corrupt_metadata_err!("schema element list truncated"))?
            .clone();
        self.pos += 1;

        let repetition = elem
            .repetition_type
            .map(basic::repetition_from_thrift)
            .transpose()?
            .unwrap_or(Repetition::REQUIRED);

        let (max_rep, max_def) = match repetition {
            Repetition::REPEATED => (parent_max_rep + 1, parent_max_def + 1),
            Repetition::OPTIONAL => (parent_max_rep, parent_max_def + 1),
            Repetition::REQUIRED => (parent_max_rep, parent_max_def),
        };

        let info = BasicTypeInfo {
            name: elem.name.clone(),
            repetition: Some(repetition),
            id: elem.field_id,
            logical_type: resolve_logical_type(&elem),
        };

        match elem.num_children {
            Some(n) if n > 0 => {
                let mut children = Vec::with_capacity(n as usize);
                for _ in 0..n {
                    children.push(self.build_child(max_rep, max_def)?);
                }
                Ok(SchemaNode::Group(Arc::new(GroupNode {
                    info,
                    kind: group_kind(&elem),
                    children,
                    max_rep_level: max_rep,
                    max_def_level: max_def,
                })))
            }
            _ => {
                let physical_type = basic::physical_type_from_thrift(
                    elem.type_.ok_or_else(|| corrupt_metadata_err!("leaf {} missing physical type", elem.name))?,
                )?;
                let column_index = self.next_column_index;
                self.next_column_index += 1;
                Ok(SchemaNode::Primitive(Arc::new(PrimitiveNode {
                    info,
                    physical_type,
                    type_length: elem.type_length.unwrap_or(0),
                    precision: elem.precision.unwrap_or(0),
                    scale: elem.scale.unwrap_or(0),
                    column_index,
                    max_rep_level: max_rep,
                    max_def_level: max_def,
                })))
            }
        }
    }
}

/// Builds a [`SchemaDescriptor`] from the flat pre-order schema element list
/// that `FileMetaData.schema` carries. Element 0 is the message root; it
/// contributes no levels of its own.
pub fn schema_from_thrift(elements: &[SchemaElement]) -> Result<SchemaDescriptor> {
    if elements.is_empty() {
        return Err(corrupt_metadata_err!("empty schema element list"));
    }
    let root_elem = &elements[0];
    let n_children = root_elem.num_children.unwrap_or(0) as usize;
    let mut builder = Builder { elements, pos: 1, next_column_index: 0 };
    let mut children = Vec::with_capacity(n_children);
    for _ in 0..n_children {
        children.push(builder.build_child(0, 0)?);
    }
    let root = Arc::new(SchemaNode::Group(Arc::new(GroupNode {
        info: BasicTypeInfo {
            name: root_elem.name.clone(),
            repetition: None,
            id: root_elem.field_id,
            logical_type: None,
        },
        kind: GroupKind::Struct,
        children,
        max_rep_level: 0,
        max_def_level: 0,
    })));
    Ok(SchemaDescriptor::new(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::SchemaElement;

    fn elem(name: &str, ty: Option<i32>, rep: Option<i32>, num_children: Option<i32>) -> SchemaElement {
        SchemaElement {
            type_: ty,
            type_length: None,
            repetition_type: rep,
            name: name.to_string(),
            num_children,
            converted_type: None,
            scale: None,
            precision: None,
            field_id: None,
            logical_type: None,
        }
    }

    #[test]
    fn test_flat_required_optional() {
        // message schema { required int64 id; optional binary name (STRING); }
        let elements = vec![
            elem("schema", None, None, Some(2)),
            elem("id", Some(2), Some(0), None),
            elem("name", Some(6), Some(1), None),
        ];
        let descr = schema_from_thrift(&elements).unwrap();
        assert_eq!(descr.num_columns(), 2);
        assert_eq!(descr.column(0).max_def_level, 0);
        assert_eq!(descr.column(0).max_rep_level, 0);
        assert_eq!(descr.column(1).max_def_level, 1);
        assert_eq!(descr.column(1).max_rep_level, 0);
    }

    #[test]
    fn test_nested_list_levels() {
        // message schema {
        //   optional group fare_components (LIST) {
        //     repeated group list {
        //       optional double element;
        //     }
        //   }
        // }
        let mut list_group = elem("fare_components", None, Some(1), Some(1));
        list_group.converted_type = Some(3); // LIST
        let mut repeated_group = elem("list", None, Some(2), Some(1));
        repeated_group.num_children = Some(1);
        let element = elem("element", Some(5), Some(1), None);

        let elements = vec![
            elem("schema", None, None, Some(1)),
            list_group,
            repeated_group,
            element,
        ];
        let descr = schema_from_thrift(&elements).unwrap();
        assert_eq!(descr.num_columns(), 1);
        let col = descr.column(0);
        assert_eq!(col.max_rep_level, 1);
        assert_eq!(col.max_def_level, 2);
    }
}
