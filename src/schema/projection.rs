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

//! A `ProjectedSchema` names a pre-resolved set of primitive leaves with a
//! `projected_column_index` assigned in stable (caller-given) order.
//! Parsing a dotted-path selection syntax (e.g. `"a.b.c"`) into this set is
//! out of scope for this crate: callers hand in the leaf set already
//! resolved against a [`SchemaDescriptor`].

use std::collections::HashMap;

use crate::errors::Result;
use crate::general_err;
use crate::schema::types::{ColumnDescriptor, SchemaDescriptor};

/// One selected leaf column, carrying both its position in the full file
/// schema and its position within this projection.
#[derive(Debug, Clone)]
pub struct ProjectedColumn {
    pub source_column_index: usize,
    pub projected_column_index: usize,
    pub descriptor: ColumnDescriptor,
}

/// An ordered subset of a [`SchemaDescriptor`]'s leaves.
#[derive(Debug, Clone)]
pub struct ProjectedSchema {
    columns: Vec<ProjectedColumn>,
    source_to_projected: HashMap<usize, usize>,
}

impl ProjectedSchema {
    /// Projects every leaf of `schema`, in its natural order.
    pub fn all(schema: &SchemaDescriptor) -> Self {
        let indices: Vec<usize> = (0..schema.num_columns()).collect();
        Self::new(schema, &indices).expect("identity projection cannot fail")
    }

    /// Projects the leaves at `source_column_indices`, in the given order.
    /// Each index must be a valid leaf position in `schema`.
    pub fn new(schema: &SchemaDescriptor, source_column_indices: &[usize]) -> Result<Self> {
        let mut columns = Vec::with_capacity(source_column_indices.len());
        let mut source_to_projected = HashMap::with_capacity(source_column_indices.len());
        for (projected_idx, &source_idx) in source_column_indices.iter().enumerate() {
            if source_idx >= schema.num_columns() {
                return Err(general_err!(
                    "projection references column index {} but schema only has {} leaves",
                    source_idx,
                    schema.num_columns()
                ));
            }
            columns.push(ProjectedColumn {
                source_column_index: source_idx,
                projected_column_index: projected_idx,
                descriptor: schema.column(source_idx).clone(),
            });
            source_to_projected.insert(source_idx, projected_idx);
        }
        Ok(ProjectedSchema { columns, source_to_projected })
    }

    /// Projects the leaves found by dotted path, resolved against `schema`.
    /// This is the one place a caller-supplied name list turns into column
    /// indices; it does not parse any selection grammar, it just looks up
    /// already-split path segments.
    pub fn from_paths(schema: &SchemaDescriptor, paths: &[Vec<String>]) -> Result<Self> {
        let mut indices = Vec::with_capacity(paths.len());
        for path in paths {
            let dotted = path.join(".");
            let col = schema
                .column_by_path(&dotted)
                .ok_or_else(|| general_err!("no such projected column: {}", dotted))?;
            indices.push(col.column_index);
        }
        Self::new(schema, &indices)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[ProjectedColumn] {
        &self.columns
    }

    pub fn column(&self, projected_index: usize) -> &ProjectedColumn {
        &self.columns[projected_index]
    }

    pub fn projected_index_of(&self, source_column_index: usize) -> Option<usize> {
        self.source_to_projected.get(&source_column_index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::from_thrift::schema_from_thrift;
    use crate::format::SchemaElement;

    fn elem(name: &str, ty: Option<i32>, rep: Option<i32>) -> SchemaElement {
        SchemaElement {
            type_: ty,
            type_length: None,
            repetition_type: rep,
            name: name.to_string(),
            num_children: None,
            converted_type: None,
            scale: None,
            precision: None,
            field_id: None,
            logical_type: None,
        }
    }

    #[test]
    fn test_projection_stable_order() {
        let mut root = elem("schema", None, None);
        root.num_children = Some(3);
        let elements = vec![
            root,
            elem("a", Some(1), Some(0)),
            elem("b", Some(1), Some(0)),
            elem("c", Some(1), Some(0)),
        ];
        let schema = schema_from_thrift(&elements).unwrap();
        let proj = ProjectedSchema::new(&schema, &[2, 0]).unwrap();
        assert_eq!(proj.len(), 2);
        assert_eq!(proj.column(0).descriptor.path, vec!["schema", "c"]);
        assert_eq!(proj.column(1).descriptor.path, vec!["schema", "a"]);
        assert_eq!(proj.projected_index_of(2), Some(0));
        assert_eq!(proj.projected_index_of(1), None);
    }
}
