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

//! `FieldDesc` mirrors a projected subset of the schema tree, but shaped for
//! row assembly rather than column layout: a tagged union over
//! primitive/struct/list/map rather than `SchemaNode`'s group-kind
//! discriminant, carrying whichever projected column indices and
//! definition-level thresholds a cursor needs to resolve nullity and
//! nested bounds without walking back through the schema tree.
//!
//! Built once per [`crate::row::reader::RowReader`] construction from a
//! [`SchemaDescriptor`] and a [`ProjectedSchema`]; every subtree with no
//! projected leaf underneath it is dropped rather than carried as an empty
//! placeholder.

use std::sync::Arc;

use crate::errors::Result;
use crate::general_err;
use crate::schema::projection::ProjectedSchema;
use crate::schema::types::{ColumnDescriptor, GroupKind, GroupNode, SchemaDescriptor, SchemaNode};

#[derive(Debug, Clone)]
pub enum FieldDesc {
    Primitive {
        projected_col: usize,
        leaf: ColumnDescriptor,
    },
    Struct {
        group: Arc<GroupNode>,
        /// Insertion-ordered so `first_primitive_col` is deterministic;
        /// looked up by name via [`FieldDesc::child`].
        children: Vec<(String, FieldDesc)>,
        first_primitive_col: usize,
    },
    ListOf {
        group: Arc<GroupNode>,
        element: Box<FieldDesc>,
        first_leaf_col: usize,
        null_def_level: i32,
        element_def_level: i32,
    },
    MapOf {
        group: Arc<GroupNode>,
        key_col: usize,
        value_col: usize,
        null_def_level: i32,
        entry_def_level: i32,
    },
}

impl FieldDesc {
    pub fn child(&self, name: &str) -> Option<&FieldDesc> {
        match self {
            FieldDesc::Struct { children, .. } => children.iter().find(|(n, _)| n == name).map(|(_, d)| d),
            _ => None,
        }
    }

    /// A projected leaf column guaranteed to lie under this field, used to
    /// probe nullity/presence of this field via that leaf's definition
    /// level at the relevant value index.
    pub fn first_primitive_col(&self) -> usize {
        match self {
            FieldDesc::Primitive { projected_col, .. } => *projected_col,
            FieldDesc::Struct { children, .. } => children[0].1.first_primitive_col(),
            FieldDesc::ListOf { first_leaf_col, .. } => *first_leaf_col,
            FieldDesc::MapOf { key_col, .. } => *key_col,
        }
    }
}

/// Builds the projected field map for a schema's root message, per spec
/// §3's "Projected field map" (name -> `FieldDesc`, dropping anything with
/// no projected leaf beneath it).
pub fn build_projected_fields(schema: &SchemaDescriptor, projection: &ProjectedSchema) -> Result<Vec<(String, FieldDesc)>> {
    let group = schema.root().as_group().ok_or_else(|| general_err!("schema root is not a group"))?;
    Ok(build_children(group, projection))
}

fn build_children(group: &Arc<GroupNode>, projection: &ProjectedSchema) -> Vec<(String, FieldDesc)> {
    group
        .children
        .iter()
        .filter_map(|child| build_node(child, projection).map(|desc| (child.name().to_string(), desc)))
        .collect()
}

fn build_node(node: &SchemaNode, projection: &ProjectedSchema) -> Option<FieldDesc> {
    match node {
        SchemaNode::Primitive(p) => {
            let projected_col = projection.projected_index_of(p.column_index)?;
            Some(FieldDesc::Primitive { projected_col, leaf: projection.column(projected_col).descriptor.clone() })
        }
        SchemaNode::Group(g) => match g.kind {
            GroupKind::Struct => build_struct(g, projection),
            GroupKind::List => build_list(g, projection),
            GroupKind::Map => build_map(g, projection),
        },
    }
}

fn build_struct(group: &Arc<GroupNode>, projection: &ProjectedSchema) -> Option<FieldDesc> {
    let children = build_children(group, projection);
    if children.is_empty() {
        return None;
    }
    let first_primitive_col = children[0].1.first_primitive_col();
    Some(FieldDesc::Struct { group: group.clone(), children, first_primitive_col })
}

/// Recognizes the canonical 3-level shape `from_thrift` builds for a
/// LIST-annotated group: one REPEATED child (conventionally named `list`
/// or `bag`), itself with one child (`element`).
fn build_list(group: &Arc<GroupNode>, projection: &ProjectedSchema) -> Option<FieldDesc> {
    let repeated = group.children.first()?;
    let repeated_group = repeated.as_group()?;
    let element_node = repeated_group.children.first()?;
    let element = build_node(element_node, projection)?;
    let first_leaf_col = element.first_primitive_col();
    Some(FieldDesc::ListOf {
        group: group.clone(),
        element: Box::new(element),
        first_leaf_col,
        null_def_level: group.max_def_level,
        element_def_level: repeated_group.max_def_level,
    })
}

/// Recognizes the canonical 3-level shape for a MAP-annotated group: one
/// REPEATED `key_value` child with `key`/`value` children. Both key and
/// value are required to be (or resolve down to) a single projected
/// primitive column; a map whose value is itself a nested group is outside
/// this shape and is dropped, same as any other unprojected subtree.
fn build_map(group: &Arc<GroupNode>, projection: &ProjectedSchema) -> Option<FieldDesc> {
    let key_value = group.children.first()?;
    let kv_group = key_value.as_group()?;
    let key_node = kv_group.children.first()?;
    let value_node = kv_group.children.get(1)?;
    let key_col = build_node(key_node, projection)?.first_primitive_col();
    let value_col = build_node(value_node, projection)?.first_primitive_col();
    Some(FieldDesc::MapOf {
        group: group.clone(),
        key_col,
        value_col,
        null_def_level: group.max_def_level,
        entry_def_level: kv_group.max_def_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::SchemaElement;
    use crate::schema::from_thrift::schema_from_thrift;

    fn elem(
        name: &str,
        ty: Option<i32>,
        rep: Option<i32>,
        num_children: Option<i32>,
        converted: Option<i32>,
    ) -> SchemaElement {
        SchemaElement {
            type_: ty,
            type_length: None,
            repetition_type: rep,
            name: name.to_string(),
            num_children,
            converted_type: converted,
            scale: None,
            precision: None,
            field_id: None,
            logical_type: None,
        }
    }

    #[test]
    fn test_flat_struct_projected_fields() {
        let mut root = elem("schema", None, None, Some(2), None);
        root.num_children = Some(2);
        let elements = vec![root, elem("a", Some(1), Some(0), None, None), elem("b", Some(1), Some(1), None, None)];
        let schema = schema_from_thrift(&elements).unwrap();
        let projection = ProjectedSchema::all(&schema);
        let fields = build_projected_fields(&schema, &projection).unwrap();
        assert_eq!(fields.len(), 2);
        assert!(matches!(fields[0].1, FieldDesc::Primitive { .. }));
    }

    #[test]
    fn test_unprojected_subtree_is_dropped() {
        let mut root = elem("schema", None, None, Some(2), None);
        root.num_children = Some(2);
        let elements = vec![root, elem("a", Some(1), Some(0), None, None), elem("b", Some(1), Some(1), None, None)];
        let schema = schema_from_thrift(&elements).unwrap();
        let projection = ProjectedSchema::new(&schema, &[1]).unwrap();
        let fields = build_projected_fields(&schema, &projection).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].0, "b");
    }

    #[test]
    fn test_list_of_ints_shape() {
        // fare_components (LIST, OPTIONAL) -> list (REPEATED) -> element (OPTIONAL, INT32)
        let mut root = elem("schema", None, None, Some(1), None);
        root.num_children = Some(1);
        let mut list_group = elem("fare_components", None, Some(1), Some(1), Some(3));
        list_group.num_children = Some(1);
        let mut repeated = elem("list", None, Some(2), Some(1), None);
        repeated.num_children = Some(1);
        let element = elem("element", Some(1), Some(1), None, None);
        let elements = vec![root, list_group, repeated, element];
        let schema = schema_from_thrift(&elements).unwrap();
        let projection = ProjectedSchema::all(&schema);
        let fields = build_projected_fields(&schema, &projection).unwrap();
        assert_eq!(fields.len(), 1);
        match &fields[0].1 {
            FieldDesc::ListOf { null_def_level, element_def_level, .. } => {
                assert_eq!(*null_def_level, 1);
                assert_eq!(*element_def_level, 2);
            }
            other => panic!("expected ListOf, got {:?}", other),
        }
    }
}
