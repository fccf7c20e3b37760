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

//! The schema tree: `PrimitiveNode | GroupNode`, each carrying its
//! Dremel coordinates (`max_repetition_level`, `max_definition_level`).

use std::sync::Arc;

use crate::basic::{LogicalType, Repetition, Type};

/// Disambiguates a group's annotated shape. `Map`/`MapKeyValue` and `List`
/// groups follow the standard 3-level nested-list / map encoding; `Struct`
/// is a plain record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Struct,
    List,
    Map,
}

#[derive(Debug, Clone)]
pub struct BasicTypeInfo {
    pub name: String,
    pub repetition: Option<Repetition>,
    pub id: Option<i32>,
    pub logical_type: Option<LogicalType>,
}

#[derive(Debug, Clone)]
pub struct PrimitiveNode {
    pub info: BasicTypeInfo,
    pub physical_type: Type,
    pub type_length: i32,
    pub precision: i32,
    pub scale: i32,
    pub column_index: usize,
    pub max_rep_level: i32,
    pub max_def_level: i32,
}

#[derive(Debug, Clone)]
pub struct GroupNode {
    pub info: BasicTypeInfo,
    pub kind: GroupKind,
    pub children: Vec<SchemaNode>,
    pub max_rep_level: i32,
    pub max_def_level: i32,
}

#[derive(Debug, Clone)]
pub enum SchemaNode {
    Primitive(Arc<PrimitiveNode>),
    Group(Arc<GroupNode>),
}

impl SchemaNode {
    pub fn name(&self) -> &str {
        match self {
            SchemaNode::Primitive(p) => &p.info.name,
            SchemaNode::Group(g) => &g.info.name,
        }
    }

    pub fn max_rep_level(&self) -> i32 {
        match self {
            SchemaNode::Primitive(p) => p.max_rep_level,
            SchemaNode::Group(g) => g.max_rep_level,
        }
    }

    pub fn max_def_level(&self) -> i32 {
        match self {
            SchemaNode::Primitive(p) => p.max_def_level,
            SchemaNode::Group(g) => g.max_def_level,
        }
    }

    pub fn is_repeated(&self) -> bool {
        let rep = match self {
            SchemaNode::Primitive(p) => p.info.repetition,
            SchemaNode::Group(g) => g.info.repetition,
        };
        rep == Some(Repetition::REPEATED)
    }

    pub fn as_group(&self) -> Option<&Arc<GroupNode>> {
        match self {
            SchemaNode::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&Arc<PrimitiveNode>> {
        match self {
            SchemaNode::Primitive(p) => Some(p),
            _ => None,
        }
    }
}

/// One projected/physical leaf column: its dotted path, Dremel coordinates,
/// and the primitive node it resolves to.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub path: Vec<String>,
    pub primitive: Arc<PrimitiveNode>,
    pub max_def_level: i32,
    pub max_rep_level: i32,
    pub column_index: usize,
}

impl ColumnDescriptor {
    pub fn physical_type(&self) -> Type {
        self.primitive.physical_type
    }
}

/// The flattened view over a schema tree: an ordered list of leaf
/// [`ColumnDescriptor`]s plus the tree root, shared cheaply via `Arc`.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    root: Arc<SchemaNode>,
    leaves: Vec<ColumnDescriptor>,
}

pub type SchemaDescPtr = Arc<SchemaDescriptor>;

impl SchemaDescriptor {
    pub fn new(root: Arc<SchemaNode>) -> Self {
        let mut leaves = Vec::new();
        let mut path = Vec::new();
        collect_leaves(&root, &mut path, &mut leaves);
        SchemaDescriptor { root, leaves }
    }

    pub fn root(&self) -> &Arc<SchemaNode> {
        &self.root
    }

    pub fn num_columns(&self) -> usize {
        self.leaves.len()
    }

    pub fn column(&self, i: usize) -> &ColumnDescriptor {
        &self.leaves[i]
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.leaves
    }

    /// Finds a leaf by its fully dotted name (root-relative, e.g. `"a.b.c"`).
    /// Schema projection *parsing* of dotted paths into selections is out
    /// of scope; this lookup exists for by-name cross-file resolution
    /// (multi-file schema compatibility, §4.8).
    pub fn column_by_path(&self, dotted: &str) -> Option<&ColumnDescriptor> {
        self.leaves.iter().find(|c| c.path.join(".") == dotted)
    }
}

fn collect_leaves(node: &Arc<SchemaNode>, path: &mut Vec<String>, out: &mut Vec<ColumnDescriptor>) {
    match node.as_ref() {
        SchemaNode::Primitive(p) => {
            path.push(p.info.name.clone());
            out.push(ColumnDescriptor {
                path: path.clone(),
                primitive: p.clone(),
                max_def_level: p.max_def_level,
                max_rep_level: p.max_rep_level,
                column_index: p.column_index,
            });
            path.pop();
        }
        SchemaNode::Group(g) => {
            path.push(g.info.name.clone());
            for child in &g.children {
                collect_leaves(&Arc::new(child.clone()), path, out);
            }
            path.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, rep: Repetition, col: usize, max_def: i32, max_rep: i32) -> SchemaNode {
        SchemaNode::Primitive(Arc::new(PrimitiveNode {
            info: BasicTypeInfo { name: name.to_string(), repetition: Some(rep), id: None, logical_type: None },
            physical_type: Type::INT32,
            type_length: 0,
            precision: 0,
            scale: 0,
            column_index: col,
            max_rep_level: max_rep,
            max_def_level: max_def,
        }))
    }

    #[test]
    fn test_flatten_simple_group() {
        let a = leaf("a", Repetition::REQUIRED, 0, 0, 0);
        let b = leaf("b", Repetition::OPTIONAL, 1, 1, 0);
        let root = Arc::new(SchemaNode::Group(Arc::new(GroupNode {
            info: BasicTypeInfo { name: "root".to_string(), repetition: None, id: None, logical_type: None },
            kind: GroupKind::Struct,
            children: vec![a, b],
            max_rep_level: 0,
            max_def_level: 0,
        })));
        let descr = SchemaDescriptor::new(root);
        assert_eq!(descr.num_columns(), 2);
        assert_eq!(descr.column(0).path, vec!["root", "a"]);
        assert_eq!(descr.column(1).max_def_level, 1);
    }
}
