//! Schema tree for structured streams
//!
//! Structured events address their values by node id. Nodes are inserted by
//! the stream itself, ids are assigned sequentially and never reused, and the
//! root (id 0) is always an object.

use std::collections::HashMap;
use std::fmt;

use crate::tags::payload;
use crate::{IrError, Result};

/// Schema-tree node id
pub type NodeId = u32;

/// Id of the implicit root object
pub const ROOT_NODE_ID: NodeId = 0;

/// Value type carried by a schema-tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Int,
    Float,
    Bool,
    Str,
    UnstructuredArray,
    Obj,
}

impl NodeType {
    /// Parse a node-insertion type tag
    #[inline]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            payload::NODE_INT => Some(Self::Int),
            payload::NODE_FLOAT => Some(Self::Float),
            payload::NODE_BOOL => Some(Self::Bool),
            payload::NODE_STR => Some(Self::Str),
            payload::NODE_UNSTRUCTURED_ARRAY => Some(Self::UnstructuredArray),
            payload::NODE_OBJ => Some(Self::Obj),
            _ => None,
        }
    }

    /// Node-insertion type tag
    #[inline]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Int => payload::NODE_INT,
            Self::Float => payload::NODE_FLOAT,
            Self::Bool => payload::NODE_BOOL,
            Self::Str => payload::NODE_STR,
            Self::UnstructuredArray => payload::NODE_UNSTRUCTURED_ARRAY,
            Self::Obj => payload::NODE_OBJ,
        }
    }

    /// Get string representation
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Str => "str",
            Self::UnstructuredArray => "unstructured_array",
            Self::Obj => "obj",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a node: parent, key name and type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeLocator {
    pub parent_id: NodeId,
    pub key_name: String,
    pub node_type: NodeType,
}

impl NodeLocator {
    pub fn new(parent_id: NodeId, key_name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            parent_id,
            key_name: key_name.into(),
            node_type,
        }
    }
}

/// A node in the schema tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNode {
    id: NodeId,
    parent_id: Option<NodeId>,
    key_name: String,
    node_type: NodeType,
    children: Vec<NodeId>,
}

impl SchemaNode {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Parent id; `None` only for the root
    #[inline]
    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent_id
    }

    #[inline]
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    #[inline]
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Children in insertion order
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Append-only arena of schema nodes
#[derive(Debug, Clone)]
pub struct SchemaTree {
    nodes: Vec<SchemaNode>,
    index: HashMap<NodeLocator, NodeId>,
}

impl SchemaTree {
    /// Create a tree holding only the root object
    pub fn new() -> Self {
        Self {
            nodes: vec![SchemaNode {
                id: ROOT_NODE_ID,
                parent_id: None,
                key_name: String::new(),
                node_type: NodeType::Obj,
                children: Vec::new(),
            }],
            index: HashMap::new(),
        }
    }

    /// Number of nodes, root included
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id as usize)
    }

    /// Look up a node by its locator
    pub fn try_get_node_id(&self, locator: &NodeLocator) -> Option<NodeId> {
        self.index.get(locator).copied()
    }

    /// Insert a node and return its new id
    ///
    /// Fails if the parent is unknown or not an object, or if the locator is
    /// already present.
    pub fn insert_node(&mut self, locator: NodeLocator) -> Result<NodeId> {
        let parent = self.get(locator.parent_id).ok_or_else(|| {
            IrError::corrupt_stream(format!("unknown parent node id {}", locator.parent_id))
        })?;
        if parent.node_type != NodeType::Obj {
            return Err(IrError::corrupt_stream(format!(
                "parent node {} is a {} node, not an object",
                locator.parent_id, parent.node_type
            )));
        }
        if self.index.contains_key(&locator) {
            return Err(IrError::corrupt_stream(format!(
                "duplicate schema node '{}' under parent {}",
                locator.key_name, locator.parent_id
            )));
        }

        let id = NodeId::try_from(self.nodes.len())
            .map_err(|_| IrError::corrupt_stream("schema tree node id overflow"))?;

        self.nodes[locator.parent_id as usize].children.push(id);
        self.nodes.push(SchemaNode {
            id,
            parent_id: Some(locator.parent_id),
            key_name: locator.key_name.clone(),
            node_type: locator.node_type,
            children: Vec::new(),
        });
        self.index.insert(locator, id);
        Ok(id)
    }

    /// Key names from the root's child down to `id`
    ///
    /// The root itself has an empty path.
    pub fn key_path(&self, id: NodeId) -> Option<Vec<&str>> {
        let mut path = Vec::new();
        let mut node = self.get(id)?;
        while let Some(parent_id) = node.parent_id {
            path.push(node.key_name.as_str());
            node = self.get(parent_id)?;
        }
        path.reverse();
        Some(path)
    }
}

impl Default for SchemaTree {
    fn default() -> Self {
        Self::new()
    }
}
