//! Tests for the schema tree

use crate::IrError;
use crate::schema::{NodeLocator, NodeType, ROOT_NODE_ID, SchemaTree};
use crate::tags::payload;

// =============================================================================
// NodeType tests
// =============================================================================

#[test]
fn test_node_type_from_tag() {
    assert_eq!(NodeType::from_tag(payload::NODE_INT), Some(NodeType::Int));
    assert_eq!(NodeType::from_tag(payload::NODE_OBJ), Some(NodeType::Obj));
    assert_eq!(
        NodeType::from_tag(payload::NODE_UNSTRUCTURED_ARRAY),
        Some(NodeType::UnstructuredArray)
    );
    assert_eq!(NodeType::from_tag(0x70), None);
}

// =============================================================================
// SchemaTree tests
// =============================================================================

#[test]
fn test_new_tree_has_root_object() {
    let tree = SchemaTree::new();
    assert_eq!(tree.num_nodes(), 1);

    let root = tree.get(ROOT_NODE_ID).unwrap();
    assert_eq!(root.node_type(), NodeType::Obj);
    assert_eq!(root.parent_id(), None);
    assert_eq!(tree.key_path(ROOT_NODE_ID).unwrap(), Vec::<&str>::new());
}

#[test]
fn test_insert_assigns_sequential_ids() {
    let mut tree = SchemaTree::new();
    let a = tree
        .insert_node(NodeLocator::new(ROOT_NODE_ID, "level", NodeType::Str))
        .unwrap();
    let b = tree
        .insert_node(NodeLocator::new(ROOT_NODE_ID, "ctx", NodeType::Obj))
        .unwrap();
    let c = tree
        .insert_node(NodeLocator::new(b, "pid", NodeType::Int))
        .unwrap();

    assert_eq!((a, b, c), (1, 2, 3));
    assert_eq!(tree.get(ROOT_NODE_ID).unwrap().children(), &[1, 2]);
    assert_eq!(tree.key_path(c).unwrap(), vec!["ctx", "pid"]);
}

#[test]
fn test_same_name_different_type_is_distinct() {
    let mut tree = SchemaTree::new();
    let s = tree
        .insert_node(NodeLocator::new(ROOT_NODE_ID, "v", NodeType::Str))
        .unwrap();
    let i = tree
        .insert_node(NodeLocator::new(ROOT_NODE_ID, "v", NodeType::Int))
        .unwrap();
    assert_ne!(s, i);

    let locator = NodeLocator::new(ROOT_NODE_ID, "v", NodeType::Int);
    assert_eq!(tree.try_get_node_id(&locator), Some(i));
}

#[test]
fn test_duplicate_locator_rejected() {
    let mut tree = SchemaTree::new();
    tree.insert_node(NodeLocator::new(ROOT_NODE_ID, "k", NodeType::Int))
        .unwrap();
    let err = tree
        .insert_node(NodeLocator::new(ROOT_NODE_ID, "k", NodeType::Int))
        .unwrap_err();
    assert!(matches!(err, IrError::CorruptStream(_)));
    assert_eq!(tree.num_nodes(), 2);
}

#[test]
fn test_unknown_parent_rejected() {
    let mut tree = SchemaTree::new();
    let err = tree
        .insert_node(NodeLocator::new(7, "k", NodeType::Int))
        .unwrap_err();
    assert!(matches!(err, IrError::CorruptStream(_)));
}

#[test]
fn test_non_object_parent_rejected() {
    let mut tree = SchemaTree::new();
    let leaf = tree
        .insert_node(NodeLocator::new(ROOT_NODE_ID, "n", NodeType::Int))
        .unwrap();
    let err = tree
        .insert_node(NodeLocator::new(leaf, "child", NodeType::Int))
        .unwrap_err();
    assert!(matches!(err, IrError::CorruptStream(_)));
}

#[test]
fn test_key_path_unknown_id() {
    let tree = SchemaTree::new();
    assert!(tree.key_path(42).is_none());
}
