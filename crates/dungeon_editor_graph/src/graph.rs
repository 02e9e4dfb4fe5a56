// SPDX-License-Identifier: MIT OR Apache-2.0
//! Room node graph: node storage, id index, and interaction state.
//!
//! The node list and the id index are the same `IndexMap`, so they cannot
//! disagree about membership. Adjacency is only ever changed through
//! [`crate::edit::EditEngine`]; this module only hands out storage.

use crate::drag::ConnectionDrag;
use crate::node::{NodeId, NodeRect, RoomNode};
use crate::room_type::{RoomType, RoomTypeId, RoomTypeRegistry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a graph document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphId(pub Uuid);

impl GraphId {
    /// Create a new random graph ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A dungeon layout graph
#[derive(Debug, Clone)]
pub struct RoomNodeGraph {
    /// Document ID
    pub id: GraphId,
    /// Graph name
    pub name: String,
    /// Nodes by ID, in insertion order
    nodes: IndexMap<NodeId, RoomNode>,
    /// Every ID this graph has produced
    issued: HashSet<NodeId>,
    /// Room types referenced by the nodes
    room_types: Arc<RoomTypeRegistry>,
    /// Connection drag in progress
    pub(crate) drag: ConnectionDrag,
    /// Accumulated canvas pan
    pub(crate) offset: [f32; 2],
}

impl RoomNodeGraph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>, room_types: Arc<RoomTypeRegistry>) -> Self {
        Self::with_id(GraphId::new(), name, room_types)
    }

    pub(crate) fn with_id(
        id: GraphId,
        name: impl Into<String>,
        room_types: Arc<RoomTypeRegistry>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            nodes: IndexMap::new(),
            issued: HashSet::new(),
            room_types,
            drag: ConnectionDrag::Idle,
            offset: [0.0, 0.0],
        }
    }

    /// Room types this graph resolves against
    pub fn room_types(&self) -> &Arc<RoomTypeRegistry> {
        &self.room_types
    }

    /// Add a node with no connections
    pub fn add_node(
        &mut self,
        room_type: &RoomTypeId,
        rect: NodeRect,
    ) -> Result<NodeId, GraphError> {
        if !self.room_types.contains(room_type) {
            tracing::warn!("Refusing node with unregistered room type {}", room_type);
            return Err(GraphError::UnknownRoomType(room_type.clone()));
        }

        let id = NodeId::new();
        self.insert_node(RoomNode::new(id, room_type.clone(), rect));
        Ok(id)
    }

    /// Insert a fully built node (used when loading documents)
    pub(crate) fn insert_node(&mut self, node: RoomNode) {
        self.issued.insert(node.id);
        self.nodes.insert(node.id, node);
    }

    /// Remove a node from storage without touching its neighbours
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<RoomNode> {
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&RoomNode> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Option<&mut RoomNode> {
        self.nodes.get_mut(&node_id)
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut RoomNode> {
        self.nodes.values_mut()
    }

    /// Whether the node is present
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &RoomNode> {
        self.nodes.values()
    }

    /// Get all node IDs in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.children.len()).sum()
    }

    /// Resolve a node's room type
    pub fn room_type_of(&self, node_id: NodeId) -> Option<&RoomType> {
        let node = self.nodes.get(&node_id)?;
        self.room_types.get(&node.room_type)
    }

    /// Topmost node under a point (later nodes draw on top)
    pub fn node_at(&self, point: [f32; 2]) -> Option<NodeId> {
        self.nodes
            .values()
            .rev()
            .find(|n| n.rect.contains(point))
            .map(|n| n.id)
    }

    /// IDs of the currently selected nodes
    pub fn selected_ids(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.selected)
            .map(|n| n.id)
            .collect()
    }

    /// Whether this graph ever produced `node_id`
    pub fn was_issued(&self, node_id: NodeId) -> bool {
        self.issued.contains(&node_id)
    }

    /// Reject IDs that never belonged to this graph.
    ///
    /// Stale IDs (issued, then deleted) pass.
    pub fn ensure_issued(&self, node_id: NodeId) -> Result<(), GraphError> {
        if self.was_issued(node_id) {
            Ok(())
        } else {
            tracing::warn!("Node {} was never part of graph {}", node_id, self.id);
            Err(GraphError::ForeignNode(node_id))
        }
    }

    /// Current connection drag
    pub fn drag(&self) -> &ConnectionDrag {
        &self.drag
    }

    /// Accumulated canvas pan
    pub fn offset(&self) -> [f32; 2] {
        self.offset
    }
}

/// Contract violation by the caller of a graph operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// ID was never produced by this graph
    #[error("Node {0} does not belong to this graph")]
    ForeignNode(NodeId),

    /// Room type is not in the registry
    #[error("Unknown room type: {0}")]
    UnknownRoomType(RoomTypeId),

    /// Registry has no entrance type
    #[error("No entrance room type is configured")]
    MissingEntranceType,

    /// Registry has no unassigned type
    #[error("No unassigned room type is configured")]
    MissingUnassignedType,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> RoomNodeGraph {
        RoomNodeGraph::new("Test", Arc::new(RoomTypeRegistry::dungeon_defaults()))
    }

    fn rect(x: f32, y: f32) -> NodeRect {
        NodeRect::new([x, y], [160.0, 75.0])
    }

    #[test]
    fn test_add_and_lookup() {
        let mut graph = graph();
        let id = graph.add_node(&"corridor".into(), rect(0.0, 0.0)).unwrap();

        let node = graph.node(id).unwrap();
        assert_eq!(node.id, id);
        assert!(node.children().is_empty() && node.parents().is_empty());
        assert_eq!(graph.room_type_of(id).map(|t| t.is_corridor), Some(true));
        assert!(graph.was_issued(id));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let mut graph = graph();
        let err = graph.add_node(&"lava".into(), rect(0.0, 0.0)).unwrap_err();
        assert_eq!(err, GraphError::UnknownRoomType("lava".into()));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_remove_keeps_insertion_order() {
        let mut graph = graph();
        let a = graph.add_node(&"none".into(), rect(0.0, 0.0)).unwrap();
        let b = graph.add_node(&"none".into(), rect(1.0, 0.0)).unwrap();
        let c = graph.add_node(&"none".into(), rect(2.0, 0.0)).unwrap();

        assert!(graph.remove_node(a).is_some());
        assert!(graph.remove_node(a).is_none());
        assert!(graph.node(a).is_none());
        assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec![b, c]);
    }

    #[test]
    fn test_stale_and_foreign_ids() {
        let mut graph = graph();
        let a = graph.add_node(&"none".into(), rect(0.0, 0.0)).unwrap();
        graph.remove_node(a);

        assert!(graph.ensure_issued(a).is_ok());
        let stranger = NodeId::new();
        assert_eq!(graph.ensure_issued(stranger), Err(GraphError::ForeignNode(stranger)));
    }

    #[test]
    fn test_node_at_prefers_topmost() {
        let mut graph = graph();
        let below = graph.add_node(&"none".into(), rect(0.0, 0.0)).unwrap();
        let above = graph.add_node(&"none".into(), rect(50.0, 20.0)).unwrap();

        assert_eq!(graph.node_at([60.0, 30.0]), Some(above));
        assert_eq!(graph.node_at([5.0, 5.0]), Some(below));
        assert_eq!(graph.node_at([-5.0, -5.0]), None);
    }
}
