// SPDX-License-Identifier: MIT OR Apache-2.0
//! Room node definitions for the dungeon graph.

use crate::room_type::RoomTypeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Default display name for new nodes
pub const DEFAULT_NODE_NAME: &str = "RoomNode";

/// Unique identifier for a room node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Layout rectangle of a node in graph space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeRect {
    /// Top-left corner
    pub position: [f32; 2],
    /// Width and height
    pub size: [f32; 2],
}

impl NodeRect {
    /// Create a rectangle
    pub fn new(position: [f32; 2], size: [f32; 2]) -> Self {
        Self { position, size }
    }

    /// Center point
    pub fn center(&self) -> [f32; 2] {
        [
            self.position[0] + self.size[0] * 0.5,
            self.position[1] + self.size[1] * 0.5,
        ]
    }

    /// Whether a point lies inside the rectangle
    pub fn contains(&self, point: [f32; 2]) -> bool {
        point[0] >= self.position[0]
            && point[0] <= self.position[0] + self.size[0]
            && point[1] >= self.position[1]
            && point[1] <= self.position[1] + self.size[1]
    }

    /// Move by a delta
    pub fn translate(&mut self, delta: [f32; 2]) {
        self.position[0] += delta[0];
        self.position[1] += delta[1];
    }
}

/// A room or corridor in the dungeon graph
#[derive(Debug, Clone)]
pub struct RoomNode {
    /// Unique instance ID
    pub id: NodeId,
    /// Room type reference
    pub room_type: RoomTypeId,
    /// Display name
    pub name: String,
    /// Layout in the graph UI
    pub rect: NodeRect,
    /// Whether the node is selected in the UI
    pub selected: bool,
    /// Child node IDs (ordered)
    pub(crate) children: Vec<NodeId>,
    /// Parent node IDs (ordered)
    pub(crate) parents: Vec<NodeId>,
}

impl RoomNode {
    pub(crate) fn new(id: NodeId, room_type: RoomTypeId, rect: NodeRect) -> Self {
        Self {
            id,
            room_type,
            name: DEFAULT_NODE_NAME.to_string(),
            rect,
            selected: true,
            children: Vec::new(),
            parents: Vec::new(),
        }
    }

    /// Child node IDs in connection order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Parent node IDs in connection order
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// Whether `id` is recorded as a child
    pub fn has_child(&self, id: NodeId) -> bool {
        self.children.contains(&id)
    }

    /// Whether `id` is recorded as a parent
    pub fn has_parent(&self, id: NodeId) -> bool {
        self.parents.contains(&id)
    }

    /// Remove a child ID; returns whether it was present
    pub(crate) fn remove_child(&mut self, id: NodeId) -> bool {
        let before = self.children.len();
        self.children.retain(|c| *c != id);
        self.children.len() != before
    }

    /// Remove a parent ID; returns whether it was present
    pub(crate) fn remove_parent(&mut self, id: NodeId) -> bool {
        let before = self.parents.len();
        self.parents.retain(|p| *p != id);
        self.parents.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> RoomNode {
        RoomNode::new(
            NodeId::new(),
            RoomTypeId::from("corridor"),
            NodeRect::new([10.0, 20.0], [160.0, 75.0]),
        )
    }

    #[test]
    fn test_rect_geometry() {
        let mut rect = NodeRect::new([10.0, 20.0], [160.0, 75.0]);
        assert_eq!(rect.center(), [90.0, 57.5]);
        assert!(rect.contains([10.0, 20.0]));
        assert!(!rect.contains([171.0, 20.0]));

        rect.translate([-10.0, 5.0]);
        assert_eq!(rect.position, [0.0, 25.0]);
    }

    #[test]
    fn test_remove_missing_entry_is_noop() {
        let mut node = node();
        let other = NodeId::new();
        node.children.push(other);

        assert!(!node.remove_parent(other));
        assert!(node.remove_child(other));
        assert!(!node.remove_child(other));
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_new_node_defaults() {
        let node = node();
        assert_eq!(node.name, DEFAULT_NODE_NAME);
        assert!(node.selected);
        assert!(node.parents().is_empty());
    }
}
