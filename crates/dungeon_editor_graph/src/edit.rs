// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edit engine: the only code path that changes graph topology.
//!
//! Every edge lives in two places, the parent's child list and the
//! child's parent list. The functions here add and remove both sides
//! together.

use crate::connection::{check_connection, RejectReason};
use crate::drag::DragResolution;
use crate::graph::{GraphError, RoomNodeGraph};
use crate::node::{NodeId, NodeRect};
use crate::room_type::RoomTypeId;
use crate::settings::EditorSettings;

/// Applies validated edits to room node graphs
#[derive(Debug, Clone, Default)]
pub struct EditEngine {
    settings: EditorSettings,
}

impl EditEngine {
    /// Create an engine with the given settings
    pub fn new(settings: EditorSettings) -> Self {
        Self { settings }
    }

    /// Active settings
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Add a node of `room_type` at `position`
    pub fn add_node(
        &self,
        graph: &mut RoomNodeGraph,
        room_type: &RoomTypeId,
        position: [f32; 2],
    ) -> Result<NodeId, GraphError> {
        let id = graph.add_node(room_type, NodeRect::new(position, self.settings.node_size))?;
        tracing::debug!("Added {} node {} at {:?}", room_type, id, position);
        Ok(id)
    }

    /// Add an unassigned node at `position`.
    ///
    /// An empty graph gets its entrance first.
    pub fn create_room_node(
        &self,
        graph: &mut RoomNodeGraph,
        position: [f32; 2],
    ) -> Result<NodeId, GraphError> {
        let unassigned = graph
            .room_types()
            .unassigned()
            .map(|t| t.id.clone())
            .ok_or(GraphError::MissingUnassignedType)?;

        if graph.is_empty() {
            let entrance = graph
                .room_types()
                .entrance()
                .map(|t| t.id.clone())
                .ok_or(GraphError::MissingEntranceType)?;
            self.add_node(graph, &entrance, self.settings.entrance_position)?;
        }

        self.add_node(graph, &unassigned, position)
    }

    /// Add the edge `parent -> child` if the layout rules allow it.
    ///
    /// Any ID missing from the graph, foreign or stale, is reported as
    /// [`RejectReason::UnknownNode`]. Call [`RoomNodeGraph::ensure_issued`]
    /// first (as [`EditEngine::apply`] does) to treat foreign IDs as
    /// [`GraphError::ForeignNode`].
    pub fn try_connect(
        &self,
        graph: &mut RoomNodeGraph,
        parent: NodeId,
        child: NodeId,
    ) -> Result<(), RejectReason> {
        let max_corridors = self.settings.max_child_corridors;
        if let Err(reason) = check_connection(graph, parent, child, max_corridors) {
            tracing::debug!("Rejected {} -> {}: {}", parent, child, reason);
            return Err(reason);
        }

        // Both endpoints were resolved by the check above
        if let Some(node) = graph.node_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = graph.node_mut(child) {
            node.parents.push(parent);
        }

        tracing::debug!("Connected {} -> {}", parent, child);
        Ok(())
    }

    /// Remove the edge `parent -> child`; missing entries are ignored
    pub fn disconnect(
        &self,
        graph: &mut RoomNodeGraph,
        parent: NodeId,
        child: NodeId,
    ) -> Result<(), GraphError> {
        graph.ensure_issued(parent)?;
        graph.ensure_issued(child)?;
        sever(graph, parent, child);
        Ok(())
    }

    /// Delete a node after detaching it from every neighbour.
    ///
    /// Returns whether the node was present.
    pub fn delete_node(&self, graph: &mut RoomNodeGraph, id: NodeId) -> Result<bool, GraphError> {
        graph.ensure_issued(id)?;
        Ok(cascade_delete(graph, id))
    }

    /// Sever edges whose endpoints are both selected, then clear the selection.
    ///
    /// Returns the number of edges removed.
    pub fn delete_selected_with_links(&self, graph: &mut RoomNodeGraph) -> usize {
        let selected = graph.selected_ids();
        let mut pairs = Vec::new();

        for &parent in &selected {
            let Some(node) = graph.node(parent) else {
                continue;
            };
            for &child in node.children().iter().rev() {
                if graph.node(child).is_some_and(|c| c.selected) {
                    pairs.push((parent, child));
                }
            }
        }

        for &(parent, child) in &pairs {
            sever(graph, parent, child);
        }
        clear_selection(graph);

        tracing::info!("Removed {} links between selected rooms", pairs.len());
        pairs.len()
    }

    /// Delete every selected node except entrances.
    ///
    /// Returns the number of nodes removed.
    pub fn delete_selected_nodes_only(&self, graph: &mut RoomNodeGraph) -> usize {
        let doomed: Vec<NodeId> = graph
            .nodes()
            .filter(|n| n.selected)
            .filter(|n| {
                !graph
                    .room_types()
                    .get(&n.room_type)
                    .is_some_and(|t| t.is_entrance)
            })
            .map(|n| n.id)
            .collect();

        let removed = doomed
            .into_iter()
            .filter(|&id| cascade_delete(graph, id))
            .count();

        tracing::info!("Deleted {} selected rooms", removed);
        removed
    }

    /// Set a node's selection flag
    pub fn set_selected(
        &self,
        graph: &mut RoomNodeGraph,
        id: NodeId,
        selected: bool,
    ) -> Result<(), GraphError> {
        graph.ensure_issued(id)?;
        if let Some(node) = graph.node_mut(id) {
            node.selected = selected;
        }
        Ok(())
    }

    /// Flip a node's selection flag
    pub fn toggle_selected(&self, graph: &mut RoomNodeGraph, id: NodeId) -> Result<(), GraphError> {
        graph.ensure_issued(id)?;
        if let Some(node) = graph.node_mut(id) {
            node.selected = !node.selected;
        }
        Ok(())
    }

    /// Select every node
    pub fn select_all(&self, graph: &mut RoomNodeGraph) {
        for node in graph.nodes_mut() {
            node.selected = true;
        }
    }

    /// Deselect every node
    pub fn clear_selection(&self, graph: &mut RoomNodeGraph) {
        clear_selection(graph);
    }

    /// Change the type of an unconnected, non-entrance node.
    ///
    /// Switching between corridor and room, or turning into a boss room,
    /// drops the node's existing child edges.
    pub fn set_room_type(
        &self,
        graph: &mut RoomNodeGraph,
        id: NodeId,
        room_type: &RoomTypeId,
    ) -> Result<(), RetypeError> {
        graph.ensure_issued(id)?;
        let Some(new_type) = graph.room_types().get(room_type).cloned() else {
            return Err(GraphError::UnknownRoomType(room_type.clone()).into());
        };
        let Some(node) = graph.node(id) else {
            return Ok(());
        };
        let Some(old_type) = graph.room_types().get(&node.room_type).cloned() else {
            return Err(GraphError::UnknownRoomType(node.room_type.clone()).into());
        };

        if old_type.is_entrance {
            return Err(RetypeError::EntranceIsFixed);
        }
        if !node.parents().is_empty() {
            return Err(RetypeError::NodeHasParent);
        }
        if new_type.is_entrance {
            return Err(RetypeError::CannotBecomeEntrance);
        }

        let invalidates_children = old_type.is_corridor != new_type.is_corridor
            || (!old_type.is_boss_room && new_type.is_boss_room);
        let children: Vec<NodeId> = if invalidates_children {
            node.children().iter().rev().copied().collect()
        } else {
            Vec::new()
        };

        for child in children {
            sever(graph, id, child);
        }
        if let Some(node) = graph.node_mut(id) {
            node.room_type = new_type.id.clone();
        }

        tracing::debug!("Node {} is now {}", id, new_type.name);
        Ok(())
    }

    /// Move one node
    pub fn move_node(
        &self,
        graph: &mut RoomNodeGraph,
        id: NodeId,
        delta: [f32; 2],
    ) -> Result<(), GraphError> {
        graph.ensure_issued(id)?;
        if let Some(node) = graph.node_mut(id) {
            node.rect.translate(delta);
        }
        Ok(())
    }

    /// Pan the whole canvas
    pub fn pan(&self, graph: &mut RoomNodeGraph, delta: [f32; 2]) {
        for node in graph.nodes_mut() {
            node.rect.translate(delta);
        }
        graph.offset[0] += delta[0];
        graph.offset[1] += delta[1];
    }

    /// Start a connection drag from `source`.
    ///
    /// Returns whether a drag is now active (stale sources are ignored).
    pub fn begin_drag(
        &self,
        graph: &mut RoomNodeGraph,
        source: NodeId,
        at: [f32; 2],
    ) -> Result<bool, GraphError> {
        graph.ensure_issued(source)?;
        if !graph.contains(source) {
            return Ok(false);
        }
        graph.drag.begin(source, at);
        Ok(true)
    }

    /// Move the free end of the drag line
    pub fn update_drag_position(&self, graph: &mut RoomNodeGraph, pos: [f32; 2]) {
        graph.drag.move_to(pos);
    }

    /// Move the free end of the drag line by a delta
    pub fn drag_line_by(&self, graph: &mut RoomNodeGraph, delta: [f32; 2]) {
        graph.drag.move_by(delta);
    }

    /// Abandon the drag
    pub fn cancel_drag(&self, graph: &mut RoomNodeGraph) {
        graph.drag.finish();
    }

    /// Finish the drag over `target` (or over empty canvas)
    pub fn resolve_drag(
        &self,
        graph: &mut RoomNodeGraph,
        target: Option<NodeId>,
    ) -> DragResolution {
        let Some(parent) = graph.drag.finish() else {
            return DragResolution::NotDragging;
        };
        let Some(child) = target else {
            return DragResolution::Dropped;
        };

        match self.try_connect(graph, parent, child) {
            Ok(()) => DragResolution::Connected { parent, child },
            Err(reason) => DragResolution::Rejected(reason),
        }
    }

    /// Finish the drag over whatever node is under `point`
    pub fn resolve_drag_at(&self, graph: &mut RoomNodeGraph, point: [f32; 2]) -> DragResolution {
        let target = graph.node_at(point);
        self.resolve_drag(graph, target)
    }
}

/// Remove both sides of an edge
fn sever(graph: &mut RoomNodeGraph, parent: NodeId, child: NodeId) {
    if let Some(node) = graph.node_mut(parent) {
        node.remove_child(child);
    }
    if let Some(node) = graph.node_mut(child) {
        node.remove_parent(parent);
    }
}

fn cascade_delete(graph: &mut RoomNodeGraph, id: NodeId) -> bool {
    let Some(node) = graph.node(id) else {
        return false;
    };
    let children = node.children().to_vec();
    let parents = node.parents().to_vec();

    for child in children {
        if let Some(child) = graph.node_mut(child) {
            child.remove_parent(id);
        }
    }
    for parent in parents {
        if let Some(parent) = graph.node_mut(parent) {
            parent.remove_child(id);
        }
    }

    if graph.drag.source() == Some(id) {
        graph.drag.finish();
    }

    graph.remove_node(id);
    tracing::debug!("Deleted node {}", id);
    true
}

fn clear_selection(graph: &mut RoomNodeGraph) {
    for node in graph.nodes_mut() {
        node.selected = false;
    }
}

/// Why a node's type could not be changed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetypeError {
    /// Connected nodes keep their type
    #[error("Room has a parent; disconnect it before changing its type")]
    NodeHasParent,

    /// The entrance keeps its type
    #[error("The entrance type cannot be changed")]
    EntranceIsFixed,

    /// Only one entrance exists per graph
    #[error("Rooms cannot be turned into an entrance")]
    CannotBecomeEntrance,

    /// Caller passed an ID or type the graph does not know
    #[error(transparent)]
    Graph(#[from] GraphError),
}
