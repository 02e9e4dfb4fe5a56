// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge admissibility rules for dungeon layouts.
//!
//! Checks run in a fixed order and the first failure is reported, so the
//! same proposal always yields the same reason.

use crate::graph::RoomNodeGraph;
use crate::node::NodeId;

/// Why a proposed parent -> child edge was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    /// An endpoint is not in the graph
    #[error("Node not found: {0}")]
    UnknownNode(NodeId),

    /// Another boss room already has a parent
    #[error("A boss room is already connected")]
    BossRoomAlreadyConnected,

    /// Child still has the unassigned type
    #[error("Unassigned rooms cannot be connected")]
    CannotConnectUnassignedType,

    /// Edge already exists
    #[error("Rooms are already connected")]
    DuplicateEdge,

    /// Parent and child are the same node
    #[error("A room cannot connect to itself")]
    SelfLoop,

    /// Child is the parent's own parent
    #[error("Connection would create a cycle")]
    ImmediateCycle,

    /// Child already has a parent
    #[error("Room already has a parent")]
    ChildAlreadyHasParent,

    /// Corridor connected to corridor
    #[error("Corridors cannot connect to corridors")]
    CorridorToCorridor,

    /// Room connected to room
    #[error("Rooms must be joined by a corridor")]
    RoomToRoomWithoutCorridor,

    /// Parent already has the maximum number of corridors
    #[error("Room already has the maximum number of corridors")]
    TooManyCorridors,

    /// Child is the entrance
    #[error("The entrance must be the top-level room")]
    EntranceCannotBeChild,

    /// Corridor already leads to a room
    #[error("Corridor already leads to a room")]
    CorridorAlreadyHasRoom,
}

/// Decide whether `parent -> child` may be added to `graph`.
///
/// Pure check: the graph is only borrowed, so a refusal can never leave a
/// half-recorded edge behind.
pub fn check_connection(
    graph: &RoomNodeGraph,
    parent_id: NodeId,
    child_id: NodeId,
    max_child_corridors: usize,
) -> Result<(), RejectReason> {
    let (Some(child), Some(child_type)) = (graph.node(child_id), graph.room_type_of(child_id))
    else {
        return Err(RejectReason::UnknownNode(child_id));
    };
    let (Some(parent), Some(parent_type)) = (graph.node(parent_id), graph.room_type_of(parent_id))
    else {
        return Err(RejectReason::UnknownNode(parent_id));
    };

    if child_type.is_boss_room && has_connected_boss_room(graph) {
        return Err(RejectReason::BossRoomAlreadyConnected);
    }

    if child_type.is_none {
        return Err(RejectReason::CannotConnectUnassignedType);
    }

    if parent.has_child(child_id) {
        return Err(RejectReason::DuplicateEdge);
    }

    if parent_id == child_id {
        return Err(RejectReason::SelfLoop);
    }

    if parent.has_parent(child_id) {
        return Err(RejectReason::ImmediateCycle);
    }

    if !child.parents().is_empty() {
        return Err(RejectReason::ChildAlreadyHasParent);
    }

    if child_type.is_corridor && parent_type.is_corridor {
        return Err(RejectReason::CorridorToCorridor);
    }

    if !child_type.is_corridor && !parent_type.is_corridor {
        return Err(RejectReason::RoomToRoomWithoutCorridor);
    }

    if child_type.is_corridor && parent.children().len() >= max_child_corridors {
        return Err(RejectReason::TooManyCorridors);
    }

    if child_type.is_entrance {
        return Err(RejectReason::EntranceCannotBeChild);
    }

    // Counts every child, not only rooms
    if !child_type.is_corridor && !parent.children().is_empty() {
        return Err(RejectReason::CorridorAlreadyHasRoom);
    }

    Ok(())
}

/// Whether any boss room in the graph already has a parent
pub fn has_connected_boss_room(graph: &RoomNodeGraph) -> bool {
    graph.nodes().any(|node| {
        !node.parents().is_empty()
            && graph
                .room_types()
                .get(&node.room_type)
                .is_some_and(|t| t.is_boss_room)
    })
}
