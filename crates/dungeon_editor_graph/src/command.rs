// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edit commands: the single entry point a host maps its gestures onto.

use crate::connection::RejectReason;
use crate::drag::DragResolution;
use crate::edit::{EditEngine, RetypeError};
use crate::graph::{GraphError, RoomNodeGraph};
use crate::node::NodeId;
use crate::room_type::RoomTypeId;
use serde::{Deserialize, Serialize};

/// A user-level edit on a room node graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditCommand {
    /// Add an unassigned room (seeding the entrance on an empty graph)
    CreateRoomNode {
        /// Top-left corner
        position: [f32; 2],
    },
    /// Add a room of a specific type
    AddNode {
        /// Room type
        room_type: RoomTypeId,
        /// Top-left corner
        position: [f32; 2],
    },
    /// Connect `parent -> child`
    Connect {
        /// Parent node
        parent: NodeId,
        /// Child node
        child: NodeId,
    },
    /// Remove the edge `parent -> child`
    Disconnect {
        /// Parent node
        parent: NodeId,
        /// Child node
        child: NodeId,
    },
    /// Delete one node and its edges
    DeleteNode {
        /// Node to delete
        id: NodeId,
    },
    /// Delete the selected nodes (entrances are kept)
    DeleteSelectedNodes,
    /// Remove edges between selected nodes
    DeleteSelectedLinks,
    /// Set a node's selection flag
    SetSelected {
        /// Node
        id: NodeId,
        /// New flag
        selected: bool,
    },
    /// Flip a node's selection flag
    ToggleSelected {
        /// Node
        id: NodeId,
    },
    /// Select every node
    SelectAll,
    /// Deselect every node
    ClearSelection,
    /// Change the type of an unconnected node
    SetRoomType {
        /// Node
        id: NodeId,
        /// New room type
        room_type: RoomTypeId,
    },
    /// Move one node
    MoveNode {
        /// Node
        id: NodeId,
        /// Offset
        delta: [f32; 2],
    },
    /// Pan the canvas
    Pan {
        /// Offset
        delta: [f32; 2],
    },
    /// Start dragging a connection out of `source`
    BeginDrag {
        /// Prospective parent
        source: NodeId,
        /// Where the line starts
        position: [f32; 2],
    },
    /// Move the free end of the drag line
    UpdateDrag {
        /// New position
        position: [f32; 2],
    },
    /// Release the drag over a node, or over nothing
    ResolveDrag {
        /// Drop target
        target: Option<NodeId>,
    },
    /// Release the drag at a canvas position
    ResolveDragAt {
        /// Release position
        position: [f32; 2],
    },
    /// Abandon the drag
    CancelDrag,
}

impl EditCommand {
    /// Human-readable name of the command
    pub fn description(&self) -> &'static str {
        match self {
            Self::CreateRoomNode { .. } => "Create Room Node",
            Self::AddNode { .. } => "Add Node",
            Self::Connect { .. } => "Connect Rooms",
            Self::Disconnect { .. } => "Disconnect Rooms",
            Self::DeleteNode { .. } => "Delete Room Node",
            Self::DeleteSelectedNodes => "Delete Selected Room Nodes",
            Self::DeleteSelectedLinks => "Delete Selected Room Node Links",
            Self::SetSelected { .. } => "Set Selection",
            Self::ToggleSelected { .. } => "Toggle Selection",
            Self::SelectAll => "Select All Room Nodes",
            Self::ClearSelection => "Clear Selection",
            Self::SetRoomType { .. } => "Set Room Type",
            Self::MoveNode { .. } => "Move Node",
            Self::Pan { .. } => "Pan",
            Self::BeginDrag { .. } => "Begin Connection",
            Self::UpdateDrag { .. } => "Drag Connection",
            Self::ResolveDrag { .. } | Self::ResolveDragAt { .. } => "Finish Connection",
            Self::CancelDrag => "Cancel Connection",
        }
    }

    /// Rewrite every node ID the command refers to.
    ///
    /// Used when replaying a recorded command against a graph whose nodes
    /// were created afresh.
    pub fn remap_nodes(&mut self, mut map: impl FnMut(NodeId) -> NodeId) {
        match self {
            Self::Connect { parent, child } | Self::Disconnect { parent, child } => {
                *parent = map(*parent);
                *child = map(*child);
            }
            Self::DeleteNode { id }
            | Self::SetSelected { id, .. }
            | Self::ToggleSelected { id }
            | Self::SetRoomType { id, .. }
            | Self::MoveNode { id, .. }
            | Self::BeginDrag { source: id, .. }
            | Self::ResolveDrag { target: Some(id) } => *id = map(*id),
            Self::CreateRoomNode { .. }
            | Self::AddNode { .. }
            | Self::DeleteSelectedNodes
            | Self::DeleteSelectedLinks
            | Self::SelectAll
            | Self::ClearSelection
            | Self::Pan { .. }
            | Self::UpdateDrag { .. }
            | Self::ResolveDrag { target: None }
            | Self::ResolveDragAt { .. }
            | Self::CancelDrag => {}
        }
    }
}

/// What an applied command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Command took effect (or was a harmless no-op)
    Applied,
    /// A node was created
    NodeAdded(NodeId),
    /// Batch operation removed this many nodes or links
    Removed(usize),
    /// Edge refused by the layout rules
    Rejected(RejectReason),
    /// Type change refused
    RetypeRejected(RetypeError),
    /// Drag ended
    Drag(DragResolution),
}

impl EditOutcome {
    /// Whether the layout rules refused the command
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            Self::Rejected(_) | Self::RetypeRejected(_) | Self::Drag(DragResolution::Rejected(_))
        )
    }
}

impl EditEngine {
    /// Apply a command to `graph`.
    ///
    /// Layout refusals come back as outcomes; `Err` is reserved for
    /// caller bugs such as IDs from another graph.
    pub fn apply(
        &self,
        graph: &mut RoomNodeGraph,
        command: EditCommand,
    ) -> Result<EditOutcome, GraphError> {
        tracing::trace!("Applying {}", command.description());

        let outcome = match command {
            EditCommand::CreateRoomNode { position } => {
                EditOutcome::NodeAdded(self.create_room_node(graph, position)?)
            }
            EditCommand::AddNode { room_type, position } => {
                EditOutcome::NodeAdded(self.add_node(graph, &room_type, position)?)
            }
            EditCommand::Connect { parent, child } => {
                graph.ensure_issued(parent)?;
                graph.ensure_issued(child)?;
                match self.try_connect(graph, parent, child) {
                    Ok(()) => EditOutcome::Applied,
                    Err(reason) => EditOutcome::Rejected(reason),
                }
            }
            EditCommand::Disconnect { parent, child } => {
                self.disconnect(graph, parent, child)?;
                EditOutcome::Applied
            }
            EditCommand::DeleteNode { id } => {
                let removed = self.delete_node(graph, id)?;
                EditOutcome::Removed(usize::from(removed))
            }
            EditCommand::DeleteSelectedNodes => {
                EditOutcome::Removed(self.delete_selected_nodes_only(graph))
            }
            EditCommand::DeleteSelectedLinks => {
                EditOutcome::Removed(self.delete_selected_with_links(graph))
            }
            EditCommand::SetSelected { id, selected } => {
                self.set_selected(graph, id, selected)?;
                EditOutcome::Applied
            }
            EditCommand::ToggleSelected { id } => {
                self.toggle_selected(graph, id)?;
                EditOutcome::Applied
            }
            EditCommand::SelectAll => {
                self.select_all(graph);
                EditOutcome::Applied
            }
            EditCommand::ClearSelection => {
                self.clear_selection(graph);
                EditOutcome::Applied
            }
            EditCommand::SetRoomType { id, room_type } => {
                match self.set_room_type(graph, id, &room_type) {
                    Ok(()) => EditOutcome::Applied,
                    Err(RetypeError::Graph(err)) => return Err(err),
                    Err(err) => EditOutcome::RetypeRejected(err),
                }
            }
            EditCommand::MoveNode { id, delta } => {
                self.move_node(graph, id, delta)?;
                EditOutcome::Applied
            }
            EditCommand::Pan { delta } => {
                self.pan(graph, delta);
                EditOutcome::Applied
            }
            EditCommand::BeginDrag { source, position } => {
                self.begin_drag(graph, source, position)?;
                EditOutcome::Applied
            }
            EditCommand::UpdateDrag { position } => {
                self.update_drag_position(graph, position);
                EditOutcome::Applied
            }
            EditCommand::ResolveDrag { target } => {
                if let Some(target) = target {
                    graph.ensure_issued(target)?;
                }
                EditOutcome::Drag(self.resolve_drag(graph, target))
            }
            EditCommand::ResolveDragAt { position } => {
                EditOutcome::Drag(self.resolve_drag_at(graph, position))
            }
            EditCommand::CancelDrag => {
                self.cancel_drag(graph);
                EditOutcome::Applied
            }
        };

        Ok(outcome)
    }
}
