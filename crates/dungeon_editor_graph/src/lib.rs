// SPDX-License-Identifier: MIT OR Apache-2.0
//! Room node graph core for the dungeon layout editor.
//!
//! Nodes are rooms or corridors, edges are parent to child connectivity.
//! The crate keeps the graph a legal dungeon layout while it is edited
//! interactively.
//!
//! ## Architecture
//!
//! - [`RoomNodeGraph`] owns nodes, the id index, selection and drag state
//! - [`EditEngine`] validates and applies every mutation
//! - [`EditCommand`] is the single entry point a host maps gestures onto
//! - [`GraphDocument`] is the flat form used for persistence

pub mod room_type;
pub mod node;
pub mod graph;
pub mod connection;
pub mod drag;
pub mod edit;
pub mod command;
pub mod document;
pub mod settings;

pub use command::{EditCommand, EditOutcome};
pub use connection::RejectReason;
pub use document::{DocumentError, GraphDocument, NodeRecord};
pub use drag::{ConnectionDrag, DragResolution};
pub use edit::{EditEngine, RetypeError};
pub use graph::{GraphError, GraphId, RoomNodeGraph};
pub use node::{NodeId, NodeRect, RoomNode};
pub use room_type::{RoomType, RoomTypeId, RoomTypeRegistry};
pub use settings::{EditorSettings, SettingsError};
