// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persistence hooks: flat document form of a room node graph.
//!
//! The host decides where and how documents are stored; RON helpers are
//! provided for convenience. Loading validates the document and rebuilds
//! the id index.

use crate::graph::{GraphId, RoomNodeGraph};
use crate::node::{NodeId, NodeRect, RoomNode, DEFAULT_NODE_NAME};
use crate::room_type::{RoomTypeId, RoomTypeRegistry};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

/// Current document format version
pub const DOCUMENT_FORMAT_VERSION: u32 = 1;

/// Serialized form of one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node ID
    pub id: NodeId,
    /// Room type reference
    pub room_type: RoomTypeId,
    /// Display name
    #[serde(default = "default_node_name")]
    pub name: String,
    /// Layout
    pub rect: NodeRect,
    /// Child IDs in order
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Parent IDs in order
    #[serde(default)]
    pub parents: Vec<NodeId>,
}

fn default_node_name() -> String {
    DEFAULT_NODE_NAME.to_string()
}

/// Serialized form of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Format version
    pub version: u32,
    /// Document ID
    pub id: GraphId,
    /// Graph name
    pub name: String,
    /// Nodes in insertion order
    pub nodes: Vec<NodeRecord>,
}

impl GraphDocument {
    /// Serialize to RON
    pub fn to_ron(&self) -> Result<String, DocumentError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Deserialize from RON
    pub fn from_ron(source: &str) -> Result<Self, DocumentError> {
        Ok(ron::from_str(source)?)
    }

    /// Write to a RON file
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_ron()?)?;
        tracing::info!("Saved graph '{}' ({} nodes) to {:?}", self.name, self.nodes.len(), path);
        Ok(())
    }

    /// Read from a RON file
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let contents = std::fs::read_to_string(path)?;
        let document = Self::from_ron(&contents)?;
        tracing::info!("Loaded graph '{}' from {:?}", document.name, path);
        Ok(document)
    }
}

impl RoomNodeGraph {
    /// Snapshot the graph as a document
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            version: DOCUMENT_FORMAT_VERSION,
            id: self.id,
            name: self.name.clone(),
            nodes: self
                .nodes()
                .map(|n| NodeRecord {
                    id: n.id,
                    room_type: n.room_type.clone(),
                    name: n.name.clone(),
                    rect: n.rect,
                    children: n.children().to_vec(),
                    parents: n.parents().to_vec(),
                })
                .collect(),
        }
    }

    /// Rebuild a graph from a document, checking its structure
    pub fn from_document(
        document: GraphDocument,
        room_types: Arc<RoomTypeRegistry>,
    ) -> Result<Self, DocumentError> {
        if document.version > DOCUMENT_FORMAT_VERSION {
            return Err(DocumentError::UnsupportedVersion(document.version));
        }

        let mut records: HashMap<NodeId, &NodeRecord> =
            HashMap::with_capacity(document.nodes.len());
        for record in &document.nodes {
            if records.insert(record.id, record).is_some() {
                return Err(DocumentError::DuplicateNode(record.id));
            }
        }

        for record in &document.nodes {
            validate_record(record, &records, &room_types)?;
        }

        let connected_bosses = document
            .nodes
            .iter()
            .filter(|r| !r.parents.is_empty())
            .filter(|r| room_types.get(&r.room_type).is_some_and(|t| t.is_boss_room))
            .count();
        if connected_bosses > 1 {
            return Err(DocumentError::MultipleConnectedBossRooms(connected_bosses));
        }

        let mut graph = RoomNodeGraph::with_id(document.id, document.name.clone(), room_types);
        for record in document.nodes {
            let mut node = RoomNode::new(record.id, record.room_type, record.rect);
            node.name = record.name;
            node.children = record.children;
            node.parents = record.parents;
            // Selection is not persisted
            node.selected = false;
            graph.insert_node(node);
        }

        tracing::debug!(
            "Rebuilt graph {} with {} nodes and {} edges",
            graph.id,
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

fn validate_record(
    record: &NodeRecord,
    records: &HashMap<NodeId, &NodeRecord>,
    room_types: &RoomTypeRegistry,
) -> Result<(), DocumentError> {
    let Some(room_type) = room_types.get(&record.room_type) else {
        return Err(DocumentError::UnknownRoomType {
            node: record.id,
            room_type: record.room_type.clone(),
        });
    };

    if room_type.is_entrance && !record.parents.is_empty() {
        return Err(DocumentError::EntranceHasParent(record.id));
    }

    let mut seen = HashSet::new();
    for &child in &record.children {
        if child == record.id {
            return Err(DocumentError::SelfReference(record.id));
        }
        if !seen.insert(child) {
            return Err(DocumentError::RepeatedEdge { parent: record.id, child });
        }
        let Some(other) = records.get(&child) else {
            return Err(DocumentError::DanglingReference { node: record.id, missing: child });
        };
        if !other.parents.contains(&record.id) {
            return Err(DocumentError::OneSidedEdge { parent: record.id, child });
        }
    }

    seen.clear();
    for &parent in &record.parents {
        if parent == record.id {
            return Err(DocumentError::SelfReference(record.id));
        }
        if !seen.insert(parent) {
            return Err(DocumentError::RepeatedEdge { parent, child: record.id });
        }
        let Some(other) = records.get(&parent) else {
            return Err(DocumentError::DanglingReference { node: record.id, missing: parent });
        };
        if !other.children.contains(&record.id) {
            return Err(DocumentError::OneSidedEdge { parent, child: record.id });
        }
    }

    if record.parents.len() > 1 {
        return Err(DocumentError::MultipleParents(record.id));
    }

    Ok(())
}

/// Error loading or saving a graph document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Written by a newer editor
    #[error("Unsupported document version {0}")]
    UnsupportedVersion(u32),

    /// Same node ID appears twice
    #[error("Duplicate node {0}")]
    DuplicateNode(NodeId),

    /// Node references a type missing from the registry
    #[error("Node {node} has unknown room type {room_type}")]
    UnknownRoomType {
        /// Offending node
        node: NodeId,
        /// Missing type
        room_type: RoomTypeId,
    },

    /// Node references an ID that is not in the document
    #[error("Node {node} references missing node {missing}")]
    DanglingReference {
        /// Offending node
        node: NodeId,
        /// Missing ID
        missing: NodeId,
    },

    /// Edge recorded on one endpoint only
    #[error("Edge {parent} -> {child} is only recorded on one side")]
    OneSidedEdge {
        /// Parent end
        parent: NodeId,
        /// Child end
        child: NodeId,
    },

    /// Edge listed more than once
    #[error("Edge {parent} -> {child} is listed twice")]
    RepeatedEdge {
        /// Parent end
        parent: NodeId,
        /// Child end
        child: NodeId,
    },

    /// Node lists itself as a neighbour
    #[error("Node {0} references itself")]
    SelfReference(NodeId),

    /// Entrance with an incoming edge
    #[error("Entrance {0} has a parent")]
    EntranceHasParent(NodeId),

    /// Node with more than one parent
    #[error("Node {0} has more than one parent")]
    MultipleParents(NodeId),

    /// More than one boss room has a parent
    #[error("{0} boss rooms are connected; at most one may be")]
    MultipleConnectedBossRooms(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Document could not be encoded
    #[error("Encode error: {0}")]
    Encode(#[from] ron::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::EditEngine;

    fn registry() -> Arc<RoomTypeRegistry> {
        Arc::new(RoomTypeRegistry::dungeon_defaults())
    }

    fn sample() -> (RoomNodeGraph, [NodeId; 3]) {
        let engine = EditEngine::default();
        let mut graph = RoomNodeGraph::new("Level 1", registry());
        let entrance = engine.add_node(&mut graph, &"entrance".into(), [0.0, 0.0]).unwrap();
        let corridor = engine.add_node(&mut graph, &"corridor".into(), [200.0, 0.0]).unwrap();
        let boss = engine.add_node(&mut graph, &"boss_room".into(), [400.0, 0.0]).unwrap();
        engine.try_connect(&mut graph, entrance, corridor).unwrap();
        engine.try_connect(&mut graph, corridor, boss).unwrap();
        (graph, [entrance, corridor, boss])
    }

    #[test]
    fn test_document_restores_graph() {
        let (graph, [entrance, corridor, boss]) = sample();
        let restored = RoomNodeGraph::from_document(graph.to_document(), registry()).unwrap();

        assert_eq!(restored.id, graph.id);
        assert_eq!(restored.name, "Level 1");
        assert_eq!(restored.node_ids().collect::<Vec<_>>(), vec![entrance, corridor, boss]);
        assert_eq!(restored.node(corridor).unwrap().children(), &[boss]);
        assert_eq!(restored.node(corridor).unwrap().parents(), &[entrance]);
        assert!(restored.was_issued(boss));
        assert!(!restored.drag().is_active());
        assert!(restored.selected_ids().is_empty());
    }

    #[test]
    fn test_restored_graph_keeps_enforcing_rules() {
        let (graph, _) = sample();
        let mut restored = RoomNodeGraph::from_document(graph.to_document(), registry()).unwrap();
        let engine = EditEngine::default();

        let corridor = engine.add_node(&mut restored, &"corridor".into(), [0.0, 100.0]).unwrap();
        let boss = engine.add_node(&mut restored, &"boss_room".into(), [0.0, 200.0]).unwrap();
        assert_eq!(
            engine.try_connect(&mut restored, corridor, boss),
            Err(crate::connection::RejectReason::BossRoomAlreadyConnected)
        );
    }

    #[test]
    fn test_file_round_trip() {
        let (graph, _) = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.ron");

        graph.to_document().save(&path).unwrap();
        let loaded = GraphDocument::load(&path).unwrap();
        assert_eq!(loaded, graph.to_document());
    }

    #[test]
    fn test_one_sided_edge_rejected() {
        let (graph, [entrance, corridor, _]) = sample();
        let mut document = graph.to_document();
        document.nodes[1].parents.clear();

        let err = RoomNodeGraph::from_document(document, registry()).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::OneSidedEdge { parent, child } if parent == entrance && child == corridor
        ));
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let (graph, [_, corridor, _]) = sample();
        let mut document = graph.to_document();
        document.nodes.pop();

        let err = RoomNodeGraph::from_document(document, registry()).unwrap_err();
        assert!(matches!(err, DocumentError::DanglingReference { node, .. } if node == corridor));
    }

    #[test]
    fn test_structural_problems_rejected() {
        let (graph, [entrance, corridor, _]) = sample();

        let mut duplicated = graph.to_document();
        duplicated.nodes.push(duplicated.nodes[0].clone());
        assert!(matches!(
            RoomNodeGraph::from_document(duplicated, registry()),
            Err(DocumentError::DuplicateNode(id)) if id == entrance
        ));

        let mut unknown = graph.to_document();
        unknown.nodes[1].room_type = "lava".into();
        assert!(matches!(
            RoomNodeGraph::from_document(unknown, registry()),
            Err(DocumentError::UnknownRoomType { node, .. }) if node == corridor
        ));

        let mut newer = graph.to_document();
        newer.version = DOCUMENT_FORMAT_VERSION + 1;
        assert!(matches!(
            RoomNodeGraph::from_document(newer, registry()),
            Err(DocumentError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_entrance_with_parent_rejected() {
        let (graph, [entrance, corridor, _]) = sample();
        let mut document = graph.to_document();
        document.nodes[0].parents.push(corridor);
        document.nodes[1].children.push(entrance);

        assert!(matches!(
            RoomNodeGraph::from_document(document, registry()),
            Err(DocumentError::EntranceHasParent(id)) if id == entrance
        ));
    }

    #[test]
    fn test_repeated_parent_rejected() {
        let (graph, [_, corridor, boss]) = sample();
        let mut document = graph.to_document();
        document.nodes[2].parents.push(corridor);

        assert!(matches!(
            RoomNodeGraph::from_document(document, registry()),
            Err(DocumentError::RepeatedEdge { parent, child })
                if parent == corridor && child == boss
        ));
    }

    #[test]
    fn test_second_parent_rejected() {
        let (mut graph, [_, _, boss]) = sample();
        let side = EditEngine::default()
            .add_node(&mut graph, &"corridor".into(), [0.0, 100.0])
            .unwrap();
        let mut document = graph.to_document();
        document.nodes[3].children.push(boss);
        document.nodes[2].parents.push(side);

        assert!(matches!(
            RoomNodeGraph::from_document(document, registry()),
            Err(DocumentError::MultipleParents(id)) if id == boss
        ));
    }

    #[test]
    fn test_second_connected_boss_rejected() {
        let (mut graph, _) = sample();
        let engine = EditEngine::default();
        let side = engine.add_node(&mut graph, &"corridor".into(), [0.0, 100.0]).unwrap();
        let second = engine.add_node(&mut graph, &"boss_room".into(), [0.0, 200.0]).unwrap();
        let mut document = graph.to_document();
        document.nodes[3].children.push(second);
        document.nodes[4].parents.push(side);

        assert!(matches!(
            RoomNodeGraph::from_document(document, registry()),
            Err(DocumentError::MultipleConnectedBossRooms(2))
        ));
    }

    #[test]
    fn test_minimal_record_defaults() {
        let id = NodeId::new();
        let source = format!(
            r#"(
                version: 1,
                id: "{}",
                name: "Blank",
                nodes: [(
                    id: "{}",
                    room_type: "none",
                    rect: (position: (0.0, 0.0), size: (160.0, 75.0)),
                )],
            )"#,
            GraphId::new(),
            id
        );
        let document = GraphDocument::from_ron(&source).unwrap();
        let graph = RoomNodeGraph::from_document(document, registry()).unwrap();
        assert_eq!(graph.node(id).unwrap().name, DEFAULT_NODE_NAME);
    }
}
