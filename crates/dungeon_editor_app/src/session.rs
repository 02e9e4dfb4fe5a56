// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editing session: configuration, the open document and script replay.

use anyhow::Context;
use dungeon_editor_graph::settings::SETTINGS_FILE_NAME;
use dungeon_editor_graph::{
    EditCommand, EditEngine, EditOutcome, EditorSettings, GraphDocument, GraphError, NodeId,
    RoomNodeGraph, RoomTypeRegistry,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default room type file name
pub const ROOM_TYPES_FILE_NAME: &str = "room_types.ron";

/// On-disk encoding, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Rusty Object Notation
    Ron,
    /// JSON
    Json,
}

impl FileFormat {
    /// Detect the format of `path`
    pub fn from_path(path: &Path) -> Result<Self, SessionError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Ok(Self::Ron),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            _ => Err(SessionError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Session errors that are not plain IO or parse failures
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Neither `.ron` nor `.json`
    #[error("Unsupported file type {0:?} (expected .ron or .json)")]
    UnsupportedFormat(PathBuf),

    /// A script step broke the engine contract
    #[error("Step {index} ({command}) failed: {source}")]
    Command {
        /// Zero-based step index
        index: usize,
        /// Command name
        command: &'static str,
        /// Underlying violation
        #[source]
        source: GraphError,
    },
}

/// Settings and room types a session runs with
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Engine tunables
    pub settings: EditorSettings,
    /// Room types shared by every graph
    pub room_types: Arc<RoomTypeRegistry>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settings: EditorSettings::default(),
            room_types: Arc::new(RoomTypeRegistry::dungeon_defaults()),
        }
    }
}

impl SessionConfig {
    /// Load configuration.
    ///
    /// Explicit paths must exist. Without one, the settings file in the
    /// working directory is used when present and the built-in room types
    /// otherwise.
    pub fn load(settings: Option<&Path>, room_types: Option<&Path>) -> anyhow::Result<Self> {
        let settings = match settings {
            Some(path) => EditorSettings::load(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => EditorSettings::load_or_default(Path::new(SETTINGS_FILE_NAME))?,
        };

        let room_types = match room_types {
            Some(path) => RoomTypeRegistry::load(path)
                .with_context(|| format!("Failed to load room types from {}", path.display()))?,
            None => RoomTypeRegistry::dungeon_defaults(),
        };

        tracing::debug!(
            "Session config: {} room types, max {} child corridors",
            room_types.len(),
            settings.max_child_corridors
        );

        Ok(Self {
            settings,
            room_types: Arc::new(room_types),
        })
    }

    /// Write the current configuration into `dir`
    pub fn write_to(&self, dir: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(dir)?;
        self.settings.save(&dir.join(SETTINGS_FILE_NAME))?;
        std::fs::write(dir.join(ROOM_TYPES_FILE_NAME), self.room_types.to_ron()?)?;
        tracing::info!("Wrote configuration to {}", dir.display());
        Ok(())
    }
}

/// One recorded script entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// The edit
    pub command: EditCommand,
    /// Placeholder ID the created node is referred to by in later steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creates: Option<NodeId>,
}

/// Read a script of steps from a RON or JSON file
pub fn load_script(path: &Path) -> anyhow::Result<Vec<ScriptStep>> {
    let format = FileFormat::from_path(path)?;
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let steps: Vec<ScriptStep> = match format {
        FileFormat::Ron => ron::from_str(&contents)?,
        FileFormat::Json => serde_json::from_str(&contents)?,
    };
    Ok(steps)
}

/// Summary of a replayed script
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptReport {
    /// Steps that took effect
    pub applied: usize,
    /// Steps refused by the layout rules
    pub rejected: usize,
    /// Nodes created, in order
    pub created: Vec<NodeId>,
}

/// Counts describing a graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Graph name
    pub name: String,
    /// Node count
    pub nodes: usize,
    /// Edge count
    pub edges: usize,
    /// Entrance nodes
    pub entrances: usize,
    /// Corridor nodes
    pub corridors: usize,
    /// Boss rooms
    pub boss_rooms: usize,
    /// Nodes without an assigned type
    pub unassigned: usize,
}

impl GraphStats {
    /// Gather counts from `graph`
    pub fn of(graph: &RoomNodeGraph) -> Self {
        let mut stats = Self {
            name: graph.name.clone(),
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            entrances: 0,
            corridors: 0,
            boss_rooms: 0,
            unassigned: 0,
        };

        for room_type in graph.node_ids().filter_map(|id| graph.room_type_of(id)) {
            stats.entrances += usize::from(room_type.is_entrance);
            stats.corridors += usize::from(room_type.is_corridor);
            stats.boss_rooms += usize::from(room_type.is_boss_room);
            stats.unassigned += usize::from(room_type.is_none);
        }

        stats
    }
}

/// A graph opened for editing
#[derive(Debug)]
pub struct EditSession {
    engine: EditEngine,
    graph: RoomNodeGraph,
}

impl EditSession {
    /// Start a new graph containing only the entrance
    pub fn create(config: &SessionConfig, name: impl Into<String>) -> anyhow::Result<Self> {
        let engine = EditEngine::new(config.settings.clone());
        let mut graph = RoomNodeGraph::new(name, Arc::clone(&config.room_types));

        let entrance = config
            .room_types
            .entrance()
            .ok_or(GraphError::MissingEntranceType)?
            .id
            .clone();
        let position = engine.settings().entrance_position;
        engine.add_node(&mut graph, &entrance, position)?;

        tracing::info!("Created graph '{}'", graph.name);
        Ok(Self { engine, graph })
    }

    /// Open a document from disk
    pub fn open(config: &SessionConfig, path: &Path) -> anyhow::Result<Self> {
        let document = match FileFormat::from_path(path)? {
            FileFormat::Ron => GraphDocument::load(path)?,
            FileFormat::Json => {
                let contents = std::fs::read_to_string(path)?;
                let document: GraphDocument = serde_json::from_str(&contents)?;
                tracing::info!("Loaded graph '{}' from {:?}", document.name, path);
                document
            }
        };

        let graph = RoomNodeGraph::from_document(document, Arc::clone(&config.room_types))
            .with_context(|| format!("Invalid graph document {}", path.display()))?;

        Ok(Self {
            engine: EditEngine::new(config.settings.clone()),
            graph,
        })
    }

    /// Save the graph, picking the format from the extension
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let document = self.graph.to_document();
        match FileFormat::from_path(path)? {
            FileFormat::Ron => document.save(path)?,
            FileFormat::Json => {
                std::fs::write(path, serde_json::to_string_pretty(&document)?)?;
                tracing::info!("Saved graph '{}' to {:?}", document.name, path);
            }
        }
        Ok(())
    }

    /// The open graph
    pub fn graph(&self) -> &RoomNodeGraph {
        &self.graph
    }

    /// Apply script steps in order.
    ///
    /// Rejected edits are logged and counted; a contract violation stops
    /// the replay.
    pub fn replay(
        &mut self,
        steps: impl IntoIterator<Item = ScriptStep>,
    ) -> Result<ScriptReport, SessionError> {
        let mut report = ScriptReport::default();
        let mut placeholders: HashMap<NodeId, NodeId> = HashMap::new();

        for (index, step) in steps.into_iter().enumerate() {
            let mut command = step.command;
            command.remap_nodes(|id| placeholders.get(&id).copied().unwrap_or(id));
            let name = command.description();

            let outcome = self
                .engine
                .apply(&mut self.graph, command)
                .map_err(|source| SessionError::Command { index, command: name, source })?;

            if outcome.is_rejected() {
                tracing::warn!("Step {} ({}) rejected: {:?}", index, name, outcome);
                report.rejected += 1;
                continue;
            }

            if let EditOutcome::NodeAdded(id) = outcome {
                if let Some(placeholder) = step.creates {
                    placeholders.insert(placeholder, id);
                }
                report.created.push(id);
            }
            report.applied += 1;
        }

        tracing::info!(
            "Replayed {} steps ({} rejected)",
            report.applied + report.rejected,
            report.rejected
        );
        Ok(report)
    }

    /// Counts for the open graph
    pub fn stats(&self) -> GraphStats {
        GraphStats::of(&self.graph)
    }
}
