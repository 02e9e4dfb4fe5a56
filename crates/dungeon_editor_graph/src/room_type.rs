// SPDX-License-Identifier: MIT OR Apache-2.0
//! Room type definitions and the registry loaded from configuration.
//!
//! Room types are immutable once loaded. Nodes reference them by
//! [`RoomTypeId`] and the registry is shared read-only between graphs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Identifier of a room type (stable across saves)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomTypeId(pub String);

impl RoomTypeId {
    /// Create a room type ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomTypeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Structural category of a room node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomType {
    /// Unique type identifier
    pub id: RoomTypeId,
    /// Display name
    pub name: String,
    /// Offered to the user when picking a node's type
    #[serde(default = "default_true")]
    pub displayable: bool,
    /// Corridor (must alternate with rooms)
    #[serde(default)]
    pub is_corridor: bool,
    /// North/south corridor variant, placed by the level builder
    #[serde(default)]
    pub is_corridor_ns: bool,
    /// East/west corridor variant, placed by the level builder
    #[serde(default)]
    pub is_corridor_ew: bool,
    /// Dungeon entrance (always a root)
    #[serde(default)]
    pub is_entrance: bool,
    /// Boss room (at most one connected per graph)
    #[serde(default)]
    pub is_boss_room: bool,
    /// Unassigned placeholder
    #[serde(default)]
    pub is_none: bool,
}

fn default_true() -> bool {
    true
}

impl RoomType {
    /// Create a plain, displayable room type with no flags set
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: RoomTypeId::new(id),
            name: name.into(),
            displayable: true,
            is_corridor: false,
            is_corridor_ns: false,
            is_corridor_ew: false,
            is_entrance: false,
            is_boss_room: false,
            is_none: false,
        }
    }

    /// Mark as a corridor
    pub fn corridor(mut self) -> Self {
        self.is_corridor = true;
        self
    }

    /// Mark as the entrance
    pub fn entrance(mut self) -> Self {
        self.is_entrance = true;
        self
    }

    /// Mark as a boss room
    pub fn boss_room(mut self) -> Self {
        self.is_boss_room = true;
        self
    }

    /// Mark as the unassigned placeholder
    pub fn unassigned(mut self) -> Self {
        self.is_none = true;
        self
    }

    /// Hide from the type picker
    pub fn hidden(mut self) -> Self {
        self.displayable = false;
        self
    }
}

/// Registry of available room types
#[derive(Debug, Clone, Default)]
pub struct RoomTypeRegistry {
    types: IndexMap<RoomTypeId, RoomType>,
}

impl RoomTypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of types; later duplicates replace earlier ones
    pub fn from_types(types: impl IntoIterator<Item = RoomType>) -> Self {
        let mut registry = Self::new();
        for room_type in types {
            registry.register(room_type);
        }
        registry
    }

    /// Register a room type
    pub fn register(&mut self, room_type: RoomType) {
        self.types.insert(room_type.id.clone(), room_type);
    }

    /// Get a room type by ID
    pub fn get(&self, id: &RoomTypeId) -> Option<&RoomType> {
        self.types.get(id)
    }

    /// Check whether a type is registered
    pub fn contains(&self, id: &RoomTypeId) -> bool {
        self.types.contains_key(id)
    }

    /// Get all registered types in configuration order
    pub fn types(&self) -> impl Iterator<Item = &RoomType> {
        self.types.values()
    }

    /// Types offered in the type picker
    pub fn displayable(&self) -> impl Iterator<Item = &RoomType> {
        self.types.values().filter(|t| t.displayable)
    }

    /// The entrance type
    pub fn entrance(&self) -> Option<&RoomType> {
        self.types.values().find(|t| t.is_entrance)
    }

    /// The unassigned placeholder type
    pub fn unassigned(&self) -> Option<&RoomType> {
        self.types.values().find(|t| t.is_none)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Report configuration problems (the registry stays usable either way)
    pub fn validate(&self) -> Vec<RegistryIssue> {
        let mut issues = Vec::new();

        let entrances = self.types.values().filter(|t| t.is_entrance).count();
        if entrances != 1 {
            issues.push(RegistryIssue::EntranceCount(entrances));
        }

        let unassigned = self.types.values().filter(|t| t.is_none).count();
        if unassigned != 1 {
            issues.push(RegistryIssue::UnassignedCount(unassigned));
        }

        for room_type in self.types.values() {
            if room_type.name.trim().is_empty() {
                issues.push(RegistryIssue::EmptyName(room_type.id.clone()));
            }
        }

        issues
    }

    /// Parse a registry from a RON list of room types
    pub fn from_ron(source: &str) -> Result<Self, ron::error::SpannedError> {
        let types: Vec<RoomType> = ron::from_str(source)?;
        Ok(Self::from_types(types))
    }

    /// Serialize the registry to a RON list
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        let types: Vec<&RoomType> = self.types.values().collect();
        ron::ser::to_string_pretty(&types, ron::ser::PrettyConfig::default())
    }

    /// Load a registry from a RON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let registry = Self::from_ron(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        for issue in registry.validate() {
            tracing::warn!("Room type configuration {:?}: {}", path, issue);
        }

        tracing::info!("Loaded {} room types from {:?}", registry.len(), path);
        Ok(registry)
    }

    /// The room types used by the stock dungeon builder
    pub fn dungeon_defaults() -> Self {
        let mut corridor_ns = RoomType::new("corridor_ns", "CorridorNS").hidden();
        corridor_ns.is_corridor_ns = true;
        let mut corridor_ew = RoomType::new("corridor_ew", "CorridorEW").hidden();
        corridor_ew.is_corridor_ew = true;

        Self::from_types([
            RoomType::new("none", "None").unassigned(),
            RoomType::new("entrance", "Entrance").entrance().hidden(),
            RoomType::new("corridor", "Corridor").corridor(),
            corridor_ns,
            corridor_ew,
            RoomType::new("small_room", "Small Room"),
            RoomType::new("medium_room", "Medium Room"),
            RoomType::new("large_room", "Large Room"),
            RoomType::new("chest_room", "Chest Room"),
            RoomType::new("boss_room", "Boss Room").boss_room(),
        ])
    }
}

/// Problem found in a room type configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryIssue {
    /// Not exactly one entrance type
    #[error("expected exactly one entrance type, found {0}")]
    EntranceCount(usize),

    /// Not exactly one unassigned type
    #[error("expected exactly one unassigned type, found {0}")]
    UnassignedCount(usize),

    /// A type has an empty display name
    #[error("room type {0} has an empty name")]
    EmptyName(RoomTypeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_well_formed() {
        let registry = RoomTypeRegistry::dungeon_defaults();
        assert!(registry.validate().is_empty());
        assert_eq!(registry.entrance().map(|t| t.id.as_str()), Some("entrance"));
        assert_eq!(registry.unassigned().map(|t| t.id.as_str()), Some("none"));
    }

    #[test]
    fn test_displayable_hides_builder_types() {
        let registry = RoomTypeRegistry::dungeon_defaults();
        let names: Vec<_> = registry.displayable().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"Corridor"));
        assert!(!names.contains(&"Entrance"));
        assert!(!names.contains(&"CorridorNS"));
    }

    #[test]
    fn test_ron_round_trip_keeps_order() {
        let registry = RoomTypeRegistry::dungeon_defaults();
        let ron = registry.to_ron().unwrap();
        let loaded = RoomTypeRegistry::from_ron(&ron).unwrap();

        let before: Vec<_> = registry.types().map(|t| t.id.clone()).collect();
        let after: Vec<_> = loaded.types().map(|t| t.id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_flags_default_when_omitted() {
        let loaded = RoomTypeRegistry::from_ron(
            r#"[
                (id: "hall", name: "Hall"),
                (id: "gap", name: "Gap", is_none: true, displayable: false),
            ]"#,
        )
        .unwrap();

        let hall = loaded.get(&RoomTypeId::from("hall")).unwrap();
        assert!(hall.displayable);
        assert!(!hall.is_corridor);
        assert!(loaded.unassigned().is_some());
        assert_eq!(loaded.validate(), vec![RegistryIssue::EntranceCount(0)]);
    }

    #[test]
    fn test_validate_reports_duplicate_flags() {
        let registry = RoomTypeRegistry::from_types([
            RoomType::new("a", "A").entrance(),
            RoomType::new("b", "B").entrance(),
            RoomType::new("c", " ").unassigned(),
        ]);
        let issues = registry.validate();
        assert!(issues.contains(&RegistryIssue::EntranceCount(2)));
        assert!(issues.contains(&RegistryIssue::EmptyName(RoomTypeId::from("c"))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("room_types.ron");
        std::fs::write(&path, RoomTypeRegistry::dungeon_defaults().to_ron().unwrap()).unwrap();

        let loaded = RoomTypeRegistry::load(&path).unwrap();
        assert_eq!(loaded.len(), 10);
    }
}
