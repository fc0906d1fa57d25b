//! Fixed faction-keyed prototype tables and the per-class resolution table.

use std::{path::Path, sync::Arc};

use bevy::prelude::Resource;
use round_schema::{Faction, MarkerClass, PerFaction, PrototypeId};
use serde::Deserialize;

use crate::catalog::{self, CatalogError, CatalogSource};

pub const BUILTIN_SPAWN_RULES: &str = include_str!("data/spawn_rules.json");
const CATALOG: &str = "spawn rules";

#[derive(Debug, Clone, Deserialize)]
pub struct DoorTables {
    pub command: PerFaction<PrototypeId>,
    pub security: PerFaction<PrototypeId>,
    pub glass: PerFaction<PrototypeId>,
    pub normal: PerFaction<PrototypeId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpawnRules {
    pub doors: DoorTables,
    pub overwatch_console: PerFaction<PrototypeId>,
    pub objectives_console: PerFaction<PrototypeId>,
    pub return_point: PerFaction<PrototypeId>,
    pub dropship_destination: PrototypeId,
    pub navigation_console: PerFaction<PrototypeId>,
    pub weapons_console: PerFaction<PrototypeId>,
}

/// Fixed lookup tables a marker class can resolve through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactionTable {
    CommandDoor,
    SecurityDoor,
    GlassDoor,
    NormalDoor,
    Overwatch,
    Objectives,
    ReturnPoint,
}

/// How a marker class turns into a prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// Table lookup keyed by the pass's effective faction.
    Table(FactionTable),
    /// Table lookup keyed by the marker's own flags, or its parent ship's
    /// faction when the marker has no flags and is aboard a ship.
    MarkerThenShip(FactionTable),
    /// Always the destination prototype, tagged with whatever faction resolved.
    Destination,
    /// The loadout's class → vendor mapping.
    Loadout,
}

impl ResolutionStrategy {
    pub fn for_class(class: MarkerClass) -> Self {
        match class {
            MarkerClass::LockedCommandDoor => Self::Table(FactionTable::CommandDoor),
            MarkerClass::LockedSecurityDoor => Self::Table(FactionTable::SecurityDoor),
            MarkerClass::LockedGlassDoor => Self::Table(FactionTable::GlassDoor),
            MarkerClass::LockedNormalDoor => Self::Table(FactionTable::NormalDoor),
            MarkerClass::OverwatchConsole => Self::MarkerThenShip(FactionTable::Overwatch),
            MarkerClass::ObjectivesConsole => Self::Table(FactionTable::Objectives),
            MarkerClass::ReturnPointGeneric => Self::Table(FactionTable::ReturnPoint),
            MarkerClass::DropshipDestination => Self::Destination,
            _ => Self::Loadout,
        }
    }
}

impl SpawnRules {
    pub fn builtin() -> Arc<Self> {
        Self::from_json_str(BUILTIN_SPAWN_RULES)
            .map(Arc::new)
            .expect("builtin spawn rules should parse")
    }

    pub fn from_json_str(input: &str) -> Result<Self, CatalogError> {
        catalog::parse_json(CATALOG, input)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        Self::from_json_str(&catalog::read_file(CATALOG, path)?)
    }

    pub fn table(&self, table: FactionTable) -> &PerFaction<PrototypeId> {
        match table {
            FactionTable::CommandDoor => &self.doors.command,
            FactionTable::SecurityDoor => &self.doors.security,
            FactionTable::GlassDoor => &self.doors.glass,
            FactionTable::NormalDoor => &self.doors.normal,
            FactionTable::Overwatch => &self.overwatch_console,
            FactionTable::Objectives => &self.objectives_console,
            FactionTable::ReturnPoint => &self.return_point,
        }
    }

    pub fn lookup(&self, table: FactionTable, faction: Faction) -> &PrototypeId {
        self.table(table).get(faction)
    }

    /// Every prototype id the tables reference.
    pub fn referenced_prototypes(&self) -> Vec<&PrototypeId> {
        let tables = [
            &self.doors.command,
            &self.doors.security,
            &self.doors.glass,
            &self.doors.normal,
            &self.overwatch_console,
            &self.objectives_console,
            &self.return_point,
            &self.navigation_console,
            &self.weapons_console,
        ];
        let mut ids: Vec<&PrototypeId> = tables
            .into_iter()
            .flat_map(|table| [&table.govfor, &table.opfor])
            .collect();
        ids.push(&self.dropship_destination);
        ids
    }
}

#[derive(Resource, Debug, Clone)]
pub struct SpawnRulesHandle(Arc<SpawnRules>);

impl SpawnRulesHandle {
    pub fn new(rules: Arc<SpawnRules>) -> Self {
        Self(rules)
    }

    pub fn get(&self) -> Arc<SpawnRules> {
        self.0.clone()
    }
}

pub fn load_spawn_rules_from_env() -> (Arc<SpawnRules>, CatalogSource) {
    catalog::load_from_env(
        CATALOG,
        "SPAWN_RULES_PATH",
        |path| SpawnRules::from_file(path).map(Arc::new),
        SpawnRules::builtin,
    )
}
