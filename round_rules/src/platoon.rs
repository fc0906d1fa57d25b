use std::{collections::HashMap, path::Path, sync::Arc};

use bevy::prelude::Resource;
use round_schema::{Faction, MapId, MarkerClass, PlatoonId, PrototypeId};
use serde::Deserialize;

use crate::catalog::{self, CatalogError, CatalogSource};

pub const BUILTIN_PLATOONS: &str = include_str!("data/platoons.json");
const CATALOG: &str = "platoons";

#[derive(Debug, Clone, Deserialize)]
struct PlatoonsFile {
    platoons: Vec<PlatoonDefinition>,
}

/// A faction's loadout: which vendors its markers become and which
/// dropship and fighter maps it can field.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatoonDefinition {
    pub id: PlatoonId,
    pub name: String,
    pub faction: Faction,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vendor_markers_by_class: HashMap<MarkerClass, PrototypeId>,
    #[serde(default)]
    pub compatible_dropships: Vec<MapId>,
    #[serde(default)]
    pub compatible_fighters: Vec<MapId>,
}

impl PlatoonDefinition {
    pub fn vendor_for(&self, class: MarkerClass) -> Option<&PrototypeId> {
        self.vendor_markers_by_class.get(&class)
    }
}

#[derive(Debug, Clone)]
pub struct PlatoonCatalog {
    platoons: Vec<PlatoonDefinition>,
    index: HashMap<PlatoonId, usize>,
}

impl PlatoonCatalog {
    pub fn builtin() -> Arc<Self> {
        Self::from_json_str(BUILTIN_PLATOONS)
            .map(Arc::new)
            .expect("builtin platoons should parse")
    }

    pub fn from_json_str(input: &str) -> Result<Self, CatalogError> {
        let file: PlatoonsFile = catalog::parse_json(CATALOG, input)?;
        Self::from_definitions(file.platoons)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        Self::from_json_str(&catalog::read_file(CATALOG, path)?)
    }

    pub fn from_definitions(platoons: Vec<PlatoonDefinition>) -> Result<Self, CatalogError> {
        let index = catalog::unique_index(CATALOG, &platoons, |p| &p.id)?;
        Ok(Self { platoons, index })
    }

    pub fn get(&self, id: &PlatoonId) -> Option<&PlatoonDefinition> {
        self.index.get(id).and_then(|idx| self.platoons.get(*idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlatoonDefinition> {
        self.platoons.iter()
    }

    pub fn for_faction(&self, faction: Faction) -> impl Iterator<Item = &PlatoonDefinition> {
        self.platoons.iter().filter(move |p| p.faction == faction)
    }

    pub fn len(&self) -> usize {
        self.platoons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platoons.is_empty()
    }
}

#[derive(Resource, Debug, Clone)]
pub struct PlatoonCatalogHandle(Arc<PlatoonCatalog>);

impl PlatoonCatalogHandle {
    pub fn new(catalog: Arc<PlatoonCatalog>) -> Self {
        Self(catalog)
    }

    pub fn get(&self) -> Arc<PlatoonCatalog> {
        self.0.clone()
    }
}

pub fn load_platoons_from_env() -> (Arc<PlatoonCatalog>, CatalogSource) {
    catalog::load_from_env(
        CATALOG,
        "PLATOONS_PATH",
        |path| PlatoonCatalog::from_file(path).map(Arc::new),
        PlatoonCatalog::builtin,
    )
}
