use std::{collections::HashMap, path::Path, sync::Arc};

use bevy::prelude::Resource;
use round_schema::{Faction, MapId, PerFaction, PlanetId, PlatoonId};
use serde::Deserialize;

use crate::catalog::{self, CatalogError, CatalogSource};

pub const BUILTIN_PLANETS: &str = include_str!("data/planets.json");
const CATALOG: &str = "planets";

#[derive(Debug, Clone, Deserialize)]
struct PlanetsFile {
    planets: Vec<PlanetDefinition>,
}

/// Per-faction round parameters of a planet.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PlanetFactionConfig {
    #[serde(default)]
    pub default_platoon: Option<PlatoonId>,
    /// Platoons that may be chosen on this planet; empty allows any.
    #[serde(default)]
    pub platoons: Vec<PlatoonId>,
    /// The faction starts aboard its own ship.
    #[serde(default)]
    pub in_ship: bool,
    #[serde(default)]
    pub dropships: u32,
    #[serde(default)]
    pub fighters: u32,
}

/// Scenario configuration for one round.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanetDefinition {
    pub id: PlanetId,
    pub name: String,
    #[serde(default)]
    pub map: Option<MapId>,
    #[serde(default)]
    pub factions: PerFaction<PlanetFactionConfig>,
}

impl PlanetDefinition {
    pub fn faction(&self, faction: Faction) -> &PlanetFactionConfig {
        self.factions.get(faction)
    }

    pub fn in_ship(&self, faction: Faction) -> bool {
        self.faction(faction).in_ship
    }

    pub fn dropship_count(&self, faction: Faction) -> usize {
        self.faction(faction).dropships as usize
    }

    pub fn fighter_count(&self, faction: Faction) -> usize {
        self.faction(faction).fighters as usize
    }

    pub fn allows_platoon(&self, faction: Faction, platoon: &PlatoonId) -> bool {
        let allowed = &self.faction(faction).platoons;
        allowed.is_empty() || allowed.contains(platoon)
    }
}

#[derive(Debug, Clone)]
pub struct PlanetCatalog {
    planets: Vec<PlanetDefinition>,
    index: HashMap<PlanetId, usize>,
}

impl PlanetCatalog {
    pub fn builtin() -> Arc<Self> {
        Self::from_json_str(BUILTIN_PLANETS)
            .map(Arc::new)
            .expect("builtin planets should parse")
    }

    pub fn from_json_str(input: &str) -> Result<Self, CatalogError> {
        let file: PlanetsFile = catalog::parse_json(CATALOG, input)?;
        Self::from_definitions(file.planets)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        Self::from_json_str(&catalog::read_file(CATALOG, path)?)
    }

    pub fn from_definitions(planets: Vec<PlanetDefinition>) -> Result<Self, CatalogError> {
        let index = catalog::unique_index(CATALOG, &planets, |p| &p.id)?;
        Ok(Self { planets, index })
    }

    pub fn get(&self, id: &PlanetId) -> Option<&PlanetDefinition> {
        self.index.get(id).and_then(|idx| self.planets.get(*idx))
    }

    pub fn first(&self) -> Option<&PlanetDefinition> {
        self.planets.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanetDefinition> {
        self.planets.iter()
    }

    pub fn len(&self) -> usize {
        self.planets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }
}

#[derive(Resource, Debug, Clone)]
pub struct PlanetCatalogHandle(Arc<PlanetCatalog>);

impl PlanetCatalogHandle {
    pub fn new(catalog: Arc<PlanetCatalog>) -> Self {
        Self(catalog)
    }

    pub fn get(&self) -> Arc<PlanetCatalog> {
        self.0.clone()
    }
}

/// Planet chosen for the current round by the upstream round flow.
#[derive(Resource, Debug, Clone, Default)]
pub struct SelectedPlanet(pub Option<PlanetId>);

impl SelectedPlanet {
    pub fn new(id: impl Into<PlanetId>) -> Self {
        Self(Some(id.into()))
    }

    /// The active scenario, if one is selected and known to the catalog.
    pub fn resolve<'a>(&self, catalog: &'a PlanetCatalog) -> Option<&'a PlanetDefinition> {
        let id = self.0.as_ref()?;
        let planet = catalog.get(id);
        if planet.is_none() {
            tracing::warn!(
                target: "round_rules::selection",
                planet = %id,
                "planet.selected_unknown"
            );
        }
        planet
    }
}

pub fn load_planets_from_env() -> (Arc<PlanetCatalog>, CatalogSource) {
    catalog::load_from_env(
        CATALOG,
        "PLANETS_PATH",
        |path| PlanetCatalog::from_file(path).map(Arc::new),
        PlanetCatalog::builtin,
    )
}
