//! Authored map blueprints and the loader that instantiates them as grids.

use std::{collections::HashMap, path::Path, sync::Arc};

use bevy::prelude::*;
use round_schema::{MapId, PrototypeId};
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::{self, CatalogError, CatalogSource};
use crate::components::{Grid, LoadedMap, ShipFaction};
use crate::prototypes::{self, MarkerSpec, Placement, PrototypeCatalog};

pub const BUILTIN_MAP_BLUEPRINTS: &str = include_str!("data/map_blueprints.json");
const CATALOG: &str = "map blueprints";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapLoadError {
    #[error("map `{0}` has no blueprint")]
    UnknownMap(MapId),
    #[error("map `{0}` has no grids")]
    NoGrids(MapId),
    #[error("map `{map}` places unknown prototype `{prototype}`")]
    UnknownPrototype { map: MapId, prototype: PrototypeId },
}

/// Instantiates authored maps into the world.
pub trait MapLoader {
    /// Loads `map` and returns its grid entities. A failed load leaves the
    /// world untouched.
    fn load_map(&mut self, world: &mut World, map: &MapId) -> Result<Vec<Entity>, MapLoadError>;
}

#[derive(Debug, Clone, Deserialize)]
struct MapBlueprintsFile {
    maps: Vec<MapBlueprint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacedEntity {
    pub prototype: PrototypeId,
    #[serde(default)]
    pub position: [f32; 2],
    #[serde(default)]
    pub name: Option<String>,
    /// Overrides the marker data of the prototype.
    #[serde(default)]
    pub marker: Option<MarkerSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridBlueprint {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ship_faction: Option<String>,
    #[serde(default)]
    pub offset: [f32; 2],
    #[serde(default)]
    pub entities: Vec<PlacedEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapBlueprint {
    pub id: MapId,
    #[serde(default)]
    pub name: Option<String>,
    pub grids: Vec<GridBlueprint>,
}

impl MapBlueprint {
    pub fn prototypes(&self) -> impl Iterator<Item = &PrototypeId> {
        self.grids
            .iter()
            .flat_map(|grid| grid.entities.iter().map(|placed| &placed.prototype))
    }
}

#[derive(Debug, Clone)]
pub struct MapBlueprints {
    maps: Vec<MapBlueprint>,
    index: HashMap<MapId, usize>,
}

impl MapBlueprints {
    pub fn builtin() -> Arc<Self> {
        Self::from_json_str(BUILTIN_MAP_BLUEPRINTS)
            .map(Arc::new)
            .expect("builtin map blueprints should parse")
    }

    pub fn from_json_str(input: &str) -> Result<Self, CatalogError> {
        let file: MapBlueprintsFile = catalog::parse_json(CATALOG, input)?;
        Self::from_blueprints(file.maps)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        Self::from_json_str(&catalog::read_file(CATALOG, path)?)
    }

    pub fn from_blueprints(maps: Vec<MapBlueprint>) -> Result<Self, CatalogError> {
        let index = catalog::unique_index(CATALOG, &maps, |m| &m.id)?;
        Ok(Self { maps, index })
    }

    pub fn get(&self, id: &MapId) -> Option<&MapBlueprint> {
        self.index.get(id).and_then(|idx| self.maps.get(*idx))
    }

    pub fn contains(&self, id: &MapId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapBlueprint> {
        self.maps.iter()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

#[derive(Resource, Debug, Clone)]
pub struct MapBlueprintsHandle(Arc<MapBlueprints>);

impl MapBlueprintsHandle {
    pub fn new(blueprints: Arc<MapBlueprints>) -> Self {
        Self(blueprints)
    }

    pub fn get(&self) -> Arc<MapBlueprints> {
        self.0.clone()
    }
}

pub fn load_map_blueprints_from_env() -> (Arc<MapBlueprints>, CatalogSource) {
    catalog::load_from_env(
        CATALOG,
        "MAP_BLUEPRINTS_PATH",
        |path| MapBlueprints::from_file(path).map(Arc::new),
        MapBlueprints::builtin,
    )
}

/// Loads maps from the blueprint catalog.
#[derive(Debug, Clone)]
pub struct BlueprintMapLoader {
    blueprints: Arc<MapBlueprints>,
    prototypes: Arc<PrototypeCatalog>,
}

impl BlueprintMapLoader {
    pub fn new(blueprints: Arc<MapBlueprints>, prototypes: Arc<PrototypeCatalog>) -> Self {
        Self {
            blueprints,
            prototypes,
        }
    }

    fn check(&self, map: &MapId) -> Result<&MapBlueprint, MapLoadError> {
        let blueprint = self
            .blueprints
            .get(map)
            .ok_or_else(|| MapLoadError::UnknownMap(map.clone()))?;
        if blueprint.grids.is_empty() {
            return Err(MapLoadError::NoGrids(map.clone()));
        }
        if let Some(prototype) = blueprint
            .prototypes()
            .find(|id| !self.prototypes.contains(id))
        {
            return Err(MapLoadError::UnknownPrototype {
                map: map.clone(),
                prototype: prototype.clone(),
            });
        }
        Ok(blueprint)
    }
}

impl MapLoader for BlueprintMapLoader {
    fn load_map(&mut self, world: &mut World, map: &MapId) -> Result<Vec<Entity>, MapLoadError> {
        let blueprint = self.check(map)?;

        let root = world
            .spawn((
                LoadedMap {
                    id: map.clone(),
                    initialized: false,
                },
                Name::new(blueprint.name.clone().unwrap_or_else(|| map.to_string())),
                TransformBundle::default(),
            ))
            .id();

        let mut grids = Vec::with_capacity(blueprint.grids.len());
        for (idx, grid_blueprint) in blueprint.grids.iter().enumerate() {
            let grid_name = grid_blueprint
                .name
                .clone()
                .unwrap_or_else(|| format!("{map} grid {idx}"));
            let [x, y] = grid_blueprint.offset;
            let mut grid = world.spawn((
                Grid,
                Name::new(grid_name),
                TransformBundle::from_transform(Transform::from_xyz(x, y, 0.0)),
            ));
            if let Some(faction) = &grid_blueprint.ship_faction {
                grid.insert(ShipFaction::new(faction.clone()));
            }
            grid.set_parent(root);
            let grid = grid.id();

            for placed in &grid_blueprint.entities {
                let [px, py] = placed.position;
                let placement = Placement::new(Some(grid), Transform::from_xyz(px, py, 0.0));
                let entity = prototypes::spawn_prototype_unchecked(
                    world,
                    &self.prototypes,
                    &placed.prototype,
                    placement,
                );
                if let Some(name) = &placed.name {
                    world.entity_mut(entity).insert(Name::new(name.clone()));
                }
                if let Some(marker) = &placed.marker {
                    world.entity_mut(entity).insert(marker.to_component());
                }
            }
            grids.push(grid);
        }

        tracing::debug!(
            target: "round_rules::maps",
            map = %map,
            grids = grids.len(),
            "map.loaded"
        );
        Ok(grids)
    }
}

/// The grid an entity stands on, walking up its parents (itself included).
pub fn grid_of(world: &World, entity: Entity) -> Option<Entity> {
    ancestor_with::<Grid>(world, entity)
}

/// The map root an entity belongs to.
pub fn map_of(world: &World, entity: Entity) -> Option<Entity> {
    ancestor_with::<LoadedMap>(world, entity)
}

fn ancestor_with<C: Component>(world: &World, entity: Entity) -> Option<Entity> {
    let mut current = Some(entity);
    while let Some(candidate) = current {
        let entity_ref = world.get_entity(candidate)?;
        if entity_ref.contains::<C>() {
            return Some(candidate);
        }
        current = entity_ref.get::<Parent>().map(Parent::get);
    }
    None
}

/// Unpauses the map `entity` belongs to. Returns `true` if it was paused.
pub fn initialize_map(world: &mut World, entity: Entity) -> bool {
    let Some(root) = map_of(world, entity) else {
        return false;
    };
    let Some(mut loaded) = world.get_mut::<LoadedMap>(root) else {
        return false;
    };
    if loaded.initialized {
        return false;
    }
    loaded.initialized = true;
    tracing::debug!(target: "round_rules::maps", map = %loaded.id, "map.initialized");
    true
}
