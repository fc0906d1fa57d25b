//! Static definitions of everything the round rules can spawn.

use std::{collections::HashMap, path::Path, sync::Arc};

use bevy::prelude::*;
use round_schema::{DestinationKind, Faction, MarkerClass, PrototypeId};
use serde::Deserialize;

use crate::catalog::{self, CatalogError, CatalogSource};
use crate::components::{
    DropshipDestination, FactionFlags, NavigationComputer, PlatoonMarker, PrototypeInstance,
};

pub const BUILTIN_PROTOTYPES: &str = include_str!("data/prototypes.json");
const CATALOG: &str = "prototypes";

#[derive(Debug, Clone, Deserialize)]
struct PrototypesFile {
    prototypes: Vec<PrototypeDefinition>,
}

/// Marker data as authored on a prototype or a placed map entity.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MarkerSpec {
    pub class: MarkerClass,
    #[serde(default)]
    pub govfor: bool,
    #[serde(default)]
    pub opfor: bool,
    #[serde(default)]
    pub ship: bool,
}

impl MarkerSpec {
    pub fn to_component(&self) -> PlatoonMarker {
        PlatoonMarker {
            class: self.class,
            factions: FactionFlags::from_bools(self.govfor, self.opfor),
            aboard_ship: self.ship,
        }
    }
}

/// Behaviour attached to every instance of a prototype.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrototypeTrait {
    NavigationComputer,
    DropshipDestination {
        #[serde(default)]
        faction: Option<Faction>,
        kind: DestinationKind,
    },
    Marker(MarkerSpec),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrototypeDefinition {
    pub id: PrototypeId,
    pub name: String,
    #[serde(default)]
    pub traits: Vec<PrototypeTrait>,
}

impl PrototypeDefinition {
    pub fn marker(&self) -> Option<&MarkerSpec> {
        self.traits.iter().find_map(|t| match t {
            PrototypeTrait::Marker(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn is_navigation_computer(&self) -> bool {
        self.traits
            .iter()
            .any(|t| matches!(t, PrototypeTrait::NavigationComputer))
    }
}

#[derive(Debug, Clone)]
pub struct PrototypeCatalog {
    prototypes: Vec<PrototypeDefinition>,
    index: HashMap<PrototypeId, usize>,
}

impl PrototypeCatalog {
    pub fn builtin() -> Arc<Self> {
        Self::from_json_str(BUILTIN_PROTOTYPES)
            .map(Arc::new)
            .expect("builtin prototypes should parse")
    }

    pub fn from_json_str(input: &str) -> Result<Self, CatalogError> {
        let file: PrototypesFile = catalog::parse_json(CATALOG, input)?;
        Self::from_definitions(file.prototypes)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        Self::from_json_str(&catalog::read_file(CATALOG, path)?)
    }

    pub fn from_definitions(prototypes: Vec<PrototypeDefinition>) -> Result<Self, CatalogError> {
        let index = catalog::unique_index(CATALOG, &prototypes, |p| &p.id)?;
        Ok(Self { prototypes, index })
    }

    pub fn get(&self, id: &PrototypeId) -> Option<&PrototypeDefinition> {
        self.index.get(id).and_then(|idx| self.prototypes.get(*idx))
    }

    pub fn contains(&self, id: &PrototypeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrototypeDefinition> {
        self.prototypes.iter()
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }
}

#[derive(Resource, Debug, Clone)]
pub struct PrototypeCatalogHandle(Arc<PrototypeCatalog>);

impl PrototypeCatalogHandle {
    pub fn new(catalog: Arc<PrototypeCatalog>) -> Self {
        Self(catalog)
    }

    pub fn get(&self) -> Arc<PrototypeCatalog> {
        self.0.clone()
    }
}

pub fn load_prototypes_from_env() -> (Arc<PrototypeCatalog>, CatalogSource) {
    catalog::load_from_env(
        CATALOG,
        "PROTOTYPES_PATH",
        |path| PrototypeCatalog::from_file(path).map(Arc::new),
        PrototypeCatalog::builtin,
    )
}

/// Location an object is spawned at: the parent it hangs off and its local
/// transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub parent: Option<Entity>,
    pub transform: Transform,
}

impl Placement {
    pub fn new(parent: Option<Entity>, transform: Transform) -> Self {
        Self { parent, transform }
    }

    /// Coordinates of an existing entity.
    pub fn of(world: &World, entity: Entity) -> Option<Self> {
        let entity_ref = world.get_entity(entity)?;
        let transform = entity_ref.get::<Transform>().copied().unwrap_or_default();
        let parent = entity_ref.get::<Parent>().map(Parent::get);
        Some(Self { parent, transform })
    }
}

/// Spawns `id` at `placement`, or returns `None` when the catalog does not
/// know the prototype.
pub fn spawn_prototype(
    world: &mut World,
    catalog: &PrototypeCatalog,
    id: &PrototypeId,
    placement: Placement,
) -> Option<Entity> {
    let definition = catalog.get(id)?;
    Some(spawn_definition(world, id, Some(definition), placement))
}

/// Spawns `id` whether or not the catalog knows it; unknown prototypes get a
/// bare entity carrying only the instance tag and transform.
pub fn spawn_prototype_unchecked(
    world: &mut World,
    catalog: &PrototypeCatalog,
    id: &PrototypeId,
    placement: Placement,
) -> Entity {
    spawn_definition(world, id, catalog.get(id), placement)
}

fn spawn_definition(
    world: &mut World,
    id: &PrototypeId,
    definition: Option<&PrototypeDefinition>,
    placement: Placement,
) -> Entity {
    let name = definition
        .map(|def| def.name.clone())
        .unwrap_or_else(|| id.to_string());
    let mut entity = world.spawn((
        PrototypeInstance(id.clone()),
        Name::new(name),
        TransformBundle::from_transform(placement.transform),
    ));

    for prototype_trait in definition.into_iter().flat_map(|def| def.traits.iter()) {
        match prototype_trait {
            PrototypeTrait::NavigationComputer => {
                entity.insert(NavigationComputer);
            }
            PrototypeTrait::DropshipDestination { faction, kind } => {
                entity.insert(DropshipDestination {
                    faction_controller: *faction,
                    kind: *kind,
                });
            }
            PrototypeTrait::Marker(spec) => {
                entity.insert(spec.to_component());
            }
        }
    }

    if let Some(parent) = placement.parent {
        entity.set_parent(parent);
    }
    entity.id()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "prototypes": [
            { "id": "nav", "name": "navigation computer", "traits": [{ "type": "navigation_computer" }] },
            { "id": "lz", "name": "landing zone", "traits": [{ "type": "dropship_destination", "kind": "dropship" }] },
            { "id": "vendor", "name": "vendor" }
        ]
    }"#;

    #[test]
    fn builtin_prototypes_parse() {
        let catalog = PrototypeCatalog::builtin();
        assert!(!catalog.is_empty());
    }

    #[test]
    fn duplicate_prototype_ids_are_rejected() {
        let json = r#"{ "prototypes": [ { "id": "a", "name": "a" }, { "id": "a", "name": "b" } ] }"#;
        let err = PrototypeCatalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId { .. }));
    }

    #[test]
    fn spawn_applies_traits_and_parent() {
        let catalog = PrototypeCatalog::from_json_str(SAMPLE).unwrap();
        let mut world = World::new();
        let parent = world.spawn(TransformBundle::default()).id();
        let placement = Placement::new(Some(parent), Transform::from_xyz(3.0, 4.0, 0.0));

        let nav = spawn_prototype(&mut world, &catalog, &"nav".into(), placement).unwrap();
        assert!(world.get::<NavigationComputer>(nav).is_some());
        assert_eq!(world.get::<Parent>(nav).map(Parent::get), Some(parent));
        assert_eq!(Placement::of(&world, nav), Some(placement));

        let lz = spawn_prototype(&mut world, &catalog, &"lz".into(), placement).unwrap();
        let destination = world.get::<DropshipDestination>(lz).unwrap();
        assert_eq!(destination.kind, DestinationKind::Dropship);
        assert_eq!(destination.faction_controller, None);
    }

    #[test]
    fn unknown_prototype_only_spawns_unchecked() {
        let catalog = PrototypeCatalog::from_json_str(SAMPLE).unwrap();
        let mut world = World::new();
        let placement = Placement::new(None, Transform::IDENTITY);
        let id = PrototypeId::new("missing");
        assert!(spawn_prototype(&mut world, &catalog, &id, placement).is_none());

        let entity = spawn_prototype_unchecked(&mut world, &catalog, &id, placement);
        assert_eq!(
            world.get::<PrototypeInstance>(entity),
            Some(&PrototypeInstance(id))
        );
        assert_eq!(world.get::<Name>(entity).map(Name::as_str), Some("missing"));
    }
}
