//! Decides which prototype replaces a marker and spawns it in the marker's place.

use bevy::prelude::*;
use round_schema::{DestinationKind, Faction, MarkerClass, PrototypeId};

use crate::components::{DropshipDestination, PlatoonMarker};
use crate::platoon::PlatoonDefinition;
use crate::prototypes::{self, Placement, PrototypeCatalog};
use crate::spawn_rules::{FactionTable, ResolutionStrategy, SpawnRules};

/// What the classifier sees of a marker.
#[derive(Debug, Clone, Copy)]
pub struct MarkerView<'a> {
    pub marker: &'a PlatoonMarker,
    /// Recognised faction of the ship the marker is parented to, if any.
    pub parent_ship: Option<Faction>,
}

impl<'a> MarkerView<'a> {
    pub fn new(marker: &'a PlatoonMarker) -> Self {
        Self {
            marker,
            parent_ship: None,
        }
    }

    pub fn with_parent_ship(mut self, faction: Option<Faction>) -> Self {
        self.parent_ship = faction;
        self
    }

    pub fn class(&self) -> MarkerClass {
        self.marker.class
    }
}

/// A resolved replacement for one marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnSpec {
    Object {
        prototype: PrototypeId,
        faction: Faction,
    },
    /// Landing zone; inherits the marker's name and is tagged for dropships.
    Destination {
        prototype: PrototypeId,
        faction: Option<Faction>,
    },
}

impl SpawnSpec {
    pub fn prototype(&self) -> &PrototypeId {
        match self {
            SpawnSpec::Object { prototype, .. } | SpawnSpec::Destination { prototype, .. } => {
                prototype
            }
        }
    }

    pub fn faction(&self) -> Option<Faction> {
        match self {
            SpawnSpec::Object { faction, .. } => Some(*faction),
            SpawnSpec::Destination { faction, .. } => *faction,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MarkerClassifier<'a> {
    rules: &'a SpawnRules,
    prototypes: &'a PrototypeCatalog,
}

impl<'a> MarkerClassifier<'a> {
    pub fn new(rules: &'a SpawnRules, prototypes: &'a PrototypeCatalog) -> Self {
        Self { rules, prototypes }
    }

    /// Resolves a marker given the faction its pass settled on and that
    /// faction's loadout.
    pub fn resolve(
        &self,
        view: MarkerView<'_>,
        effective: Option<Faction>,
        loadout: Option<&PlatoonDefinition>,
    ) -> Option<SpawnSpec> {
        match ResolutionStrategy::for_class(view.class()) {
            ResolutionStrategy::Table(table) => self.from_table(table, effective),
            ResolutionStrategy::MarkerThenShip(table) => {
                let marker = view.marker;
                let faction = marker.factions.primary().or(if marker.aboard_ship {
                    view.parent_ship
                } else {
                    None
                });
                self.from_table(table, faction)
            }
            ResolutionStrategy::Destination => Some(SpawnSpec::Destination {
                prototype: self.rules.dropship_destination.clone(),
                faction: effective,
            }),
            ResolutionStrategy::Loadout => {
                if view.marker.factions.is_ambiguous() {
                    return None;
                }
                let faction = effective?;
                let prototype = loadout?.vendor_for(view.class())?;
                self.prototypes
                    .contains(prototype)
                    .then(|| SpawnSpec::Object {
                        prototype: prototype.clone(),
                        faction,
                    })
            }
        }
    }

    fn from_table(&self, table: FactionTable, faction: Option<Faction>) -> Option<SpawnSpec> {
        let faction = faction?;
        let prototype = self.rules.lookup(table, faction);
        self.prototypes
            .contains(prototype)
            .then(|| SpawnSpec::Object {
                prototype: prototype.clone(),
                faction,
            })
    }
}

/// Spawns `spec` at the marker's coordinates. The marker is left untouched.
pub fn spawn_at_marker(
    world: &mut World,
    prototypes: &PrototypeCatalog,
    spec: &SpawnSpec,
    marker: Entity,
) -> Option<Entity> {
    let placement = Placement::of(world, marker)?;
    match spec {
        SpawnSpec::Object { prototype, .. } => {
            prototypes::spawn_prototype(world, prototypes, prototype, placement)
        }
        SpawnSpec::Destination { prototype, faction } => {
            let marker_name = world.get::<Name>(marker).cloned();
            let entity =
                prototypes::spawn_prototype_unchecked(world, prototypes, prototype, placement);
            let mut destination = world.entity_mut(entity);
            destination.insert(DropshipDestination {
                faction_controller: *faction,
                kind: DestinationKind::Dropship,
            });
            if let Some(name) = marker_name {
                destination.insert(name);
            }
            Some(entity)
        }
    }
}
