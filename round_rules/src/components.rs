use bevy::prelude::*;
use bitflags::bitflags;
use round_schema::{DestinationKind, Faction, MapId, MarkerClass, PrototypeId};

bitflags! {
    /// Faction flags authored on a marker. Both or neither set means the
    /// marker does not name a side.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FactionFlags: u8 {
        const GOVFOR = 0b01;
        const OPFOR = 0b10;
    }
}

impl FactionFlags {
    pub fn from_bools(govfor: bool, opfor: bool) -> Self {
        let mut flags = FactionFlags::empty();
        flags.set(FactionFlags::GOVFOR, govfor);
        flags.set(FactionFlags::OPFOR, opfor);
        flags
    }

    pub fn of(faction: Faction) -> Self {
        match faction {
            Faction::Govfor => FactionFlags::GOVFOR,
            Faction::Opfor => FactionFlags::OPFOR,
        }
    }

    pub fn has(&self, faction: Faction) -> bool {
        self.contains(FactionFlags::of(faction))
    }

    /// Both or neither flag set.
    pub fn is_ambiguous(&self) -> bool {
        self.bits().count_ones() != 1
    }

    /// The flagged faction, govfor winning when both are set.
    pub fn primary(&self) -> Option<Faction> {
        Faction::ALL.into_iter().find(|faction| self.has(*faction))
    }
}

/// Placeholder entity replaced by a concrete object at round start.
#[derive(Component, Debug, Clone)]
pub struct PlatoonMarker {
    pub class: MarkerClass,
    pub factions: FactionFlags,
    /// Marker belongs to the ship it is parented to.
    pub aboard_ship: bool,
}

impl PlatoonMarker {
    pub fn new(class: MarkerClass) -> Self {
        Self {
            class,
            factions: FactionFlags::empty(),
            aboard_ship: false,
        }
    }

    pub fn with_faction(mut self, faction: Faction) -> Self {
        self.factions.insert(FactionFlags::of(faction));
        self
    }

    pub fn aboard_ship(mut self) -> Self {
        self.aboard_ship = true;
        self
    }
}

/// Ownership of a mobile grid. The tag is free-form; only `govfor` and
/// `opfor` are recognised by the round rules.
#[derive(Component, Debug, Clone)]
pub struct ShipFaction {
    pub faction: String,
}

impl ShipFaction {
    pub fn new(faction: impl Into<String>) -> Self {
        Self {
            faction: faction.into(),
        }
    }

    pub fn recognised(&self) -> Option<Faction> {
        Faction::from_tag(&self.faction)
    }
}

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Grid;

/// Root entity of a loaded map. Maps load paused and are initialised on demand.
#[derive(Component, Debug, Clone)]
pub struct LoadedMap {
    pub id: MapId,
    pub initialized: bool,
}

/// The prototype an entity was spawned from.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct PrototypeInstance(pub PrototypeId);

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct DropshipDestination {
    pub faction_controller: Option<Faction>,
    pub kind: DestinationKind,
}

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct NavigationComputer;

/// Restricts a shuttle console to one faction and craft type.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct WhitelistedShuttle {
    pub faction: Faction,
    pub shuttle_type: DestinationKind,
}

/// One-shot autopilot order for a navigation computer.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct FlyToRequested {
    pub computer: Entity,
    pub destination: Entity,
    pub faction: Faction,
    pub kind: DestinationKind,
}
