use bevy::prelude::*;
use round_schema::{DestinationKind, Faction, MapId, PerFaction, PlanetId, PlatoonId, PrototypeId};

/// Pipeline stage that produced a spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpawnStage {
    ShipPass,
    GlobalPass,
    DropshipConsole,
    FighterConsole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRecord {
    pub stage: SpawnStage,
    pub entity: Entity,
    /// The marker the object replaced.
    pub marker: Entity,
    pub prototype: PrototypeId,
    pub faction: Option<Faction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightOrder {
    pub faction: Faction,
    pub kind: DestinationKind,
    pub computer: Entity,
    pub destination: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundOutcome {
    #[default]
    Pending,
    Completed,
    NoActiveScenario,
    /// Configuration error before anything spawned.
    Aborted,
}

/// Summary of the last round setup.
#[derive(Resource, Debug, Clone, Default)]
pub struct RoundSetupReport {
    pub outcome: RoundOutcome,
    pub planet: Option<PlanetId>,
    pub platoons: PerFaction<Option<PlatoonId>>,
    pub spawns: Vec<SpawnRecord>,
    pub dropship_maps: PerFaction<Vec<MapId>>,
    pub fighter_maps: PerFaction<Vec<MapId>>,
    pub failed_maps: Vec<MapId>,
    pub flight_orders: Vec<FlightOrder>,
}

impl RoundSetupReport {
    pub fn no_active_scenario() -> Self {
        Self {
            outcome: RoundOutcome::NoActiveScenario,
            ..Default::default()
        }
    }

    pub fn spawns_in(&self, stage: SpawnStage) -> impl Iterator<Item = &SpawnRecord> {
        self.spawns.iter().filter(move |record| record.stage == stage)
    }

    pub fn count_prototype(&self, prototype: &str) -> usize {
        self.spawns
            .iter()
            .filter(|record| record.prototype.as_str() == prototype)
            .count()
    }

    pub fn maps_loaded(&self) -> usize {
        Faction::ALL
            .into_iter()
            .map(|faction| {
                self.dropship_maps.get(faction).len() + self.fighter_maps.get(faction).len()
            })
            .sum()
    }
}
