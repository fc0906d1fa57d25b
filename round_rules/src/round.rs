//! Round-start orchestration: selection, both marker passes, then the fleet.

use std::{env, sync::Arc};

use bevy::prelude::*;
use rand::{rngs::SmallRng, SeedableRng};
use thiserror::Error;

use crate::components::LoadedMap;
use crate::context::RoundSetupContext;
use crate::fleet;
use crate::maps::{
    self, BlueprintMapLoader, MapBlueprints, MapBlueprintsHandle, MapLoadError, MapLoader,
};
use crate::picker::RandomPicker;
use crate::planet::{self, PlanetCatalog, PlanetCatalogHandle, PlanetDefinition, SelectedPlanet};
use crate::platoon::{self, PlatoonCatalog, PlatoonCatalogHandle};
use crate::prototypes::{self, PrototypeCatalog, PrototypeCatalogHandle};
use crate::report::{RoundOutcome, RoundSetupReport};
use crate::resolution::{self, ClaimedMarkers};
use crate::selection::{self, PlatoonSelection, SelectionError};
use crate::spawn_rules::{self, SpawnRules, SpawnRulesHandle};

/// Fired by the round flow once a planet and platoons are settled.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RoundStarted;

#[derive(Debug, Error)]
pub enum RoundSetupError {
    #[error("platoon selection failed: {0}")]
    Selection(#[from] SelectionError),
}

#[derive(Resource, Debug, Clone)]
pub struct RoundSetupConfig {
    /// Fixed seed for map and marker draws; entropy when unset.
    pub rng_seed: Option<u64>,
    /// Load the selected planet's own map before resolving markers.
    pub load_scenario_map: bool,
}

impl Default for RoundSetupConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            load_scenario_map: true,
        }
    }
}

impl RoundSetupConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = env::var("ROUND_SEED") {
            match raw.trim().parse::<u64>() {
                Ok(seed) => config.rng_seed = Some(seed),
                Err(err) => tracing::warn!(
                    target: "round_rules::selection",
                    value = %raw,
                    error = %err,
                    "round.seed_invalid"
                ),
            }
        }
        config
    }

    pub fn rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        }
    }
}

/// Every catalog one round reads.
#[derive(Debug, Clone)]
pub struct RoundCatalogs {
    pub platoons: Arc<PlatoonCatalog>,
    pub planets: Arc<PlanetCatalog>,
    pub prototypes: Arc<PrototypeCatalog>,
    pub rules: Arc<SpawnRules>,
    pub blueprints: Arc<MapBlueprints>,
}

impl RoundCatalogs {
    pub fn builtin() -> Self {
        Self {
            platoons: PlatoonCatalog::builtin(),
            planets: PlanetCatalog::builtin(),
            prototypes: PrototypeCatalog::builtin(),
            rules: SpawnRules::builtin(),
            blueprints: MapBlueprints::builtin(),
        }
    }

    /// Each catalog from its `*_PATH` override, or the builtin data.
    pub fn from_env() -> Self {
        Self {
            platoons: platoon::load_platoons_from_env().0,
            planets: planet::load_planets_from_env().0,
            prototypes: prototypes::load_prototypes_from_env().0,
            rules: spawn_rules::load_spawn_rules_from_env().0,
            blueprints: maps::load_map_blueprints_from_env().0,
        }
    }

    pub fn from_world(world: &World) -> Option<Self> {
        Some(Self {
            platoons: world.get_resource::<PlatoonCatalogHandle>()?.get(),
            planets: world.get_resource::<PlanetCatalogHandle>()?.get(),
            prototypes: world.get_resource::<PrototypeCatalogHandle>()?.get(),
            rules: world.get_resource::<SpawnRulesHandle>()?.get(),
            blueprints: world.get_resource::<MapBlueprintsHandle>()?.get(),
        })
    }

    pub fn insert_into(&self, world: &mut World) {
        world.insert_resource(PlatoonCatalogHandle::new(self.platoons.clone()));
        world.insert_resource(PlanetCatalogHandle::new(self.planets.clone()));
        world.insert_resource(PrototypeCatalogHandle::new(self.prototypes.clone()));
        world.insert_resource(SpawnRulesHandle::new(self.rules.clone()));
        world.insert_resource(MapBlueprintsHandle::new(self.blueprints.clone()));
    }

    pub fn map_loader(&self) -> BlueprintMapLoader {
        BlueprintMapLoader::new(self.blueprints.clone(), self.prototypes.clone())
    }
}

/// Runs the whole round setup once. Without an active planet nothing is
/// looked up or spawned.
pub fn run_platoon_spawn(
    world: &mut World,
    catalogs: &RoundCatalogs,
    planet: &SelectedPlanet,
    selection: &PlatoonSelection,
    loader: &mut dyn MapLoader,
    picker: &mut dyn RandomPicker,
) -> Result<RoundSetupReport, RoundSetupError> {
    let Some(planet) = planet.resolve(&catalogs.planets) else {
        tracing::info!(target: "round_rules::selection", "round.no_active_scenario");
        return Ok(RoundSetupReport::no_active_scenario());
    };

    let platoons = selection::select_platoons(selection, planet, &catalogs.platoons)?;
    for (faction, platoon) in platoons.iter() {
        tracing::info!(
            target: "round_rules::selection",
            planet = %planet.id,
            faction = %faction,
            platoon = platoon.map(|p| p.id.as_str()).unwrap_or("none"),
            "platoon.selected"
        );
    }

    let mut report = RoundSetupReport {
        planet: Some(planet.id.clone()),
        platoons: platoons.map(|_, platoon| platoon.map(|p| p.id.clone())),
        ..Default::default()
    };
    let ctx = RoundSetupContext {
        planet,
        platoons,
        prototypes: &catalogs.prototypes,
        rules: &catalogs.rules,
    };

    let mut claimed = ClaimedMarkers::default();
    let ship_spawns = resolution::resolve_ship_markers(world, &ctx, &mut claimed, &mut report);
    let global_spawns = resolution::resolve_global_markers(world, &ctx, &claimed, &mut report);
    fleet::run_fleet_loader(world, &ctx, loader, picker, &mut report);

    report.outcome = RoundOutcome::Completed;
    tracing::info!(
        target: "round_rules::selection",
        planet = %planet.id,
        ship_spawns,
        global_spawns,
        maps = report.maps_loaded(),
        failed_maps = report.failed_maps.len(),
        flight_orders = report.flight_orders.len(),
        "round.setup_complete"
    );
    Ok(report)
}

/// Loads the planet's own map unless it is already in the world.
pub fn load_scenario_map(
    world: &mut World,
    planet: &PlanetDefinition,
    loader: &mut dyn MapLoader,
) -> Result<Vec<Entity>, MapLoadError> {
    let Some(map) = &planet.map else {
        return Ok(Vec::new());
    };
    let already_loaded = world
        .query::<&LoadedMap>()
        .iter(world)
        .any(|loaded| &loaded.id == map);
    if already_loaded {
        return Ok(Vec::new());
    }
    let grids = loader.load_map(world, map)?;
    for grid in &grids {
        maps::initialize_map(world, *grid);
    }
    Ok(grids)
}

/// Exclusive system behind [`RoundStarted`]; leaves a [`RoundSetupReport`].
pub fn platoon_spawn_system(world: &mut World) {
    let Some(catalogs) = RoundCatalogs::from_world(world) else {
        tracing::error!(target: "round_rules::selection", "round.catalogs_missing");
        return;
    };
    let planet = world
        .get_resource::<SelectedPlanet>()
        .cloned()
        .unwrap_or_default();
    let selection = world
        .get_resource::<PlatoonSelection>()
        .cloned()
        .unwrap_or_default();
    let config = world
        .get_resource::<RoundSetupConfig>()
        .cloned()
        .unwrap_or_default();

    let mut loader = catalogs.map_loader();
    let mut rng = config.rng();

    if let Some(scenario) = planet.resolve(&catalogs.planets) {
        // Nothing may enter the world for a round that is going to abort.
        if let Err(err) = selection::select_platoons(&selection, scenario, &catalogs.platoons) {
            world.insert_resource(aborted_report(&planet, &err.into()));
            return;
        }
        if config.load_scenario_map {
            if let Err(err) = load_scenario_map(world, scenario, &mut loader) {
                tracing::warn!(
                    target: "round_rules::selection",
                    planet = %scenario.id,
                    error = %err,
                    "round.scenario_map_failed"
                );
            }
        }
    }

    let report = run_platoon_spawn(
        world,
        &catalogs,
        &planet,
        &selection,
        &mut loader,
        &mut rng,
    )
    .unwrap_or_else(|err| aborted_report(&planet, &err));
    world.insert_resource(report);
}

fn aborted_report(planet: &SelectedPlanet, err: &RoundSetupError) -> RoundSetupReport {
    tracing::error!(target: "round_rules::selection", error = %err, "round.setup_failed");
    RoundSetupReport {
        outcome: RoundOutcome::Aborted,
        planet: planet.0.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::FlyToRequested;
    use crate::picker::SequencePicker;
    use bevy::ecs::event::Events;
    use round_schema::PlatoonId;

    fn world_with_catalogs() -> World {
        let mut world = World::new();
        world.init_resource::<Events<FlyToRequested>>();
        RoundCatalogs::builtin().insert_into(&mut world);
        world
    }

    #[test]
    fn missing_planet_spawns_nothing() {
        let mut world = World::new();
        let catalogs = RoundCatalogs::builtin();
        let before = world.entities().len();
        let report = run_platoon_spawn(
            &mut world,
            &catalogs,
            &SelectedPlanet::default(),
            &PlatoonSelection::default(),
            &mut catalogs.map_loader(),
            &mut SequencePicker::default(),
        )
        .unwrap();
        assert_eq!(report.outcome, RoundOutcome::NoActiveScenario);
        assert!(report.spawns.is_empty());
        assert_eq!(world.entities().len(), before);
    }

    #[test]
    fn unknown_default_platoon_aborts_before_spawning() {
        let mut world = World::new();
        let mut catalogs = RoundCatalogs::builtin();
        let mut planets: Vec<PlanetDefinition> = catalogs.planets.iter().cloned().collect();
        planets[0].factions.govfor.default_platoon = Some(PlatoonId::new("phantoms"));
        let id = planets[0].id.clone();
        catalogs.planets = Arc::new(PlanetCatalog::from_definitions(planets).unwrap());

        let err = run_platoon_spawn(
            &mut world,
            &catalogs,
            &SelectedPlanet::new(id),
            &PlatoonSelection::default(),
            &mut catalogs.map_loader(),
            &mut SequencePicker::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RoundSetupError::Selection(SelectionError::UnknownPlatoon(_))
        ));
        assert_eq!(world.entities().len(), 0);
    }

    #[test]
    fn system_loads_scenario_and_records_report() {
        let mut world = world_with_catalogs();
        world.insert_resource(SelectedPlanet::new("lv624"));
        world.insert_resource(RoundSetupConfig {
            rng_seed: Some(11),
            load_scenario_map: true,
        });
        platoon_spawn_system(&mut world);

        let report = world.resource::<RoundSetupReport>();
        assert_eq!(report.outcome, RoundOutcome::Completed);
        assert_eq!(
            report.platoons.govfor.as_ref().map(PlatoonId::as_str),
            Some("colonial_marines")
        );
        assert_eq!(report.count_prototype("objectives_console_govfor"), 1);
        assert_eq!(report.count_prototype("objectives_console_opfor"), 1);
        assert_eq!(report.dropship_maps.govfor.len(), 2);
        assert_eq!(report.dropship_maps.opfor.len(), 1);
    }

    #[test]
    fn aborted_round_loads_no_scenario_map() {
        let mut world = World::new();
        world.init_resource::<Events<FlyToRequested>>();
        let mut catalogs = RoundCatalogs::builtin();
        let mut planets: Vec<PlanetDefinition> = catalogs.planets.iter().cloned().collect();
        planets[0].factions.opfor.default_platoon = Some(PlatoonId::new("colonial_marines"));
        let id = planets[0].id.clone();
        catalogs.planets = Arc::new(PlanetCatalog::from_definitions(planets).unwrap());
        catalogs.insert_into(&mut world);
        world.insert_resource(SelectedPlanet::new(id));

        platoon_spawn_system(&mut world);

        assert_eq!(
            world.resource::<RoundSetupReport>().outcome,
            RoundOutcome::Aborted
        );
        assert_eq!(world.entities().len(), 0);
    }

    #[test]
    fn system_without_catalogs_leaves_no_report() {
        let mut world = World::new();
        platoon_spawn_system(&mut world);
        assert!(world.get_resource::<RoundSetupReport>().is_none());
    }

    #[test]
    fn seeded_config_is_reproducible() {
        let config = RoundSetupConfig {
            rng_seed: Some(42),
            load_scenario_map: false,
        };
        let mut a = config.rng();
        let mut b = config.rng();
        let picks_a: Vec<usize> = (0..8).map(|_| a.pick_index(10)).collect();
        let picks_b: Vec<usize> = (0..8).map(|_| b.pick_index(10)).collect();
        assert_eq!(picks_a, picks_b);
    }
}
