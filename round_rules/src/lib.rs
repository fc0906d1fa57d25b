//! Round-start platoon rules for the headless round server.
//!
//! When a [`RoundStarted`] event fires, [`platoon_spawn_system`] settles the
//! platoon of each faction, replaces every placed marker with the object it
//! stands for and brings in each side's dropships and fighters.

pub mod catalog;
pub mod classifier;
pub mod components;
pub mod context;
pub mod fleet;
pub mod maps;
pub mod picker;
pub mod planet;
pub mod platoon;
pub mod prototypes;
pub mod report;
pub mod resolution;
pub mod round;
pub mod selection;
pub mod spawn_rules;
pub mod validate;

use bevy::prelude::*;

pub use catalog::{CatalogError, CatalogSource};
pub use classifier::{MarkerClassifier, MarkerView, SpawnSpec};
pub use components::{
    DropshipDestination, FactionFlags, FlyToRequested, Grid, LoadedMap, NavigationComputer,
    PlatoonMarker, PrototypeInstance, ShipFaction, WhitelistedShuttle,
};
pub use context::RoundSetupContext;
pub use maps::{BlueprintMapLoader, MapBlueprints, MapBlueprintsHandle, MapLoadError, MapLoader};
pub use picker::{RandomPicker, SequencePicker};
pub use planet::{PlanetCatalog, PlanetCatalogHandle, PlanetDefinition, SelectedPlanet};
pub use platoon::{PlatoonCatalog, PlatoonCatalogHandle, PlatoonDefinition};
pub use prototypes::{Placement, PrototypeCatalog, PrototypeCatalogHandle};
pub use report::{FlightOrder, RoundOutcome, RoundSetupReport, SpawnRecord, SpawnStage};
pub use round::{
    platoon_spawn_system, run_platoon_spawn, RoundCatalogs, RoundSetupConfig, RoundSetupError,
    RoundStarted,
};
pub use selection::{PlatoonSelection, SelectionError};
pub use spawn_rules::{SpawnRules, SpawnRulesHandle};
pub use validate::{validate_catalogs, ValidationError};

/// Construct a headless [`App`] with the round rules installed. Catalogs come
/// from their `*_PATH` overrides when set.
pub fn build_round_app() -> App {
    build_round_app_with(RoundCatalogs::from_env(), RoundSetupConfig::from_env())
}

pub fn build_round_app_with(catalogs: RoundCatalogs, config: RoundSetupConfig) -> App {
    let mut app = App::new();
    catalogs.insert_into(&mut app.world);

    app.insert_resource(config)
        .insert_resource(SelectedPlanet::default())
        .insert_resource(PlatoonSelection::default())
        .insert_resource(RoundSetupReport::default())
        .add_event::<RoundStarted>()
        .add_event::<FlyToRequested>()
        .add_plugins(MinimalPlugins)
        .add_systems(
            Update,
            platoon_spawn_system.run_if(on_event::<RoundStarted>()),
        );

    app
}

/// Fire [`RoundStarted`] and run one update so the setup completes.
pub fn start_round(app: &mut App) {
    app.world.send_event(RoundStarted);
    app.update();
}
