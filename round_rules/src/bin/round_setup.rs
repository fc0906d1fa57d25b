use std::env;

use tracing::{info, warn};

use round_rules::{
    build_round_app, start_round, validate_catalogs, PlanetCatalogHandle, RoundCatalogs,
    RoundOutcome, RoundSetupReport, SelectedPlanet, SpawnStage,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut app = build_round_app();

    if let Some(catalogs) = RoundCatalogs::from_world(&app.world) {
        for issue in validate_catalogs(&catalogs) {
            warn!(target: "round_rules::catalog", %issue, "catalog.issue");
        }
    }

    let planet = env::args()
        .nth(1)
        .or_else(|| env::var("ROUND_PLANET").ok())
        .or_else(|| {
            app.world
                .resource::<PlanetCatalogHandle>()
                .get()
                .first()
                .map(|planet| planet.id.to_string())
        });
    match planet {
        Some(planet) => app.insert_resource(SelectedPlanet::new(planet)),
        None => app.insert_resource(SelectedPlanet::default()),
    };

    start_round(&mut app);

    let report = app.world.resource::<RoundSetupReport>();
    if report.outcome != RoundOutcome::Completed {
        warn!(outcome = ?report.outcome, "round setup did not complete");
        return;
    }
    info!(
        planet = ?report.planet,
        govfor = ?report.platoons.govfor,
        opfor = ?report.platoons.opfor,
        ship_spawns = report.spawns_in(SpawnStage::ShipPass).count(),
        global_spawns = report.spawns_in(SpawnStage::GlobalPass).count(),
        dropship_consoles = report.spawns_in(SpawnStage::DropshipConsole).count(),
        fighter_consoles = report.spawns_in(SpawnStage::FighterConsole).count(),
        maps = report.maps_loaded(),
        failed_maps = report.failed_maps.len(),
        flight_orders = report.flight_orders.len(),
        "round setup complete"
    );
    for record in &report.spawns {
        info!(
            stage = ?record.stage,
            prototype = %record.prototype,
            faction = ?record.faction,
            "spawned"
        );
    }
}
