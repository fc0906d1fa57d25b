#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Once};

use bevy::prelude::*;
use round_rules::{
    build_round_app_with, start_round, PlanetCatalog, PrototypeInstance, RoundCatalogs,
    RoundSetupConfig, SelectedPlanet,
};

static INIT: Once = Once::new();

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Points the catalog overrides at the test fixtures.
pub fn ensure_test_catalogs() {
    INIT.call_once(|| {
        for (var, file) in [
            ("PLANETS_PATH", "planets.json"),
            ("PLATOONS_PATH", "platoons.json"),
            ("MAP_BLUEPRINTS_PATH", "map_blueprints.json"),
        ] {
            let path = fixture_path(file);
            debug_assert!(path.exists(), "missing fixture at {}", path.display());
            std::env::set_var(var, &path);
        }
    });
}

pub fn test_catalogs() -> RoundCatalogs {
    ensure_test_catalogs();
    RoundCatalogs::from_env()
}

/// Fixture catalogs with one field of the proving grounds changed, e.g.
/// `("govfor", "dropships", 5)`.
pub fn catalogs_with_count(faction: &str, field: &str, value: u32) -> anyhow::Result<RoundCatalogs> {
    let raw = std::fs::read_to_string(fixture_path("planets.json"))?;
    let mut planets: serde_json::Value = serde_json::from_str(&raw)?;
    let config = planets["planets"][0]["factions"][faction]
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("no {faction} config in fixture"))?;
    config.insert(field.to_string(), serde_json::Value::from(value));

    let mut catalogs = test_catalogs();
    catalogs.planets = Arc::new(PlanetCatalog::from_json_str(&planets.to_string())?);
    Ok(catalogs)
}

pub fn seeded_config(seed: u64) -> RoundSetupConfig {
    RoundSetupConfig {
        rng_seed: Some(seed),
        load_scenario_map: true,
    }
}

/// Builds the app on `catalogs`, selects `planet` and runs one round start.
pub fn run_round(catalogs: RoundCatalogs, planet: &str, seed: u64) -> App {
    let mut app = build_round_app_with(catalogs, seeded_config(seed));
    app.insert_resource(SelectedPlanet::new(planet));
    start_round(&mut app);
    app
}

pub fn spawned_prototypes(app: &mut App) -> Vec<String> {
    let mut query = app.world.query::<&PrototypeInstance>();
    query
        .iter(&app.world)
        .map(|instance| instance.0.to_string())
        .collect()
}
