mod common;

use bevy::prelude::*;
use round_rules::{
    Placement, PlatoonMarker, RoundSetupReport, SpawnStage,
};
use round_schema::{Faction, MarkerClass};

#[test]
fn ship_objectives_marker_becomes_one_govfor_console() {
    let mut app = common::run_round(common::test_catalogs(), "proving_grounds", 4);
    let report = app.world.resource::<RoundSetupReport>().clone();

    let ship_spawns: Vec<_> = report.spawns_in(SpawnStage::ShipPass).collect();
    assert_eq!(ship_spawns.len(), 1);
    let record = ship_spawns[0];
    assert_eq!(record.prototype.as_str(), "objectives_console_govfor");
    assert_eq!(record.faction, Some(Faction::Govfor));
    assert_eq!(report.count_prototype("objectives_console_govfor"), 1);
    assert_eq!(report.count_prototype("objectives_console_opfor"), 0);

    assert_eq!(
        Placement::of(&app.world, record.entity),
        Placement::of(&app.world, record.marker)
    );

    let marker = app
        .world
        .get::<PlatoonMarker>(record.marker)
        .expect("marker stays in place");
    assert_eq!(marker.class, MarkerClass::ObjectivesConsole);
    assert!(marker.aboard_ship);
    assert!(marker.factions.is_empty());
    assert_eq!(
        app.world.get::<Name>(record.marker).map(Name::as_str),
        Some("Carrier objectives")
    );

    let mut markers = app.world.query::<&PlatoonMarker>();
    let placed = markers
        .iter(&app.world)
        .filter(|marker| marker.class != MarkerClass::FighterDestination)
        .count();
    // Scenario markers plus the dropship markers, none consumed.
    assert!(placed >= 5);
}

#[test]
fn global_pass_uses_marker_flags() {
    let app = common::run_round(common::test_catalogs(), "proving_grounds", 4);
    let report = app.world.resource::<RoundSetupReport>();

    // The opfor-flagged weapon vendor resolves through the raiders' loadout.
    assert_eq!(report.count_prototype("vendor_weapons_clf"), 1);
    // The vendor flagged for both sides is inert.
    assert_eq!(report.count_prototype("vendor_ammo_marines"), 0);

    let destinations: Vec<_> = report
        .spawns_in(SpawnStage::GlobalPass)
        .filter(|record| record.prototype.as_str() == "dropship_destination")
        .map(|record| record.faction)
        .collect();
    assert_eq!(destinations.len(), 2);
    assert!(destinations.contains(&Some(Faction::Govfor)));
    assert!(destinations.contains(&Some(Faction::Opfor)));
}
