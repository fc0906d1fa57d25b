mod common;

use std::collections::HashSet;

use round_rules::{RoundSetupReport, SpawnStage, WhitelistedShuttle};
use round_schema::{DestinationKind, Faction};

fn fighter_markers(report: &RoundSetupReport, faction: Faction) -> Vec<bevy::prelude::Entity> {
    report
        .spawns_in(SpawnStage::FighterConsole)
        .filter(|record| record.faction == Some(faction))
        .map(|record| record.marker)
        .collect()
}

#[test]
fn fighters_fill_every_pooled_marker_when_requested() {
    for seed in 0..8 {
        let app = common::run_round(common::test_catalogs(), "proving_grounds", seed);
        let report = app.world.resource::<RoundSetupReport>();

        assert_eq!(report.fighter_maps.govfor.len(), 2);
        let govfor = fighter_markers(report, Faction::Govfor);
        assert_eq!(govfor.len(), 3);
        assert_eq!(govfor.iter().collect::<HashSet<_>>().len(), 3);

        let opfor = fighter_markers(report, Faction::Opfor);
        assert_eq!(opfor.len(), 1);

        for record in report.spawns_in(SpawnStage::FighterConsole) {
            let whitelist = app.world.get::<WhitelistedShuttle>(record.entity).unwrap();
            assert_eq!(whitelist.shuttle_type, DestinationKind::Fighter);
            assert_eq!(Some(whitelist.faction), record.faction);
        }

        // Govfor starts aboard its ship so any launch point will do; opfor
        // must find one on the fighter's own grid.
        let fighter_orders = report
            .flight_orders
            .iter()
            .filter(|order| order.kind == DestinationKind::Fighter)
            .count();
        assert_eq!(fighter_orders, 4);
    }
}

#[test]
fn fighter_draws_never_exceed_pool() -> anyhow::Result<()> {
    let catalogs = common::catalogs_with_count("govfor", "fighters", 10)?;
    let app = common::run_round(catalogs, "proving_grounds", 5);
    let report = app.world.resource::<RoundSetupReport>();
    let govfor = fighter_markers(report, Faction::Govfor);
    assert_eq!(govfor.len(), 3);
    assert_eq!(govfor.iter().collect::<HashSet<_>>().len(), 3);
    Ok(())
}

#[test]
fn fighter_draws_stop_at_requested_count() -> anyhow::Result<()> {
    let catalogs = common::catalogs_with_count("govfor", "fighters", 2)?;
    let app = common::run_round(catalogs, "proving_grounds", 6);
    let report = app.world.resource::<RoundSetupReport>();
    assert_eq!(fighter_markers(report, Faction::Govfor).len(), 2);
    // Both wings still load even though one marker goes unused.
    assert_eq!(report.fighter_maps.govfor.len(), 2);
    Ok(())
}
