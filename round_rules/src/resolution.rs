//! The two marker passes: ship-scoped first, then everything left over.

use std::collections::HashSet;

use bevy::prelude::*;
use round_schema::Faction;

use crate::classifier::{self, MarkerView};
use crate::components::{PlatoonMarker, ShipFaction};
use crate::context::RoundSetupContext;
use crate::platoon::PlatoonDefinition;
use crate::report::{RoundSetupReport, SpawnRecord, SpawnStage};

/// Markers already handled this round.
#[derive(Debug, Clone, Default)]
pub struct ClaimedMarkers(HashSet<Entity>);

impl ClaimedMarkers {
    pub fn claim(&mut self, marker: Entity) -> bool {
        self.0.insert(marker)
    }

    pub fn is_claimed(&self, marker: Entity) -> bool {
        self.0.contains(&marker)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct MarkerSnapshot {
    entity: Entity,
    marker: PlatoonMarker,
    parent: Option<Entity>,
}

fn snapshot_markers(world: &mut World) -> Vec<MarkerSnapshot> {
    let mut query = world.query::<(Entity, &PlatoonMarker, Option<&Parent>)>();
    query
        .iter(world)
        .map(|(entity, marker, parent)| MarkerSnapshot {
            entity,
            marker: marker.clone(),
            parent: parent.map(Parent::get),
        })
        .collect()
}

/// Resolves ship-scoped markers on every ship whose faction starts aboard and
/// has a platoon. The ship's faction drives the classifier. Returns the
/// number of objects spawned.
pub fn resolve_ship_markers(
    world: &mut World,
    ctx: &RoundSetupContext<'_>,
    claimed: &mut ClaimedMarkers,
    report: &mut RoundSetupReport,
) -> usize {
    let ships: Vec<(Entity, ShipFaction)> = world
        .query::<(Entity, &ShipFaction)>()
        .iter(world)
        .map(|(entity, ship)| (entity, ship.clone()))
        .collect();
    if ships.is_empty() {
        return 0;
    }
    let markers = snapshot_markers(world);

    let mut spawned = 0;
    for (ship, ownership) in ships {
        let Some(faction) = ownership.recognised() else {
            tracing::debug!(
                target: "round_rules::markers",
                ship = ?ship,
                faction = %ownership.faction,
                "ship.skipped=unknown_faction"
            );
            continue;
        };
        if !ctx.planet.in_ship(faction) {
            continue;
        }
        let Some(platoon) = ctx.platoon(faction) else {
            tracing::debug!(
                target: "round_rules::markers",
                ship = ?ship,
                faction = %faction,
                "ship.skipped=no_platoon"
            );
            continue;
        };

        for snapshot in markers
            .iter()
            .filter(|s| s.marker.aboard_ship && s.parent == Some(ship))
        {
            claimed.claim(snapshot.entity);
            let view = MarkerView::new(&snapshot.marker).with_parent_ship(Some(faction));
            spawned += resolve_marker(
                world,
                ctx,
                snapshot.entity,
                view,
                Some(faction),
                Some(platoon),
                SpawnStage::ShipPass,
                report,
            );
        }
    }
    spawned
}

/// Resolves every unclaimed marker by its own faction flags.
pub fn resolve_global_markers(
    world: &mut World,
    ctx: &RoundSetupContext<'_>,
    claimed: &ClaimedMarkers,
    report: &mut RoundSetupReport,
) -> usize {
    let markers = snapshot_markers(world);
    let mut spawned = 0;
    for snapshot in markers.iter().filter(|s| !claimed.is_claimed(s.entity)) {
        let effective = effective_faction(ctx, &snapshot.marker);
        let parent_ship = snapshot
            .parent
            .and_then(|parent| world.get::<ShipFaction>(parent))
            .and_then(ShipFaction::recognised);
        let view = MarkerView::new(&snapshot.marker).with_parent_ship(parent_ship);
        spawned += resolve_marker(
            world,
            ctx,
            snapshot.entity,
            view,
            effective,
            effective.and_then(|faction| ctx.platoon(faction)),
            SpawnStage::GlobalPass,
            report,
        );
    }
    spawned
}

/// First flagged faction that has a platoon this round. Doors flagged for
/// both sides, or neither, have no faction.
fn effective_faction(ctx: &RoundSetupContext<'_>, marker: &PlatoonMarker) -> Option<Faction> {
    if marker.class.is_door() && marker.factions.is_ambiguous() {
        return None;
    }
    Faction::ALL
        .into_iter()
        .find(|faction| marker.factions.has(*faction) && ctx.platoon(*faction).is_some())
}

#[allow(clippy::too_many_arguments)]
fn resolve_marker(
    world: &mut World,
    ctx: &RoundSetupContext<'_>,
    marker: Entity,
    view: MarkerView<'_>,
    effective: Option<Faction>,
    loadout: Option<&PlatoonDefinition>,
    stage: SpawnStage,
    report: &mut RoundSetupReport,
) -> usize {
    let Some(spec) = ctx.classifier().resolve(view, effective, loadout) else {
        tracing::trace!(
            target: "round_rules::markers",
            marker = ?marker,
            class = %view.class(),
            "marker.skipped"
        );
        return 0;
    };
    let Some(entity) = classifier::spawn_at_marker(world, ctx.prototypes, &spec, marker) else {
        return 0;
    };
    tracing::debug!(
        target: "round_rules::markers",
        marker = ?marker,
        class = %view.class(),
        prototype = %spec.prototype(),
        stage = ?stage,
        "marker.resolved"
    );
    report.spawns.push(SpawnRecord {
        stage,
        entity,
        marker,
        prototype: spec.prototype().clone(),
        faction: spec.faction(),
    });
    1
}
