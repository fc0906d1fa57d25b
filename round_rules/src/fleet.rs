//! Dropship and fighter maps: loading, console placement and launch orders.

use bevy::prelude::*;
use round_schema::{DestinationKind, Faction, MarkerClass, PrototypeId};

use crate::components::{
    DropshipDestination, FlyToRequested, NavigationComputer, PlatoonMarker, WhitelistedShuttle,
};
use crate::context::RoundSetupContext;
use crate::maps::{self, MapLoader};
use crate::picker::{self, RandomPicker};
use crate::platoon::PlatoonDefinition;
use crate::prototypes::{self, Placement};
use crate::report::{FlightOrder, RoundSetupReport, SpawnRecord, SpawnStage};

/// First destination in query order owned by `faction` for `kind`, optionally
/// restricted to one grid.
pub fn find_destination(
    world: &mut World,
    faction: Faction,
    kind: DestinationKind,
    grid: Option<Entity>,
) -> Option<Entity> {
    let mut query = world.query::<(Entity, &DropshipDestination)>();
    let world = &*world;
    query
        .iter(world)
        .filter(|(_, destination)| {
            destination.faction_controller == Some(faction) && destination.kind == kind
        })
        .map(|(entity, _)| entity)
        .find(|entity| grid.map_or(true, |grid| maps::grid_of(world, *entity) == Some(grid)))
}

pub fn find_navigation_computer(world: &mut World, grid: Entity) -> Option<Entity> {
    let mut query = world.query_filtered::<Entity, With<NavigationComputer>>();
    let world = &*world;
    query
        .iter(world)
        .find(|entity| maps::grid_of(world, *entity) == Some(grid))
}

pub fn markers_on_grid(world: &mut World, grid: Entity, class: MarkerClass) -> Vec<Entity> {
    let mut query = world.query::<(Entity, &PlatoonMarker)>();
    let world = &*world;
    query
        .iter(world)
        .filter(|(entity, marker)| {
            marker.class == class && maps::grid_of(world, *entity) == Some(grid)
        })
        .map(|(entity, _)| entity)
        .collect()
}

/// Loads dropships and fighters for every faction with a platoon, govfor first.
pub fn run_fleet_loader(
    world: &mut World,
    ctx: &RoundSetupContext<'_>,
    loader: &mut dyn MapLoader,
    picker: &mut dyn RandomPicker,
    report: &mut RoundSetupReport,
) {
    for faction in Faction::ALL {
        let Some(platoon) = ctx.platoon(faction) else {
            continue;
        };
        load_dropships(world, ctx, faction, platoon, loader, picker, report);
        load_fighters(world, ctx, faction, platoon, loader, picker, report);
    }
}

/// Draws compatible dropship maps without replacement until the planet's
/// count has loaded or the list runs out. Returns the number loaded.
pub fn load_dropships(
    world: &mut World,
    ctx: &RoundSetupContext<'_>,
    faction: Faction,
    platoon: &PlatoonDefinition,
    loader: &mut dyn MapLoader,
    picker: &mut dyn RandomPicker,
    report: &mut RoundSetupReport,
) -> usize {
    let wanted = ctx.planet.dropship_count(faction);
    let mut pool = platoon.compatible_dropships.clone();
    let mut loaded = 0;

    while loaded < wanted {
        let Some(map) = picker::take_random(picker, &mut pool) else {
            break;
        };
        let grids = match loader.load_map(world, &map) {
            Ok(grids) => grids,
            Err(err) => {
                tracing::warn!(
                    target: "round_rules::fleet",
                    faction = %faction,
                    map = %map,
                    error = %err,
                    "dropship.load_failed"
                );
                report.failed_maps.push(map);
                continue;
            }
        };
        loaded += 1;
        tracing::info!(
            target: "round_rules::fleet",
            faction = %faction,
            map = %map,
            grids = grids.len(),
            "dropship.loaded"
        );
        report.dropship_maps.get_mut(faction).push(map);

        for grid in grids {
            wire_dropship_grid(world, ctx, faction, grid, picker, report);
        }
    }

    if loaded < wanted {
        tracing::debug!(
            target: "round_rules::fleet",
            faction = %faction,
            wanted,
            loaded,
            "dropship.short"
        );
    }
    loaded
}

fn wire_dropship_grid(
    world: &mut World,
    ctx: &RoundSetupContext<'_>,
    faction: Faction,
    grid: Entity,
    picker: &mut dyn RandomPicker,
    report: &mut RoundSetupReport,
) {
    maps::initialize_map(world, grid);

    let consoles = [
        (
            MarkerClass::DropshipNavigation,
            ctx.rules.navigation_console.get(faction),
        ),
        (
            MarkerClass::DropshipWeapons,
            ctx.rules.weapons_console.get(faction),
        ),
    ];
    for (class, prototype) in consoles {
        let candidates = markers_on_grid(world, grid, class);
        let Some(&marker) = picker::choose(picker, &candidates) else {
            continue;
        };
        place_console(
            world,
            ctx,
            prototype,
            marker,
            faction,
            DestinationKind::Dropship,
            SpawnStage::DropshipConsole,
            report,
        );
    }

    let destination = find_destination(world, faction, DestinationKind::Dropship, None);
    let computer = find_navigation_computer(world, grid);
    order_flight(
        world,
        faction,
        DestinationKind::Dropship,
        computer,
        destination,
        report,
    );
}

/// Loads every compatible fighter map, then places `min(count, markers)`
/// weapons consoles on fighter markers drawn from the combined pool.
/// Returns the number of consoles placed.
pub fn load_fighters(
    world: &mut World,
    ctx: &RoundSetupContext<'_>,
    faction: Faction,
    platoon: &PlatoonDefinition,
    loader: &mut dyn MapLoader,
    picker: &mut dyn RandomPicker,
    report: &mut RoundSetupReport,
) -> usize {
    let mut pool = Vec::new();
    for map in &platoon.compatible_fighters {
        match loader.load_map(world, map) {
            Ok(grids) => {
                for grid in grids {
                    pool.extend(markers_on_grid(world, grid, MarkerClass::FighterDestination));
                }
                report.fighter_maps.get_mut(faction).push(map.clone());
            }
            Err(err) => {
                tracing::warn!(
                    target: "round_rules::fleet",
                    faction = %faction,
                    map = %map,
                    error = %err,
                    "fighter.load_failed"
                );
                report.failed_maps.push(map.clone());
            }
        }
    }

    let draws = ctx.planet.fighter_count(faction).min(pool.len());
    let prototype = ctx.rules.weapons_console.get(faction);
    let mut placed = 0;
    for _ in 0..draws {
        let Some(marker) = picker::take_random(picker, &mut pool) else {
            break;
        };
        if place_console(
            world,
            ctx,
            prototype,
            marker,
            faction,
            DestinationKind::Fighter,
            SpawnStage::FighterConsole,
            report,
        )
        .is_some()
        {
            placed += 1;
        }

        let Some(grid) = maps::grid_of(world, marker) else {
            continue;
        };
        maps::initialize_map(world, grid);
        let grid_filter = (!ctx.planet.in_ship(faction)).then_some(grid);
        let destination = find_destination(world, faction, DestinationKind::Fighter, grid_filter);
        let computer = find_navigation_computer(world, grid);
        order_flight(
            world,
            faction,
            DestinationKind::Fighter,
            computer,
            destination,
            report,
        );
    }

    tracing::info!(
        target: "round_rules::fleet",
        faction = %faction,
        maps = platoon.compatible_fighters.len(),
        placed,
        "fighter.wired"
    );
    placed
}

#[allow(clippy::too_many_arguments)]
fn place_console(
    world: &mut World,
    ctx: &RoundSetupContext<'_>,
    prototype: &PrototypeId,
    marker: Entity,
    faction: Faction,
    kind: DestinationKind,
    stage: SpawnStage,
    report: &mut RoundSetupReport,
) -> Option<Entity> {
    let placement = Placement::of(world, marker)?;
    let Some(console) = prototypes::spawn_prototype(world, ctx.prototypes, prototype, placement)
    else {
        tracing::warn!(
            target: "round_rules::fleet",
            prototype = %prototype,
            "console.unknown_prototype"
        );
        return None;
    };
    world.entity_mut(console).insert(WhitelistedShuttle {
        faction,
        shuttle_type: kind,
    });
    report.spawns.push(SpawnRecord {
        stage,
        entity: console,
        marker,
        prototype: prototype.clone(),
        faction: Some(faction),
    });
    Some(console)
}

fn order_flight(
    world: &mut World,
    faction: Faction,
    kind: DestinationKind,
    computer: Option<Entity>,
    destination: Option<Entity>,
    report: &mut RoundSetupReport,
) {
    let (Some(computer), Some(destination)) = (computer, destination) else {
        tracing::debug!(
            target: "round_rules::fleet",
            faction = %faction,
            kind = kind.as_str(),
            has_computer = computer.is_some(),
            has_destination = destination.is_some(),
            "flight.skipped"
        );
        return;
    };
    world.send_event(FlyToRequested {
        computer,
        destination,
        faction,
        kind,
    });
    report.flight_orders.push(FlightOrder {
        faction,
        kind,
        computer,
        destination,
    });
}
