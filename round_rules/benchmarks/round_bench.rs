use bevy::{ecs::event::Events, prelude::*};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use round_rules::{
    run_platoon_spawn, FactionFlags, FlyToRequested, PlatoonMarker, PlatoonSelection, RoundCatalogs,
    SelectedPlanet, ShipFaction,
};
use round_schema::{Faction, MarkerClass};

const CLASSES: [MarkerClass; 8] = [
    MarkerClass::LockedCommandDoor,
    MarkerClass::LockedGlassDoor,
    MarkerClass::OverwatchConsole,
    MarkerClass::ObjectivesConsole,
    MarkerClass::ReturnPointGeneric,
    MarkerClass::DropshipDestination,
    MarkerClass::WeaponVendor,
    MarkerClass::AmmoVendor,
];

/// A govfor ship plus ground markers; a quarter ride the ship and one in
/// seven carries both flags.
fn populated_world(markers: usize) -> World {
    let mut world = World::new();
    world.init_resource::<Events<FlyToRequested>>();
    let ship = world
        .spawn((ShipFaction::new("govfor"), TransformBundle::default()))
        .id();

    for idx in 0..markers {
        let mut marker = PlatoonMarker::new(CLASSES[idx % CLASSES.len()]);
        marker.factions = match idx % 7 {
            0 => FactionFlags::all(),
            n if n % 2 == 0 => FactionFlags::of(Faction::Govfor),
            _ => FactionFlags::of(Faction::Opfor),
        };
        let aboard = idx % 4 == 0;
        marker.aboard_ship = aboard;
        let position = Transform::from_xyz(idx as f32, (idx % 13) as f32, 0.0);
        let mut entity = world.spawn((marker, TransformBundle::from_transform(position)));
        if aboard {
            entity.set_parent(ship);
        }
    }
    world
}

fn bench_round_setup(c: &mut Criterion) {
    let catalogs = RoundCatalogs::builtin();
    let planet = SelectedPlanet::new("lv624");
    let selection = PlatoonSelection::default();
    let mut group = c.benchmark_group("round_setup");

    for markers in [64usize, 512, 4096] {
        group.bench_with_input(
            BenchmarkId::new("markers", markers),
            &markers,
            |b, &markers| {
                b.iter_batched(
                    || (populated_world(markers), ChaCha8Rng::seed_from_u64(7)),
                    |(mut world, mut rng)| {
                        let mut loader = catalogs.map_loader();
                        run_platoon_spawn(
                            &mut world,
                            &catalogs,
                            &planet,
                            &selection,
                            &mut loader,
                            &mut rng,
                        )
                        .map(|report| report.spawns.len())
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_round_setup);
criterion_main!(benches);
