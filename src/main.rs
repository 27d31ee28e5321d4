use bevy::log::LogPlugin;
use bevy::prelude::*;
use lockstep_dock::SimulationPlugin;
use lockstep_dock::constants::CELL_SIZE;
use lockstep_dock::events::DockEvent;
use lockstep_dock::game_state::{SimulationTick, SyncChecksum};
use lockstep_dock::systems::dock::{
    DockClient, DockDrag, DockHost, DockService, DockTypes, FindAndDock, ProximityDock, QueueLimit,
};
use lockstep_dock::systems::task_queue::TaskChain;
use lockstep_dock::world::{Ammo, Cargo, Credits, Health, Owner, Position, Team};
use std::env;

const DEFAULT_TICKS: u64 = 600;

/// ヘッドレス実行の集計
#[derive(Resource, Default)]
struct DockTally {
    reserved: usize,
    released: usize,
    completed: usize,
}

fn main() {
    let ticks = env::var("SIM_TICKS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TICKS);
    let filter = env::var("SIM_LOG").unwrap_or_else(|_| "lockstep_dock=info".to_string());

    let mut app = App::new();
    app.add_plugins(LogPlugin {
        level: bevy::log::Level::INFO,
        filter,
        ..default()
    })
    .add_plugins(SimulationPlugin)
    .init_resource::<DockTally>()
    .add_systems(Startup, spawn_demo_scenario)
    .add_systems(Last, (tally_dock_events_system, sync_report_system));

    for _ in 0..ticks {
        app.update();
    }

    let world = app.world();
    let tally = world.resource::<DockTally>();
    let checksum = world.resource::<SyncChecksum>();
    info!(
        "SIM: finished {} ticks, reserved={} released={} completed={} checksum={:016x}",
        world.resource::<SimulationTick>().0,
        tally.reserved,
        tally.released,
        tally.completed,
        checksum.value
    );
}

/// 精製所1つ・修理ドック1つ・近接補給パッド1つと、採集ユニット・戦闘ユニットを置く
fn spawn_demo_scenario(mut commands: Commands) {
    let player = commands.spawn(Credits(200)).id();
    let team = Team(0);

    let refinery = commands
        .spawn((
            Position(IVec2::new(0, 0)),
            team,
            Owner(player),
            DockHost::new(vec![DockService::refinery()])
                .with_queue_limit(QueueLimit::Limited(3))
                .with_dock_offset(IVec2::new(CELL_SIZE, 0))
                .with_drag(DockDrag {
                    offset: IVec2::new(0, CELL_SIZE / 2),
                    ticks: 4,
                }),
        ))
        .id();
    commands.spawn((
        Position(IVec2::new(-8 * CELL_SIZE, 4 * CELL_SIZE)),
        team,
        Owner(player),
        DockHost::new(vec![DockService::repair()]),
    ));
    commands.spawn((
        Position(IVec2::new(6 * CELL_SIZE, 6 * CELL_SIZE)),
        team,
        Owner(player),
        DockHost::new(vec![DockService::rearm()]),
        ProximityDock::default(),
    ));

    for i in 0..4 {
        commands.spawn((
            Position(IVec2::new(12 * CELL_SIZE, i * 3 * CELL_SIZE)),
            team,
            Owner(player),
            Cargo {
                amount: 20,
                capacity: 20,
            },
            Health { current: 60, max: 100 },
            DockClient::new(DockTypes::UNLOAD | DockTypes::REPAIR),
            // 1台目は命令で精製所を指定された想定
            TaskChain::new(if i == 0 {
                FindAndDock::prefer(refinery)
            } else {
                FindAndDock::new()
            }),
        ));
    }

    for i in 0..2 {
        commands.spawn((
            Position(IVec2::new(6 * CELL_SIZE + i * CELL_SIZE, 7 * CELL_SIZE)),
            team,
            Owner(player),
            Ammo { current: 0, max: 6 },
            DockClient::new(DockTypes::REARM),
            TaskChain::default(),
        ));
    }
}

fn tally_dock_events_system(mut events: MessageReader<DockEvent>, mut tally: ResMut<DockTally>) {
    for event in events.read() {
        match event {
            DockEvent::Reserved { .. } => tally.reserved += 1,
            DockEvent::Released { .. } => tally.released += 1,
            DockEvent::Completed { .. } => tally.completed += 1,
            _ => {}
        }
    }
}

fn sync_report_system(checksum: Res<SyncChecksum>) {
    if checksum.tick % 100 == 0 {
        info!("SYNC: tick {} checksum {:016x}", checksum.tick, checksum.value);
    }
}
