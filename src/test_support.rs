//! テスト用のワールド構築ヘルパ

use crate::events::DockEvent;
use crate::plugins::SimulationPlugin;
use crate::systems::dock::{DockClient, DockHost, DockService, DockTypes};
use crate::systems::task_queue::TaskChain;
use crate::world::{Cargo, Credits, Owner, Position, Team};
use bevy::ecs::message::Messages;
use bevy::prelude::*;

pub(crate) fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(SimulationPlugin);
    app
}

/// `ticks` 回更新し、その間に書かれた `DockEvent` を返す
///
/// メッセージは2更新で捨てられるので毎tick取り出す。
pub(crate) fn run(app: &mut App, ticks: usize) -> Vec<DockEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        app.update();
        events.extend(drain_dock_events(app));
    }
    events
}

pub(crate) fn spawn_player(app: &mut App, credits: i64) -> Entity {
    app.world_mut().spawn(Credits(credits)).id()
}

pub(crate) fn spawn_refinery(app: &mut App, owner: Entity, pos: IVec2) -> Entity {
    app.world_mut()
        .spawn((
            Position(pos),
            Team(0),
            Owner(owner),
            DockHost::new(vec![DockService::refinery()]),
        ))
        .id()
}

pub(crate) fn spawn_host(app: &mut App, owner: Entity, pos: IVec2, dock: DockHost) -> Entity {
    app.world_mut()
        .spawn((Position(pos), Team(0), Owner(owner), dock))
        .id()
}

/// 積荷を持った採集ユニット（タスクは空）
pub(crate) fn spawn_harvester(app: &mut App, owner: Entity, pos: IVec2, cargo: u32) -> Entity {
    app.world_mut()
        .spawn((
            Position(pos),
            Team(0),
            Owner(owner),
            Cargo {
                amount: cargo,
                capacity: cargo.max(1),
            },
            DockClient::new(DockTypes::UNLOAD),
            TaskChain::default(),
        ))
        .id()
}

/// これまでに書かれた `DockEvent` をすべて取り出す
pub(crate) fn drain_dock_events(app: &mut App) -> Vec<DockEvent> {
    app.world_mut()
        .resource_mut::<Messages<DockEvent>>()
        .drain()
        .collect()
}

pub(crate) fn count_released(events: &[DockEvent], client: Entity) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, DockEvent::Released { client: c, .. } if *c == client))
        .count()
}
