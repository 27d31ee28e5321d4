//! 近接（リモート）ドック
//!
//! ホストが範囲内の対応クライアントを自分から引き込む。フェーズの形は通常のドックと同じで、
//! 引き込みの代わりに待機タイマー (`dock_wait_ticks`) を挟む。
//! クライアントのタスクチェーンには触らない。

use super::host::{DockHost, ProximityDock, RemoteDock, WaitingClient};
use super::reservation::{can_dock, docked_host, host_is_valid, reserve, reserved_host, unreserve};
use super::service::{ServiceState, tick_service};
use super::types::{DockOccupancy, DockPhase};
use super::client::DockClient;
use crate::events::DockEvent;
use crate::relationships::{DockedAt, ReservedDock};
use crate::world::{is_alive, position_of, within_range};
use bevy::prelude::*;

/// 近接ドックのホストを Entity 順に1tick進める
pub fn proximity_dock_system(world: &mut World) {
    let mut hosts: Vec<Entity> = world
        .query_filtered::<Entity, (With<ProximityDock>, With<DockHost>)>()
        .iter(world)
        .collect();
    hosts.sort();

    let mut clients: Vec<Entity> = world
        .query_filtered::<Entity, With<DockClient>>()
        .iter(world)
        .collect();
    clients.sort();

    for host in hosts {
        tick_proximity_host(world, host, &clients);
    }
}

fn tick_proximity_host(world: &mut World, host: Entity, clients: &[Entity]) {
    // 記録を取り外して、ワールドを自由に触れるようにする
    let Some((mut waiting, mut serviced, range, wait_ticks)) =
        world.get_mut::<ProximityDock>(host).map(|mut proximity| {
            (
                std::mem::take(&mut proximity.waiting),
                std::mem::take(&mut proximity.serviced),
                proximity.range,
                proximity.dock_wait_ticks,
            )
        })
    else {
        return;
    };

    if host_is_valid(world, host) {
        pull_clients(world, host, clients, range, wait_ticks, &mut waiting, &serviced);
        advance_waiting(world, host, range, &mut waiting, &mut serviced);
        advance_serviced(world, host, range, &mut serviced);
    } else {
        for record in waiting.drain(..) {
            release_if_ours(world, host, record.client);
        }
        for mut record in serviced.drain(..) {
            undock_remote(world, host, &mut record);
            release_if_ours(world, host, record.client);
        }
    }

    if let Some(mut proximity) = world.get_mut::<ProximityDock>(host) {
        proximity.waiting = waiting;
        proximity.serviced = serviced;
    }
}

fn dock_position(world: &World, host: Entity) -> Option<IVec2> {
    let dock = world.get::<DockHost>(host)?;
    position_of(world, host).map(|pos| dock.dock_position(pos))
}

fn in_range(world: &World, host: Entity, client: Entity, range: i32) -> bool {
    match (dock_position(world, host), position_of(world, client)) {
        (Some(dock_pos), Some(client_pos)) => within_range(client_pos, dock_pos, range),
        _ => false,
    }
}

/// 範囲内にいる、サービスを必要とする未予約のクライアントを予約して待機させる
fn pull_clients(
    world: &mut World,
    host: Entity,
    clients: &[Entity],
    range: i32,
    wait_ticks: u32,
    waiting: &mut Vec<WaitingClient>,
    serviced: &[RemoteDock],
) {
    for &client in clients {
        if waiting.iter().any(|w| w.client == client)
            || serviced.iter().any(|r| r.client == client)
        {
            continue;
        }
        // 他のホストを予約中（命令でドックに向かっている等）なら奪わない
        if world.get::<ReservedDock>(client).is_some() {
            continue;
        }
        if !can_dock(world, host, client, false) || !in_range(world, host, client, range) {
            continue;
        }

        match reserve(world, host, client) {
            Ok(true) => {
                info!(
                    "DOCK_HOST: {:?} pulled {:?}, docking in {} ticks",
                    host, client, wait_ticks
                );
                waiting.push(WaitingClient {
                    client,
                    remaining_ticks: wait_ticks,
                });
            }
            Ok(false) => {}
            Err(e) => error!("DOCK_HOST: {:?} failed to pull {:?}: {}", host, client, e),
        }
    }
}

/// 待機タイマーを進め、満了したものをドックへ、範囲外・無効になったものを破棄する
fn advance_waiting(
    world: &mut World,
    host: Entity,
    range: i32,
    waiting: &mut Vec<WaitingClient>,
    serviced: &mut Vec<RemoteDock>,
) {
    let exclusive = world
        .get::<DockHost>(host)
        .is_some_and(|dock| dock.occupancy == DockOccupancy::Exclusive);

    let mut kept = Vec::with_capacity(waiting.len());
    for mut record in waiting.drain(..) {
        let client = record.client;
        let still_valid = reserved_host(world, client) == Some(host)
            && is_alive(world, client)
            && in_range(world, host, client, range);
        if !still_valid {
            debug!("DOCK_HOST: {:?} dropped waiting {:?}", host, client);
            release_if_ours(world, host, client);
            continue;
        }

        record.remaining_ticks = record.remaining_ticks.saturating_sub(1);
        if record.remaining_ticks == 0 && (!exclusive || serviced.is_empty()) {
            serviced.push(RemoteDock {
                client,
                phase: DockPhase::DockStart,
                service: ServiceState::default(),
                docked: false,
            });
        } else {
            kept.push(record);
        }
    }
    *waiting = kept;
}

/// ドック済みのクライアントを `DockStart → Active → Undock → Complete` で進める
///
/// `Completed` はサービスを最後まで終えたときだけ出す。途中で失ったクライアントには出さない
fn advance_serviced(world: &mut World, host: Entity, range: i32, serviced: &mut Vec<RemoteDock>) {
    serviced.retain_mut(|record| {
        let client = record.client;
        let still_valid = reserved_host(world, client) == Some(host)
            && is_alive(world, client)
            && in_range(world, host, client, range);
        if !still_valid && matches!(record.phase, DockPhase::DockStart | DockPhase::Active) {
            info!("DOCK_HOST: {:?} lost {:?} mid-service", host, client);
            record.phase = DockPhase::Undock;
        }

        let mut serviced_out = false;
        loop {
            match record.phase {
                DockPhase::Approach | DockPhase::Drag | DockPhase::DockStart => {
                    if let Ok(mut entity) = world.get_entity_mut(client) {
                        entity.insert(DockedAt(host));
                    }
                    world.flush();
                    record.docked = true;
                    world.write_message(DockEvent::Docked { client, host });
                    info!("DOCK_HOST: {:?} servicing {:?}", host, client);
                    // ドックした tick からサービスする
                    record.phase = DockPhase::Active;
                }
                DockPhase::Active => {
                    if !tick_service(world, host, client, &mut record.service) {
                        return true;
                    }
                    serviced_out = true;
                    record.phase = DockPhase::Undock;
                }
                DockPhase::Undock => {
                    undock_remote(world, host, record);
                    record.phase = DockPhase::Complete;
                }
                DockPhase::Complete => {
                    release_if_ours(world, host, client);
                    if serviced_out {
                        world.write_message(DockEvent::Completed { client, host });
                    }
                    return false;
                }
            }
        }
    });
}

/// `Docked` を出したクライアントには、予約が先に外れていても必ず `Undocked` を出す
fn undock_remote(world: &mut World, host: Entity, record: &mut RemoteDock) {
    if !record.docked {
        return;
    }
    record.docked = false;
    let client = record.client;
    if docked_host(world, client) == Some(host) {
        if let Ok(mut entity) = world.get_entity_mut(client) {
            entity.remove::<DockedAt>();
        }
    }
    world.write_message(DockEvent::Undocked { client, host });
}

fn release_if_ours(world: &mut World, host: Entity, client: Entity) {
    if reserved_host(world, client) == Some(host) {
        unreserve(world, client);
    }
}
