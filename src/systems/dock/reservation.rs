//! 予約ハンドシェイク
//!
//! ホスト側の予約テーブル (`DockReservations`) とクライアント側の予約 (`ReservedDock`) は
//! 同じ Relationship の両端なので、食い違いは構造上起こらない。
//! 予約の変更はすべてこのモジュールの関数を通し、呼び出した tick のうちに同期的に反映する。

use super::client::{DockClient, wanted_types};
use super::host::DockHost;
use super::types::DockTypes;
use crate::error::DockError;
use crate::events::DockEvent;
use crate::relationships::{DockReservations, DockedAt, ReservedDock};
use crate::world::{Dead, OutOfWorld, Selling, is_alive, is_allied};
use bevy::prelude::*;

/// 有効・生存・ワールド内・売却中でないホストか
pub fn host_is_valid(world: &World, host: Entity) -> bool {
    let Ok(entity) = world.get_entity(host) else {
        return false;
    };
    let Some(dock) = entity.get::<DockHost>() else {
        return false;
    };
    dock.enabled
        && !entity.contains::<Dead>()
        && !entity.contains::<OutOfWorld>()
        && !entity.contains::<Selling>()
}

pub fn reservation_count(world: &World, host: Entity) -> usize {
    world
        .get::<DockReservations>(host)
        .map_or(0, |reservations| reservations.len())
}

pub fn reserved_host(world: &World, client: Entity) -> Option<Entity> {
    world.get::<ReservedDock>(client).map(|r| r.0)
}

pub fn docked_host(world: &World, client: Entity) -> Option<Entity> {
    world.get::<DockedAt>(client).map(|d| d.0)
}

/// もう1件予約を受け付けられるか
pub fn has_capacity(world: &World, host: Entity) -> bool {
    world
        .get::<DockHost>(host)
        .is_some_and(|dock| dock.queue_limit.allows(reservation_count(world, host)))
}

/// クライアントがこのホストにドックできるか（予約前の判定）
///
/// `allow_force_enter` が false なら、今そのサービスを必要としていることも条件にする。
pub fn can_dock(world: &World, host: Entity, client: Entity, allow_force_enter: bool) -> bool {
    let Some(dock) = world.get::<DockHost>(host) else {
        return false;
    };
    let Some(dock_client) = world.get::<DockClient>(client) else {
        return false;
    };
    if !host_is_valid(world, host) || !is_alive(world, client) || !is_allied(world, host, client) {
        return false;
    }

    let types = if allow_force_enter {
        dock_client.supported
    } else {
        wanted_types(world, client)
    };
    if !types.intersects(dock.types) {
        return false;
    }
    reserved_host(world, client) == Some(host) || has_capacity(world, host)
}

/// 予約する。既に同じホストを予約していれば何もせず成功（冪等）
///
/// 満杯・無効・非同盟などは `Ok(false)`（再試行する条件）。
/// 別のホストを予約していた場合は、成功したときだけそちらを解除する。
pub fn reserve(world: &mut World, host: Entity, client: Entity) -> Result<bool, DockError> {
    if world.get::<DockHost>(host).is_none() {
        return Err(DockError::NotAHost { host });
    }
    if world.get::<DockClient>(client).is_none() {
        return Err(DockError::NotAClient { client });
    }

    let previous = reserved_host(world, client);
    if previous == Some(host) {
        return Ok(true);
    }
    if !can_dock(world, host, client, true) {
        debug!(
            "DOCK: {:?} could not reserve {:?} ({} reserved)",
            client,
            host,
            reservation_count(world, host)
        );
        return Ok(false);
    }

    if previous.is_some() {
        unreserve(world, client);
    }
    world.entity_mut(client).insert(ReservedDock(host));
    world.flush();
    world.write_message(DockEvent::Reserved { client, host });
    info!(
        "DOCK: {:?} reserved {:?} ({} reserved)",
        client,
        host,
        reservation_count(world, host)
    );
    Ok(true)
}

/// 予約を解除する。予約が無ければ何もしない（二重解除にならない）
///
/// `Released` 通知と `last_reserved_host` の更新は `on_reservation_removed` が行うので、
/// ホストの despawn による自動解除でも同じ経路を通る。
pub fn unreserve(world: &mut World, client: Entity) -> bool {
    if reserved_host(world, client).is_none() {
        return false;
    }
    let Ok(mut entity) = world.get_entity_mut(client) else {
        return false;
    };
    entity.remove::<(DockedAt, ReservedDock)>();
    world.flush();
    true
}

/// 予約の食い違いを検出したときの強制解除。両側を通常の解除経路に通す
pub fn force_teardown(world: &mut World, client: Entity) {
    if let Ok(mut entity) = world.get_entity_mut(client) {
        entity.remove::<DockedAt>();
    }
    unreserve(world, client);
}

/// 予約 Relationship が外れたとき（明示解除・差し替え・ホスト消滅のすべて）
pub fn on_reservation_removed(
    on: On<Remove, ReservedDock>,
    mut q_clients: Query<(&ReservedDock, Option<&mut DockClient>)>,
    mut dock_events: MessageWriter<DockEvent>,
) {
    let client = on.entity;
    let Ok((reserved, dock_client)) = q_clients.get_mut(client) else {
        return;
    };
    let host = reserved.0;

    if let Some(mut dock_client) = dock_client {
        dock_client.last_reserved_host = Some(host);
        dock_client.active = DockTypes::empty();
    }
    debug!("DOCK: {:?} released {:?}", client, host);
    dock_events.write(DockEvent::Released { client, host });
}
