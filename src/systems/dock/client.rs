//! ドッククライアント（サービスを受けるユニット）

use super::host::DockHost;
use super::types::DockTypes;
use crate::events::DockEvent;
use crate::relationships::ReservedDock;
use crate::world::{Ammo, Cargo, Health};
use bevy::prelude::*;

#[derive(Component, Debug, Clone)]
pub struct DockClient {
    /// このユニットが受けられるサービス
    pub supported: DockTypes,
    /// 今の状態で受けたいサービス（毎tick更新）
    pub(crate) accepted: DockTypes,
    /// 予約先と共有しているサービス
    pub(crate) active: DockTypes,
    /// 直前に予約していたホスト。所有関係ではない
    pub(crate) last_reserved_host: Option<Entity>,
}

impl DockClient {
    pub fn new(supported: DockTypes) -> Self {
        Self {
            supported,
            accepted: DockTypes::empty(),
            active: DockTypes::empty(),
            last_reserved_host: None,
        }
    }

    pub fn accepted(&self) -> DockTypes {
        self.accepted
    }

    pub fn active_types(&self) -> DockTypes {
        self.active
    }

    pub fn last_reserved_host(&self) -> Option<Entity> {
        self.last_reserved_host
    }
}

/// 積荷・弾薬・耐久から今受けたいサービスを求める
pub fn wanted_from(
    supported: DockTypes,
    cargo: Option<&Cargo>,
    ammo: Option<&Ammo>,
    health: Option<&Health>,
) -> DockTypes {
    let mut wanted = DockTypes::empty();
    if cargo.is_some_and(|c| !c.is_empty()) {
        wanted |= DockTypes::UNLOAD;
    }
    if ammo.is_some_and(|a| !a.is_full()) {
        wanted |= DockTypes::REARM;
    }
    if health.is_some_and(|h| !h.is_full()) {
        wanted |= DockTypes::REPAIR;
    }
    wanted & supported
}

/// ワールドから直接求める版。キャッシュ (`accepted`) の更新を待たない
pub fn wanted_types(world: &World, client: Entity) -> DockTypes {
    let Some(dock_client) = world.get::<DockClient>(client) else {
        return DockTypes::empty();
    };
    wanted_from(
        dock_client.supported,
        world.get::<Cargo>(client),
        world.get::<Ammo>(client),
        world.get::<Health>(client),
    )
}

/// 受けたいサービスと、予約先と共有している種別を更新する
pub fn update_dock_client_types_system(
    mut q_clients: Query<(
        Entity,
        &mut DockClient,
        Option<&Cargo>,
        Option<&Ammo>,
        Option<&Health>,
        Option<&ReservedDock>,
    )>,
    q_hosts: Query<&DockHost>,
    mut dock_events: MessageWriter<DockEvent>,
) {
    let mut clients: Vec<Entity> = q_clients.iter().map(|(entity, ..)| entity).collect();
    clients.sort();

    for entity in clients {
        let Ok((_, mut client, cargo, ammo, health, reserved)) = q_clients.get_mut(entity) else {
            continue;
        };

        let accepted = wanted_from(client.supported, cargo, ammo, health);
        if client.accepted != accepted {
            client.accepted = accepted;
        }

        let host = reserved.map(|r| r.0);
        let active = host
            .and_then(|host| q_hosts.get(host).ok())
            .map_or(DockTypes::empty(), |dock| accepted & dock.dock_types());
        if client.active == active {
            continue;
        }
        client.active = active;
        if let Some(host) = host {
            debug!(
                "DOCK: {:?} active types at {:?} now {:?}",
                entity, host, active
            );
            dock_events.write(DockEvent::ActiveTypesChanged {
                client: entity,
                host,
                types: active,
            });
        }
    }
}
