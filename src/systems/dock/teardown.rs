//! 予約の無効化
//!
//! ホストの死亡・無効化・売却・所有者変更、クライアントの死亡や陣営変更を毎tick検出し、
//! 該当する予約を解除する。解除は通常の `unreserve` 経路を通るので `Released` は1回だけ。

use super::client::DockClient;
use super::host::DockHost;
use super::reservation::{docked_host, force_teardown, host_is_valid, reserved_host, unreserve};
use crate::error::DockError;
use crate::relationships::DockReservations;
use crate::world::{is_alive, is_allied, owner_of};
use bevy::prelude::*;

pub fn release_invalid_reservations_system(world: &mut World) {
    release_on_owner_change(world);

    let mut clients: Vec<Entity> = world
        .query_filtered::<Entity, With<DockClient>>()
        .iter(world)
        .collect();
    clients.sort();

    for client in clients {
        let reserved = reserved_host(world, client);
        let docked = docked_host(world, client);

        if let Some(docked) = docked {
            if reserved != Some(docked) {
                let err = DockError::ReservationMismatch {
                    client,
                    expected: docked,
                    found: reserved,
                };
                error!("DOCK: {} [{}], tearing down", err, err.as_label());
                force_teardown(world, client);
                continue;
            }
        }

        let Some(host) = reserved else {
            continue;
        };
        let reason = if !is_alive(world, client) {
            Some("client gone")
        } else if !host_is_valid(world, host) {
            Some("host invalid")
        } else if !is_allied(world, host, client) {
            Some("no longer allied")
        } else {
            None
        };
        if let Some(reason) = reason {
            info!("DOCK: releasing {:?} from {:?} ({})", client, host, reason);
            unreserve(world, client);
        }
    }
}

/// 所有者が変わったホストの予約をすべて解除する
fn release_on_owner_change(world: &mut World) {
    let mut hosts: Vec<Entity> = world
        .query_filtered::<Entity, With<DockHost>>()
        .iter(world)
        .collect();
    hosts.sort();

    for host in hosts {
        let owner = owner_of(world, host);
        let Some(mut dock) = world.get_mut::<DockHost>(host) else {
            continue;
        };
        let previous = dock.observed_owner.replace(owner);
        match previous {
            Some(previous) if previous != owner => {}
            _ => continue,
        }

        let mut clients: Vec<Entity> = world
            .get::<DockReservations>(host)
            .map(|reservations| reservations.iter().copied().collect())
            .unwrap_or_default();
        clients.sort();
        if clients.is_empty() {
            continue;
        }
        info!(
            "DOCK: {:?} changed owner, releasing {} reservation(s)",
            host,
            clients.len()
        );
        for client in clients {
            unreserve(world, client);
        }
    }
}
