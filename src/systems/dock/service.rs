//! ドック中のサービス（荷下ろし・補給・修理）
//!
//! 通常ドックと近接ドックのどちらも、ドック中は毎tick `tick_service` を1回呼ぶ。

use super::client::DockClient;
use super::host::DockHost;
use super::types::DockTypes;
use crate::constants::*;
use crate::world::{Ammo, Cargo, Credits, Health, owner_of};
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DockService {
    /// 積荷を下ろし、ホスト所有者の資金にする
    Refinery {
        unload_per_tick: u32,
        value_per_unit: i64,
    },
    /// `reload_ticks` ごとに弾薬を1補給
    Rearm { reload_ticks: u32 },
    /// `step_ticks` ごとに修理し、クライアント所有者が費用を払う
    Repair {
        hp_per_step: u32,
        step_ticks: u32,
        cost_per_step: i64,
    },
}

impl DockService {
    pub fn refinery() -> Self {
        DockService::Refinery {
            unload_per_tick: REFINERY_UNLOAD_PER_TICK,
            value_per_unit: REFINERY_VALUE_PER_UNIT,
        }
    }

    pub fn rearm() -> Self {
        DockService::Rearm {
            reload_ticks: REARM_RELOAD_TICKS,
        }
    }

    pub fn repair() -> Self {
        DockService::Repair {
            hp_per_step: REPAIR_HP_PER_STEP,
            step_ticks: REPAIR_STEP_TICKS,
            cost_per_step: REPAIR_COST_PER_STEP,
        }
    }

    pub fn dock_type(&self) -> DockTypes {
        match self {
            DockService::Refinery { .. } => DockTypes::UNLOAD,
            DockService::Rearm { .. } => DockTypes::REARM,
            DockService::Repair { .. } => DockTypes::REPAIR,
        }
    }
}

/// ドック1回分のサービス進行状況。0 から始まるのでドック直後から作業する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ServiceState {
    reload_countdown: u32,
    repair_countdown: u32,
}

/// 1tick分のサービスを行う。このドックでやることがもうなければ true
pub fn tick_service(world: &mut World, host: Entity, client: Entity, state: &mut ServiceState) -> bool {
    let Some(dock) = world.get::<DockHost>(host) else {
        return true;
    };
    let services = dock.services.clone();
    let supported = world
        .get::<DockClient>(client)
        .map_or(DockTypes::empty(), |c| c.supported);

    let mut pending = false;
    for service in services {
        if !supported.intersects(service.dock_type()) {
            continue;
        }
        let more = match service {
            DockService::Refinery {
                unload_per_tick,
                value_per_unit,
            } => unload(world, host, client, unload_per_tick, value_per_unit),
            DockService::Rearm { reload_ticks } => {
                rearm(world, client, reload_ticks, &mut state.reload_countdown)
            }
            DockService::Repair {
                hp_per_step,
                step_ticks,
                cost_per_step,
            } => repair(
                world,
                client,
                hp_per_step,
                step_ticks,
                cost_per_step,
                &mut state.repair_countdown,
            ),
        };
        pending |= more;
    }
    !pending
}

fn unload(world: &mut World, host: Entity, client: Entity, per_tick: u32, value: i64) -> bool {
    let Some(mut cargo) = world.get_mut::<Cargo>(client) else {
        return false;
    };
    if cargo.is_empty() {
        return false;
    }
    let amount = cargo.amount.min(per_tick.max(1));
    cargo.amount -= amount;
    let more = !cargo.is_empty();

    if let Some(owner) = owner_of(world, host) {
        if let Some(mut credits) = world.get_mut::<Credits>(owner) {
            credits.0 += i64::from(amount) * value;
        }
    }
    more
}

fn rearm(world: &mut World, client: Entity, reload_ticks: u32, countdown: &mut u32) -> bool {
    let Some(mut ammo) = world.get_mut::<Ammo>(client) else {
        return false;
    };
    if ammo.is_full() {
        return false;
    }
    if *countdown > 0 {
        *countdown -= 1;
        return true;
    }
    ammo.current += 1;
    *countdown = reload_ticks.saturating_sub(1);
    !ammo.is_full()
}

fn repair(
    world: &mut World,
    client: Entity,
    hp_per_step: u32,
    step_ticks: u32,
    cost: i64,
    countdown: &mut u32,
) -> bool {
    match world.get::<Health>(client) {
        Some(health) if !health.is_full() => {}
        _ => return false,
    }
    if *countdown > 0 {
        *countdown -= 1;
        return true;
    }

    // 所有者のいないユニットは無料。支払えなければ止まって待つ（資金が入れば再開）
    let owner = owner_of(world, client);
    if let Some(mut credits) = owner.and_then(|owner| world.get_mut::<Credits>(owner)) {
        if credits.0 < cost {
            debug!("DOCK: repair of {:?} stalled, owner cannot pay", client);
            return true;
        }
        credits.0 -= cost;
    }

    let Some(mut health) = world.get_mut::<Health>(client) else {
        return false;
    };
    health.current = (health.current + hp_per_step).min(health.max);
    *countdown = step_ticks.saturating_sub(1);
    !health.is_full()
}
