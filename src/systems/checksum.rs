//! 同期チェックサム
//!
//! tick 終了時のシミュレーション状態をハッシュする。全レプリカで同じ値になるのが正常。
//! エンティティは必ず Entity 順で走査する。

use crate::game_state::{SimulationTick, SyncChecksum};
use crate::relationships::{DockedAt, ReservedDock};
use crate::systems::dock::{DockClient, ProximityDock};
use crate::systems::task_queue::TaskChain;
use crate::world::{Ammo, Cargo, Credits, Health, Position};
use bevy::prelude::*;
use std::hash::{Hash, Hasher};

/// FNV-1a (64bit)。`DefaultHasher` と違いアルゴリズムが固定。
/// 整数はリトルエンディアンで書く
#[derive(Debug, Clone, Copy)]
pub struct SyncHasher {
    state: u64,
}

impl SyncHasher {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
}

impl Default for SyncHasher {
    fn default() -> Self {
        Self {
            state: Self::OFFSET,
        }
    }
}

impl Hasher for SyncHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }

    fn write_u16(&mut self, i: u16) {
        self.write(&i.to_le_bytes());
    }

    fn write_u32(&mut self, i: u32) {
        self.write(&i.to_le_bytes());
    }

    fn write_u64(&mut self, i: u64) {
        self.write(&i.to_le_bytes());
    }

    fn write_usize(&mut self, i: usize) {
        self.write_u64(i as u64);
    }

    fn write_i32(&mut self, i: i32) {
        self.write(&i.to_le_bytes());
    }

    fn write_i64(&mut self, i: i64) {
        self.write(&i.to_le_bytes());
    }

    fn finish(&self) -> u64 {
        self.state
    }
}

fn sorted<F: bevy::ecs::query::QueryFilter>(world: &mut World) -> Vec<Entity> {
    let mut entities: Vec<Entity> = world.query_filtered::<Entity, F>().iter(world).collect();
    entities.sort();
    entities
}

pub fn state_checksum(world: &mut World) -> u64 {
    let mut hasher = SyncHasher::default();

    for actor in sorted::<With<TaskChain>>(world) {
        actor.hash(&mut hasher);
        if let Some(chain) = world.get::<TaskChain>(actor) {
            chain.hash_into(&mut hasher);
        }
    }

    for client in sorted::<With<DockClient>>(world) {
        client.hash(&mut hasher);
        world.get::<ReservedDock>(client).map(|r| r.0).hash(&mut hasher);
        world.get::<DockedAt>(client).map(|d| d.0).hash(&mut hasher);
    }

    for host in sorted::<With<ProximityDock>>(world) {
        host.hash(&mut hasher);
        if let Some(proximity) = world.get::<ProximityDock>(host) {
            proximity.waiting.hash(&mut hasher);
            proximity.serviced.hash(&mut hasher);
        }
    }

    for entity in sorted::<Or<(With<Position>, With<Credits>)>>(world) {
        entity.hash(&mut hasher);
        world.get::<Position>(entity).hash(&mut hasher);
        world.get::<Credits>(entity).map(|c| c.0).hash(&mut hasher);
        world.get::<Cargo>(entity).map(|c| c.amount).hash(&mut hasher);
        world.get::<Ammo>(entity).map(|a| a.current).hash(&mut hasher);
        world.get::<Health>(entity).map(|h| h.current).hash(&mut hasher);
    }

    hasher.finish()
}

pub fn update_sync_checksum_system(world: &mut World) {
    let tick = world.get_resource::<SimulationTick>().map_or(0, |t| t.0);
    let value = state_checksum(world);
    trace!("SYNC: tick {} checksum {:016x}", tick, value);
    world.insert_resource(SyncChecksum { tick, value });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CELL_SIZE;
    use crate::systems::dock::FindAndDock;
    use crate::test_support::*;

    fn scenario(extra_cargo: u32) -> App {
        let mut app = test_app();
        let player = spawn_player(&mut app, 100);
        spawn_refinery(&mut app, player, IVec2::ZERO);
        spawn_refinery(&mut app, player, IVec2::new(5 * CELL_SIZE, 5 * CELL_SIZE));
        for i in 0..4 {
            let pos = IVec2::new(3 * CELL_SIZE, i * CELL_SIZE);
            let harvester = spawn_harvester(&mut app, player, pos, 6 + extra_cargo);
            app.world_mut()
                .get_mut::<TaskChain>(harvester)
                .unwrap()
                .append(FindAndDock::new());
        }
        app
    }

    #[test]
    fn sync_hasher_is_fnv1a() {
        let mut hasher = SyncHasher::default();
        hasher.write(b"a");
        assert_eq!(hasher.finish(), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn replicas_agree_every_tick() {
        let mut a = scenario(0);
        let mut b = scenario(0);
        for _ in 0..80 {
            a.update();
            b.update();
            let left = *a.world().resource::<SyncChecksum>();
            let right = *b.world().resource::<SyncChecksum>();
            assert_eq!(left, right);
        }
    }

    #[test]
    fn diverging_state_changes_the_checksum() {
        let mut a = scenario(0);
        let mut b = scenario(1);
        a.update();
        b.update();
        assert_ne!(
            a.world().resource::<SyncChecksum>().value,
            b.world().resource::<SyncChecksum>().value
        );
    }
}
