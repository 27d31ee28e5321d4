//! シミュレーション全体の状態リソース

use bevy::prelude::*;

/// 現在のシミュレーションtick。`App::update` 1回で1進む
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SimulationTick(pub u64);

/// 直近tick終了時点の同期チェックサム。レプリカ間で比較する
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncChecksum {
    pub tick: u64,
    pub value: u64,
}

pub fn advance_tick_system(mut tick: ResMut<SimulationTick>) {
    tick.0 += 1;
}
