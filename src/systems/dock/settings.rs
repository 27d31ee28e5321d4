//! ドックプロトコルの実行時設定

use crate::constants::*;
use bevy::prelude::*;

/// 再試行間隔などの調整値。デフォルトは `constants` から
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct DockSettings {
    /// 予約に失敗したときの再試行間隔 (tick)
    pub reserve_retry_ticks: u32,
    /// ドックが見つからなかったときの再探索間隔 (tick)
    pub search_retry_ticks: u32,
    /// 再探索の上限回数。None なら諦めない
    pub search_retry_budget: Option<u32>,
    /// 排他ドックが使用中だったときの待機間隔 (tick)
    pub occupied_retry_ticks: u32,
    /// ドック位置への到着判定半径
    pub arrival_radius: i32,
}

impl Default for DockSettings {
    fn default() -> Self {
        Self {
            reserve_retry_ticks: DOCK_RESERVE_RETRY_TICKS,
            search_retry_ticks: DOCK_SEARCH_RETRY_TICKS,
            search_retry_budget: None,
            occupied_retry_ticks: DOCK_OCCUPIED_RETRY_TICKS,
            arrival_radius: DOCK_ARRIVAL_RADIUS,
        }
    }
}

impl DockSettings {
    /// リソースが無ければデフォルト
    pub fn current(world: &World) -> Self {
        world.get_resource::<Self>().cloned().unwrap_or_default()
    }
}
