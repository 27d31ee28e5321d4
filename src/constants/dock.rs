//! ドック/補給プロトコルの定数

/// 予約失敗時の再試行間隔 (tick)
pub const DOCK_RESERVE_RETRY_TICKS: u32 = 15;

/// ドック探索に失敗したときの再探索間隔 (tick)
pub const DOCK_SEARCH_RETRY_TICKS: u32 = 25;

/// 排他ドックが使用中だったときの待機間隔 (tick)
pub const DOCK_OCCUPIED_RETRY_TICKS: u32 = 5;

/// ドック位置に到着したとみなす半径
pub const DOCK_ARRIVAL_RADIUS: i32 = 64;

/// 予約キュー長の「無制限」センチネル
pub const DOCK_QUEUE_UNBOUNDED: i32 = -1;

/// 近接ドックのデフォルト待機時間 (tick)
pub const PROXIMITY_DOCK_WAIT_TICKS: u32 = 10;

/// 近接ドックのデフォルト有効範囲（ワールド単位）
pub const PROXIMITY_DOCK_RANGE: i32 = 3 * super::world::CELL_SIZE;

// ----- サービス -----
pub const REFINERY_UNLOAD_PER_TICK: u32 = 2;
pub const REFINERY_VALUE_PER_UNIT: i64 = 25;
pub const REARM_RELOAD_TICKS: u32 = 3;
pub const REPAIR_HP_PER_STEP: u32 = 10;
pub const REPAIR_STEP_TICKS: u32 = 2;
pub const REPAIR_COST_PER_STEP: i64 = 5;
