//! ワールド座標・移動の定数

/// 1セルあたりのワールド単位（整数座標で決定論を保つ）
pub const CELL_SIZE: i32 = 1024;

/// 移動タスクのデフォルト速度（ワールド単位/tick）
pub const DEFAULT_MOVE_SPEED: i32 = 96;

/// 目的地に到着したとみなす半径
pub const MOVE_ARRIVAL_RADIUS: i32 = 32;
