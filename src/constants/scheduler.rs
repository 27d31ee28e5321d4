//! タスクスケジューラの定数

/// 1回の呼び出しで積める子タスク数の警告しきい値。これを超えたら構造の誤りを疑う
pub const QUEUED_CHILDREN_WARN: usize = 8;
