//! 階層型タスクスケジューラ
//!
//! アクターごとに1本の `TaskChain` を持ち、毎tick最も内側の子から順に進める。
//! - `task`: タスクの共通インターフェース
//! - `node`: 兄弟(`next`)・子(`child`)リンクとライフサイクル管理
//! - `chain`: アクターに付くコンポーネント
//! - `driver`: tick ごとの実行
//! - `orders`: 命令層からのワールド単位の入口

mod chain;
mod context;
mod driver;
mod node;
pub mod orders;
mod task;

#[cfg(test)]
mod tests;

pub use chain::TaskChain;
pub use context::TaskContext;
pub use driver::tick_task_chains_system;
pub use task::{Task, TaskStatus};
