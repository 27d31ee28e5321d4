//! ロックステップ・シミュレーション向けの
//! アクター別階層タスクスケジューラと、ドック/補給の予約プロトコル。
//!
//! 全レプリカが同じ入力から同じ状態に到達するよう、処理順はすべて `Entity` 順に固定し、
//! 座標は整数で扱う。

pub mod constants;
pub mod error;
pub mod events;
pub mod game_state;
pub mod plugins;
pub mod relationships;
pub mod systems;
pub mod world;

#[cfg(test)]
pub(crate) mod test_support;

pub use plugins::SimulationPlugin;
