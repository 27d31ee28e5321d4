//! プラグインモジュールのエントリポイント

pub mod logic;
pub mod messages;

pub use logic::LogicPlugin;
pub use messages::MessagesPlugin;

use bevy::prelude::*;

/// スケジューラとドックプロトコル一式
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((MessagesPlugin, LogicPlugin));
    }
}
