//! シミュレーションロジックのプラグイン

use crate::game_state::{SimulationTick, SyncChecksum, advance_tick_system};
use crate::systems::SimulationSet;
use crate::systems::checksum::update_sync_checksum_system;
use crate::systems::dock::{
    DockSettings, on_reservation_removed, proximity_dock_system,
    release_invalid_reservations_system, update_dock_client_types_system,
};
use crate::systems::task_queue::tick_task_chains_system;
use bevy::prelude::*;

pub struct LogicPlugin;

impl Plugin for LogicPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationTick>()
            .init_resource::<SyncChecksum>()
            .init_resource::<DockSettings>()
            .configure_sets(
                Update,
                (
                    SimulationSet::Sense,
                    SimulationSet::Tasks,
                    SimulationSet::Hosts,
                    SimulationSet::Checksum,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    advance_tick_system,
                    update_dock_client_types_system,
                    release_invalid_reservations_system,
                )
                    .chain()
                    .in_set(SimulationSet::Sense),
            )
            .add_systems(Update, tick_task_chains_system.in_set(SimulationSet::Tasks))
            .add_systems(Update, proximity_dock_system.in_set(SimulationSet::Hosts))
            .add_systems(
                Update,
                update_sync_checksum_system.in_set(SimulationSet::Checksum),
            )
            .add_observer(on_reservation_removed);
    }
}
