//! ドック/補給の予約プロトコル
//!
//! - `reservation`: 予約ハンドシェイク（ホストの予約テーブルとクライアントの予約は同じ Relationship）
//! - `sequence`: クライアント側のドック手順 (`DockSequence` タスク)
//! - `find_dock`: ホスト探索 (`FindAndDock` タスク)
//! - `proximity`: 範囲内のクライアントを引き込むホスト
//! - `teardown`: 死亡・無効化・所有者変更による予約の解除
//! - `service`: ドック中のサービス（荷下ろし・補給・修理）

mod client;
mod find_dock;
mod host;
mod proximity;
mod reservation;
mod sequence;
mod service;
mod settings;
mod teardown;
mod types;


pub use client::{DockClient, update_dock_client_types_system, wanted_from, wanted_types};
pub use find_dock::{FindAndDock, choose_host};
pub use host::{DockHost, ProximityDock, WaitingClient};
pub use proximity::proximity_dock_system;
pub use reservation::{
    can_dock, docked_host, force_teardown, has_capacity, host_is_valid, on_reservation_removed,
    reservation_count, reserve, reserved_host, unreserve,
};
pub use sequence::{DockSequence, is_docking};
pub use service::{DockService, ServiceState, tick_service};
pub use settings::DockSettings;
pub use teardown::release_invalid_reservations_system;
pub use types::{DockDrag, DockOccupancy, DockPhase, DockTypes, QueueLimit};
