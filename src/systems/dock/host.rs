//! ドックホスト（サービスを提供する建物・パッド）

use super::service::{DockService, ServiceState};
use super::types::*;
use crate::constants::*;
use bevy::prelude::*;

/// ドックを提供するエンティティ
///
/// 予約テーブル本体は Relationship (`DockReservations`) 側にあり、
/// ここには静的な設定と有効/無効だけを持つ。
#[derive(Component, Debug, Clone)]
pub struct DockHost {
    pub types: DockTypes,
    pub queue_limit: QueueLimit,
    pub occupancy: DockOccupancy,
    /// ホスト位置からドック位置までのオフセット
    pub dock_offset: IVec2,
    pub drag: Option<DockDrag>,
    pub services: Vec<DockService>,
    /// 無効化されたホストは新規予約を受けず、既存の予約も解除される
    pub enabled: bool,
    /// 直近に観測した所有者。None はまだ観測していない
    pub(crate) observed_owner: Option<Option<Entity>>,
}

impl DockHost {
    pub fn new(services: Vec<DockService>) -> Self {
        let types = services
            .iter()
            .fold(DockTypes::empty(), |acc, service| acc | service.dock_type());
        Self {
            types,
            queue_limit: QueueLimit::from_raw(DOCK_QUEUE_UNBOUNDED),
            occupancy: DockOccupancy::Exclusive,
            dock_offset: IVec2::ZERO,
            drag: None,
            services,
            enabled: true,
            observed_owner: None,
        }
    }

    pub fn with_queue_limit(mut self, limit: QueueLimit) -> Self {
        self.queue_limit = limit;
        self
    }

    pub fn with_occupancy(mut self, occupancy: DockOccupancy) -> Self {
        self.occupancy = occupancy;
        self
    }

    pub fn with_dock_offset(mut self, offset: IVec2) -> Self {
        self.dock_offset = offset;
        self
    }

    pub fn with_drag(mut self, drag: DockDrag) -> Self {
        self.drag = Some(drag);
        self
    }

    pub fn dock_types(&self) -> DockTypes {
        self.types
    }

    pub fn dock_position(&self, host_position: IVec2) -> IVec2 {
        host_position + self.dock_offset
    }
}

/// 待機タイマー中のクライアント
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaitingClient {
    pub client: Entity,
    pub remaining_ticks: u32,
}

/// 近接ドックでサービス中のクライアント
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RemoteDock {
    pub(crate) client: Entity,
    pub(crate) phase: DockPhase,
    pub(crate) service: ServiceState,
    /// `Docked` を出した。`Undocked` はこれを見て対で出す
    pub(crate) docked: bool,
}

/// 範囲内の対応クライアントを命令なしで引き込むホスト（修理パッド・補給パッドなど）
///
/// `DockHost` と一緒に付ける。
#[derive(Component, Debug, Clone)]
pub struct ProximityDock {
    pub range: i32,
    /// 引き込んでからサービス開始までの待機 tick
    pub dock_wait_ticks: u32,
    pub(crate) waiting: Vec<WaitingClient>,
    pub(crate) serviced: Vec<RemoteDock>,
}

impl Default for ProximityDock {
    fn default() -> Self {
        Self {
            range: PROXIMITY_DOCK_RANGE,
            dock_wait_ticks: PROXIMITY_DOCK_WAIT_TICKS,
            waiting: Vec::new(),
            serviced: Vec::new(),
        }
    }
}

impl ProximityDock {
    pub fn waiting(&self) -> &[WaitingClient] {
        &self.waiting
    }

    /// サービス中（ドック済み）のクライアント
    pub fn serviced_clients(&self) -> impl Iterator<Item = Entity> + '_ {
        self.serviced.iter().map(|record| record.client)
    }

    pub fn tracks(&self, client: Entity) -> bool {
        self.waiting.iter().any(|w| w.client == client)
            || self.serviced.iter().any(|r| r.client == client)
    }
}
