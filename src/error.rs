//! スケジューラとドックプロトコルのエラー型
//!
//! ここに定義されるのは「正しい使い方では起こらない」契約違反のみ。
//! 予約失敗やホスト消失のような再試行・無効化はエラーではなく、
//! タスク側で待機/再試行/完了として処理する。

use bevy::prelude::*;
use thiserror::Error;

/// タスクチェーン操作の契約違反
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// アクターに `TaskChain` が付いていない
    #[error("actor {actor:?} has no task chain")]
    MissingChain { actor: Entity },

    /// 子タスクを付ける実行中タスクが存在しない
    #[error("actor {actor:?} has no running task to attach a child to")]
    NoActiveTask { actor: Entity },
}

impl SchedulerError {
    /// ログ用の短いラベル
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::MissingChain { .. } => "scheduler_missing_chain",
            SchedulerError::NoActiveTask { .. } => "scheduler_no_active_task",
        }
    }
}

/// ドック予約の契約違反
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DockError {
    /// 予約先が `DockHost` を持たない
    #[error("entity {host:?} is not a dock host")]
    NotAHost { host: Entity },

    /// 予約者が `DockClient` を持たない
    #[error("entity {client:?} is not a dock client")]
    NotAClient { client: Entity },

    /// クライアント側の予約とホスト側の認識が食い違っている
    #[error("client {client:?} expected reservation on {expected:?}, found {found:?}")]
    ReservationMismatch {
        client: Entity,
        expected: Entity,
        found: Option<Entity>,
    },
}

impl DockError {
    /// ログ用の短いラベル
    pub fn as_label(&self) -> &'static str {
        match self {
            DockError::NotAHost { .. } => "dock_not_a_host",
            DockError::NotAClient { .. } => "dock_not_a_client",
            DockError::ReservationMismatch { .. } => "dock_reservation_mismatch",
        }
    }
}
