//! ドックプロトコルの基本型

use crate::constants::*;
use bevy::prelude::*;

bitflags::bitflags! {
    /// ドック種別の集合。ホストは提供する種別、クライアントは受けたい種別を持つ
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DockTypes: u8 {
        /// 積荷の荷下ろし（精製所）
        const UNLOAD = 0b0000_0001;
        /// 弾薬の補給
        const REARM  = 0b0000_0010;
        /// 修理
        const REPAIR = 0b0000_0100;
    }
}

/// 予約キューの長さ制限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueLimit {
    Unbounded,
    Limited(usize),
}

impl QueueLimit {
    /// ルールセット由来の生の値から作る。負数（センチネル -1）は無制限
    pub fn from_raw(raw: i32) -> Self {
        if raw < 0 {
            if raw != DOCK_QUEUE_UNBOUNDED {
                warn!("DOCK: queue length {} treated as unbounded", raw);
            }
            QueueLimit::Unbounded
        } else {
            QueueLimit::Limited(raw as usize)
        }
    }

    /// 現在 `count` 件の予約があるとき、もう1件受け付けられるか
    pub fn allows(&self, count: usize) -> bool {
        match self {
            QueueLimit::Unbounded => true,
            QueueLimit::Limited(limit) => count < *limit,
        }
    }
}

/// 同時にドックできるクライアント数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DockOccupancy {
    /// 1台ずつ。残りの予約者は離れて待つ
    Exclusive,
    /// 複数台が同時にサービスを受ける
    Shared,
}

/// ドック時の引き込み（ドック位置から `offset` へ `ticks` かけて移動）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DockDrag {
    pub offset: IVec2,
    pub ticks: u32,
}

/// ドック1回分のフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DockPhase {
    #[default]
    Approach,
    Drag,
    DockStart,
    Active,
    Undock,
    Complete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_queue_length_is_unbounded() {
        assert_eq!(QueueLimit::from_raw(-1), QueueLimit::Unbounded);
        assert!(QueueLimit::from_raw(-1).allows(10_000));
        assert!(QueueLimit::from_raw(2).allows(1));
        assert!(!QueueLimit::from_raw(2).allows(2));
        assert!(!QueueLimit::from_raw(0).allows(0));
    }
}
