pub mod checksum;
pub mod dock;
pub mod task_execution;
pub mod task_queue;

use bevy::prelude::*;

/// 1tick内の実行順序を制御するセット（この順に chain される）
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// tick を進め、ドック種別の更新と無効な予約の解除を行う。
    /// 予約の後始末はタスクとホストが動く前にここで済ませる
    Sense,
    /// 全アクターのタスクチェーンを Entity 順に進める
    Tasks,
    /// 近接ドックのホスト処理
    Hosts,
    /// tick 終了時の同期チェックサム。状態は変更しない
    Checksum,
}
