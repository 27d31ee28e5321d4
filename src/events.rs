use crate::systems::dock::DockTypes;
use bevy::prelude::*;

/// ドックプロトコルの状態変化通知（演出・UI・テスト向け）
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockEvent {
    /// クライアントがホストの枠を予約した
    Reserved { client: Entity, host: Entity },
    /// 予約が解除された（正常終了・無効化・差し替えのいずれでも1回だけ）
    Released { client: Entity, host: Entity },
    /// ドック開始。ホスト・クライアント双方の開始フックに相当
    Docked { client: Entity, host: Entity },
    /// ドック終了
    Undocked { client: Entity, host: Entity },
    /// ドックシーケンスが最後まで終わった。近接ドックではサービスを終えたときだけ
    Completed { client: Entity, host: Entity },
    /// 予約先と共有しているドック種別が変わった
    ActiveTypesChanged {
        client: Entity,
        host: Entity,
        types: DockTypes,
    },
}

impl DockEvent {
    pub fn client(&self) -> Entity {
        match *self {
            DockEvent::Reserved { client, .. }
            | DockEvent::Released { client, .. }
            | DockEvent::Docked { client, .. }
            | DockEvent::Undocked { client, .. }
            | DockEvent::Completed { client, .. }
            | DockEvent::ActiveTypesChanged { client, .. } => client,
        }
    }

    pub fn host(&self) -> Entity {
        match *self {
            DockEvent::Reserved { host, .. }
            | DockEvent::Released { host, .. }
            | DockEvent::Docked { host, .. }
            | DockEvent::Undocked { host, .. }
            | DockEvent::Completed { host, .. }
            | DockEvent::ActiveTypesChanged { host, .. } => host,
        }
    }
}
