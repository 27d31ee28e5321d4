//! ドックシーケンス（クライアント側）
//!
//! `Approach → Drag → DockStart → Active → Undock → Complete` を1つのタスクで進める。
//! 移動・引き込み・再試行待ちは子タスクとして積み、終わったら同じフェーズから再開する。
//!
//! ## 割り込み
//! `Approach` の間だけ割り込み可能。ドック開始後にキャンセルされた場合も
//! `Active` が要求を見て `Undock` へ進み、位置と予約を必ず片付けてから終わる。

use super::host::DockHost;
use super::reservation::{docked_host, host_is_valid, reserve, reserved_host, unreserve};
use super::service::{ServiceState, tick_service};
use super::settings::DockSettings;
use super::types::{DockOccupancy, DockPhase};
use crate::events::DockEvent;
use crate::relationships::{DockedAt, DockedClients};
use crate::systems::task_execution::{Drag, MoveTarget, MoveTo, Wait};
use crate::systems::task_queue::{Task, TaskChain, TaskContext, TaskStatus};
use crate::world::{is_alive, position_of, within_range};
use bevy::prelude::*;

#[cfg(test)]
mod tests;

/// フェーズ処理の結果
enum Flow {
    /// 同じ tick のうちに次のフェーズへ
    Next(DockPhase),
    /// このフェーズのまま次の tick（子タスクを積んだ場合は子が先に走る）
    Yield,
    /// シーケンス終了
    Done,
}

/// 1回のドック試行
#[derive(Debug, Clone)]
pub struct DockSequence {
    host: Entity,
    phase: DockPhase,
    /// 引き込み前の位置と所要 tick（帰りはそこへ引き戻す）
    dragged: Option<(IVec2, u32)>,
    docked: bool,
    service: ServiceState,
    finished: bool,
}

impl DockSequence {
    pub fn new(host: Entity) -> Self {
        Self {
            host,
            phase: DockPhase::Approach,
            dragged: None,
            docked: false,
            service: ServiceState::default(),
            finished: false,
        }
    }

    pub fn host(&self) -> Entity {
        self.host
    }

    pub fn phase(&self) -> DockPhase {
        self.phase
    }

    fn approach(&mut self, ctx: &mut TaskContext) -> Flow {
        let client = ctx.actor();
        let host = self.host;
        if !is_alive(ctx.world(), client) || !host_is_valid(ctx.world(), host) {
            info!("DOCK: {:?} gives up on {:?}, host or client gone", client, host);
            return Flow::Done;
        }

        let settings = DockSettings::current(ctx.world());
        match reserve(ctx.world_mut(), host, client) {
            Ok(true) => {}
            Ok(false) => {
                // 満杯などは再試行（エラーではない）
                ctx.queue_child(Wait::new(settings.reserve_retry_ticks));
                return Flow::Yield;
            }
            Err(e) => {
                error!("DOCK: {:?} cannot dock at {:?}: {} [{}]", client, host, e, e.as_label());
                return Flow::Done;
            }
        }

        let Some(dock) = ctx.world().get::<DockHost>(host) else {
            return Flow::Done;
        };
        let offset = dock.dock_offset;
        let has_drag = dock.drag.is_some();
        let (Some(client_pos), Some(host_pos)) = (
            position_of(ctx.world(), client),
            position_of(ctx.world(), host),
        ) else {
            // 位置を持たないものは到着済みとみなす
            return Flow::Next(if has_drag { DockPhase::Drag } else { DockPhase::DockStart });
        };

        if !within_range(client_pos, host_pos + offset, settings.arrival_radius) {
            ctx.queue_child(
                MoveTo::new(MoveTarget::Actor { entity: host, offset })
                    .with_arrival_radius(settings.arrival_radius),
            );
            return Flow::Yield;
        }
        Flow::Next(if has_drag { DockPhase::Drag } else { DockPhase::DockStart })
    }

    fn drag_in(&mut self, ctx: &mut TaskContext) -> Flow {
        let host = self.host;
        let Some(dock) = ctx.world().get::<DockHost>(host) else {
            return Flow::Next(DockPhase::DockStart);
        };
        let (Some(drag), Some(host_pos)) = (dock.drag, position_of(ctx.world(), host)) else {
            return Flow::Next(DockPhase::DockStart);
        };

        let dock_pos = dock.dock_position(host_pos);
        let from = position_of(ctx.world(), ctx.actor()).unwrap_or(dock_pos);
        ctx.queue_child(Drag::new(dock_pos + drag.offset, drag.ticks));
        self.dragged = Some((from, drag.ticks));
        self.phase = DockPhase::DockStart;
        Flow::Yield
    }

    fn dock_start(&mut self, ctx: &mut TaskContext) -> Flow {
        let client = ctx.actor();
        let host = self.host;
        if ctx.is_cancel_requested() {
            return Flow::Next(DockPhase::Undock);
        }
        if !host_is_valid(ctx.world(), host) || reserved_host(ctx.world(), client) != Some(host) {
            info!("DOCK: {:?} lost its slot at {:?} before docking", client, host);
            return Flow::Next(DockPhase::Undock);
        }

        let exclusive = ctx
            .world()
            .get::<DockHost>(host)
            .is_some_and(|dock| dock.occupancy == DockOccupancy::Exclusive);
        let occupied = ctx
            .world()
            .get::<DockedClients>(host)
            .is_some_and(|docked| docked.iter().any(|&other| other != client));
        if exclusive && occupied {
            let retry = DockSettings::current(ctx.world()).occupied_retry_ticks;
            ctx.queue_child(Wait::new(retry));
            return Flow::Yield;
        }

        if let Ok(mut entity) = ctx.world_mut().get_entity_mut(client) {
            entity.insert(DockedAt(host));
        }
        ctx.world_mut().flush();
        ctx.world_mut()
            .write_message(DockEvent::Docked { client, host });
        self.docked = true;
        info!("DOCK: {:?} docked at {:?}", client, host);
        self.phase = DockPhase::Active;
        Flow::Yield
    }

    fn active(&mut self, ctx: &mut TaskContext) -> Flow {
        let client = ctx.actor();
        let host = self.host;
        if ctx.is_cancel_requested() {
            info!("DOCK: {:?} undocking from {:?} on request", client, host);
            return Flow::Next(DockPhase::Undock);
        }
        if !host_is_valid(ctx.world(), host) || !is_alive(ctx.world(), client) {
            info!("DOCK: {:?} undocking, {:?} was invalidated", client, host);
            return Flow::Next(DockPhase::Undock);
        }
        if reserved_host(ctx.world(), client) != Some(host)
            || docked_host(ctx.world(), client) != Some(host)
        {
            info!("DOCK: {:?} no longer holds {:?}, undocking", client, host);
            return Flow::Next(DockPhase::Undock);
        }

        if tick_service(ctx.world_mut(), host, client, &mut self.service) {
            return Flow::Next(DockPhase::Undock);
        }
        Flow::Yield
    }

    fn undock(&mut self, ctx: &mut TaskContext) -> Flow {
        self.leave_dock(ctx);
        self.phase = DockPhase::Complete;
        match self.dragged.take() {
            Some((from, ticks)) => {
                ctx.queue_child(Drag::new(from, ticks));
                Flow::Yield
            }
            None => Flow::Next(DockPhase::Complete),
        }
    }

    fn complete(&mut self, ctx: &mut TaskContext) -> Flow {
        let client = ctx.actor();
        let host = self.host;
        self.release(ctx);
        ctx.world_mut()
            .write_message(DockEvent::Completed { client, host });
        info!(
            "DOCK: {:?} finished docking at {:?} (tick {})",
            client,
            host,
            ctx.tick()
        );
        self.finished = true;
        Flow::Done
    }

    /// ドック中の Relationship を外す（他のホストのものには触らない）
    fn leave_dock(&mut self, ctx: &mut TaskContext) {
        let client = ctx.actor();
        let host = self.host;
        if docked_host(ctx.world(), client) == Some(host) {
            if let Ok(mut entity) = ctx.world_mut().get_entity_mut(client) {
                entity.remove::<DockedAt>();
            }
        }
        if self.docked {
            self.docked = false;
            ctx.world_mut()
                .write_message(DockEvent::Undocked { client, host });
        }
    }

    /// このホストの予約だけを解除する。解除済みなら何もしない
    fn release(&mut self, ctx: &mut TaskContext) {
        let client = ctx.actor();
        if reserved_host(ctx.world(), client) == Some(self.host) {
            unreserve(ctx.world_mut(), client);
        }
    }
}

impl Task for DockSequence {
    fn name(&self) -> &'static str {
        "dock_sequence"
    }

    fn is_interruptible(&self) -> bool {
        self.phase == DockPhase::Approach
    }

    fn tick(&mut self, ctx: &mut TaskContext) -> TaskStatus {
        loop {
            let flow = match self.phase {
                DockPhase::Approach => self.approach(ctx),
                DockPhase::Drag => self.drag_in(ctx),
                DockPhase::DockStart => self.dock_start(ctx),
                DockPhase::Active => self.active(ctx),
                DockPhase::Undock => self.undock(ctx),
                DockPhase::Complete => self.complete(ctx),
            };
            match flow {
                Flow::Next(phase) => self.phase = phase,
                Flow::Yield => return TaskStatus::Continue,
                Flow::Done => return TaskStatus::Complete,
            }
        }
    }

    fn on_last_run(&mut self, ctx: &mut TaskContext) {
        if self.finished {
            return;
        }
        // 途中で終わった（キャンセル・破棄・諦め）場合も予約とドック状態を残さない
        self.leave_dock(ctx);
        self.release(ctx);
    }

    fn sync_state(&self) -> u64 {
        let dragged = self.dragged.map_or(0, |(_, ticks)| u64::from(ticks) + 1);
        (self.phase as u64) | (u64::from(self.docked) << 8) | (dragged << 16)
    }
}

/// アクターがドック中、またはドックに向かっているか
pub fn is_docking(world: &World, actor: Entity) -> bool {
    world.get::<DockedAt>(actor).is_some()
        || world
            .get::<TaskChain>(actor)
            .is_some_and(|chain| chain.contains::<DockSequence>())
}
