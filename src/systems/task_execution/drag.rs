//! ドック前後の引き込み

use crate::systems::task_queue::{Task, TaskContext, TaskStatus};
use crate::world::{Position, lerp};
use bevy::prelude::*;

/// 開始時の位置から `to` へ `ticks` かけて補間移動する。
/// 途中でキャンセルしても位置が飛ばないよう割り込み不可
#[derive(Debug, Clone)]
pub struct Drag {
    from: IVec2,
    to: IVec2,
    ticks: u32,
    elapsed: u32,
}

impl Drag {
    pub fn new(to: IVec2, ticks: u32) -> Self {
        Self {
            from: to,
            to,
            ticks,
            elapsed: 0,
        }
    }

    fn place(&self, ctx: &mut TaskContext, pos: IVec2) {
        let actor = ctx.actor();
        if let Some(mut position) = ctx.world_mut().get_mut::<Position>(actor) {
            position.0 = pos;
        }
    }
}

impl Task for Drag {
    fn name(&self) -> &'static str {
        "drag"
    }

    fn is_interruptible(&self) -> bool {
        false
    }

    fn on_first_run(&mut self, ctx: &mut TaskContext) {
        // 到着判定の半径内のどこにいてもそこから動かす
        if let Some(position) = ctx.world().get::<Position>(ctx.actor()) {
            self.from = position.0;
        }
    }

    fn tick(&mut self, ctx: &mut TaskContext) -> TaskStatus {
        self.elapsed = (self.elapsed + 1).min(self.ticks);
        let pos = lerp(self.from, self.to, self.elapsed, self.ticks);
        self.place(ctx, pos);
        if self.elapsed >= self.ticks {
            TaskStatus::Complete
        } else {
            TaskStatus::Continue
        }
    }

    fn sync_state(&self) -> u64 {
        u64::from(self.elapsed)
    }
}
