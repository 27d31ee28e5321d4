//! タスク実行のコンテキスト

use super::task::Task;
use bevy::prelude::*;

/// 1アクター分のチェーンを進める間、各タスクに渡されるコンテキスト
///
/// チェーン自体はワールドから一時的に取り外されているので、
/// タスクは自分のチェーンを `World` 経由ではなく `queue_child` / `append` で伸ばす。
pub struct TaskContext<'w> {
    world: &'w mut World,
    actor: Entity,
    tick: u64,
    cancel_requested: bool,
    queued_children: Vec<Box<dyn Task>>,
    appended: Vec<Box<dyn Task>>,
}

impl<'w> TaskContext<'w> {
    pub(crate) fn new(world: &'w mut World, actor: Entity, tick: u64) -> Self {
        Self {
            world,
            actor,
            tick,
            cancel_requested: false,
            queued_children: Vec::new(),
            appended: Vec::new(),
        }
    }

    /// このチェーンを所有するアクター
    pub fn actor(&self) -> Entity {
        self.actor
    }

    /// 現在のシミュレーションtick
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn world(&self) -> &World {
        &*self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut *self.world
    }

    /// 実行中タスクにキャンセル要求が出ているか。
    /// 割り込み不可のタスクはこれを見て自分で安全な終了点へ向かう
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    /// 実行中タスクの直下に子タスクを積む。
    /// 同じ呼び出し内で複数積んだ場合、最後に積んだものが先に走る
    pub fn queue_child(&mut self, task: impl Task) {
        self.queued_children.push(Box::new(task));
    }

    /// 実行中タスクと同じ階層の末尾にタスクを積む
    pub fn append(&mut self, task: impl Task) {
        self.appended.push(Box::new(task));
    }

    pub(crate) fn set_cancel_requested(&mut self, requested: bool) {
        self.cancel_requested = requested;
    }

    pub(crate) fn take_queued_children(&mut self) -> Vec<Box<dyn Task>> {
        std::mem::take(&mut self.queued_children)
    }

    pub(crate) fn take_appended(&mut self) -> Vec<Box<dyn Task>> {
        std::mem::take(&mut self.appended)
    }
}
