//! 一定tick待つだけのタスク

use crate::systems::task_queue::{Task, TaskContext, TaskStatus};

/// `ticks` 回目の tick で完了する。再試行間隔の表現に使う
#[derive(Debug, Clone)]
pub struct Wait {
    remaining: u32,
    interruptible: bool,
}

impl Wait {
    pub fn new(ticks: u32) -> Self {
        Self {
            remaining: ticks,
            interruptible: true,
        }
    }

    /// キャンセルされても最後まで待つ
    pub fn uninterruptible(ticks: u32) -> Self {
        Self {
            remaining: ticks,
            interruptible: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl Task for Wait {
    fn name(&self) -> &'static str {
        "wait"
    }

    fn is_interruptible(&self) -> bool {
        self.interruptible
    }

    fn tick(&mut self, _ctx: &mut TaskContext) -> TaskStatus {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            TaskStatus::Complete
        } else {
            TaskStatus::Continue
        }
    }

    fn sync_state(&self) -> u64 {
        u64::from(self.remaining)
    }
}
