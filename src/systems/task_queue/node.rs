//! チェーンのノード
//!
//! 1ノード = 1タスク。`next` は兄弟チェーンの残り、`child` は入れ子のサブキューで、
//! どちらもこのノードが所有する（`Box` の単一所有なので同じタスクが二つのキューに入ることはない）。
//!
//! 不変条件: 開始済みのノードは常に各チェーンの先頭にしかない。

use super::context::TaskContext;
use super::task::{Task, TaskStatus};
use crate::constants::*;
use bevy::prelude::*;
use std::any::Any;
use std::hash::{Hash, Hasher};

pub(crate) struct TaskNode {
    task: Box<dyn Task>,
    next: Option<Box<TaskNode>>,
    child: Option<Box<TaskNode>>,
    started: bool,
    cancel_requested: bool,
    /// 自分は完了を返したが、同時に積んだ子がまだ残っている
    finishing: bool,
}

impl TaskNode {
    pub(crate) fn new(task: Box<dyn Task>) -> Box<Self> {
        Box::new(Self {
            task,
            next: None,
            child: None,
            started: false,
            cancel_requested: false,
            finishing: false,
        })
    }

    pub(crate) fn name(&self) -> &'static str {
        self.task.name()
    }

    pub(crate) fn take_next(&mut self) -> Option<Box<TaskNode>> {
        self.next.take()
    }

    /// 兄弟チェーンの末尾に繋ぐ
    pub(crate) fn append(&mut self, node: Box<TaskNode>) {
        match &mut self.next {
            Some(next) => next.append(node),
            None => self.next = Some(node),
        }
    }

    fn append_rest(&mut self, rest: Option<Box<TaskNode>>) {
        if let Some(rest) = rest {
            self.append(rest);
        }
    }

    /// 1回の呼び出しで積まれた子をまとめて子チェーンに入れる
    fn push_children(&mut self, tasks: Vec<Box<dyn Task>>) {
        // 後から積んだものが先に走るよう逆順に連結する
        let mut batch: Option<Box<TaskNode>> = None;
        for task in tasks {
            let mut node = TaskNode::new(task);
            node.next = batch.take();
            batch = Some(node);
        }
        let Some(mut batch) = batch else {
            return;
        };

        let head_started = self.child.as_ref().is_some_and(|head| head.started);
        if head_started {
            // 開始済みの子は先頭から動かさない
            if let Some(head) = self.child.as_mut() {
                let rest = head.next.take();
                batch.append_rest(rest);
                head.next = Some(batch);
            }
        } else {
            batch.append_rest(self.child.take());
            self.child = Some(batch);
        }
    }

    /// タスクがコンテキストに積んだものを引き取る。新しい子を受け取ったら true
    fn absorb_queued(&mut self, ctx: &mut TaskContext) -> bool {
        let children = ctx.take_queued_children();
        let appended = ctx.take_appended();
        if children.len() > QUEUED_CHILDREN_WARN {
            warn!(
                "TASK_QUEUE: {} queued {} children in one tick on {:?}",
                self.task.name(),
                children.len(),
                ctx.actor()
            );
        }

        let queued_child = !children.is_empty();
        self.push_children(children);
        for task in appended {
            self.append(TaskNode::new(task));
        }
        queued_child
    }

    fn run_first(&mut self, ctx: &mut TaskContext) {
        self.started = true;
        ctx.set_cancel_requested(self.cancel_requested);
        self.task.on_first_run(ctx);
        self.absorb_queued(ctx);
    }

    /// 終了フック。ここで積まれた子は走る機会がないので捨てる
    fn run_last(&mut self, ctx: &mut TaskContext) {
        ctx.set_cancel_requested(self.cancel_requested);
        self.task.on_last_run(ctx);

        let dropped = ctx.take_queued_children();
        if !dropped.is_empty() {
            warn!(
                "TASK_QUEUE: {} queued {} children from its last run; dropped",
                self.task.name(),
                dropped.len()
            );
        }
        for task in ctx.take_appended() {
            self.append(TaskNode::new(task));
        }
    }

    fn wants_to_stop(&self) -> bool {
        self.cancel_requested && self.task.is_interruptible()
    }

    /// 自分と子孫がすべて割り込み可能か。未開始のものは常に可能
    fn chain_interruptible(&self) -> bool {
        let this = !self.started || self.task.is_interruptible();
        this && self
            .child
            .as_ref()
            .map_or(true, |child| child.chain_interruptible())
    }

    /// 子チェーンを1tick進める。子チェーンが空になったら true
    fn tick_child(&mut self, ctx: &mut TaskContext) -> bool {
        if let Some(child) = self.child.as_mut() {
            if child.tick(ctx) == TaskStatus::Complete {
                let next = child.take_next();
                self.child = next;
            }
        }
        self.child.is_none()
    }

    fn tear_down_child(&mut self, ctx: &mut TaskContext) {
        if let Some(child) = self.child.take() {
            child.tear_down(ctx);
        }
    }

    /// 自分・子孫・兄弟をすべて破棄する。開始済みのものには終了フックを呼ぶ
    pub(crate) fn tear_down(self: Box<Self>, ctx: &mut TaskContext) {
        let mut current = Some(self);
        while let Some(mut node) = current {
            node.tear_down_child(ctx);
            if node.started {
                node.run_last(ctx);
            }
            current = node.next.take();
        }
    }

    fn finish(&mut self, ctx: &mut TaskContext) -> TaskStatus {
        self.tear_down_child(ctx);
        self.run_last(ctx);
        TaskStatus::Complete
    }

    /// 1tick進める。`Complete` を返したら呼び出し側が `next` を引き継ぐ
    pub(crate) fn tick(&mut self, ctx: &mut TaskContext) -> TaskStatus {
        if !self.started {
            // 未開始のままキャンセルされたものはフックなしで捨てる
            if self.wants_to_stop() {
                self.child = None;
                return TaskStatus::Complete;
            }
            self.run_first(ctx);
        }

        // 子を差し置いて親が動けるのは、子優先でない親がキャンセルされたときだけ
        let overrule = !self.finishing && !self.task.child_has_priority() && self.wants_to_stop();
        if overrule && self.child.is_some() {
            let child_interruptible = self
                .child
                .as_ref()
                .map_or(true, |child| child.chain_interruptible());
            if child_interruptible {
                self.tear_down_child(ctx);
                return self.finish(ctx);
            }
            if !self.tick_child(ctx) {
                // 割り込み不可の子が走っている間は親のキャンセルも保留
                return TaskStatus::Continue;
            }
        } else if !self.tick_child(ctx) {
            return TaskStatus::Continue;
        }

        if self.finishing || self.wants_to_stop() {
            return self.finish(ctx);
        }

        ctx.set_cancel_requested(self.cancel_requested);
        let status = self.task.tick(ctx);
        let queued_child = self.absorb_queued(ctx);

        match status {
            TaskStatus::Continue => {
                // 積んだばかりの子は同じtickで開始して1tickの遅れを作らない
                if queued_child {
                    self.tick_child(ctx);
                }
                TaskStatus::Continue
            }
            TaskStatus::Complete if self.child.is_some() => {
                self.finishing = true;
                if queued_child && self.tick_child(ctx) {
                    return self.finish(ctx);
                }
                TaskStatus::Continue
            }
            TaskStatus::Complete => self.finish(ctx),
        }
    }

    /// キャンセル要求を立てる。実際に止まるのは次の自分のtick
    pub(crate) fn cancel(&mut self, keep_remaining: bool) {
        if let Some(child) = self.child.as_mut() {
            child.cancel(false);
        }
        self.cancel_requested = true;
        if !keep_remaining {
            // 兄弟は未開始なのでフックは不要
            self.next = None;
        }
    }

    /// 外部から直下に子を積む
    pub(crate) fn queue_child(&mut self, task: Box<dyn Task>) {
        self.push_children(vec![task]);
    }

    pub(crate) fn collect<'a, T: Task>(&'a self, out: &mut Vec<&'a T>) {
        let task: &dyn Any = &*self.task;
        if let Some(found) = task.downcast_ref::<T>() {
            out.push(found);
        }
        if let Some(child) = &self.child {
            child.collect(out);
        }
        if let Some(next) = &self.next {
            next.collect(out);
        }
    }

    pub(crate) fn collect_mut<'a, T: Task>(&'a mut self, out: &mut Vec<&'a mut T>) {
        let TaskNode {
            task, next, child, ..
        } = self;
        let task: &mut dyn Any = &mut **task;
        if let Some(found) = task.downcast_mut::<T>() {
            out.push(found);
        }
        if let Some(child) = child {
            child.collect_mut(out);
        }
        if let Some(next) = next {
            next.collect_mut(out);
        }
    }

    /// 深さ優先（自分 → 子 → 兄弟）で名前を並べる
    pub(crate) fn collect_names(&self, out: &mut Vec<&'static str>) {
        out.push(self.task.name());
        if let Some(child) = &self.child {
            child.collect_names(out);
        }
        if let Some(next) = &self.next {
            next.collect_names(out);
        }
    }

    pub(crate) fn hash_into<H: Hasher>(&self, state: &mut H) {
        self.task.name().hash(state);
        self.task.sync_state().hash(state);
        (self.started, self.cancel_requested, self.finishing).hash(state);
        match &self.child {
            Some(child) => {
                1u8.hash(state);
                child.hash_into(state);
            }
            None => 0u8.hash(state),
        }
        match &self.next {
            Some(next) => {
                1u8.hash(state);
                next.hash_into(state);
            }
            None => 0u8.hash(state),
        }
    }
}
