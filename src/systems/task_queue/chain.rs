//! アクターごとのタスクチェーン

use super::node::TaskNode;
use super::task::Task;
use bevy::prelude::*;
use std::hash::Hasher;

/// アクターの現在の行動
///
/// 先頭ノード1つだけを持ち、残りはすべて `next` / `child` からぶら下がる。
/// 外部（命令層・AI）はこのメソッド群か `orders` のワールド関数を通してのみ触る。
#[derive(Component, Default)]
pub struct TaskChain {
    head: Option<Box<TaskNode>>,
}

impl TaskChain {
    pub fn new(task: impl Task) -> Self {
        let mut chain = Self::default();
        chain.append(task);
        chain
    }

    /// 命令を積む。
    /// `keep_existing = false` なら現在の行動をキャンセルし、それが終わり次第このタスクが走る
    pub fn queue(&mut self, task: impl Task, keep_existing: bool) {
        if !keep_existing {
            self.cancel(false);
        }
        self.append(task);
    }

    /// 兄弟チェーンの末尾に積む
    pub fn append(&mut self, task: impl Task) {
        self.append_boxed(Box::new(task));
    }

    pub fn append_boxed(&mut self, task: Box<dyn Task>) {
        self.append_node(TaskNode::new(task));
    }

    fn append_node(&mut self, node: Box<TaskNode>) {
        match &mut self.head {
            Some(head) => head.append(node),
            None => self.head = Some(node),
        }
    }

    /// 先頭タスクの直下に子を積む。先頭がなければ false（タスクは捨てられる）
    pub fn queue_child(&mut self, task: impl Task) -> bool {
        match &mut self.head {
            Some(head) => {
                head.queue_child(Box::new(task));
                true
            }
            None => false,
        }
    }

    /// 先頭タスクにキャンセルを要求する
    pub fn cancel(&mut self, keep_remaining: bool) {
        if let Some(head) = &mut self.head {
            head.cancel(keep_remaining);
        }
    }

    pub fn current_head(&self) -> Option<&'static str> {
        self.head.as_ref().map(|head| head.name())
    }

    pub fn is_idle(&self) -> bool {
        self.head.is_none()
    }

    /// 兄弟・子チェーンを深さ優先で探し、型 `T` のタスクをすべて返す
    pub fn find_in_chain<T: Task>(&self) -> Vec<&T> {
        let mut found = Vec::new();
        if let Some(head) = &self.head {
            head.collect(&mut found);
        }
        found
    }

    /// `find_in_chain` の可変版。チェーンを壊さずに走行中タスクの状態を書き換える
    pub fn find_in_chain_mut<T: Task>(&mut self) -> Vec<&mut T> {
        let mut found = Vec::new();
        if let Some(head) = &mut self.head {
            head.collect_mut(&mut found);
        }
        found
    }

    pub fn contains<T: Task>(&self) -> bool {
        !self.find_in_chain::<T>().is_empty()
    }

    /// チェーン全体のタスク名（自分 → 子 → 兄弟の順）
    pub fn active_task_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if let Some(head) = &self.head {
            head.collect_names(&mut names);
        }
        names
    }

    pub(crate) fn take_head(&mut self) -> Option<Box<TaskNode>> {
        self.head.take()
    }

    /// 実行後のチェーンを戻す。
    /// 取り外している間にワールド経由で積まれたものは末尾に繋ぎ直す
    pub(crate) fn reattach(&mut self, head: Option<Box<TaskNode>>) {
        let queued_meanwhile = self.head.take();
        self.head = head;
        if let Some(queued) = queued_meanwhile {
            self.append_node(queued);
        }
    }

    pub(crate) fn hash_into<H: Hasher>(&self, state: &mut H) {
        match &self.head {
            Some(head) => head.hash_into(state),
            None => state.write_u8(0),
        }
    }
}
