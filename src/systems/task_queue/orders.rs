//! 命令層・AI からの入口
//!
//! `&mut World` を持つ呼び出し側（排他システム、テスト、他のタスク）向け。
//! `Query<&mut TaskChain>` を持っている場合は `TaskChain` のメソッドを直接使えばよい。

use super::chain::TaskChain;
use super::driver::tear_down_actor;
use super::task::Task;
use crate::error::SchedulerError;
use bevy::prelude::*;

fn chain_mut(world: &mut World, actor: Entity) -> Result<Mut<'_, TaskChain>, SchedulerError> {
    world
        .get_mut::<TaskChain>(actor)
        .ok_or(SchedulerError::MissingChain { actor })
}

pub fn queue(
    world: &mut World,
    actor: Entity,
    task: impl Task,
    keep_existing: bool,
) -> Result<(), SchedulerError> {
    let name = task.name();
    chain_mut(world, actor)?.queue(task, keep_existing);
    debug!(
        "TASK_QUEUE: {:?} queued {} (keep_existing: {})",
        actor, name, keep_existing
    );
    Ok(())
}

pub fn append(world: &mut World, actor: Entity, task: impl Task) -> Result<(), SchedulerError> {
    chain_mut(world, actor)?.append(task);
    Ok(())
}

/// 実行中の先頭タスクに子を積む。先頭がなければ契約違反
pub fn queue_child(world: &mut World, actor: Entity, task: impl Task) -> Result<(), SchedulerError> {
    if chain_mut(world, actor)?.queue_child(task) {
        Ok(())
    } else {
        Err(SchedulerError::NoActiveTask { actor })
    }
}

pub fn cancel(world: &mut World, actor: Entity, keep_remaining: bool) -> Result<(), SchedulerError> {
    chain_mut(world, actor)?.cancel(keep_remaining);
    Ok(())
}

pub fn current_head(world: &World, actor: Entity) -> Option<&'static str> {
    world
        .get::<TaskChain>(actor)
        .and_then(|chain| chain.current_head())
}

/// チェーンを即座に空にする。開始済みのタスクは終了フックで後始末する
pub fn clear(world: &mut World, actor: Entity) -> Result<(), SchedulerError> {
    if world.get::<TaskChain>(actor).is_none() {
        return Err(SchedulerError::MissingChain { actor });
    }
    tear_down_actor(world, actor);
    info!("TASK_QUEUE: {:?} chain cleared", actor);
    Ok(())
}
