//! スケジューラ本体
//!
//! 排他システムとして全アクターのチェーンを `Entity` 昇順に1回ずつ進める。
//! 実行中はチェーンをコンポーネントから取り外し、タスクに `&mut World` を渡す。

use super::chain::TaskChain;
use super::context::TaskContext;
use super::node::TaskNode;
use super::task::TaskStatus;
use crate::game_state::SimulationTick;
use bevy::prelude::*;

pub fn tick_task_chains_system(world: &mut World) {
    let tick = world
        .get_resource::<SimulationTick>()
        .map_or(0, |tick| tick.0);

    let mut actors: Vec<Entity> = world
        .query_filtered::<Entity, With<TaskChain>>()
        .iter(world)
        .collect();
    // リプレイ間で同じ順序になるよう Entity 順で固定する
    actors.sort();

    for actor in actors {
        tick_actor(world, actor, tick);
    }
}

/// 1アクターのチェーンを1tick進める。チェーンが空なら何もしない
pub(crate) fn tick_actor(world: &mut World, actor: Entity, tick: u64) {
    let Some(mut head) = world
        .get_mut::<TaskChain>(actor)
        .and_then(|mut chain| chain.take_head())
    else {
        return;
    };

    let mut ctx = TaskContext::new(world, actor, tick);
    let status = head.tick(&mut ctx);
    drop(ctx);

    let remaining = match status {
        TaskStatus::Continue => Some(head),
        TaskStatus::Complete => {
            let next = head.take_next();
            if let Some(next) = &next {
                debug!(
                    "TASK_QUEUE: {:?} finished {}, next is {}",
                    actor,
                    head.name(),
                    next.name()
                );
            }
            next
        }
    };
    restore_chain(world, actor, tick, remaining);
}

fn restore_chain(world: &mut World, actor: Entity, tick: u64, head: Option<Box<TaskNode>>) {
    if let Some(mut chain) = world.get_mut::<TaskChain>(actor) {
        chain.reattach(head);
        return;
    }

    // 実行中にアクターが消えた（またはチェーンが外された）
    if let Some(head) = head {
        debug!("TASK_QUEUE: {:?} lost its chain mid-tick, tearing down", actor);
        let mut ctx = TaskContext::new(world, actor, tick);
        head.tear_down(&mut ctx);
    }
}

/// チェーンを即座に破棄する。開始済みのタスクには終了フックが呼ばれる
pub(crate) fn tear_down_actor(world: &mut World, actor: Entity) {
    let tick = world
        .get_resource::<SimulationTick>()
        .map_or(0, |tick| tick.0);
    let Some(head) = world
        .get_mut::<TaskChain>(actor)
        .and_then(|mut chain| chain.take_head())
    else {
        return;
    };

    let mut ctx = TaskContext::new(world, actor, tick);
    head.tear_down(&mut ctx);
}
