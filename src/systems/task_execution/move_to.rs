//! 目標地点・目標アクターへの移動

use crate::constants::*;
use crate::systems::task_queue::{Task, TaskContext, TaskStatus};
use crate::world::{Position, is_alive, position_of, step_towards, within_range};
use bevy::prelude::*;

/// 移動先。アクター指定の場合は毎tick解決し直す
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    Cell(IVec2),
    Actor { entity: Entity, offset: IVec2 },
}

impl MoveTarget {
    /// 現在の目標座標。目標アクターが消えていれば None
    pub fn resolve(&self, world: &World) -> Option<IVec2> {
        match *self {
            MoveTarget::Cell(pos) => Some(pos),
            MoveTarget::Actor { entity, offset } => {
                if !is_alive(world, entity) {
                    return None;
                }
                position_of(world, entity).map(|pos| pos + offset)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MoveTo {
    pub target: MoveTarget,
    pub speed: i32,
    pub arrival_radius: i32,
}

impl MoveTo {
    pub fn new(target: MoveTarget) -> Self {
        Self {
            target,
            speed: DEFAULT_MOVE_SPEED,
            arrival_radius: MOVE_ARRIVAL_RADIUS,
        }
    }

    pub fn with_arrival_radius(mut self, radius: i32) -> Self {
        self.arrival_radius = radius;
        self
    }
}

impl Task for MoveTo {
    fn name(&self) -> &'static str {
        "move_to"
    }

    fn tick(&mut self, ctx: &mut TaskContext) -> TaskStatus {
        let actor = ctx.actor();
        let Some(goal) = self.target.resolve(ctx.world()) else {
            debug!("MOVE: {:?} target vanished, stopping", actor);
            return TaskStatus::Complete;
        };
        let Some(mut position) = ctx.world_mut().get_mut::<Position>(actor) else {
            return TaskStatus::Complete;
        };

        if within_range(position.0, goal, self.arrival_radius) {
            return TaskStatus::Complete;
        }
        position.0 = step_towards(position.0, goal, self.speed);
        if within_range(position.0, goal, self.arrival_radius) {
            TaskStatus::Complete
        } else {
            TaskStatus::Continue
        }
    }
}
