//! ドック探索
//!
//! 候補の選び方:
//! 1. 明示的に指定されたホスト
//! 2. 直前に予約していたホスト（まだ予約できるなら）
//! 3. ドック位置が最も近いホスト（同距離なら Entity 順）

use super::client::{DockClient, wanted_types};
use super::host::{DockHost, ProximityDock};
use super::reservation::{can_dock, reserve};
use super::sequence::DockSequence;
use super::settings::DockSettings;
use crate::systems::task_execution::Wait;
use crate::systems::task_queue::{Task, TaskContext, TaskStatus};
use crate::world::{distance_squared, position_of};
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchState {
    Searching,
    /// 子の `DockSequence` が走っている
    Docking,
}

/// 必要なサービスがなくなるまで、ホストを探してはドックする
#[derive(Debug, Clone)]
pub struct FindAndDock {
    preferred: Option<Entity>,
    state: SearchState,
    retries_left: Option<u32>,
}

impl FindAndDock {
    pub fn new() -> Self {
        Self {
            preferred: None,
            state: SearchState::Searching,
            retries_left: None,
        }
    }

    /// 最初にこのホストを試す（予約できなければ通常の探索）
    pub fn prefer(host: Entity) -> Self {
        Self {
            preferred: Some(host),
            ..Self::new()
        }
    }

    fn search(&mut self, ctx: &mut TaskContext) -> TaskStatus {
        let client = ctx.actor();
        if wanted_types(ctx.world(), client).is_empty() {
            debug!("DOCK: {:?} needs no service, search done", client);
            return TaskStatus::Complete;
        }

        let preferred = self.preferred.take();
        if let Some(host) = choose_host(ctx.world_mut(), client, preferred) {
            match reserve(ctx.world_mut(), host, client) {
                Ok(true) => {
                    ctx.queue_child(DockSequence::new(host));
                    self.state = SearchState::Docking;
                    return TaskStatus::Continue;
                }
                Ok(false) => {}
                Err(e) => {
                    error!("DOCK: {:?} search hit {} [{}]", client, e, e.as_label());
                    return TaskStatus::Complete;
                }
            }
        }

        if let Some(left) = self.retries_left.as_mut() {
            if *left == 0 {
                info!("DOCK: {:?} found no dock, giving up", client);
                return TaskStatus::Complete;
            }
            *left -= 1;
        }
        let retry = DockSettings::current(ctx.world()).search_retry_ticks;
        debug!("DOCK: {:?} found no dock, retrying in {} ticks", client, retry);
        ctx.queue_child(Wait::new(retry));
        TaskStatus::Continue
    }
}

impl Default for FindAndDock {
    fn default() -> Self {
        Self::new()
    }
}

impl Task for FindAndDock {
    fn name(&self) -> &'static str {
        "find_and_dock"
    }

    fn on_first_run(&mut self, ctx: &mut TaskContext) {
        self.retries_left = DockSettings::current(ctx.world()).search_retry_budget;
    }

    fn tick(&mut self, ctx: &mut TaskContext) -> TaskStatus {
        // 子（ドック or 待機）が終わったところ
        if self.state == SearchState::Docking {
            debug!("DOCK: {:?} back from docking, searching again", ctx.actor());
        }
        self.state = SearchState::Searching;
        self.search(ctx)
    }

    fn sync_state(&self) -> u64 {
        let state = match self.state {
            SearchState::Searching => 0,
            SearchState::Docking => 1,
        };
        state | (self.retries_left.map_or(0, |left| u64::from(left) + 1) << 1)
    }
}

/// 予約できるホストを1つ選ぶ。近接ドック専用ホストは命令では使わない
pub fn choose_host(world: &mut World, client: Entity, preferred: Option<Entity>) -> Option<Entity> {
    let mut hosts: Vec<Entity> = world
        .query_filtered::<Entity, (With<DockHost>, Without<ProximityDock>)>()
        .iter(world)
        .collect();
    hosts.sort();

    let world: &World = world;
    hosts.retain(|&host| can_dock(world, host, client, false));
    if hosts.is_empty() {
        return None;
    }

    if let Some(host) = preferred.filter(|host| hosts.contains(host)) {
        return Some(host);
    }
    let last = world
        .get::<DockClient>(client)
        .and_then(|c| c.last_reserved_host);
    if let Some(host) = last.filter(|host| hosts.contains(host)) {
        return Some(host);
    }

    let client_pos = position_of(world, client).unwrap_or_default();
    hosts.into_iter().min_by_key(|&host| {
        let dock_pos = match (world.get::<DockHost>(host), position_of(world, host)) {
            (Some(dock), Some(pos)) => dock.dock_position(pos),
            _ => IVec2::ZERO,
        };
        (distance_squared(client_pos, dock_pos), host)
    })
}
