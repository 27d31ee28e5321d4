use super::*;
use crate::error::SchedulerError;
use crate::game_state::SimulationTick;
use bevy::prelude::*;

#[derive(Resource, Default)]
struct Journal(Vec<String>);

/// 指定回数ステップしたら完了するテスト用タスク
struct Probe {
    label: &'static str,
    remaining: u32,
    interruptible: bool,
    child_priority: bool,
    children: Vec<Probe>,
}

impl Probe {
    fn new(label: &'static str, steps: u32) -> Self {
        Self {
            label,
            remaining: steps,
            interruptible: true,
            child_priority: true,
            children: Vec::new(),
        }
    }

    fn committed(mut self) -> Self {
        self.interruptible = false;
        self
    }

    fn overrules_children(mut self) -> Self {
        self.child_priority = false;
        self
    }

    fn with_children(mut self, children: Vec<Probe>) -> Self {
        self.children = children;
        self
    }
}

fn note(ctx: &mut TaskContext, entry: String) {
    ctx.world_mut().resource_mut::<Journal>().0.push(entry);
}

impl Task for Probe {
    fn name(&self) -> &'static str {
        self.label
    }

    fn is_interruptible(&self) -> bool {
        self.interruptible
    }

    fn child_has_priority(&self) -> bool {
        self.child_priority
    }

    fn on_first_run(&mut self, ctx: &mut TaskContext) {
        note(ctx, format!("{}:first", self.label));
    }

    fn tick(&mut self, ctx: &mut TaskContext) -> TaskStatus {
        note(ctx, format!("{}:step", self.label));
        for child in std::mem::take(&mut self.children) {
            ctx.queue_child(child);
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            TaskStatus::Complete
        } else {
            TaskStatus::Continue
        }
    }

    fn on_last_run(&mut self, ctx: &mut TaskContext) {
        note(ctx, format!("{}:last", self.label));
    }
}

/// tick 中に自分のアクターへワールド経由で命令を積むタスク
struct Reorder;

impl Task for Reorder {
    fn name(&self) -> &'static str {
        "reorder"
    }

    fn tick(&mut self, ctx: &mut TaskContext) -> TaskStatus {
        let actor = ctx.actor();
        orders::append(ctx.world_mut(), actor, Probe::new("late", 1))
            .expect("placeholder chain stays attached");
        TaskStatus::Continue
    }
}

fn setup(tasks: Vec<Probe>) -> (World, Entity) {
    let mut world = World::new();
    world.insert_resource(SimulationTick(0));
    world.init_resource::<Journal>();
    let mut chain = TaskChain::default();
    for task in tasks {
        chain.append(task);
    }
    let actor = world.spawn(chain).id();
    (world, actor)
}

fn step(world: &mut World, ticks: usize) {
    for _ in 0..ticks {
        world.resource_mut::<SimulationTick>().0 += 1;
        tick_task_chains_system(world);
    }
}

fn journal(world: &mut World) -> Vec<String> {
    std::mem::take(&mut world.resource_mut::<Journal>().0)
}

fn chain(world: &World, actor: Entity) -> &TaskChain {
    world.get::<TaskChain>(actor).expect("actor keeps its chain")
}

#[test]
fn siblings_drain_in_append_order() {
    let (mut world, _) = setup(vec![
        Probe::new("a", 2),
        Probe::new("b", 1),
        Probe::new("c", 1),
    ]);

    step(&mut world, 4);

    assert_eq!(
        journal(&mut world),
        [
            "a:first", "a:step", "a:step", "a:last", "b:first", "b:step", "b:last", "c:first",
            "c:step", "c:last",
        ]
    );
}

#[test]
fn next_sibling_starts_on_the_following_tick() {
    let (mut world, actor) = setup(vec![Probe::new("a", 1), Probe::new("b", 1)]);

    step(&mut world, 1);
    assert_eq!(journal(&mut world), ["a:first", "a:step", "a:last"]);
    assert_eq!(chain(&world, actor).current_head(), Some("b"));
}

#[test]
fn children_finish_before_the_parent_steps_again() {
    let parent = Probe::new("p", 2).with_children(vec![Probe::new("x", 2), Probe::new("y", 1)]);
    let (mut world, actor) = setup(vec![parent]);

    step(&mut world, 3);

    // 同じ呼び出しで積んだ子は後入れ先出し
    assert_eq!(
        journal(&mut world),
        [
            "p:first", "p:step", "y:first", "y:step", "y:last", "x:first", "x:step", "x:step",
            "x:last", "p:step", "p:last",
        ]
    );
    assert!(chain(&world, actor).is_idle());
}

#[test]
fn interruptible_cancel_finishes_without_stepping() {
    let (mut world, actor) = setup(vec![Probe::new("a", 10)]);
    step(&mut world, 1);
    journal(&mut world);

    world.get_mut::<TaskChain>(actor).unwrap().cancel(false);
    step(&mut world, 1);

    assert_eq!(journal(&mut world), ["a:last"]);
    assert!(chain(&world, actor).is_idle());
}

#[test]
fn committed_task_ignores_cancel_until_it_completes() {
    let (mut world, actor) = setup(vec![Probe::new("commit", 4).committed(), Probe::new("after", 1)]);
    step(&mut world, 1);

    orders::cancel(&mut world, actor, false).unwrap();
    for _ in 0..2 {
        step(&mut world, 1);
        assert_eq!(chain(&world, actor).current_head(), Some("commit"));
    }
    step(&mut world, 1);

    assert_eq!(
        journal(&mut world),
        [
            "commit:first",
            "commit:step",
            "commit:step",
            "commit:step",
            "commit:step",
            "commit:last",
        ]
    );
    assert!(chain(&world, actor).is_idle());
}

#[test]
fn cancel_without_keep_remaining_drops_siblings() {
    let (mut world, actor) = setup(vec![Probe::new("a", 10), Probe::new("b", 1)]);
    step(&mut world, 1);

    orders::cancel(&mut world, actor, false).unwrap();
    assert_eq!(chain(&world, actor).active_task_names(), ["a"]);

    step(&mut world, 2);
    assert!(journal(&mut world).iter().all(|entry| !entry.starts_with("b:")));
    assert!(chain(&world, actor).is_idle());
}

#[test]
fn cancel_with_keep_remaining_runs_siblings_next_tick() {
    let (mut world, actor) = setup(vec![Probe::new("a", 10), Probe::new("b", 1)]);
    step(&mut world, 1);
    journal(&mut world);

    orders::cancel(&mut world, actor, true).unwrap();
    step(&mut world, 1);
    assert_eq!(journal(&mut world), ["a:last"]);
    assert_eq!(chain(&world, actor).current_head(), Some("b"));

    step(&mut world, 1);
    assert_eq!(journal(&mut world), ["b:first", "b:step", "b:last"]);
}

#[test]
fn cancelled_before_start_is_dropped_without_hooks() {
    let (mut world, actor) = setup(vec![Probe::new("a", 3)]);

    orders::cancel(&mut world, actor, false).unwrap();
    step(&mut world, 1);

    assert!(journal(&mut world).is_empty());
    assert!(chain(&world, actor).is_idle());
}

#[test]
fn queue_without_keep_existing_replaces_current_order() {
    let (mut world, actor) = setup(vec![Probe::new("a", 10), Probe::new("b", 10)]);
    step(&mut world, 1);
    journal(&mut world);

    orders::queue(&mut world, actor, Probe::new("c", 1), false).unwrap();
    step(&mut world, 2);

    assert_eq!(journal(&mut world), ["a:last", "c:first", "c:step", "c:last"]);
}

#[test]
fn cancel_reaches_the_running_child_first() {
    let parent = Probe::new("p", 5).with_children(vec![Probe::new("c", 10)]);
    let (mut world, actor) = setup(vec![parent]);
    step(&mut world, 1);
    journal(&mut world);

    orders::cancel(&mut world, actor, false).unwrap();
    step(&mut world, 1);

    // 子が先に終わり、親は同じtickで自分のステップを行わずに終わる
    assert_eq!(journal(&mut world), ["c:last", "p:last"]);
    assert!(chain(&world, actor).is_idle());
}

#[test]
fn overruling_parent_still_waits_for_its_child_without_cancel() {
    let parent = Probe::new("p", 10)
        .overrules_children()
        .with_children(vec![Probe::new("c", 3)]);
    let (mut world, actor) = setup(vec![parent]);

    step(&mut world, 3);

    // 子チェーンが空になった tick に親が一度だけステップする
    assert_eq!(
        journal(&mut world),
        ["p:first", "p:step", "c:first", "c:step", "c:step", "c:step", "c:last", "p:step"]
    );
    assert_eq!(chain(&world, actor).current_head(), Some("p"));
}

#[test]
fn committed_child_outlasts_parent_overrule() {
    let parent = Probe::new("p", 10)
        .overrules_children()
        .with_children(vec![Probe::new("c", 4).committed()]);
    let (mut world, actor) = setup(vec![parent]);
    step(&mut world, 2);

    orders::cancel(&mut world, actor, false).unwrap();
    step(&mut world, 1);
    assert_eq!(chain(&world, actor).current_head(), Some("p"));
    step(&mut world, 1);

    assert_eq!(
        journal(&mut world),
        [
            "p:first", "p:step", "c:first", "c:step", "c:step", "c:step", "c:step", "c:last",
            "p:last",
        ]
    );
    assert!(chain(&world, actor).is_idle());
}

#[test]
fn parent_overrule_tears_down_interruptible_child() {
    let parent = Probe::new("p", 10)
        .overrules_children()
        .with_children(vec![Probe::new("c", 10)]);
    let (mut world, actor) = setup(vec![parent]);
    step(&mut world, 2);
    journal(&mut world);

    orders::cancel(&mut world, actor, false).unwrap();
    step(&mut world, 1);

    assert_eq!(journal(&mut world), ["c:last", "p:last"]);
}

#[test]
fn find_in_chain_walks_siblings_and_children() {
    let parent = Probe::new("p", 5).with_children(vec![Probe::new("c", 5)]);
    let (mut world, actor) = setup(vec![parent, Probe::new("s", 1)]);
    step(&mut world, 1);

    let labels: Vec<&str> = chain(&world, actor)
        .find_in_chain::<Probe>()
        .iter()
        .map(|probe| probe.label)
        .collect();
    assert_eq!(labels, ["p", "c", "s"]);
    assert_eq!(chain(&world, actor).active_task_names(), ["p", "c", "s"]);
    assert!(!chain(&world, actor).contains::<Reorder>());

    // 走行中の子を書き換えてもチェーンはそのまま
    {
        let mut chain_mut = world.get_mut::<TaskChain>(actor).unwrap();
        for probe in chain_mut.find_in_chain_mut::<Probe>() {
            if probe.label == "c" {
                probe.remaining = 1;
            }
        }
    }
    journal(&mut world);
    step(&mut world, 1);
    assert_eq!(journal(&mut world), ["c:step", "c:last", "p:step"]);
}

#[test]
fn world_api_reports_contract_violations() {
    let (mut world, actor) = setup(Vec::new());
    let bare = world.spawn_empty().id();

    assert_eq!(
        orders::queue_child(&mut world, actor, Probe::new("orphan", 1)),
        Err(SchedulerError::NoActiveTask { actor })
    );
    assert_eq!(
        orders::append(&mut world, bare, Probe::new("x", 1)),
        Err(SchedulerError::MissingChain { actor: bare })
    );
    assert_eq!(orders::current_head(&world, bare), None);
}

#[test]
fn orders_issued_mid_tick_are_merged_at_the_tail() {
    let mut world = World::new();
    world.insert_resource(SimulationTick(0));
    world.init_resource::<Journal>();
    let actor = world.spawn(TaskChain::new(Reorder)).id();
    world
        .get_mut::<TaskChain>(actor)
        .unwrap()
        .append(Probe::new("queued", 1));

    step(&mut world, 1);

    assert_eq!(
        chain(&world, actor).active_task_names(),
        ["reorder", "queued", "late"]
    );
}

#[test]
fn clear_runs_last_hooks_of_started_tasks_only() {
    let parent = Probe::new("p", 5).with_children(vec![Probe::new("c", 5)]);
    let (mut world, actor) = setup(vec![parent, Probe::new("s", 1)]);
    step(&mut world, 1);
    journal(&mut world);

    orders::clear(&mut world, actor).unwrap();

    assert_eq!(journal(&mut world), ["c:last", "p:last"]);
    assert!(chain(&world, actor).is_idle());
}

#[test]
fn idle_actor_tick_is_a_no_op() {
    let (mut world, actor) = setup(Vec::new());
    step(&mut world, 3);
    assert!(journal(&mut world).is_empty());
    assert!(chain(&world, actor).is_idle());
}
