use super::*;
use crate::constants::CELL_SIZE;
use crate::relationships::DockReservations;
use crate::systems::dock::{DockClient, DockDrag, DockService, QueueLimit, reservation_count};
use crate::systems::task_queue::orders;
use crate::test_support::*;
use crate::world::{Cargo, Credits, Dead, Position};

fn cargo_of(app: &App, actor: Entity) -> u32 {
    app.world().get::<Cargo>(actor).unwrap().amount
}

fn queue_dock(app: &mut App, client: Entity, host: Entity) {
    orders::append(app.world_mut(), client, DockSequence::new(host)).unwrap();
}

fn count<F: Fn(&DockEvent) -> bool>(events: &[DockEvent], f: F) -> usize {
    events.iter().filter(|e| f(e)).count()
}

#[test]
fn docks_unloads_and_releases() {
    let mut app = test_app();
    let player = spawn_player(&mut app, 0);
    let refinery = spawn_refinery(&mut app, player, IVec2::ZERO);
    let harvester = spawn_harvester(&mut app, player, IVec2::new(4 * CELL_SIZE, 0), 10);
    queue_dock(&mut app, harvester, refinery);

    let events = run(&mut app, 120);

    assert_eq!(cargo_of(&app, harvester), 0);
    assert_eq!(app.world().get::<Credits>(player).unwrap().0, 250);
    assert_eq!(reserved_host(app.world(), harvester), None);
    assert_eq!(docked_host(app.world(), harvester), None);
    assert!(app.world().get::<TaskChain>(harvester).unwrap().is_idle());

    let reserved = count(&events, |e| matches!(e, DockEvent::Reserved { .. }));
    let completed = count(&events, |e| matches!(e, DockEvent::Completed { .. }));
    assert_eq!(reserved, 1);
    assert_eq!(count_released(&events, harvester), 1);
    assert_eq!(completed, 1);

    let client = app.world().get::<DockClient>(harvester).unwrap();
    assert_eq!(client.last_reserved_host(), Some(refinery));
}

#[test]
fn host_death_mid_service_undocks_and_releases_once() {
    let mut app = test_app();
    let player = spawn_player(&mut app, 0);
    let refinery = spawn_refinery(&mut app, player, IVec2::ZERO);
    let harvester = spawn_harvester(&mut app, player, IVec2::ZERO, 10);
    queue_dock(&mut app, harvester, refinery);

    // 1tick目で予約とドック、2・3tick目で荷下ろし
    let mut events = run(&mut app, 3);
    assert_eq!(docked_host(app.world(), harvester), Some(refinery));
    assert_eq!(cargo_of(&app, harvester), 6);

    app.world_mut().entity_mut(refinery).insert(Dead);
    events.extend(run(&mut app, 1));

    assert_eq!(cargo_of(&app, harvester), 6);
    assert_eq!(reserved_host(app.world(), harvester), None);
    assert_eq!(docked_host(app.world(), harvester), None);
    assert!(app.world().get::<TaskChain>(harvester).unwrap().is_idle());
    assert_eq!(count_released(&events, harvester), 1);
    assert_eq!(
        count(&events, |e| matches!(e, DockEvent::Undocked { .. })),
        1
    );
    assert_eq!(
        count(&events, |e| matches!(e, DockEvent::Completed { .. })),
        1
    );

    events.extend(run(&mut app, 5));
    assert_eq!(count_released(&events, harvester), 1);
}

#[test]
fn host_despawn_mid_service_releases_once() {
    let mut app = test_app();
    let player = spawn_player(&mut app, 0);
    let refinery = spawn_refinery(&mut app, player, IVec2::ZERO);
    let harvester = spawn_harvester(&mut app, player, IVec2::ZERO, 10);
    queue_dock(&mut app, harvester, refinery);

    let mut events = run(&mut app, 2);
    app.world_mut().despawn(refinery);
    events.extend(drain_dock_events(&mut app));
    events.extend(run(&mut app, 3));

    assert_eq!(reserved_host(app.world(), harvester), None);
    assert_eq!(docked_host(app.world(), harvester), None);
    assert!(app.world().get::<TaskChain>(harvester).unwrap().is_idle());
    assert_eq!(count_released(&events, harvester), 1);
}

#[test]
fn cancel_while_approaching_releases_reservation() {
    let mut app = test_app();
    let player = spawn_player(&mut app, 0);
    let refinery = spawn_refinery(&mut app, player, IVec2::ZERO);
    let harvester = spawn_harvester(&mut app, player, IVec2::new(8 * CELL_SIZE, 0), 10);
    queue_dock(&mut app, harvester, refinery);

    let mut events = run(&mut app, 3);
    assert_eq!(reserved_host(app.world(), harvester), Some(refinery));
    assert!(is_docking(app.world(), harvester));

    orders::cancel(app.world_mut(), harvester, false).unwrap();
    events.extend(run(&mut app, 1));

    assert_eq!(reserved_host(app.world(), harvester), None);
    assert!(!is_docking(app.world(), harvester));
    assert!(app.world().get::<TaskChain>(harvester).unwrap().is_idle());
    assert_eq!(count_released(&events, harvester), 1);
    assert_eq!(cargo_of(&app, harvester), 10);
}

#[test]
fn cancel_while_active_still_runs_undock() {
    let mut app = test_app();
    let player = spawn_player(&mut app, 0);
    let refinery = spawn_refinery(&mut app, player, IVec2::ZERO);
    let harvester = spawn_harvester(&mut app, player, IVec2::ZERO, 10);
    queue_dock(&mut app, harvester, refinery);

    let mut events = run(&mut app, 2);
    assert_eq!(cargo_of(&app, harvester), 8);

    orders::cancel(app.world_mut(), harvester, false).unwrap();
    events.extend(run(&mut app, 1));

    // 割り込み不可なので要求はタスク自身が拾い、Undock → Complete で終わる
    assert_eq!(cargo_of(&app, harvester), 8);
    assert_eq!(docked_host(app.world(), harvester), None);
    assert_eq!(reserved_host(app.world(), harvester), None);
    assert_eq!(
        count(&events, |e| matches!(e, DockEvent::Undocked { .. })),
        1
    );
    assert_eq!(
        count(&events, |e| matches!(e, DockEvent::Completed { .. })),
        1
    );
    assert_eq!(count_released(&events, harvester), 1);
}

#[test]
fn drag_moves_client_in_and_back_out() {
    let mut app = test_app();
    let player = spawn_player(&mut app, 0);
    let drag = DockDrag {
        offset: IVec2::new(0, 400),
        ticks: 4,
    };
    let refinery = spawn_host(
        &mut app,
        player,
        IVec2::ZERO,
        DockHost::new(vec![DockService::refinery()]).with_drag(drag),
    );
    let harvester = spawn_harvester(&mut app, player, IVec2::ZERO, 2);
    queue_dock(&mut app, harvester, refinery);

    run(&mut app, 2);
    let pos = app.world().get::<Position>(harvester).unwrap().0;
    assert_eq!(pos, IVec2::new(0, 200));
    assert_eq!(docked_host(app.world(), harvester), None);

    // 4tick目で引き込みが終わり、同じtickにドックする
    run(&mut app, 2);
    let pos = app.world().get::<Position>(harvester).unwrap().0;
    assert_eq!(pos, IVec2::new(0, 400));
    assert_eq!(docked_host(app.world(), harvester), Some(refinery));

    run(&mut app, 10);
    let pos = app.world().get::<Position>(harvester).unwrap().0;
    assert_eq!(pos, IVec2::ZERO);
    assert_eq!(cargo_of(&app, harvester), 0);
    assert!(app.world().get::<TaskChain>(harvester).unwrap().is_idle());
}

#[test]
fn drag_starts_from_where_the_client_arrived() {
    let mut app = test_app();
    let player = spawn_player(&mut app, 0);
    let drag = DockDrag {
        offset: IVec2::new(0, 400),
        ticks: 4,
    };
    let refinery = spawn_host(
        &mut app,
        player,
        IVec2::ZERO,
        DockHost::new(vec![DockService::refinery()]).with_drag(drag),
    );
    // 到着半径の内側だがドック位置ちょうどではない
    let harvester = spawn_harvester(&mut app, player, IVec2::new(40, 0), 2);
    queue_dock(&mut app, harvester, refinery);

    run(&mut app, 1);
    let pos = app.world().get::<Position>(harvester).unwrap().0;
    assert_eq!(pos, IVec2::new(30, 100));

    run(&mut app, 20);
    let pos = app.world().get::<Position>(harvester).unwrap().0;
    assert_eq!(pos, IVec2::new(40, 0));
    assert_eq!(cargo_of(&app, harvester), 0);
    assert!(app.world().get::<TaskChain>(harvester).unwrap().is_idle());
}

#[test]
fn full_host_makes_the_second_client_retry() {
    let mut app = test_app();
    let player = spawn_player(&mut app, 0);
    let refinery = spawn_host(
        &mut app,
        player,
        IVec2::ZERO,
        DockHost::new(vec![DockService::refinery()]).with_queue_limit(QueueLimit::Limited(1)),
    );
    let first = spawn_harvester(&mut app, player, IVec2::ZERO, 4);
    let second = spawn_harvester(&mut app, player, IVec2::ZERO, 4);
    queue_dock(&mut app, first, refinery);
    queue_dock(&mut app, second, refinery);

    let mut events = run(&mut app, 1);
    assert_eq!(docked_host(app.world(), first), Some(refinery));
    assert_eq!(reserved_host(app.world(), second), None);
    assert!(app.world().get::<TaskChain>(second).unwrap().contains::<Wait>());

    for _ in 0..40 {
        events.extend(run(&mut app, 1));
        assert!(reservation_count(app.world(), refinery) <= 1);
        if reserved_host(app.world(), second).is_some() {
            assert_eq!(reserved_host(app.world(), first), None);
        }
    }

    assert_eq!(cargo_of(&app, first), 0);
    assert_eq!(cargo_of(&app, second), 0);
    assert!(app.world().get::<TaskChain>(second).unwrap().is_idle());
    let reserved_by_second = count(&events, |e| {
        matches!(e, DockEvent::Reserved { client, .. } if *client == second)
    });
    assert_eq!(reserved_by_second, 1);
    assert_eq!(count_released(&events, first), 1);
    assert_eq!(count_released(&events, second), 1);
}

#[test]
fn exclusive_host_services_one_client_at_a_time() {
    let mut app = test_app();
    let player = spawn_player(&mut app, 0);
    let refinery = spawn_refinery(&mut app, player, IVec2::ZERO);
    let first = spawn_harvester(&mut app, player, IVec2::ZERO, 4);
    let second = spawn_harvester(&mut app, player, IVec2::ZERO, 4);
    queue_dock(&mut app, first, refinery);
    queue_dock(&mut app, second, refinery);

    run(&mut app, 1);
    assert_eq!(reservation_count(app.world(), refinery), 2);
    assert_eq!(docked_host(app.world(), first), Some(refinery));
    assert_eq!(docked_host(app.world(), second), None);

    for _ in 0..30 {
        run(&mut app, 1);
        let docked = app
            .world()
            .get::<DockedClients>(refinery)
            .map_or(0, |d| d.len());
        assert!(docked <= 1);
    }

    assert_eq!(cargo_of(&app, first), 0);
    assert_eq!(cargo_of(&app, second), 0);
    assert!(
        app.world()
            .get::<DockReservations>(refinery)
            .is_none_or(|r| r.is_empty())
    );
}
