use std::time::Duration;

use maze_escape_core::{
    Aabb, AgentSnapshot, CellCoord, Event, LineOfSight, MazeLayout, PursuitState, WallGrid,
    WorldPoint,
};
use maze_escape_system_pursuit::{PursuitAgent, Tuning};

const HALF_SECOND: Duration = Duration::from_millis(500);

fn open_grid(size: u32) -> WallGrid {
    let mut layout = MazeLayout::filled(size, size);
    for row in 1..size - 1 {
        for column in 1..size - 1 {
            layout.set_wall(CellCoord::new(column, row), false);
        }
    }
    WallGrid::new(layout, 4.0).expect("valid cell length")
}

fn clear(_: WorldPoint, _: WorldPoint) -> bool {
    true
}

fn blind(_: WorldPoint, _: WorldPoint) -> bool {
    false
}

fn step(
    agent: &mut PursuitAgent,
    grid: &WallGrid,
    player: WorldPoint,
    sight: &dyn LineOfSight,
    dt: Duration,
) -> Vec<Event> {
    let mut events = Vec::new();
    agent.update(dt, player, Some(sight), grid, &[], &mut events);
    events
}

#[test]
fn chase_persists_for_five_seconds_without_sight() {
    let grid = open_grid(41);
    let player = WorldPoint::new(70.0, 0.0);
    let mut agent = PursuitAgent::new(WorldPoint::new(-70.0, 0.0), Tuning::default(), 1);

    let events = step(&mut agent, &grid, player, &clear, HALF_SECOND);
    assert_eq!(
        events,
        vec![Event::AgentStateChanged {
            from: PursuitState::Hunting,
            to: PursuitState::Chasing,
        }]
    );

    for frame in 0..10 {
        let events = step(&mut agent, &grid, player, &blind, HALF_SECOND);
        assert!(events.is_empty(), "frame {frame} emitted {events:?}");
        assert_eq!(agent.state(), PursuitState::Chasing);
    }

    let events = step(&mut agent, &grid, player, &blind, HALF_SECOND);
    assert_eq!(
        events,
        vec![Event::AgentStateChanged {
            from: PursuitState::Chasing,
            to: PursuitState::Hunting,
        }]
    );
}

#[test]
fn expired_chase_near_the_player_turns_into_search() {
    let grid = open_grid(21);
    let player = WorldPoint::new(10.0, 0.0);
    let pillar = [Aabb::from_center(WorldPoint::default(), 2.0)];
    let mut agent = PursuitAgent::new(WorldPoint::new(-10.0, 0.0), Tuning::default(), 1);
    let (seen, unseen): (&dyn LineOfSight, &dyn LineOfSight) = (&clear, &blind);
    let mut events = Vec::new();

    agent.update(
        HALF_SECOND,
        player,
        Some(seen),
        &grid,
        &pillar,
        &mut events,
    );
    assert_eq!(agent.state(), PursuitState::Chasing);

    for frame in 0..10 {
        events.clear();
        agent.update(
            HALF_SECOND,
            player,
            Some(unseen),
            &grid,
            &pillar,
            &mut events,
        );
        assert!(events.is_empty(), "frame {frame} emitted {events:?}");
        assert_eq!(agent.state(), PursuitState::Chasing);
    }
    assert!(agent.position().distance_to(player) < Tuning::default().search_range);

    events.clear();
    agent.update(
        HALF_SECOND,
        player,
        Some(unseen),
        &grid,
        &pillar,
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::AgentStateChanged {
            from: PursuitState::Chasing,
            to: PursuitState::Searching,
        }]
    );
}

#[test]
fn oversized_wander_interval_does_not_panic() {
    let tuning: Tuning =
        toml::from_str("wander_interval_min_secs = 1e20\n").expect("valid tuning table");
    let grid = open_grid(21);
    let player = WorldPoint::new(10.0, 10.0);
    let mut agent = PursuitAgent::new(WorldPoint::default(), tuning, 1);

    for _ in 0..3 {
        let _ = step(&mut agent, &grid, player, &blind, HALF_SECOND);
    }

    assert_eq!(agent.state(), PursuitState::Searching);
    assert_ne!(agent.position(), WorldPoint::default());
}

#[test]
fn single_sighted_frame_resets_persistence() {
    let grid = open_grid(41);
    let player = WorldPoint::new(75.0, 0.0);
    let mut agent = PursuitAgent::new(WorldPoint::new(-75.0, 0.0), Tuning::default(), 1);

    let _ = step(&mut agent, &grid, player, &clear, HALF_SECOND);
    for _ in 0..8 {
        let _ = step(&mut agent, &grid, player, &blind, HALF_SECOND);
    }
    let _ = step(&mut agent, &grid, player, &clear, HALF_SECOND);
    for _ in 0..10 {
        let _ = step(&mut agent, &grid, player, &blind, HALF_SECOND);
    }

    assert_eq!(agent.state(), PursuitState::Chasing);
}

#[test]
fn stun_freezes_until_the_frame_after_expiry() {
    let grid = open_grid(21);
    let player = WorldPoint::new(30.0, 0.0);
    let start = WorldPoint::new(-30.0, 0.0);
    let mut agent = PursuitAgent::new(start, Tuning::default(), 1);
    agent.stun(Duration::from_secs(1));
    assert_eq!(agent.snapshot().shock_intensity, 1.0);

    let events = step(&mut agent, &grid, player, &clear, HALF_SECOND);
    assert!(events.is_empty());
    let AgentSnapshot {
        position,
        stunned,
        shock_intensity,
        ..
    } = agent.snapshot();
    assert_eq!(position, start);
    assert!(stunned);
    assert!((shock_intensity - 0.5).abs() < 1e-6);

    let events = step(&mut agent, &grid, player, &clear, HALF_SECOND);
    assert_eq!(events, vec![Event::AgentRecovered]);
    assert_eq!(agent.position(), start);
    assert!(!agent.is_stunned());

    let _ = step(&mut agent, &grid, player, &clear, HALF_SECOND);
    assert!(agent.position().x() > start.x());
}

#[test]
fn blocked_x_axis_still_slides_along_z() {
    let grid = open_grid(7);
    let start = WorldPoint::new(9.0, 0.0);
    let player = WorldPoint::new(20.0, 8.0);
    let mut agent = PursuitAgent::new(start, Tuning::default(), 1);
    let mut events = Vec::new();

    agent.update(
        Duration::from_millis(250),
        player,
        None,
        &grid,
        &[],
        &mut events,
    );

    assert_eq!(agent.state(), PursuitState::Chasing);
    assert_eq!(agent.position().x(), start.x());
    assert!(agent.position().z() > 1.0);
}

#[test]
fn distant_unseen_player_is_hunted_directly() {
    let grid = open_grid(21);
    let player = WorldPoint::new(30.0, 0.0);
    let mut agent = PursuitAgent::new(WorldPoint::default(), Tuning::default(), 1);

    let events = step(
        &mut agent,
        &grid,
        player,
        &blind,
        Duration::from_millis(100),
    );

    assert!(events.is_empty());
    assert_eq!(agent.state(), PursuitState::Hunting);
    assert!((agent.position().x() - 0.5).abs() < 1e-5);
    assert_eq!(agent.position().z(), 0.0);
}

#[test]
fn nearby_unseen_player_is_searched_for() {
    let grid = open_grid(21);
    let player = WorldPoint::new(10.0, 10.0);
    let mut agent = PursuitAgent::new(WorldPoint::default(), Tuning::default(), 1);

    let events = step(
        &mut agent,
        &grid,
        player,
        &blind,
        Duration::from_millis(100),
    );

    assert_eq!(
        events,
        vec![Event::AgentStateChanged {
            from: PursuitState::Hunting,
            to: PursuitState::Searching,
        }]
    );
    assert_ne!(agent.position(), WorldPoint::default());
}

#[test]
fn catch_is_reported_once() {
    let grid = open_grid(21);
    let player = WorldPoint::new(1.0, 0.0);
    let mut agent = PursuitAgent::new(WorldPoint::default(), Tuning::default(), 1);
    let mut events = Vec::new();

    agent.update(
        Duration::from_millis(100),
        player,
        None,
        &grid,
        &[],
        &mut events,
    );
    assert!(agent.has_caught());
    assert!(matches!(events.last(), Some(Event::PlayerCaught { .. })));

    events.clear();
    agent.update(
        Duration::from_millis(100),
        player,
        None,
        &grid,
        &[],
        &mut events,
    );
    assert!(events.is_empty());
}

#[test]
fn partial_tuning_tables_keep_defaults() {
    let tuning: Tuning = toml::from_str("chase_speed = 9.5\nsearch_range = 30.0\n")
        .expect("valid tuning table");

    assert_eq!(tuning.chase_speed, 9.5);
    assert_eq!(tuning.search_range, 30.0);
    assert_eq!(tuning.hunt_speed, Tuning::default().hunt_speed);
}
