use tactics_core::{
    Clickable, Command, Event, GridSize, MatchConfig, MatchPhase, SelectionMode, SetupError, Team,
    TileCoord, UnitId, UnitPlacement,
};
use tactics_world::{self as world, query, World};

fn tile(x: u32, y: u32) -> TileCoord {
    TileCoord::new(x, y)
}

fn config(width: u32, height: u32, move_range: u32, teams: &[(Team, &[(u32, u32)])]) -> MatchConfig {
    MatchConfig {
        grid: GridSize::new(width, height),
        move_range,
        placements: teams
            .iter()
            .map(|(team, positions)| UnitPlacement {
                team: *team,
                positions: positions.iter().map(|(x, y)| tile(*x, *y)).collect(),
            })
            .collect(),
    }
}

fn start(world: &mut World, config: MatchConfig) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::StartMatch { config }, &mut events);
    events
}

fn click(world: &mut World, target: Option<Clickable>) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Click { target }, &mut events);
    events
}

fn click_unit(world: &mut World, unit: u32) -> Vec<Event> {
    click(world, Some(Clickable::Unit(UnitId::new(unit))))
}

fn click_tile(world: &mut World, x: u32, y: u32) -> Vec<Event> {
    click(world, Some(Clickable::Tile(tile(x, y))))
}

#[test]
fn skirmish_plays_through_a_capture() {
    let mut world = World::new();
    assert_eq!(query::phase(&world), MatchPhase::Idle);

    let events = start(&mut world, MatchConfig::skirmish());
    assert_eq!(
        events,
        vec![
            Event::MatchStarted {
                team: Team::Red,
                columns: 4,
                rows: 4,
            },
            Event::SelectionModeChanged {
                mode: SelectionMode::Units(Team::Red),
            },
        ]
    );
    assert_eq!(query::phase(&world), MatchPhase::InProgress);
    assert_eq!(query::occupant(&world, tile(0, 0)), Some(UnitId::new(0)));
    assert_eq!(query::occupant(&world, tile(2, 3)), Some(UnitId::new(3)));

    let events = click_unit(&mut world, 0);
    let expected_reach = vec![tile(0, 1), tile(0, 2), tile(1, 1), tile(2, 2)];
    assert_eq!(
        events,
        vec![
            Event::UnitSelected {
                unit: UnitId::new(0),
                reachable: expected_reach.clone(),
            },
            Event::SelectionModeChanged {
                mode: SelectionMode::Tiles,
            },
        ]
    );
    assert_eq!(query::selected_unit(&world), Some(UnitId::new(0)));
    assert_eq!(query::selected_tiles(&world), expected_reach.as_slice());
    assert!(query::is_unit_highlighted(&world, UnitId::new(0)));
    assert!(query::is_tile_highlighted(&world, tile(2, 2)));
    assert!(!query::is_tile_highlighted(&world, tile(1, 0)));

    let events = click_tile(&mut world, 2, 2);
    assert_eq!(
        events,
        vec![
            Event::UnitMoved {
                unit: UnitId::new(0),
                from: tile(0, 0),
                to: tile(2, 2),
            },
            Event::TurnChanged { team: Team::Blue },
            Event::SelectionCleared,
            Event::SelectionModeChanged {
                mode: SelectionMode::Units(Team::Blue),
            },
        ]
    );
    assert_eq!(query::occupant(&world, tile(0, 0)), None);
    assert!(!query::is_tile_highlighted(&world, tile(2, 2)));
    assert!(!query::is_unit_highlighted(&world, UnitId::new(0)));

    let events = click_unit(&mut world, 2);
    assert_eq!(
        events.first(),
        Some(&Event::UnitSelected {
            unit: UnitId::new(2),
            reachable: vec![tile(3, 2), tile(3, 1), tile(2, 2)],
        })
    );

    let events = click_tile(&mut world, 2, 2);
    assert_eq!(
        events,
        vec![
            Event::UnitCaptured {
                unit: UnitId::new(0),
                team: Team::Red,
                tile: tile(2, 2),
            },
            Event::UnitMoved {
                unit: UnitId::new(2),
                from: tile(3, 3),
                to: tile(2, 2),
            },
            Event::TurnChanged { team: Team::Red },
            Event::SelectionCleared,
            Event::SelectionModeChanged {
                mode: SelectionMode::Units(Team::Red),
            },
        ]
    );
    assert_eq!(query::roster(&world, Team::Red), &[UnitId::new(1)]);
    assert!(!query::is_unit_pooled_active(&world, UnitId::new(0)));
    assert!(query::unit(&world, UnitId::new(0)).is_none());
    assert_eq!(query::occupant(&world, tile(2, 2)), Some(UnitId::new(2)));
    assert_eq!(query::units(&world).len(), 3);
}

#[test]
fn eliminated_team_is_skipped_in_turn_order() {
    let mut world = World::new();
    let _ = start(
        &mut world,
        config(
            5,
            5,
            2,
            &[
                (Team::Red, &[(0, 0)]),
                (Team::Blue, &[(2, 0)]),
                (Team::Green, &[(4, 4)]),
            ],
        ),
    );

    let _ = click_unit(&mut world, 0);
    let events = click_tile(&mut world, 2, 0);

    assert!(events.contains(&Event::UnitCaptured {
        unit: UnitId::new(1),
        team: Team::Blue,
        tile: tile(2, 0),
    }));
    assert!(events.contains(&Event::TurnChanged { team: Team::Green }));
    assert!(!events.contains(&Event::TurnChanged { team: Team::Blue }));
    assert_eq!(query::current_team(&world), Team::Green);
    assert_eq!(query::live_teams(&world), vec![Team::Red, Team::Green]);
}

#[test]
fn last_capture_ends_the_game() {
    let mut world = World::new();
    let _ = start(
        &mut world,
        config(3, 3, 1, &[(Team::Red, &[(0, 0)]), (Team::Blue, &[(1, 1)])]),
    );

    let _ = click_unit(&mut world, 0);
    let events = click_tile(&mut world, 1, 1);
    assert_eq!(
        events,
        vec![
            Event::UnitCaptured {
                unit: UnitId::new(1),
                team: Team::Blue,
                tile: tile(1, 1),
            },
            Event::UnitMoved {
                unit: UnitId::new(0),
                from: tile(0, 0),
                to: tile(1, 1),
            },
            Event::SelectionCleared,
            Event::SelectionModeChanged {
                mode: SelectionMode::None,
            },
            Event::GameOver { winner: Team::Red },
        ]
    );
    assert_eq!(query::phase(&world), MatchPhase::Over);
    assert_eq!(query::selection_mode(&world), SelectionMode::None);

    assert!(click_unit(&mut world, 0).is_empty());
    assert!(click(&mut world, None).is_empty());
    assert_eq!(query::occupant(&world, tile(1, 1)), Some(UnitId::new(0)));
}

#[test]
fn unreachable_tile_resets_selection() {
    let mut world = World::new();
    let _ = start(&mut world, MatchConfig::skirmish());
    let _ = click_unit(&mut world, 0);

    let events = click_tile(&mut world, 3, 0);
    assert_eq!(
        events,
        vec![
            Event::SelectionCleared,
            Event::SelectionModeChanged {
                mode: SelectionMode::Units(Team::Red),
            },
        ]
    );
    assert_eq!(query::selected_unit(&world), None);
    assert!(query::selected_tiles(&world).is_empty());
    assert_eq!(query::current_team(&world), Team::Red);
    assert_eq!(query::occupant(&world, tile(0, 0)), Some(UnitId::new(0)));
    assert!(query::grid(&world)
        .expect("grid")
        .highlighted()
        .next()
        .is_none());
}

#[test]
fn enemy_and_empty_clicks_only_reset_the_filter() {
    let mut world = World::new();
    let _ = start(&mut world, MatchConfig::skirmish());

    let reset = vec![Event::SelectionModeChanged {
        mode: SelectionMode::Units(Team::Red),
    }];
    assert_eq!(click_unit(&mut world, 2), reset);
    assert_eq!(click(&mut world, None), reset);
    assert_eq!(click_tile(&mut world, 1, 1), reset);
    assert_eq!(query::selected_unit(&world), None);
}

#[test]
fn unit_click_while_awaiting_a_tile_clears_selection() {
    let mut world = World::new();
    let _ = start(&mut world, MatchConfig::skirmish());
    let _ = click_unit(&mut world, 0);

    let events = click_unit(&mut world, 1);
    assert_eq!(
        events,
        vec![
            Event::SelectionCleared,
            Event::SelectionModeChanged {
                mode: SelectionMode::Units(Team::Red),
            },
        ]
    );
    assert!(!query::is_unit_highlighted(&world, UnitId::new(0)));
}

#[test]
fn clicks_before_start_are_ignored() {
    let mut world = World::new();
    assert!(click_tile(&mut world, 0, 0).is_empty());
    assert_eq!(query::selection_mode(&world), SelectionMode::None);
}

#[test]
fn empty_grid_is_rejected() {
    let mut world = World::new();
    let events = start(&mut world, config(0, 3, 2, &[]));
    assert_eq!(
        events,
        vec![Event::MatchRejected {
            reason: SetupError::EmptyGrid {
                columns: 0,
                rows: 3,
            },
        }]
    );
    assert_eq!(query::phase(&world), MatchPhase::Idle);
    assert!(query::grid(&world).is_none());
}

#[test]
fn oversized_grid_is_rejected_instead_of_allocated() {
    let mut world = World::new();
    let events = start(
        &mut world,
        config(u32::MAX, u32::MAX, 2, &[(Team::Red, &[(0, 0)])]),
    );
    assert_eq!(
        events,
        vec![Event::MatchRejected {
            reason: SetupError::GridTooLarge {
                columns: u32::MAX,
                rows: u32::MAX,
            },
        }]
    );
    assert_eq!(query::phase(&world), MatchPhase::Idle);
    assert!(query::grid(&world).is_none());
    assert!(query::units(&world).is_empty());

    let events = start(&mut world, MatchConfig::skirmish());
    assert!(matches!(events.first(), Some(Event::MatchStarted { .. })));
}

#[test]
fn end_match_recycles_units_for_the_next_match() {
    let mut world = World::new();
    let _ = start(&mut world, MatchConfig::skirmish());
    let _ = click_unit(&mut world, 0);

    let mut events = Vec::new();
    world::apply(&mut world, Command::EndMatch, &mut events);
    assert_eq!(events, vec![Event::MatchEnded]);
    assert_eq!(query::phase(&world), MatchPhase::Idle);
    assert!(query::grid(&world).is_none());
    assert!(query::units(&world).is_empty());
    let counts = query::unit_pool_counts(&world);
    assert_eq!((counts.active, counts.available), (0, 4));

    let events = start(&mut world, MatchConfig::skirmish());
    assert!(matches!(
        events.first(),
        Some(Event::MatchStarted {
            team: Team::Red,
            ..
        })
    ));
    let counts = query::unit_pool_counts(&world);
    assert_eq!((counts.active, counts.available), (4, 0));
    assert_eq!(query::roster(&world, Team::Red), &[UnitId::new(0), UnitId::new(1)]);
    assert_eq!(query::roster(&world, Team::Blue), &[UnitId::new(2), UnitId::new(3)]);
}

#[test]
fn end_match_without_a_match_does_nothing() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::EndMatch, &mut events);
    assert!(events.is_empty());
}

#[test]
fn red_captures_the_only_blue_unit_and_wins() {
    let mut world = World::new();
    let _ = start(
        &mut world,
        config(4, 4, 2, &[(Team::Red, &[(0, 0)]), (Team::Blue, &[(2, 0)])]),
    );

    let events = click_unit(&mut world, 0);
    let Some(Event::UnitSelected { reachable, .. }) = events.first() else {
        panic!("expected a selection, got {events:?}");
    };
    assert!(reachable.contains(&tile(1, 0)));
    assert!(reachable.contains(&tile(2, 0)));
    assert!(!reachable.contains(&tile(3, 0)));

    let events = click_tile(&mut world, 2, 0);
    assert_eq!(
        events.first(),
        Some(&Event::UnitCaptured {
            unit: UnitId::new(1),
            team: Team::Blue,
            tile: tile(2, 0),
        })
    );
    assert_eq!(events.last(), Some(&Event::GameOver { winner: Team::Red }));
    assert_eq!(query::occupant(&world, tile(2, 0)), Some(UnitId::new(0)));
    assert!(query::roster(&world, Team::Blue).is_empty());
}
