#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match state for the tactics engine.
//!
//! The [`World`] owns the grid, the unit pool and the team rosters, and runs
//! the turn and selection state machine. Every mutation goes through
//! [`apply`], which reports the outcome as [`Event`] values.

pub mod grid;
pub mod observers;
pub mod pool;
pub mod units;

use std::collections::BTreeMap;

use tactics_core::{
    Clickable, Command, Event, MatchConfig, MatchPhase, SelectionMode, SetupError, Team,
    TileCoord, UnitId,
};
use tracing::{debug, info, warn};

use crate::{
    grid::Grid,
    pool::EntityPool,
    units::{id_of, relocate, slot_of, Unit},
};

/// Unit chosen this turn together with the tiles it may move to.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Selection {
    unit: UnitId,
    tiles: Vec<TileCoord>,
}

/// Represents the authoritative match state.
#[derive(Debug)]
pub struct World {
    phase: MatchPhase,
    grid: Option<Grid>,
    units: EntityPool<Unit>,
    teams: Vec<Team>,
    rosters: BTreeMap<Team, Vec<UnitId>>,
    current_team_index: usize,
    selection: Option<Selection>,
    selection_mode: SelectionMode,
}

impl World {
    /// Creates an idle world with an empty, expandable unit pool.
    #[must_use]
    pub fn new() -> Self {
        let teams: Vec<Team> = Team::all().collect();
        Self {
            phase: MatchPhase::Idle,
            grid: None,
            units: EntityPool::create("unit", Unit::default(), 0, true),
            rosters: teams.iter().map(|team| (*team, Vec::new())).collect(),
            teams,
            current_team_index: 0,
            selection: None,
            selection_mode: SelectionMode::None,
        }
    }

    fn current_team(&self) -> Team {
        self.teams[self.current_team_index]
    }

    fn roster(&self, team: Team) -> &[UnitId] {
        self.rosters.get(&team).map(Vec::as_slice).unwrap_or_default()
    }

    fn live_teams(&self) -> impl Iterator<Item = Team> + '_ {
        self.teams
            .iter()
            .copied()
            .filter(|team| !self.roster(*team).is_empty())
    }

    fn unit(&self, unit: UnitId) -> Option<&Unit> {
        self.units.get(slot_of(unit))
    }

    fn reachable_tiles(&self, unit: UnitId) -> Vec<TileCoord> {
        let (Some(grid), Some(state)) = (self.grid.as_ref(), self.unit(unit)) else {
            return Vec::new();
        };
        state.reachable_tiles(grid, |occupant| self.unit(occupant).map(Unit::team))
    }

    fn start_match(&mut self, config: MatchConfig, out_events: &mut Vec<Event>) {
        if self.phase != MatchPhase::Idle {
            warn!(phase = ?self.phase, "match start requested while a match exists");
            out_events.push(Event::MatchRejected {
                reason: SetupError::AlreadyRunning,
            });
            return;
        }

        let grid = match Grid::initialize(config.grid.width, config.grid.height) {
            Ok(grid) => grid,
            Err(error) => {
                warn!(%error, "grid generation failed; match not started");
                out_events.push(Event::MatchRejected {
                    reason: error.into(),
                });
                return;
            }
        };
        self.grid = Some(grid);

        for roster in self.rosters.values_mut() {
            roster.clear();
        }

        let shortfall = config
            .unit_count()
            .saturating_sub(self.units.available_count());
        self.units.prewarm(shortfall);

        for placement in &config.placements {
            for position in &placement.positions {
                self.spawn(placement.team, *position, config.move_range);
            }
        }

        self.current_team_index = self
            .teams
            .iter()
            .position(|team| !self.roster(*team).is_empty())
            .unwrap_or(0);
        self.phase = MatchPhase::InProgress;

        let team = self.current_team();
        info!(
            %team,
            columns = config.grid.width,
            rows = config.grid.height,
            units = config.unit_count(),
            "match started"
        );
        out_events.push(Event::MatchStarted {
            team,
            columns: config.grid.width,
            rows: config.grid.height,
        });
        self.reset_selection(out_events);
    }

    fn spawn(&mut self, team: Team, position: TileCoord, move_range: u32) {
        let Some(grid) = self.grid.as_mut() else {
            return;
        };
        if grid.tile(position).is_none() {
            warn!(%team, %position, "placement outside the grid; unit skipped");
            return;
        }
        if grid.occupant(position).is_some() {
            warn!(%team, %position, "placement on an occupied tile; unit skipped");
            return;
        }

        let slot = match self.units.acquire() {
            Ok(slot) => slot,
            Err(error) => {
                warn!(%error, %team, %position, "unit spawn skipped");
                return;
            }
        };
        if let Some(unit) = self.units.get_mut(slot) {
            unit.set_team(team);
            unit.set_move_range(move_range);
        }

        let unit = id_of(slot);
        let _ = relocate(&mut self.units, grid, unit, Some(position));
        self.rosters.entry(team).or_default().push(unit);
        debug!(unit = unit.get(), %team, %position, "unit spawned");
    }

    fn handle_click(&mut self, target: Option<Clickable>, out_events: &mut Vec<Event>) {
        if self.phase != MatchPhase::InProgress {
            debug!(phase = ?self.phase, "click ignored outside a running match");
            return;
        }

        match target {
            None => self.reset_selection(out_events),
            Some(Clickable::Unit(unit)) => self.select_unit(unit, out_events),
            Some(Clickable::Tile(tile)) => self.choose_tile(tile, out_events),
        }
    }

    fn select_unit(&mut self, unit: UnitId, out_events: &mut Vec<Event>) {
        let team = self.current_team();
        let selectable = self.selection_mode == SelectionMode::Units(team)
            && self
                .unit(unit)
                .is_some_and(|state| state.team() == team && state.tile().is_some());
        if !selectable {
            debug!(unit = unit.get(), %team, "unit cannot be selected; resetting");
            self.reset_selection(out_events);
            return;
        }

        let reachable = self.reachable_tiles(unit);
        if let Some(state) = self.units.get_mut(slot_of(unit)) {
            state.set_highlight(true);
        }
        if let Some(grid) = self.grid.as_mut() {
            for tile in &reachable {
                grid.highlight(*tile, true);
            }
        }

        debug!(unit = unit.get(), reachable = reachable.len(), "unit selected");
        self.selection = Some(Selection {
            unit,
            tiles: reachable.clone(),
        });
        self.selection_mode = SelectionMode::Tiles;
        out_events.push(Event::UnitSelected { unit, reachable });
        out_events.push(Event::SelectionModeChanged {
            mode: SelectionMode::Tiles,
        });
    }

    fn choose_tile(&mut self, tile: TileCoord, out_events: &mut Vec<Event>) {
        let awaiting_tile = self.selection_mode == SelectionMode::Tiles;
        let mover = self
            .selection
            .as_ref()
            .filter(|selection| awaiting_tile && selection.tiles.contains(&tile))
            .map(|selection| selection.unit);
        let Some(mover) = mover else {
            debug!(%tile, "tile is not a valid destination; resetting");
            self.reset_selection(out_events);
            return;
        };

        let occupant = self.grid.as_ref().and_then(|grid| grid.occupant(tile));
        if let Some(enemy) = occupant {
            self.capture(enemy, tile, out_events);
        }

        let Some(grid) = self.grid.as_mut() else {
            return;
        };
        if let Some(from) = relocate(&mut self.units, grid, mover, Some(tile)) {
            debug!(unit = mover.get(), %from, to = %tile, "unit moved");
            out_events.push(Event::UnitMoved {
                unit: mover,
                from,
                to: tile,
            });
        }

        self.end_turn(out_events);
    }

    fn capture(&mut self, enemy: UnitId, tile: TileCoord, out_events: &mut Vec<Event>) {
        let Some(team) = self.unit(enemy).map(Unit::team) else {
            return;
        };
        debug_assert_ne!(team, self.current_team(), "captured a friendly unit");

        if let Some(grid) = self.grid.as_mut() {
            grid.clear_occupant(tile);
            let _ = relocate(&mut self.units, grid, enemy, None);
        }
        if let Err(error) = self.units.release(slot_of(enemy)) {
            warn!(%error, unit = enemy.get(), "captured unit was not returned to the pool");
        }
        if let Some(roster) = self.rosters.get_mut(&team) {
            roster.retain(|unit| *unit != enemy);
        }

        info!(unit = enemy.get(), %team, %tile, "unit captured");
        out_events.push(Event::UnitCaptured {
            unit: enemy,
            team,
            tile,
        });
    }

    fn end_turn(&mut self, out_events: &mut Vec<Event>) {
        if self.live_teams().nth(1).is_some() {
            self.advance_turn(out_events);
        } else {
            self.finish(out_events);
        }
    }

    fn advance_turn(&mut self, out_events: &mut Vec<Event>) {
        assert!(
            self.live_teams().next().is_some(),
            "turn advanced with no team holding units"
        );

        loop {
            self.current_team_index = (self.current_team_index + 1) % self.teams.len();
            if !self.roster(self.current_team()).is_empty() {
                break;
            }
        }

        let team = self.current_team();
        info!(%team, "turn changed");
        out_events.push(Event::TurnChanged { team });
        self.reset_selection(out_events);
    }

    fn finish(&mut self, out_events: &mut Vec<Event>) {
        self.clear_selection(out_events);
        self.selection_mode = SelectionMode::None;
        self.phase = MatchPhase::Over;
        out_events.push(Event::SelectionModeChanged {
            mode: SelectionMode::None,
        });

        let winner = self
            .live_teams()
            .next()
            .unwrap_or_else(|| self.current_team());
        info!(%winner, "game over");
        out_events.push(Event::GameOver { winner });
    }

    fn clear_selection(&mut self, out_events: &mut Vec<Event>) {
        if let Some(grid) = self.grid.as_mut() {
            grid.unhighlight_all();
        }
        for (_, unit) in self.units.iter_active_mut() {
            unit.set_highlight(false);
        }
        if self.selection.take().is_some() {
            out_events.push(Event::SelectionCleared);
        }
    }

    fn reset_selection(&mut self, out_events: &mut Vec<Event>) {
        self.clear_selection(out_events);
        self.selection_mode = SelectionMode::Units(self.current_team());
        out_events.push(Event::SelectionModeChanged {
            mode: self.selection_mode,
        });
    }

    fn end_match(&mut self, out_events: &mut Vec<Event>) {
        if self.phase == MatchPhase::Idle {
            debug!("end requested without a match");
            return;
        }

        self.selection = None;
        let units = self.units.release_all();
        for roster in self.rosters.values_mut() {
            roster.clear();
        }
        let tiles = self.grid.take().map_or(0, |mut grid| grid.teardown());
        self.selection_mode = SelectionMode::None;
        self.current_team_index = 0;
        self.phase = MatchPhase::Idle;

        info!(units, tiles, "match ended");
        out_events.push(Event::MatchEnded);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, reporting outcomes as events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartMatch { config } => world.start_match(config, out_events),
        Command::Click { target } => world.handle_click(target, out_events),
        Command::EndMatch => world.end_match(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tactics_core::{MatchPhase, SelectionMode, Team, TileCoord, UnitId};

    use super::{Grid, Unit, World};
    use crate::units::{id_of, slot_of};

    /// Lifecycle stage of the match.
    #[must_use]
    pub fn phase(world: &World) -> MatchPhase {
        world.phase
    }

    /// Team whose turn it is.
    #[must_use]
    pub fn current_team(world: &World) -> Team {
        world.current_team()
    }

    /// Entity filter for the next click.
    #[must_use]
    pub fn selection_mode(world: &World) -> SelectionMode {
        world.selection_mode
    }

    /// Unit awaiting a destination, if any.
    #[must_use]
    pub fn selected_unit(world: &World) -> Option<UnitId> {
        world.selection.as_ref().map(|selection| selection.unit)
    }

    /// Destinations remembered for the selected unit.
    #[must_use]
    pub fn selected_tiles(world: &World) -> &[TileCoord] {
        world
            .selection
            .as_ref()
            .map(|selection| selection.tiles.as_slice())
            .unwrap_or_default()
    }

    /// Provides read-only access to the grid of the running match.
    #[must_use]
    pub fn grid(world: &World) -> Option<&Grid> {
        world.grid.as_ref()
    }

    /// Tiles the unit could move to right now.
    #[must_use]
    pub fn reachable_tiles(world: &World, unit: UnitId) -> Vec<TileCoord> {
        world.reachable_tiles(unit)
    }

    /// Unit standing on the tile, if any.
    #[must_use]
    pub fn occupant(world: &World, tile: TileCoord) -> Option<UnitId> {
        world.grid.as_ref().and_then(|grid| grid.occupant(tile))
    }

    /// Reports whether the tile is highlighted.
    #[must_use]
    pub fn is_tile_highlighted(world: &World, tile: TileCoord) -> bool {
        world
            .grid
            .as_ref()
            .and_then(|grid| grid.tile(tile))
            .is_some_and(|tile| tile.is_highlighted())
    }

    /// Reports whether the unit is highlighted.
    #[must_use]
    pub fn is_unit_highlighted(world: &World, unit: UnitId) -> bool {
        world.unit(unit).is_some_and(Unit::is_highlighted)
    }

    /// Captures a snapshot of a unit still held by the match.
    #[must_use]
    pub fn unit(world: &World, unit: UnitId) -> Option<UnitSnapshot> {
        world.unit(unit).map(|state| UnitSnapshot::capture(unit, state))
    }

    /// Captures snapshots of every unit on the grid, ordered by identifier.
    #[must_use]
    pub fn units(world: &World) -> Vec<UnitSnapshot> {
        world
            .units
            .iter_active()
            .filter(|(_, state)| state.tile().is_some())
            .map(|(slot, state)| UnitSnapshot::capture(id_of(slot), state))
            .collect()
    }

    /// Live units of a team in spawn order.
    #[must_use]
    pub fn roster(world: &World, team: Team) -> &[UnitId] {
        world.roster(team)
    }

    /// Teams that still hold units, in turn order.
    #[must_use]
    pub fn live_teams(world: &World) -> Vec<Team> {
        world.live_teams().collect()
    }

    /// Reports whether the unit pool currently hands out the unit.
    #[must_use]
    pub fn is_unit_pooled_active(world: &World, unit: UnitId) -> bool {
        world.units.is_active(slot_of(unit))
    }

    /// Active and available counts of the unit pool.
    #[must_use]
    pub fn unit_pool_counts(world: &World) -> PoolCounts {
        PoolCounts {
            active: world.units.active_count(),
            available: world.units.available_count(),
        }
    }

    /// Occupancy of a pool.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PoolCounts {
        /// Instances handed out.
        pub active: usize,
        /// Instances waiting for reuse.
        pub available: usize,
    }

    /// Immutable representation of a single unit's state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct UnitSnapshot {
        /// Identifier of the unit.
        pub id: UnitId,
        /// Team the unit fights for.
        pub team: Team,
        /// Tile the unit stands on.
        pub tile: Option<TileCoord>,
        /// Maximum number of tiles travelled along one ray.
        pub move_range: u32,
        /// Indicates whether the unit is highlighted.
        pub highlighted: bool,
    }

    impl UnitSnapshot {
        fn capture(id: UnitId, unit: &Unit) -> Self {
            Self {
                id,
                team: unit.team(),
                tile: unit.tile(),
                move_range: unit.move_range(),
                highlighted: unit.is_highlighted(),
            }
        }
    }
}
