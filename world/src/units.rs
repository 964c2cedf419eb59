//! Units, their relocation primitive and the straight-ray movement rule.

use tactics_core::{RayDirection, Team, TileCoord, UnitId, DEFAULT_MOVE_RANGE};

use crate::{
    grid::Grid,
    pool::{EntityPool, PoolSlot, Poolable},
};

/// Pooled game piece owned by a team.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    team: Team,
    tile: Option<TileCoord>,
    move_range: u32,
    highlighted: bool,
}

impl Unit {
    /// Creates an off-grid prototype with the given movement range.
    #[must_use]
    pub const fn new(move_range: u32) -> Self {
        Self {
            team: Team::Red,
            tile: None,
            move_range,
            highlighted: false,
        }
    }

    /// Team the unit fights for.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Tile the unit occupies. `None` means the unit is out of play.
    #[must_use]
    pub const fn tile(&self) -> Option<TileCoord> {
        self.tile
    }

    /// Maximum number of tiles travelled along one ray.
    #[must_use]
    pub const fn move_range(&self) -> u32 {
        self.move_range
    }

    /// Reports whether the unit is drawn highlighted.
    #[must_use]
    pub const fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub(crate) fn set_team(&mut self, team: Team) {
        self.team = team;
        self.highlighted = false;
    }

    pub(crate) fn set_move_range(&mut self, move_range: u32) {
        self.move_range = move_range;
    }

    pub(crate) fn set_highlight(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    /// Tiles the unit may move to from its current tile.
    ///
    /// Each of the eight rays is walked outward up to `move_range` steps. A
    /// ray stops at the grid edge, stops before a friendly unit, and stops on
    /// (and includes) an enemy unit. `team_of` resolves the team of an
    /// occupying unit. Units off the grid reach nothing.
    pub fn reachable_tiles<F>(&self, grid: &Grid, team_of: F) -> Vec<TileCoord>
    where
        F: Fn(UnitId) -> Option<Team>,
    {
        let Some(origin) = self.tile else {
            return Vec::new();
        };

        let mut reachable = Vec::new();
        for direction in RayDirection::all() {
            let (dx, dy) = direction.step();
            for distance in 1..=i64::from(self.move_range) {
                let x = i64::from(origin.x()) + i64::from(dx) * distance;
                let y = i64::from(origin.y()) + i64::from(dy) * distance;
                let Some(tile) = grid.tile_at(x, y) else {
                    break;
                };

                match tile.occupant() {
                    None => reachable.push(tile.coord()),
                    Some(occupant) => {
                        if team_of(occupant).is_some_and(|team| team != self.team) {
                            reachable.push(tile.coord());
                        }
                        break;
                    }
                }
            }
        }
        reachable
    }
}

impl Default for Unit {
    fn default() -> Self {
        Self::new(DEFAULT_MOVE_RANGE)
    }
}

impl Poolable for Unit {
    fn on_acquire(&mut self) {
        self.highlighted = false;
    }

    fn on_release(&mut self) {
        self.tile = None;
        self.highlighted = false;
    }
}

/// Converts a unit identifier into its pool slot.
#[must_use]
pub(crate) fn slot_of(unit: UnitId) -> PoolSlot {
    PoolSlot::new(usize::try_from(unit.get()).unwrap_or(usize::MAX))
}

/// Converts a pool slot into the identifier exposed to other crates.
#[must_use]
pub(crate) fn id_of(slot: PoolSlot) -> UnitId {
    UnitId::new(u32::try_from(slot.index()).unwrap_or(u32::MAX))
}

/// Moves `unit` onto `destination`, or off the grid when `destination` is `None`.
///
/// The tile the unit leaves loses its occupant. A unit already standing on
/// the destination is pushed off the grid so that every tile and unit keep
/// pointing at each other. Returns the tile the unit left, if any.
pub(crate) fn relocate(
    units: &mut EntityPool<Unit>,
    grid: &mut Grid,
    unit: UnitId,
    destination: Option<TileCoord>,
) -> Option<TileCoord> {
    let slot = slot_of(unit);
    let previous = units.get_mut(slot)?.tile.take();
    if let Some(previous) = previous {
        if grid.occupant(previous) == Some(unit) {
            grid.clear_occupant(previous);
        }
    }

    let Some(destination) = destination.filter(|coord| grid.tile(*coord).is_some()) else {
        return previous;
    };

    if let Some(displaced) = grid.occupant(destination).filter(|other| *other != unit) {
        if let Some(other) = units.get_mut(slot_of(displaced)) {
            other.tile = None;
        }
    }

    grid.set_occupant(destination, Some(unit));
    if let Some(moved) = units.get_mut(slot) {
        moved.tile = Some(destination);
    }
    previous
}
