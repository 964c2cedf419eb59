#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tactics engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative match world, and pure systems. Adapters submit [`Command`]
//! values describing player intent, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! observers to react to. Systems consume event streams, query immutable
//! state, and respond exclusively with new commands.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// Number of tiles a unit may travel along a single ray unless configured otherwise.
pub const DEFAULT_MOVE_RANGE: u32 = 2;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Builds the grid, spawns the configured units and enters the turn loop.
    StartMatch {
        /// Grid dimensions and initial placements for the match.
        config: MatchConfig,
    },
    /// Reports that the player clicked, resolved against the active selection filter.
    Click {
        /// Entity under the cursor, or `None` when the click hit nothing clickable.
        target: Option<Clickable>,
    },
    /// Tears the match down and returns every pooled entity.
    EndMatch,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a match was set up and the first team may act.
    MatchStarted {
        /// Team that acts first.
        team: Team,
        /// Number of tile columns in the grid.
        columns: u32,
        /// Number of tile rows in the grid.
        rows: u32,
    },
    /// Reports that a match setup request failed.
    MatchRejected {
        /// Reason the setup could not complete.
        reason: SetupError,
    },
    /// Announces that the entity filter for the next click changed.
    SelectionModeChanged {
        /// Mode that became active.
        mode: SelectionMode,
    },
    /// Confirms that a unit was selected and lists its destinations.
    UnitSelected {
        /// Identifier of the selected unit.
        unit: UnitId,
        /// Tiles the unit may move to this turn, in ray order.
        reachable: Vec<TileCoord>,
    },
    /// Reports that the pending selection was discarded.
    SelectionCleared,
    /// Confirms that an enemy unit was removed from play.
    UnitCaptured {
        /// Identifier of the captured unit.
        unit: UnitId,
        /// Team the captured unit belonged to.
        team: Team,
        /// Tile the captured unit occupied.
        tile: TileCoord,
    },
    /// Confirms that a unit moved between two tiles.
    UnitMoved {
        /// Identifier of the unit that moved.
        unit: UnitId,
        /// Tile the unit occupied before moving.
        from: TileCoord,
        /// Tile the unit occupies after moving.
        to: TileCoord,
    },
    /// Announces that a new team is acting.
    TurnChanged {
        /// Team whose turn begins.
        team: Team,
    },
    /// Announces that only one team retains units.
    GameOver {
        /// Team left standing.
        winner: Team,
    },
    /// Confirms that the match was torn down.
    MatchEnded,
}

/// Factions that own rosters and alternate turns in declaration order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    EnumCount,
    strum::Display,
)]
pub enum Team {
    /// The red faction, first in turn order.
    Red,
    /// The blue faction.
    Blue,
    /// The green faction.
    Green,
    /// The yellow faction.
    Yellow,
}

impl Team {
    /// Every team in turn order.
    pub fn all() -> impl Iterator<Item = Team> {
        Team::iter()
    }
}

/// Unique identifier assigned to a unit.
///
/// Identifiers are slots in the unit pool and are reused once a captured
/// unit has been recycled by a later match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single tile expressed as zero-based column and row indices.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct TileCoord {
    x: u32,
    y: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Offsets the coordinate, returning `None` when either axis would become negative.
    ///
    /// The result is not bounds checked against any grid.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self { x, y })
    }
}

impl From<[u32; 2]> for TileCoord {
    fn from([x, y]: [u32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<TileCoord> for [u32; 2] {
    fn from(coord: TileCoord) -> Self {
        [coord.x, coord.y]
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The eight straight rays a unit may travel along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum RayDirection {
    /// Increasing row indices.
    North,
    /// Decreasing row indices.
    South,
    /// Increasing column indices.
    East,
    /// Decreasing column indices.
    West,
    /// Increasing column and row indices.
    NorthEast,
    /// Decreasing column, increasing row indices.
    NorthWest,
    /// Increasing column, decreasing row indices.
    SouthEast,
    /// Decreasing column and row indices.
    SouthWest,
}

impl RayDirection {
    /// Unit step `(dx, dy)` taken along the ray.
    #[must_use]
    pub const fn step(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::South => (0, -1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
            Self::NorthEast => (1, 1),
            Self::NorthWest => (-1, 1),
            Self::SouthEast => (1, -1),
            Self::SouthWest => (-1, -1),
        }
    }

    /// Every ray, orthogonal axes first.
    pub fn all() -> impl Iterator<Item = RayDirection> {
        RayDirection::iter()
    }
}

/// Entity resolved under the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Clickable {
    /// A grid tile.
    Tile(TileCoord),
    /// A unit standing on the grid.
    Unit(UnitId),
}

/// Filter describing which entity category may be clicked next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionMode {
    /// Nothing is clickable; used once the game is over.
    None,
    /// Only units of the given team are clickable.
    Units(Team),
    /// Only tiles are clickable; a unit is awaiting its destination.
    Tiles,
}

bitflags! {
    /// Entity categories eligible for picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct LayerMask: u8 {
        /// Grid tiles.
        const TILES = 1 << 0;
        /// Units of [`Team::Red`].
        const RED = 1 << 1;
        /// Units of [`Team::Blue`].
        const BLUE = 1 << 2;
        /// Units of [`Team::Green`].
        const GREEN = 1 << 3;
        /// Units of [`Team::Yellow`].
        const YELLOW = 1 << 4;
    }
}

impl LayerMask {
    /// Layer that units of the given team are placed on.
    #[must_use]
    pub const fn team(team: Team) -> Self {
        match team {
            Team::Red => Self::RED,
            Team::Blue => Self::BLUE,
            Team::Green => Self::GREEN,
            Team::Yellow => Self::YELLOW,
        }
    }
}

/// Lifecycle stage of the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchPhase {
    /// No match has been started, or the last one was torn down.
    Idle,
    /// Teams are taking turns.
    InProgress,
    /// A single team remains; clicks are no longer processed.
    Over,
}

/// Grid dimensions measured in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    /// Number of tile columns.
    pub width: u32,
    /// Number of tile rows.
    pub height: u32,
}

impl GridSize {
    /// Creates a new grid size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of tiles covered by the grid, or `None` when it does not fit in `usize`.
    #[must_use]
    pub fn area(&self) -> Option<usize> {
        let width = usize::try_from(self.width).ok()?;
        let height = usize::try_from(self.height).ok()?;
        width.checked_mul(height)
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, coord: TileCoord) -> bool {
        coord.x() < self.width && coord.y() < self.height
    }
}

/// Initial coordinates of every unit belonging to one team.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacement {
    /// Team the placed units join.
    pub team: Team,
    /// Tiles the units start on.
    pub positions: Vec<TileCoord>,
}

/// Static description of a match, validated before it reaches the world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Grid dimensions.
    pub grid: GridSize,
    /// Maximum number of tiles a unit may travel along one ray.
    #[serde(default = "default_move_range")]
    pub move_range: u32,
    /// Initial unit placements, at most one entry per team.
    #[serde(default)]
    pub placements: Vec<UnitPlacement>,
}

impl MatchConfig {
    /// Total number of units described by the placements.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.placements
            .iter()
            .map(|placement| placement.positions.len())
            .sum()
    }

    /// Two-team demo layout on a four by four grid.
    #[must_use]
    pub fn skirmish() -> Self {
        Self {
            grid: GridSize::new(4, 4),
            move_range: DEFAULT_MOVE_RANGE,
            placements: vec![
                UnitPlacement {
                    team: Team::Red,
                    positions: vec![TileCoord::new(0, 0), TileCoord::new(1, 0)],
                },
                UnitPlacement {
                    team: Team::Blue,
                    positions: vec![TileCoord::new(3, 3), TileCoord::new(2, 3)],
                },
            ],
        }
    }
}

fn default_move_range() -> u32 {
    DEFAULT_MOVE_RANGE
}

/// Reasons a match could not be set up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetupError {
    /// The grid must have at least one row and one column.
    EmptyGrid {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
    },
    /// The tile pool ran dry while generating the grid.
    TileGeneration {
        /// Number of tiles the grid required.
        requested: usize,
        /// Number of tiles generated before the pool was exhausted.
        generated: usize,
    },
    /// The grid holds more tiles than can be allocated.
    GridTooLarge {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
    },
    /// A match is already running and must be ended first.
    AlreadyRunning,
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { columns, rows } => {
                write!(f, "grid must not be empty (received {columns}x{rows})")
            }
            Self::TileGeneration {
                requested,
                generated,
            } => write!(
                f,
                "tile pool exhausted after {generated} of {requested} tiles"
            ),
            Self::GridTooLarge { columns, rows } => {
                write!(f, "grid of {columns}x{rows} tiles is too large to allocate")
            }
            Self::AlreadyRunning => write!(f, "a match is already running"),
        }
    }
}

impl std::error::Error for SetupError {}
