//! Dense tile grid backed by a fixed-size tile pool.

use tactics_core::{GridSize, SetupError, TileCoord, UnitId};
use thiserror::Error;

use crate::pool::{EntityPool, PoolError, PoolSlot, Poolable};

/// Single grid cell holding at most one unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tile {
    coord: TileCoord,
    occupant: Option<UnitId>,
    highlighted: bool,
}

impl Tile {
    /// Coordinate assigned to the tile during grid generation.
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Unit currently standing on the tile, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<UnitId> {
        self.occupant
    }

    /// Reports whether the tile is drawn highlighted.
    #[must_use]
    pub const fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}

impl Poolable for Tile {
    fn on_acquire(&mut self) {
        self.highlighted = false;
    }

    fn on_release(&mut self) {
        self.occupant = None;
        self.highlighted = false;
    }
}

/// Failures raised while generating a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// Width and height must both be positive.
    #[error("grid dimensions must be positive (received {width}x{height})")]
    EmptyDimensions {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// The grid holds more tiles than can be allocated.
    #[error("grid of {width}x{height} tiles is too large to allocate")]
    TooLarge {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// The tile pool could not supply every tile.
    #[error("generated {generated} of {requested} tiles")]
    TileGeneration {
        /// Number of tiles the grid required.
        requested: usize,
        /// Number of tiles acquired before the failure.
        generated: usize,
        /// Pool condition that stopped generation.
        #[source]
        source: PoolError,
    },
}

impl From<GridError> for SetupError {
    fn from(error: GridError) -> Self {
        match error {
            GridError::EmptyDimensions { width, height } => SetupError::EmptyGrid {
                columns: width,
                rows: height,
            },
            GridError::TooLarge { width, height } => SetupError::GridTooLarge {
                columns: width,
                rows: height,
            },
            GridError::TileGeneration {
                requested,
                generated,
                ..
            } => SetupError::TileGeneration {
                requested,
                generated,
            },
        }
    }
}

/// Rectangular arrangement of pooled tiles indexed by coordinate.
#[derive(Clone, Debug)]
pub struct Grid {
    size: GridSize,
    pool: EntityPool<Tile>,
    tiles: Vec<PoolSlot>,
}

impl Grid {
    /// Generates every tile of a `width` by `height` grid.
    ///
    /// The tile pool is sized to the grid and never grows; running out of
    /// tiles fails the whole initialization. Grids whose storage cannot be
    /// reserved are rejected before any tile is generated.
    pub fn initialize(width: u32, height: u32) -> Result<Self, GridError> {
        let size = GridSize::new(width, height);
        let requested = checked_area(size)?;
        let pool = EntityPool::try_create("tile", Tile::default(), requested, false)
            .map_err(|_| too_large(size))?;
        Self::generate(pool, size)
    }

    fn generate(mut pool: EntityPool<Tile>, size: GridSize) -> Result<Self, GridError> {
        let requested = checked_area(size)?;
        let mut tiles: Vec<PoolSlot> = Vec::new();
        tiles
            .try_reserve_exact(requested)
            .map_err(|_| too_large(size))?;
        tiles.resize(requested, PoolSlot::new(0));
        let mut generated = 0;
        for x in 0..size.width {
            for y in 0..size.height {
                let slot = pool.acquire().map_err(|source| GridError::TileGeneration {
                    requested,
                    generated,
                    source,
                })?;
                let coord = TileCoord::new(x, y);
                if let Some(tile) = pool.get_mut(slot) {
                    tile.coord = coord;
                }
                if let Some(index) = index_of(size, coord) {
                    tiles[index] = slot;
                }
                generated += 1;
            }
        }

        Ok(Self { size, pool, tiles })
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> GridSize {
        self.size
    }

    /// Looks up the tile at `coord`, returning `None` outside the grid.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        let index = index_of(self.size, coord)?;
        self.pool.get(self.tiles[index])
    }

    /// Looks up the tile at signed coordinates, returning `None` outside the grid.
    #[must_use]
    pub fn tile_at(&self, x: i64, y: i64) -> Option<&Tile> {
        let coord = TileCoord::new(u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        self.tile(coord)
    }

    fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        let index = index_of(self.size, coord)?;
        self.pool.get_mut(self.tiles[index])
    }

    /// Unit standing on `coord`, if any.
    #[must_use]
    pub fn occupant(&self, coord: TileCoord) -> Option<UnitId> {
        self.tile(coord).and_then(Tile::occupant)
    }

    pub(crate) fn set_occupant(&mut self, coord: TileCoord, occupant: Option<UnitId>) {
        if let Some(tile) = self.tile_mut(coord) {
            tile.occupant = occupant;
        }
    }

    pub(crate) fn clear_occupant(&mut self, coord: TileCoord) {
        self.set_occupant(coord, None);
    }

    pub(crate) fn highlight(&mut self, coord: TileCoord, highlighted: bool) {
        if let Some(tile) = self.tile_mut(coord) {
            tile.highlighted = highlighted;
        }
    }

    /// Clears the highlight of every tile.
    pub fn unhighlight_all(&mut self) {
        for (_, tile) in self.pool.iter_active_mut() {
            tile.highlighted = false;
        }
    }

    /// Iterates tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter_map(|slot| self.pool.get(*slot))
    }

    /// Coordinates of the highlighted tiles in row-major order.
    pub fn highlighted(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.iter()
            .filter(|tile| tile.highlighted)
            .map(Tile::coord)
    }

    /// Read access to the backing tile pool.
    #[must_use]
    pub fn pool(&self) -> &EntityPool<Tile> {
        &self.pool
    }

    /// Returns every tile to the pool, leaving the grid without tiles.
    pub fn teardown(&mut self) -> usize {
        self.tiles.clear();
        self.size = GridSize::new(0, 0);
        self.pool.release_all()
    }
}

fn checked_area(size: GridSize) -> Result<usize, GridError> {
    if size.width == 0 || size.height == 0 {
        return Err(GridError::EmptyDimensions {
            width: size.width,
            height: size.height,
        });
    }
    size.area().ok_or_else(|| too_large(size))
}

const fn too_large(size: GridSize) -> GridError {
    GridError::TooLarge {
        width: size.width,
        height: size.height,
    }
}

fn index_of(size: GridSize, coord: TileCoord) -> Option<usize> {
    if !size.contains(coord) {
        return None;
    }
    let row = usize::try_from(coord.y()).ok()?;
    let column = usize::try_from(coord.x()).ok()?;
    let width = usize::try_from(size.width).ok()?;
    Some(row * width + column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn initialize_generates_one_tile_per_coordinate() {
        let grid = Grid::initialize(3, 2).expect("grid");
        assert_eq!(grid.pool().active_count(), 6);
        assert_eq!(grid.pool().available_count(), 0);
        assert!(!grid.pool().is_expandable());

        let coords: Vec<TileCoord> = grid.iter().map(Tile::coord).collect();
        assert_eq!(
            coords,
            vec![
                TileCoord::new(0, 0),
                TileCoord::new(1, 0),
                TileCoord::new(2, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1),
                TileCoord::new(2, 1),
            ]
        );
    }

    #[test]
    fn initialize_rejects_empty_dimensions() {
        assert_eq!(
            Grid::initialize(0, 4).unwrap_err(),
            GridError::EmptyDimensions {
                width: 0,
                height: 4
            }
        );
    }

    #[test]
    fn undersized_pool_fails_generation() {
        let pool = EntityPool::create("tile", Tile::default(), 3, false);
        let error = Grid::generate(pool, GridSize::new(2, 2)).unwrap_err();
        assert_eq!(
            error,
            GridError::TileGeneration {
                requested: 4,
                generated: 3,
                source: PoolError::Exhausted { kind: "tile" },
            }
        );
        assert_eq!(
            SetupError::from(error),
            SetupError::TileGeneration {
                requested: 4,
                generated: 3
            }
        );
    }

    #[test]
    fn oversized_grid_is_rejected_before_generation() {
        assert_eq!(
            Grid::initialize(u32::MAX, u32::MAX).unwrap_err(),
            GridError::TooLarge {
                width: u32::MAX,
                height: u32::MAX,
            }
        );
        assert_eq!(
            SetupError::from(GridError::TooLarge {
                width: 9,
                height: 9
            }),
            SetupError::GridTooLarge {
                columns: 9,
                rows: 9
            }
        );
    }

    #[test]
    fn default_tile_sits_at_the_origin_unoccupied() {
        let tile = Tile::default();
        assert_eq!(tile.coord(), TileCoord::new(0, 0));
        assert_eq!(tile.occupant(), None);
        assert!(!tile.is_highlighted());
    }

    #[test]
    fn tile_at_treats_negative_coordinates_as_outside() {
        let grid = Grid::initialize(2, 2).expect("grid");
        assert!(grid.tile_at(-1, 0).is_none());
        assert!(grid.tile_at(0, -1).is_none());
        assert!(grid.tile_at(2, 0).is_none());
        assert_eq!(
            grid.tile_at(1, 1).map(Tile::coord),
            Some(TileCoord::new(1, 1))
        );
    }

    #[test]
    fn unhighlight_all_is_idempotent() {
        let mut grid = Grid::initialize(3, 3).expect("grid");
        grid.highlight(TileCoord::new(1, 1), true);
        grid.highlight(TileCoord::new(2, 0), true);
        assert_eq!(grid.highlighted().count(), 2);

        grid.unhighlight_all();
        grid.unhighlight_all();
        assert_eq!(grid.highlighted().count(), 0);
    }

    #[test]
    fn teardown_releases_tiles_and_clears_occupants() {
        let mut grid = Grid::initialize(2, 2).expect("grid");
        grid.set_occupant(TileCoord::new(0, 0), Some(UnitId::new(4)));

        assert_eq!(grid.teardown(), 4);
        assert_eq!(grid.pool().available_count(), 4);
        assert!(grid.tile(TileCoord::new(0, 0)).is_none());
    }

    proptest! {
        #[test]
        fn lookups_match_bounds(width in 1u32..24, height in 1u32..24, x in -4i64..32, y in -4i64..32) {
            let grid = Grid::initialize(width, height).expect("grid");
            let inside = (0..i64::from(width)).contains(&x) && (0..i64::from(height)).contains(&y);
            match grid.tile_at(x, y) {
                Some(tile) => {
                    prop_assert!(inside);
                    prop_assert_eq!(i64::from(tile.coord().x()), x);
                    prop_assert_eq!(i64::from(tile.coord().y()), y);
                }
                None => prop_assert!(!inside),
            }
        }
    }
}
