#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for tactics adapters.
//!
//! Scenes are laid out on the XZ plane with the grid centred on the origin.
//! A [`TopDownCamera`] hovers above the board looking straight down, which
//! lets adapters turn screen pixels into picking rays without a graphics
//! backend.

use anyhow::Result as AnyResult;
use glam::{Vec2, Vec3};
use tactics_core::{Clickable, LayerMask, Team, TileCoord, UnitId};
use thiserror::Error;

/// Furthest distance along a picking ray that may produce a hit.
pub const MAX_PICK_DISTANCE: f32 = 100.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Colors assigned to tiles, teams and the shared highlight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Base tile color; alternate tiles are drawn slightly lighter.
    pub tile: Color,
    /// Color of every highlighted tile or unit.
    pub highlight: Color,
    /// Unit color for [`Team::Red`].
    pub red: Color,
    /// Unit color for [`Team::Blue`].
    pub blue: Color,
    /// Unit color for [`Team::Green`].
    pub green: Color,
    /// Unit color for [`Team::Yellow`].
    pub yellow: Color,
}

impl Palette {
    /// Resting color of a team's units.
    #[must_use]
    pub const fn team(&self, team: Team) -> Color {
        match team {
            Team::Red => self.red,
            Team::Blue => self.blue,
            Team::Green => self.green,
            Team::Yellow => self.yellow,
        }
    }

    /// Color used to draw the tile.
    #[must_use]
    pub fn tile_color(&self, tile: &SceneTile) -> Color {
        if tile.highlighted {
            self.highlight
        } else if (tile.coord.x() + tile.coord.y()) % 2 == 1 {
            self.tile.lighten(0.15)
        } else {
            self.tile
        }
    }

    /// Color used to draw the unit.
    #[must_use]
    pub const fn unit_color(&self, unit: &SceneUnit) -> Color {
        if unit.highlighted {
            self.highlight
        } else {
            self.team(unit.team)
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            tile: Color::from_rgb_u8(96, 96, 104),
            highlight: Color::from_rgb_u8(120, 230, 230),
            red: Color::from_rgb_u8(214, 64, 64),
            blue: Color::from_rgb_u8(64, 112, 214),
            green: Color::from_rgb_u8(72, 168, 88),
            yellow: Color::from_rgb_u8(224, 196, 64),
        }
    }
}

/// Spatial arrangement of tiles and units in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneLayout {
    tile_spacing: f32,
    tile_size: f32,
    unit_offset: f32,
    unit_radius: f32,
}

impl SceneLayout {
    /// Creates a layout, validating that tiles neither vanish nor overlap.
    pub fn new(
        tile_spacing: f32,
        tile_size: f32,
        unit_offset: f32,
        unit_radius: f32,
    ) -> Result<Self, RenderingError> {
        let valid = tile_spacing > 0.0
            && tile_size > 0.0
            && tile_size <= tile_spacing
            && unit_offset >= 0.0
            && unit_radius > 0.0;
        if !valid {
            return Err(RenderingError::InvalidLayout {
                tile_spacing,
                tile_size,
            });
        }

        Ok(Self {
            tile_spacing,
            tile_size,
            unit_offset,
            unit_radius,
        })
    }

    /// Distance between neighbouring tile centres.
    #[must_use]
    pub const fn tile_spacing(&self) -> f32 {
        self.tile_spacing
    }

    /// Edge length of a square tile.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Height of a unit's centre above its tile.
    #[must_use]
    pub const fn unit_offset(&self) -> f32 {
        self.unit_offset
    }

    /// Radius of the sphere representing a unit.
    #[must_use]
    pub const fn unit_radius(&self) -> f32 {
        self.unit_radius
    }

    /// Centre of the tile at `coord` on a `columns` by `rows` grid.
    #[must_use]
    pub fn tile_position(&self, coord: TileCoord, columns: u32, rows: u32) -> Vec3 {
        Vec3::new(
            self.axis_position(coord.x(), columns),
            0.0,
            self.axis_position(coord.y(), rows),
        )
    }

    /// Centre of a unit standing on the tile at `coord`.
    #[must_use]
    pub fn unit_position(&self, coord: TileCoord, columns: u32, rows: u32) -> Vec3 {
        self.tile_position(coord, columns, rows) + Vec3::new(0.0, self.unit_offset, 0.0)
    }

    fn axis_position(&self, index: u32, count: u32) -> f32 {
        let total = count as f32 * self.tile_spacing;
        let start = -(total / 2.0 - self.tile_spacing / 2.0);
        start + index as f32 * self.tile_spacing
    }
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            tile_spacing: 1.5,
            tile_size: 1.0,
            unit_offset: 1.0,
            unit_radius: 0.4,
        }
    }
}

/// Half-line used to pick entities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Point the ray starts from.
    pub origin: Vec3,
    /// Unit-length direction of travel.
    pub direction: Vec3,
}

/// Orthographic camera looking straight down the Y axis at the board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TopDownCamera {
    height: f32,
    viewport: Vec2,
    pixels_per_unit: f32,
}

impl TopDownCamera {
    /// Creates a camera hovering `height` units above the board.
    ///
    /// The screen origin is the top-left pixel of the viewport; the viewport
    /// centre looks at the world origin.
    pub fn new(height: f32, viewport: Vec2, pixels_per_unit: f32) -> Result<Self, RenderingError> {
        if height <= 0.0 || pixels_per_unit <= 0.0 || viewport.min_element() <= 0.0 {
            return Err(RenderingError::InvalidCamera {
                height,
                width: viewport.x,
                depth: viewport.y,
                pixels_per_unit,
            });
        }

        Ok(Self {
            height,
            viewport,
            pixels_per_unit,
        })
    }

    /// Height of the camera above the board.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Size of the viewport in pixels.
    #[must_use]
    pub const fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Scale between world units and pixels.
    #[must_use]
    pub const fn pixels_per_unit(&self) -> f32 {
        self.pixels_per_unit
    }

    /// Projects a screen pixel onto the board plane.
    #[must_use]
    pub fn screen_to_board(&self, screen: Vec2) -> Vec2 {
        (screen - self.viewport / 2.0) / self.pixels_per_unit
    }

    /// Projects a world position onto the screen.
    #[must_use]
    pub fn world_to_screen(&self, position: Vec3) -> Vec2 {
        Vec2::new(position.x, position.z) * self.pixels_per_unit + self.viewport / 2.0
    }

    /// Downward ray passing through the screen pixel.
    #[must_use]
    pub fn ray(&self, screen: Vec2) -> Ray {
        let board = self.screen_to_board(screen);
        Ray {
            origin: Vec3::new(board.x, self.height, board.y),
            direction: Vec3::NEG_Y,
        }
    }
}

impl Default for TopDownCamera {
    fn default() -> Self {
        Self {
            height: 10.0,
            viewport: Vec2::new(640.0, 480.0),
            pixels_per_unit: 48.0,
        }
    }
}

/// Snapshot of a tile as it should be drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneTile {
    /// Grid coordinate of the tile.
    pub coord: TileCoord,
    /// Indicates whether the tile is highlighted.
    pub highlighted: bool,
}

/// Snapshot of a unit standing on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneUnit {
    /// Identifier allocated to the unit by the world.
    pub id: UnitId,
    /// Team the unit fights for.
    pub team: Team,
    /// Tile the unit stands on.
    pub tile: TileCoord,
    /// Indicates whether the unit is highlighted.
    pub highlighted: bool,
}

/// Scene description combining the tile grid and the units on it.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Spatial arrangement used for placement and picking.
    pub layout: SceneLayout,
    /// Tiles in row-major order.
    pub tiles: Vec<SceneTile>,
    /// Units currently on the grid.
    pub units: Vec<SceneUnit>,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        columns: u32,
        rows: u32,
        layout: SceneLayout,
        tiles: Vec<SceneTile>,
        units: Vec<SceneUnit>,
    ) -> Self {
        Self {
            columns,
            rows,
            layout,
            tiles,
            units,
        }
    }

    /// World position of a tile centre.
    #[must_use]
    pub fn tile_position(&self, coord: TileCoord) -> Vec3 {
        self.layout.tile_position(coord, self.columns, self.rows)
    }

    /// World position of a unit standing on `coord`.
    #[must_use]
    pub fn unit_position(&self, coord: TileCoord) -> Vec3 {
        self.layout.unit_position(coord, self.columns, self.rows)
    }

    /// Nearest entity on the `mask` layers under the screen pixel.
    ///
    /// Units are spheres resting above their tiles, so a unit always wins
    /// against the tile beneath it when both layers are searched.
    #[must_use]
    pub fn pick(&self, camera: &TopDownCamera, screen: Vec2, mask: LayerMask) -> Option<Clickable> {
        let ray = camera.ray(screen);
        let mut nearest: Option<(f32, Clickable)> = None;
        let mut consider = |distance: f32, hit: Clickable| {
            if (0.0..=MAX_PICK_DISTANCE).contains(&distance)
                && nearest.map_or(true, |(best, _)| distance < best)
            {
                nearest = Some((distance, hit));
            }
        };

        for unit in &self.units {
            if !mask.contains(LayerMask::team(unit.team)) {
                continue;
            }
            let centre = self.unit_position(unit.tile);
            if let Some(distance) = intersect_sphere(ray, centre, self.layout.unit_radius) {
                consider(distance, Clickable::Unit(unit.id));
            }
        }

        if mask.contains(LayerMask::TILES) {
            let half = self.layout.tile_size / 2.0;
            for tile in &self.tiles {
                let centre = self.tile_position(tile.coord);
                if let Some(distance) = intersect_square(ray, centre, half) {
                    consider(distance, Clickable::Tile(tile.coord));
                }
            }
        }

        nearest.map(|(_, hit)| hit)
    }
}

fn intersect_sphere(ray: Ray, centre: Vec3, radius: f32) -> Option<f32> {
    let offset = ray.origin - centre;
    let along = offset.dot(ray.direction);
    let discriminant = along * along - (offset.length_squared() - radius * radius);
    if discriminant < 0.0 {
        return None;
    }
    let distance = -along - discriminant.sqrt();
    (distance >= 0.0).then_some(distance)
}

fn intersect_square(ray: Ray, centre: Vec3, half: f32) -> Option<f32> {
    if ray.direction.y.abs() <= f32::EPSILON {
        return None;
    }
    let distance = (centre.y - ray.origin.y) / ray.direction.y;
    if distance < 0.0 {
        return None;
    }
    let point = ray.origin + ray.direction * distance;
    let inside = (point.x - centre.x).abs() <= half && (point.z - centre.z).abs() <= half;
    inside.then_some(distance)
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Banner announcing the turn or the winner.
    pub label: String,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(label: T, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            label: label.into(),
            scene,
        }
    }
}

/// Rendering backend capable of presenting tactics scenes.
pub trait RenderingBackend {
    /// Draws a single frame.
    fn present(&mut self, presentation: &Presentation) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum RenderingError {
    /// Tiles must be non-empty and must not overlap their neighbours.
    #[error("tile size {tile_size} must be positive and fit within spacing {tile_spacing}")]
    InvalidLayout {
        /// Requested distance between tile centres.
        tile_spacing: f32,
        /// Requested tile edge length.
        tile_size: f32,
    },
    /// Camera height, viewport and scale must be positive.
    #[error(
        "camera requires positive height, viewport and scale \
         (received height {height}, viewport {width}x{depth}, scale {pixels_per_unit})"
    )]
    InvalidCamera {
        /// Requested camera height.
        height: f32,
        /// Requested viewport width in pixels.
        width: f32,
        /// Requested viewport height in pixels.
        depth: f32,
        /// Requested pixels per world unit.
        pixels_per_unit: f32,
    },
}
