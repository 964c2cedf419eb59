#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure selection system that turns raw screen clicks into click commands.
//!
//! The system follows the world's selection mode through the event stream
//! and asks the adapter's picking probe for the nearest entity on the layers
//! that mode allows. Every raw click produces exactly one
//! [`Command::Click`] while a match is running.

use glam::Vec2;
use tactics_core::{Clickable, Command, Event, LayerMask, SelectionMode};
use tracing::trace;

/// Mapping from selection mode to the layers eligible for picking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionFilters {
    tiles: LayerMask,
}

impl SelectionFilters {
    /// Creates filters that pick tiles on the provided layer.
    #[must_use]
    pub const fn new(tiles: LayerMask) -> Self {
        Self { tiles }
    }

    /// Layers searched while the world is in `mode`.
    #[must_use]
    pub const fn mask(&self, mode: SelectionMode) -> LayerMask {
        match mode {
            SelectionMode::None => LayerMask::empty(),
            SelectionMode::Units(team) => LayerMask::team(team),
            SelectionMode::Tiles => self.tiles,
        }
    }
}

impl Default for SelectionFilters {
    fn default() -> Self {
        Self::new(LayerMask::TILES)
    }
}

/// Selection system that resolves clicks against the active filter.
#[derive(Clone, Debug)]
pub struct ClickSelector {
    filters: SelectionFilters,
    mode: SelectionMode,
    attached: bool,
}

impl Default for ClickSelector {
    fn default() -> Self {
        Self::new(SelectionFilters::default())
    }
}

impl ClickSelector {
    /// Creates a detached selector using the provided filters.
    #[must_use]
    pub const fn new(filters: SelectionFilters) -> Self {
        Self {
            filters,
            mode: SelectionMode::None,
            attached: false,
        }
    }

    /// Reports whether clicks are currently forwarded to the world.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    /// Selection mode most recently announced by the world.
    #[must_use]
    pub const fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Layers the next click is resolved against.
    #[must_use]
    pub const fn active_mask(&self) -> LayerMask {
        self.filters.mask(self.mode)
    }

    /// Consumes world events and an optional raw click to emit a click command.
    ///
    /// The `probe` closure receives the screen position and the layer mask of
    /// the current mode and must return the nearest entity on those layers.
    /// The probe is skipped when the mask is empty, which yields a click on
    /// nothing.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        click: Option<Vec2>,
        mut probe: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(Vec2, LayerMask) -> Option<Clickable>,
    {
        for event in events {
            match event {
                Event::MatchStarted { .. } => self.attached = true,
                Event::GameOver { .. } | Event::MatchEnded => self.attached = false,
                Event::SelectionModeChanged { mode } => self.mode = *mode,
                _ => {}
            }
        }

        let Some(screen) = click else {
            return;
        };
        if !self.attached {
            trace!(x = screen.x, y = screen.y, "click dropped while detached");
            return;
        }

        let mask = self.active_mask();
        let target = if mask.is_empty() {
            None
        } else {
            probe(screen, mask)
        };
        trace!(x = screen.x, y = screen.y, ?mask, ?target, "click resolved");
        out.push(Command::Click { target });
    }
}
