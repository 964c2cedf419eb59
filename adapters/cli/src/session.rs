//! Drives a match from scripted clicks.

use std::{cell::RefCell, rc::Rc};

use anyhow::{bail, Result};
use glam::Vec2;
use tactics_core::{Clickable, Command, Event, LayerMask, MatchConfig};
use tactics_rendering::{Presentation, Scene, SceneLayout, SceneTile, SceneUnit, TopDownCamera};
use tactics_system_selection::ClickSelector;
use tactics_system_turn_label::TurnLabel;
use tactics_world::{self as world, observers::Observers, query, World};
use tracing::{debug, info};

use crate::input::ClickInput;

/// Running match together with the systems that react to it.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    selector: ClickSelector,
    observers: Observers,
    label: Rc<RefCell<TurnLabel>>,
    layout: SceneLayout,
    camera: TopDownCamera,
    pending: Vec<Event>,
}

impl Session {
    /// Starts a match, failing when the world rejects the configuration.
    pub(crate) fn start(
        config: MatchConfig,
        layout: SceneLayout,
        camera: TopDownCamera,
    ) -> Result<Self> {
        let label = Rc::new(RefCell::new(TurnLabel::new()));
        let mut observers = Observers::new();
        {
            let label = Rc::clone(&label);
            let _ = observers.subscribe(move |event| {
                let _ = label.borrow_mut().handle(std::slice::from_ref(event));
            });
        }
        let _ = observers.subscribe(|event| debug!(?event, "world event"));

        let mut session = Self {
            world: World::new(),
            selector: ClickSelector::default(),
            observers,
            label,
            layout,
            camera,
            pending: Vec::new(),
        };

        session.submit(Command::StartMatch { config });
        if let Some(Event::MatchRejected { reason }) = session.pending.first() {
            bail!("match could not start: {reason}");
        }
        Ok(session)
    }

    /// Current text of the turn label.
    pub(crate) fn label(&self) -> String {
        self.label.borrow().text().to_owned()
    }

    /// Resolves one scripted click and returns the events it caused.
    pub(crate) fn click(&mut self, input: ClickInput) -> Vec<Event> {
        let scene = self.scene();
        let screen = match input {
            ClickInput::Screen(screen) => Some(screen),
            ClickInput::Tile(coord) => scene
                .as_ref()
                .map(|scene| self.camera.world_to_screen(scene.tile_position(coord))),
            ClickInput::Miss => None,
        };

        let mut commands = Vec::new();
        let pending = std::mem::take(&mut self.pending);
        let camera = self.camera;
        let probe = |screen: Vec2, mask: LayerMask| -> Option<Clickable> {
            scene.as_ref()?.pick(&camera, screen, mask)
        };
        match screen {
            Some(screen) => self.selector.handle(&pending, Some(screen), probe, &mut commands),
            None => self
                .selector
                .handle(&pending, Some(Vec2::NEG_ONE), |_, _| None, &mut commands),
        }

        for command in commands {
            self.submit(command);
        }
        self.pending.clone()
    }

    /// Tears the match down, returning the final events.
    pub(crate) fn end(mut self) -> Vec<Event> {
        self.pending.clear();
        self.submit(Command::EndMatch);
        let counts = query::unit_pool_counts(&self.world);
        info!(
            active = counts.active,
            available = counts.available,
            "session closed"
        );
        self.pending
    }

    /// Frame describing the current board, if a grid exists.
    pub(crate) fn presentation(&self) -> Option<Presentation> {
        self.scene()
            .map(|scene| Presentation::new(self.label(), scene))
    }

    fn submit(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.observers.publish(&events);
        self.pending.extend(events);
    }

    fn scene(&self) -> Option<Scene> {
        let grid = query::grid(&self.world)?;
        let size = grid.dimensions();
        let tiles = grid
            .iter()
            .map(|tile| SceneTile {
                coord: tile.coord(),
                highlighted: tile.is_highlighted(),
            })
            .collect();
        let units = query::units(&self.world)
            .into_iter()
            .filter_map(|unit| {
                Some(SceneUnit {
                    id: unit.id,
                    team: unit.team,
                    tile: unit.tile?,
                    highlighted: unit.highlighted,
                })
            })
            .collect();
        Some(Scene::new(size.width, size.height, self.layout, tiles, units))
    }
}

#[cfg(test)]
mod tests {
    use tactics_core::{SelectionMode, Team, TileCoord, UnitId};

    use super::*;

    fn session() -> Session {
        Session::start(
            MatchConfig::skirmish(),
            SceneLayout::default(),
            TopDownCamera::default(),
        )
        .expect("skirmish starts")
    }

    #[test]
    fn start_sets_the_label() {
        assert_eq!(session().label(), "Turn: Red");
    }

    #[test]
    fn tile_shorthand_picks_the_unit_standing_there() {
        let mut session = session();
        let events = session.click(ClickInput::Tile(TileCoord::new(0, 0)));
        assert!(events.contains(&Event::UnitSelected {
            unit: UnitId::new(0),
            reachable: vec![
                TileCoord::new(0, 1),
                TileCoord::new(0, 2),
                TileCoord::new(1, 1),
                TileCoord::new(2, 2),
            ],
        }));

        let events = session.click(ClickInput::Tile(TileCoord::new(2, 2)));
        assert!(events.contains(&Event::TurnChanged { team: Team::Blue }));
        assert_eq!(session.label(), "Turn: Blue");
    }

    #[test]
    fn miss_resets_the_selection() {
        let mut session = session();
        let _ = session.click(ClickInput::Tile(TileCoord::new(0, 0)));
        let events = session.click(ClickInput::Miss);
        assert_eq!(
            events,
            vec![
                Event::SelectionCleared,
                Event::SelectionModeChanged {
                    mode: SelectionMode::Units(Team::Red),
                },
            ]
        );
    }

    #[test]
    fn clicks_far_off_screen_hit_nothing() {
        let mut session = session();
        let events = session.click(ClickInput::Screen(Vec2::new(-500.0, -500.0)));
        assert_eq!(
            events,
            vec![Event::SelectionModeChanged {
                mode: SelectionMode::Units(Team::Red),
            }]
        );
    }

    #[test]
    fn rejected_config_fails_to_start() {
        let mut config = MatchConfig::skirmish();
        config.grid.width = 0;
        let error = Session::start(config, SceneLayout::default(), TopDownCamera::default())
            .expect_err("empty grid");
        assert!(error.to_string().contains("could not start"));
    }

    #[test]
    fn end_reports_only_the_teardown() {
        let mut session = session();
        let _ = session.click(ClickInput::Miss);
        assert_eq!(session.end(), vec![Event::MatchEnded]);
    }
}
