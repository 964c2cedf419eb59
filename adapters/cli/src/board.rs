//! Text rendering backend that prints the label and the board.

use std::io::Write;

use anyhow::Result as AnyResult;
use tactics_core::{Team, TileCoord};
use tactics_rendering::{Presentation, RenderingBackend, Scene};

/// Backend drawing each frame as a block of characters.
///
/// Tiles are `.` or `*` when highlighted. Units use the first letter of
/// their team, lowercase while highlighted. Row zero is printed first.
#[derive(Debug)]
pub(crate) struct AsciiBackend<W> {
    out: W,
}

impl<W: Write> AsciiBackend<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for AsciiBackend<W> {
    fn present(&mut self, presentation: &Presentation) -> AnyResult<()> {
        if !presentation.label.is_empty() {
            writeln!(self.out, "{}", presentation.label)?;
        }
        for line in draw(&presentation.scene) {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

fn draw(scene: &Scene) -> Vec<String> {
    (0..scene.rows)
        .map(|y| {
            (0..scene.columns)
                .map(|x| glyph(scene, TileCoord::new(x, y)))
                .map(String::from)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn glyph(scene: &Scene, coord: TileCoord) -> char {
    if let Some(unit) = scene.units.iter().find(|unit| unit.tile == coord) {
        let letter = team_letter(unit.team);
        return if unit.highlighted {
            letter.to_ascii_lowercase()
        } else {
            letter
        };
    }

    let highlighted = scene
        .tiles
        .iter()
        .any(|tile| tile.coord == coord && tile.highlighted);
    if highlighted {
        '*'
    } else {
        '.'
    }
}

const fn team_letter(team: Team) -> char {
    match team {
        Team::Red => 'R',
        Team::Blue => 'B',
        Team::Green => 'G',
        Team::Yellow => 'Y',
    }
}

#[cfg(test)]
mod tests {
    use tactics_core::UnitId;
    use tactics_rendering::{SceneLayout, SceneTile, SceneUnit};

    use super::*;

    #[test]
    fn draws_units_and_highlights() {
        let tiles = [(0, 0, false), (1, 0, true), (0, 1, false), (1, 1, false)]
            .into_iter()
            .map(|(x, y, highlighted)| SceneTile {
                coord: TileCoord::new(x, y),
                highlighted,
            })
            .collect();
        let units = vec![
            SceneUnit {
                id: UnitId::new(0),
                team: Team::Red,
                tile: TileCoord::new(0, 0),
                highlighted: true,
            },
            SceneUnit {
                id: UnitId::new(1),
                team: Team::Blue,
                tile: TileCoord::new(1, 1),
                highlighted: false,
            },
        ];
        let scene = Scene::new(2, 2, SceneLayout::default(), tiles, units);

        let mut backend = AsciiBackend::new(Vec::new());
        backend
            .present(&Presentation::new("Turn: Red", scene))
            .expect("write to memory");
        let text = String::from_utf8(backend.into_inner()).expect("utf8");

        assert_eq!(text, "Turn: Red\nr *\n. B\n");
    }
}
