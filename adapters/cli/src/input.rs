//! Parsing of scripted click lines.

use glam::Vec2;
use tactics_core::TileCoord;
use thiserror::Error;

/// Single click read from the script.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ClickInput {
    /// Screen position in pixels.
    Screen(Vec2),
    /// Centre of the tile on screen.
    Tile(TileCoord),
    /// A click that lands on nothing clickable.
    Miss,
}

/// Reasons a script line could not be understood.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum InputError {
    #[error("expected `x y`, `tile x y` or `miss`, found `{0}`")]
    Unrecognized(String),
    #[error("`{0}` is not a valid coordinate")]
    InvalidNumber(String),
}

/// Parses one script line. Blank lines and `#` comments yield `Ok(None)`.
pub(crate) fn parse_line(line: &str) -> Result<Option<ClickInput>, InputError> {
    let line = line.split('#').next().unwrap_or_default().trim();
    if line.is_empty() {
        return Ok(None);
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    let click = match words.as_slice() {
        ["miss"] => ClickInput::Miss,
        ["tile", x, y] => ClickInput::Tile(TileCoord::new(number(x)?, number(y)?)),
        [x, y] => ClickInput::Screen(Vec2::new(number(x)?, number(y)?)),
        _ => return Err(InputError::Unrecognized(line.to_owned())),
    };
    Ok(Some(click))
}

fn number<T: std::str::FromStr>(word: &str) -> Result<T, InputError> {
    word.parse()
        .map_err(|_| InputError::InvalidNumber(word.to_owned()))
}
