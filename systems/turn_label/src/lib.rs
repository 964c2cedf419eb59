#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that keeps a human-readable turn banner in sync with the world.

use tactics_core::Event;

/// Text shown to players announcing whose turn it is or who won.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnLabel {
    text: String,
}

impl TurnLabel {
    /// Creates an empty label.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Current label text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Updates the label from world events, returning whether the text changed.
    pub fn handle(&mut self, events: &[Event]) -> bool {
        let mut changed = false;
        for event in events {
            let text = match event {
                Event::MatchStarted { team, .. } | Event::TurnChanged { team } => {
                    format!("Turn: {team}")
                }
                Event::GameOver { winner } => format!("{winner} has won!"),
                Event::MatchEnded => String::new(),
                _ => continue,
            };
            if text != self.text {
                self.text = text;
                changed = true;
            }
        }
        changed
    }
}
