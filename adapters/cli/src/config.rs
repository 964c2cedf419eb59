//! Match configuration loading and authoring checks.

use std::{collections::BTreeMap, fmt, fs, path::Path};

use anyhow::{Context, Result};
use tactics_core::{MatchConfig, Team, TileCoord};
use thiserror::Error;

/// Authoring mistake detected in a match configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub(crate) enum ConfigIssue {
    /// The grid needs at least one column and one row.
    #[error("grid size must be positive (received {width}x{height})")]
    NonPositiveGrid { width: u32, height: u32 },
    /// Units must be able to move at least one tile.
    #[error("move range must be positive")]
    NonPositiveMoveRange,
    /// Each team may be listed once.
    #[error("duplicate team {team}; teams should be unique")]
    DuplicateTeam { team: Team },
    /// A team lists the same tile twice.
    #[error("duplicate unit placement for team {team} at {position}")]
    DuplicatePosition { team: Team, position: TileCoord },
    /// Two teams start on the same tile.
    #[error("duplicate unit placement at {position} between teams {first} and {second}")]
    SharedPosition {
        position: TileCoord,
        first: Team,
        second: Team,
    },
    /// A placement lies outside the grid.
    #[error("unit placement for team {team} at {position} is outside the {width}x{height} grid")]
    OutOfBounds {
        team: Team,
        position: TileCoord,
        width: u32,
        height: u32,
    },
}

/// Every issue found in a configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ConfigIssues(pub(crate) Vec<ConfigIssue>);

impl fmt::Display for ConfigIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration has {} issue(s)", self.0.len())?;
        for issue in &self.0 {
            write!(f, "\n  - {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigIssues {}

/// Reads a match configuration from a TOML file.
pub(crate) fn load(path: &Path) -> Result<MatchConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse(&content).with_context(|| format!("failed to load config {}", path.display()))
}

/// Parses a match configuration from TOML text.
pub(crate) fn parse(content: &str) -> Result<MatchConfig> {
    toml::from_str(content).context("failed to parse config TOML")
}

/// Collects every authoring issue in `config`.
pub(crate) fn validate(config: &MatchConfig) -> Result<(), ConfigIssues> {
    let mut issues = Vec::new();
    let grid = config.grid;

    if grid.width == 0 || grid.height == 0 {
        issues.push(ConfigIssue::NonPositiveGrid {
            width: grid.width,
            height: grid.height,
        });
    }
    if config.move_range == 0 {
        issues.push(ConfigIssue::NonPositiveMoveRange);
    }

    let mut teams = Vec::new();
    let mut claimed: BTreeMap<TileCoord, Team> = BTreeMap::new();
    for placement in &config.placements {
        let team = placement.team;
        if teams.contains(&team) {
            issues.push(ConfigIssue::DuplicateTeam { team });
        } else {
            teams.push(team);
        }

        let mut own = Vec::new();
        for position in &placement.positions {
            let position = *position;
            if own.contains(&position) {
                issues.push(ConfigIssue::DuplicatePosition { team, position });
                continue;
            }
            own.push(position);

            match claimed.get(&position) {
                Some(first) if *first != team => issues.push(ConfigIssue::SharedPosition {
                    position,
                    first: *first,
                    second: team,
                }),
                Some(_) => {}
                None => {
                    let _ = claimed.insert(position, team);
                }
            }

            if !grid.contains(position) {
                issues.push(ConfigIssue::OutOfBounds {
                    team,
                    position,
                    width: grid.width,
                    height: grid.height,
                });
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ConfigIssues(issues))
    }
}
