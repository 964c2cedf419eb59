#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a tactics match from scripted clicks.

mod board;
mod config;
mod input;
mod session;

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use tactics_core::MatchConfig;
use tactics_rendering::{RenderingBackend, SceneLayout, TopDownCamera};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{board::AsciiBackend, session::Session};

/// Banner printed before the first board.
const WELCOME_BANNER: &str = "Welcome to Tactics.";

/// Plays a turn-based tactics match driven by click lines.
#[derive(Debug, Parser)]
#[command(name = "tactics", version)]
struct Args {
    /// Match configuration in TOML; defaults to the four by four skirmish.
    #[arg(long)]
    config: Option<PathBuf>,
    /// File of click lines; standard input is read when omitted.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Screen size used to turn pixels into picking rays.
    #[arg(long, default_value = "640x480", value_parser = parse_viewport)]
    viewport: Vec2,
    /// Pixels per world unit of the top-down camera.
    #[arg(long, default_value_t = 48.0)]
    pixels_per_unit: f32,
}

/// Entry point for the tactics command-line interface.
fn main() -> Result<()> {
    setup_logging();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => config::load(path)?,
        None => MatchConfig::skirmish(),
    };
    config::validate(&config).context("invalid match configuration")?;

    let camera = TopDownCamera::new(10.0, args.viewport, args.pixels_per_unit)
        .context("invalid camera settings")?;
    println!("{WELCOME_BANNER}");
    let mut session = Session::start(config, SceneLayout::default(), camera)?;
    let mut backend = AsciiBackend::new(io::stdout().lock());

    if let Some(frame) = session.presentation() {
        backend.present(&frame)?;
    }

    let reader: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    for (number, line) in reader.lines().enumerate() {
        let line = line.context("failed to read click line")?;
        let click = match input::parse_line(&line) {
            Ok(Some(click)) => click,
            Ok(None) => continue,
            Err(error) => {
                warn!(line = number + 1, %error, "skipping click line");
                continue;
            }
        };

        let _ = session.click(click);
        if let Some(frame) = session.presentation() {
            backend.present(&frame)?;
        }
    }

    let _ = session.end();
    Ok(())
}

fn setup_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

fn parse_viewport(value: &str) -> Result<Vec2, String> {
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, found `{value}`"))?;
    let parse = |axis: &str| {
        axis.trim()
            .parse::<f32>()
            .map_err(|error| format!("`{axis}` is not a valid size: {error}"))
    };
    Ok(Vec2::new(parse(width)?, parse(height)?))
}
