//! Stacktower — stack-the-tower timing arcade game in the terminal.

mod app;
mod background;
mod block;
mod camera;
mod game;
mod highscore;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use highscore::{HighScore, HighScoreStore};
use std::path::{Path, PathBuf};

/// Tuning for one game: world size, block size, speeds and camera easing. World units are
/// abstract pixels; the renderer scales them to the terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub world_width: f32,
    pub world_height: f32,
    pub block_height: f32,
    /// Width of the base block (and so the widest any block can be).
    pub start_width: f32,
    pub initial_speed: f32,
    /// Added to the speed on every successful stack.
    pub speed_increment: f32,
    /// Every this many points the speed gets an extra `difficulty_increment`.
    pub difficulty_step: u32,
    pub difficulty_increment: f32,
    /// Fall speed of trimmed pieces per tick.
    pub drop_speed: f32,
    /// Fraction of the view kept free above the tower.
    pub scroll_margin: f32,
    /// Fraction of the scroll deficit closed per tick.
    pub scroll_smoothing: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_width: 500.0,
            world_height: 700.0,
            block_height: 30.0,
            start_width: 200.0,
            initial_speed: 3.0,
            speed_increment: 0.15,
            difficulty_step: 5,
            difficulty_increment: 0.5,
            drop_speed: 10.0,
            scroll_margin: 0.4,
            scroll_smoothing: 0.1,
        }
    }
}

impl GameConfig {
    pub fn from_args(args: &Args) -> Self {
        let d = Self::default();
        Self {
            start_width: args.start_width.clamp(1.0, d.world_width),
            initial_speed: args.speed.max(0.0),
            ..d
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        log::warn!("theme not loaded: {e}");
        theme::Theme::default()
    });
    let config = GameConfig::from_args(&args);
    log::info!("starting with {config:?}");

    let store_path = args.highscore_file.clone().unwrap_or_else(highscore::default_path);
    let high_score = HighScore::load(HighScoreStore::new(store_path));

    let mut app = App::new(&args, &config, theme, high_score);
    app.run()?;
    Ok(())
}

/// Log to `path` when given (stderr belongs to the TUI); otherwise logging stays off unless
/// RUST_LOG asks for it.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let default_filter = if path.is_some() { "info" } else { "off" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if let Some(path) = path {
        let file = std::fs::File::create(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

/// Stack-the-tower arcade game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "stacktower",
    version,
    about = "Stack-the-tower timing game in the terminal. Drop each sliding block onto the tower; overhangs are cut off.",
    long_about = "Stacktower is a terminal take on the classic stacking arcade game.\n\n\
        A block slides back and forth above the tower. Press Space to drop it: the part that \
        hangs over the block below is cut away and the next block is that much narrower. \
        Miss the tower completely and the game is over.\n\n\
        CONTROLS:\n  Space/Enter  Stack    R  Restart (after game over)\n  P            Pause    Q / Esc  Quit"
)]
pub struct Args {
    /// Game ticks (and frames) per second. Block speed is per tick.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub fps: f64,

    /// Width of the base block in world units (the world is 500 wide).
    #[arg(long, default_value = "200.0", value_name = "UNITS")]
    pub start_width: f32,

    /// Starting block speed in world units per tick.
    #[arg(long, default_value = "3.0", value_name = "UNITS")]
    pub speed: f32,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// High score file. Defaults to $XDG_CONFIG_HOME/stacktower/highscore.
    #[arg(long, value_name = "FILE")]
    pub highscore_file: Option<PathBuf>,

    /// Plain-text art drawn behind the tower. Ignored if missing.
    #[arg(short, long, value_name = "FILE")]
    pub background: Option<PathBuf>,

    /// Disable the game-over fade-in.
    #[arg(long)]
    pub no_animation: bool,

    /// Write logs to this file (filter with RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
