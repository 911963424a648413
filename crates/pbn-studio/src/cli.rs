use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pbn_canvas::{CanvasConfig, Difficulty};

/// Headless paint-by-numbers studio.
///
/// Loads paintings, replays pointer scripts against them, exports PNG frames
/// and keeps progress in a JSON store file.
#[derive(Parser, Debug)]
#[command(name = "pbn-studio", version)]
pub struct Cli {
    /// More log output (-v debug, -vv trace). `RUST_LOG` applies otherwise.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a painting to PNG.
    Render {
        /// Painting JSON file. The built-in demo painting when omitted.
        #[arg(short, long, value_name = "FILE")]
        painting: Option<PathBuf>,

        #[arg(short, long, value_name = "FILE.png")]
        output: PathBuf,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Send an image through a processor and write the resulting painting.
    ///
    /// The processor reads its answer from `--result`, standing in for the
    /// remote service.
    Process {
        /// Source photo.
        #[arg(short, long, value_name = "FILE", required_unless_present = "board", conflicts_with = "board")]
        image: Option<PathBuf>,

        /// Start from a catalog board instead of a photo (see `boards`).
        #[arg(short, long, value_name = "ID")]
        board: Option<String>,

        /// Painting JSON the processor answers with.
        #[arg(short, long, value_name = "FILE")]
        result: PathBuf,

        /// Give up on the processor after this many milliseconds.
        #[arg(long, default_value_t = 30_000, value_name = "MS")]
        timeout_ms: u64,

        /// Where to write the painting JSON.
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Replay a pointer script against a painting.
    Replay {
        /// Painting JSON file. The built-in demo painting when omitted.
        #[arg(short, long, value_name = "FILE")]
        painting: Option<PathBuf>,

        /// Script JSON: a list of steps such as `{"select": 2}`,
        /// `{"down": {"x": 50, "y": 50}}`, `"up"`, `"frame"`.
        #[arg(short, long, value_name = "FILE")]
        script: PathBuf,

        /// Write the final frame here.
        #[arg(short, long, value_name = "FILE.png")]
        output: Option<PathBuf>,

        #[command(flatten)]
        save: SaveArgs,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// List the built-in board catalog.
    Boards {
        #[arg(long, value_name = "ID")]
        category: Option<String>,

        /// Case-insensitive title search.
        #[arg(long, value_name = "TEXT")]
        search: Option<String>,

        /// easy, medium or hard.
        #[arg(long, value_name = "LEVEL")]
        difficulty: Option<Difficulty>,
    },

    /// List saved paintings, most recently updated first.
    List {
        #[arg(long, value_name = "FILE")]
        store: PathBuf,

        #[arg(long, value_name = "ID")]
        user: Option<String>,
    },

    /// Process the demo painting, paint every region of its first color and render it.
    Demo {
        #[arg(short, long, value_name = "FILE.png")]
        output: PathBuf,

        /// Simulated processing latency.
        #[arg(long, default_value_t = 0, value_name = "MS")]
        delay_ms: u64,

        #[arg(long, default_value_t = 30_000, value_name = "MS")]
        timeout_ms: u64,

        #[command(flatten)]
        view: ViewArgs,
    },
}

/// Display options shared by commands that draw.
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Hide region numbers.
    #[arg(long)]
    pub no_numbers: bool,

    /// Brush diameter in pixels (1–50).
    #[arg(long, default_value_t = 10.0, value_name = "PX")]
    pub brush_size: f32,

    /// TrueType/OpenType font for numbers. A system font is tried otherwise.
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,
}

impl ViewArgs {
    pub fn canvas_config(&self) -> CanvasConfig {
        CanvasConfig::default()
            .show_numbers(!self.no_numbers)
            .brush_size(self.brush_size)
    }
}

/// Where and as whom to save progress.
#[derive(Args, Debug, Clone)]
pub struct SaveArgs {
    /// Store file to save progress into.
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Signed-in user id. Saving requires one.
    #[arg(long, value_name = "ID")]
    pub user: Option<String>,

    /// Title for a new painting. Renames the painting when resuming.
    #[arg(long)]
    pub title: Option<String>,

    /// Resume this saved painting: replay starts from its stored progress
    /// and the result is written back to it.
    #[arg(long, value_name = "UUID")]
    pub painting_id: Option<String>,
}
