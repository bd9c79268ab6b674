use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use collage_layout::{
    Board, CanvasSize, InteractionTrace, LayoutConfig, Piece, PieceContent, PieceKind, Rect,
    read_image_file,
};
use serde::Serialize;

use crate::error::{CliError, Result};

#[derive(Debug, Parser)]
#[command(
    name = "collage",
    about = "Replay collage interaction traces and run the layout pipeline",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a recorded interaction trace on a fresh board.
    Replay(ReplayArgs),

    /// Insert pieces in order through placement and resolution.
    Place(PlaceArgs),

    /// Print the data URL image reference for an image file.
    #[command(name = "data-url")]
    DataUrl(DataUrlArgs),
}

/// Options shared by commands that build a board.
#[derive(Debug, Clone, Default, Args)]
pub struct BoardArgs {
    /// Layout config file (TOML, or JSON with a `.json` extension).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Canvas bound for spawned pieces: `square`, `landscape`, `portrait`, or `WxH`.
    #[arg(long, value_parser = parse_canvas)]
    pub canvas: Option<CanvasSize>,

    /// Disable grid snapping.
    #[arg(long)]
    pub no_snap: bool,

    /// Emit the final layout as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// Trace file (JSON).
    pub trace: PathBuf,

    #[command(flatten)]
    pub board: BoardArgs,
}

#[derive(Debug, Clone, Args)]
pub struct PlaceArgs {
    /// Piece as `WxH` (spawned) or `WxH@X,Y` (explicit position). Repeatable.
    #[arg(long = "piece", required = true)]
    pub pieces: Vec<PieceSpec>,

    /// Fill color for placed pieces.
    #[arg(long, default_value = "#cccccc")]
    pub color: String,

    #[command(flatten)]
    pub board: BoardArgs,
}

#[derive(Debug, Clone, Args)]
pub struct DataUrlArgs {
    /// PNG, JPEG, GIF, or WebP file.
    pub image: PathBuf,
}

/// Size plus optional position for `place`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSpec {
    pub width: u32,
    pub height: u32,
    pub at: Option<(u32, u32)>,
}

impl FromStr for PieceSpec {
    type Err = CliError;

    fn from_str(raw: &str) -> Result<Self> {
        let (size, at) = match raw.split_once('@') {
            Some((size, at)) => (size, Some(at)),
            None => (raw, None),
        };
        let (width, height) = size
            .split_once(['x', 'X'])
            .ok_or_else(|| CliError::invalid_spec(raw, "expected WxH"))?;
        let width = parse_dimension(raw, width, "width")?;
        let height = parse_dimension(raw, height, "height")?;
        if width == 0 || height == 0 {
            return Err(CliError::invalid_spec(raw, "width and height must be non-zero"));
        }

        let at = match at {
            Some(at) => {
                let (x, y) = at
                    .split_once(',')
                    .ok_or_else(|| CliError::invalid_spec(raw, "expected @X,Y"))?;
                Some((parse_dimension(raw, x, "x")?, parse_dimension(raw, y, "y")?))
            }
            None => None,
        };

        Ok(Self { width, height, at })
    }
}

fn parse_canvas(raw: &str) -> std::result::Result<CanvasSize, String> {
    if let Some(preset) = CanvasSize::preset(raw) {
        return Ok(preset);
    }
    let (width, height) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected square, landscape, portrait, or WxH, got `{raw}`"))?;
    let extent = |value: &str| value.trim().parse::<u32>().ok().filter(|&v| v > 0);
    match (extent(width), extent(height)) {
        (Some(width), Some(height)) => Ok(CanvasSize::new(width, height)),
        _ => Err(format!("invalid canvas size `{raw}`")),
    }
}

fn parse_dimension(spec: &str, value: &str, field: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::invalid_spec(spec, format!("invalid {field} `{value}`")))
}

/// Final layout as printed by `replay` and `place`.
#[derive(Debug, Serialize)]
pub struct LayoutReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_checksum: Option<u64>,
    pub snap_enabled: bool,
    pub pieces: &'a [Piece],
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}

pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Commands::Replay(args) => run_replay(&args, out),
        Commands::Place(args) => run_place(&args, out),
        Commands::DataUrl(args) => {
            let image = read_image_file(&args.image)?;
            writeln!(out, "{}", image.as_str()).map_err(CliError::Output)
        }
    }
}

fn run_replay(args: &ReplayArgs, out: &mut impl Write) -> Result<()> {
    let raw = std::fs::read_to_string(&args.trace).map_err(|source| CliError::Io {
        path: args.trace.clone(),
        source,
    })?;
    let trace: InteractionTrace = serde_json::from_str(&raw)?;
    let mut board = board_from_args(&args.board)?;
    let replay = trace.replay(&mut board)?;
    tracing::info!(
        target: "collage.cli",
        entries = replay.outcomes.len(),
        pieces = replay.pieces.len(),
        "trace replayed"
    );
    write_layout(
        out,
        &LayoutReport {
            trace_checksum: Some(replay.trace_checksum),
            snap_enabled: board.rules().grid.is_enabled(),
            pieces: board.pieces(),
        },
        args.board.json,
    )
}

fn run_place(args: &PlaceArgs, out: &mut impl Write) -> Result<()> {
    let mut board = board_from_args(&args.board)?;
    for spec in &args.pieces {
        let content = PieceContent::color(args.color.clone());
        let insertion = match spec.at {
            Some((x, y)) => board.add_piece_at(content, Rect::new(x, y, spec.width, spec.height)),
            None => board.add_piece(content, spec.width, spec.height),
        }
        .ok_or(CliError::IdSpaceExhausted)?;
        if insertion.placement_exhausted || !insertion.resolve.converged {
            tracing::warn!(
                target: "collage.cli",
                piece = insertion.id.get(),
                placement_exhausted = insertion.placement_exhausted,
                converged = insertion.resolve.converged,
                "layout left unresolved overlaps"
            );
        }
    }
    write_layout(
        out,
        &LayoutReport {
            trace_checksum: None,
            snap_enabled: board.rules().grid.is_enabled(),
            pieces: board.pieces(),
        },
        args.board.json,
    )
}

fn board_from_args(args: &BoardArgs) -> Result<Board> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => LayoutConfig::default(),
    };
    if let Some(canvas) = args.canvas {
        config.canvas = canvas;
    }
    let mut board = Board::new(config);
    if args.no_snap {
        board.set_snap_enabled(false);
    }
    Ok(board)
}

fn load_config(path: &Path) -> Result<LayoutConfig> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        LayoutConfig::from_json_file(path)?
    } else {
        LayoutConfig::from_toml_file(path)?
    };
    Ok(config)
}

fn write_layout(out: &mut impl Write, report: &LayoutReport<'_>, json: bool) -> Result<()> {
    if json {
        let encoded = serde_json::to_string_pretty(report)?;
        return writeln!(out, "{encoded}").map_err(CliError::Output);
    }

    if let Some(checksum) = report.trace_checksum {
        writeln!(out, "trace checksum {checksum:#018x}").map_err(CliError::Output)?;
    }
    for piece in report.pieces {
        let kind = match piece.kind() {
            PieceKind::Image => "image",
            PieceKind::Color => "color",
        };
        writeln!(
            out,
            "{}\t{kind}\tx={} y={} w={} h={}",
            piece.id,
            piece.left(),
            piece.top(),
            piece.width(),
            piece.height()
        )
        .map_err(CliError::Output)?;
    }
    Ok(())
}
