use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "doppelshade",
    author,
    version,
    about = "Procedural shader effects bound to windows",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Stage file describing the surfaces to open. Defaults to `stage.toml`
    /// in the config directory when present.
    #[arg(long, value_name = "FILE", conflicts_with = "effect")]
    pub stage: Option<PathBuf>,

    /// Open a single window running this effect instead of a stage.
    #[arg(long, value_name = "NAME")]
    pub effect: Option<String>,

    /// Logical size of the single window (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every registered effect.
    ListEffects(ListArgs),
    /// Render one frame on the CPU and write it as a PNG.
    Render(RenderArgs),
    /// Print the resolved config directory and stage file.
    Where,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit the registry as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Effect token; unknown tokens render the default effect.
    #[arg(long, value_name = "NAME")]
    pub effect: String,

    /// Logical surface size.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: (u32, u32),

    /// Seconds since the instance was created.
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    pub time: f64,

    /// Device pixel ratio applied to the logical size.
    #[arg(long, value_name = "RATIO", default_value_t = 1.0)]
    pub dpr: f64,

    /// Destination PNG path.
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    if width == 0 || height == 0 {
        return Err("size must be greater than zero".into());
    }
    Ok((width, height))
}
