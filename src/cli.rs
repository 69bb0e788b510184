use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{debug, trace};

use crate::error::Result;
use crate::tools::clean::{normalize, CleanOptions};
use crate::tools::plot::{ConfusionMatrix, NumberFormat, Palette, PlotOptions};
use crate::tools::repair::repair_text;

#[derive(Parser)]
#[command(name = "textmend", version, about = "Repair and normalize text, plot confusion matrices")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize every line of the input; prints a JSON array
    Clean(CleanArgs),
    /// Repair the input without flattening it; prints a JSON string
    Repair(RepairArgs),
    /// Render a confusion matrix given as JSON to SVG
    Plot(PlotArgs),
}

#[derive(Args)]
struct CleanArgs {
    /// Input file, or `-` for stdin
    input: String,
    /// Keep only ASCII characters
    #[arg(long)]
    ascii: bool,
    /// JSON file with clean options
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct RepairArgs {
    /// Input file, or `-` for stdin
    input: String,
    /// JSON file with clean options; only `repair` is used
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct PlotArgs {
    /// JSON file `{"matrix": [[..]], "labels": [..]}`, or `-` for stdin
    input: String,
    /// Write the SVG here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Cell number format: d, .Nf or .N%
    #[arg(long, default_value = ".2f")]
    format: NumberFormat,
    #[arg(long, default_value = "Confusion matrix")]
    title: String,
    #[arg(long, default_value = "PuBu")]
    palette: Palette,
    /// Figure width in inches
    #[arg(long, default_value_t = 7.0)]
    width: f64,
    /// Figure height in inches
    #[arg(long, default_value_t = 7.0)]
    height: f64,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    match cli.cmd {
        Command::Clean(args) => {
            let mut opts = load_options(args.config.as_deref())?;
            opts.restrict_to_ascii |= args.ascii;
            let input = read_input(&args.input)?;
            let lines = input
                .lines()
                .map(|line| normalize(line, &opts))
                .collect::<Result<Vec<_>>>()?;
            print_json(&lines)
        }
        Command::Repair(args) => {
            let opts = load_options(args.config.as_deref())?;
            let input = read_input(&args.input)?;
            print_json(&repair_text(&input, &opts.repair)?)
        }
        Command::Plot(args) => {
            let cm: ConfusionMatrix = serde_json::from_str(&read_input(&args.input)?)?;
            let opts = PlotOptions {
                fig_size: (args.width, args.height),
                number_format: args.format,
                title: args.title,
                palette: args.palette,
            };
            let svg = cm.render(&opts)?;
            match args.output {
                Some(path) => {
                    std::fs::write(&path, svg)?;
                    debug!(path = %path.display(), "wrote confusion matrix");
                }
                None => print!("{svg}"),
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    // `try_init` so a second call (tests, embedding) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
        .with_target(verbose >= 2)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

fn load_options(path: Option<&Path>) -> Result<CleanOptions> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading clean options");
            Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
        }
        None => Ok(CleanOptions::default()),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(val: &T) -> Result<()> {
    // pretty JSON output
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}
