mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use weekgrid_core::config::Config;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "weekgrid",
    version,
    about = "Weekly planning grid: inspect and edit mailer task assignments"
)]
struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    quiet: u8,

    /// Configuration overrides, e.g. --rc backend.url=http://host:3000
    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    rc_overrides: Vec<KeyVal>,

    /// Use this rc file instead of ~/.weekgridrc / $WEEKGRID_RC
    #[arg(long = "weekgridrc")]
    weekgridrc: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Print the current and next week grids
    Show,
    /// List the quick-assign presets
    Presets,
    /// Assign a task code (or a preset) to a rectangle of cells
    Assign {
        /// "current" or "next"
        #[arg(long, default_value = "current")]
        week: String,
        /// Resource (mailer) name or id at one corner of the rectangle
        #[arg(long)]
        resource: String,
        /// Opposite corner's resource; defaults to --resource (one row)
        #[arg(long)]
        to_resource: Option<String>,
        /// Day or day range, e.g. "mon", "mon-wed", "0-4"
        #[arg(long)]
        days: String,
        /// Apply a preset by label instead of a literal task code
        #[arg(long, conflicts_with = "code")]
        preset: Option<String>,
        /// Literal task code to write into each cell
        code: Option<String>,
    },
    /// Delete the assignments in a rectangle of cells
    Clear {
        #[arg(long, default_value = "current")]
        week: String,
        #[arg(long)]
        resource: String,
        #[arg(long)]
        to_resource: Option<String>,
        #[arg(long)]
        days: String,
        /// Confirm the deletion; without this flag nothing is sent
        #[arg(long)]
        yes: bool,
    },
    /// Copy one cell's assignment onto other cells
    Copy {
        #[arg(long, default_value = "current")]
        week: String,
        /// Source resource name or id
        #[arg(long)]
        from: String,
        /// Source day, e.g. "mon" or "0"
        #[arg(long)]
        day: String,
        /// Target resource name or id
        #[arg(long)]
        to: String,
        /// Target day or day range
        #[arg(long)]
        to_days: String,
    },
}

fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

fn run() -> anyhow::Result<()> {
    let cli = GlobalCli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    info!(verbose = cli.verbose, quiet = cli.quiet, "starting weekgrid CLI");

    let mut cfg = Config::load(cli.weekgridrc.as_deref())?;
    cfg.apply_overrides(
        cli.rc_overrides
            .into_iter()
            .map(|kv| (kv.key, kv.value)),
    );

    commands::dispatch(&cfg, cli.command)?;

    info!("done");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
