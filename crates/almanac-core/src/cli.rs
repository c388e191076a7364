use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use chrono::{Datelike, NaiveDate};
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::ReferenceYear;
use crate::window::MonthDay;

/// A config override as `(key, value)`.
pub type RcOverride = (String, String);

/// Arguments with positional `rc.` overrides pulled out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcSplit {
    pub args: Vec<OsString>,
    pub overrides: Vec<RcOverride>,
}

/// Parses `key=value` or `key:value`.
fn rc_pair(text: &str) -> Option<RcOverride> {
    let (key, value) = text.split_once('=').or_else(|| text.split_once(':'))?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

fn parse_rc_flag(text: &str) -> anyhow::Result<RcOverride> {
    rc_pair(text).ok_or_else(|| anyhow!("expected KEY=VALUE, got: {text}"))
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "almanac",
    version,
    about = "Shows which template categories are in season",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Config override, repeatable.
    #[arg(
        long = "rc",
        value_name = "KEY=VALUE",
        value_parser = clap::builder::ValueParser::new(parse_rc_flag),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<RcOverride>,

    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    #[arg(long = "catalog")]
    pub catalog: Option<PathBuf>,

    /// Evaluate as of this MM-DD instead of the local date.
    #[arg(
        long = "today",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<MonthDay>())
    )]
    pub today: Option<MonthDay>,

    /// Year used for day-count checks.
    #[arg(long = "year")]
    pub year: Option<i32>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Activation of every category.
    Status {
        #[arg(long)]
        json: bool,
    },
    /// List calendar and data problems.
    Check,
    /// Preview a date range before saving it.
    Preview {
        start: String,
        end: String,
        #[arg(long)]
        id: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Templates visible today, in display order.
    Templates {
        #[arg(long)]
        json: bool,
    },
}

impl Command {
    /// Maps the `default.command` setting to a command.
    pub fn from_name(name: &str) -> anyhow::Result<Self> {
        match name.trim() {
            "status" => Ok(Command::Status { json: false }),
            "check" => Ok(Command::Check),
            "templates" => Ok(Command::Templates { json: false }),
            other => Err(anyhow!("unknown default.command: {other}")),
        }
    }
}

/// The day and reference year a command is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub today: MonthDay,
    pub reference_year: i32,
}

impl Evaluation {
    pub fn resolve(
        today: Option<MonthDay>,
        year: Option<i32>,
        configured: ReferenceYear,
        clock_date: NaiveDate,
    ) -> Self {
        let today = today.unwrap_or_else(|| {
            MonthDay::new(clock_date.month() as u8, clock_date.day() as u8)
        });
        let reference_year = match (year, configured) {
            (Some(year), _) => year,
            (None, ReferenceYear::Fixed(year)) => year,
            (None, ReferenceYear::Today) => clock_date.year(),
        };
        debug!(today = %today, reference_year, "resolved evaluation date");
        Self {
            today,
            reference_year,
        }
    }
}

/// Filter used when `RUST_LOG` is unset. Quiet flags win over verbose ones.
fn log_level(verbose: u8, quiet: u8) -> &'static str {
    match (quiet, verbose) {
        (2.., _) => "error",
        (1, _) | (0, 0) => "warn",
        (0, 1) => "info",
        (0, 2) => "debug",
        (0, _) => "trace",
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level(verbose, quiet)))
        .map_err(|e| anyhow!("invalid RUST_LOG filter: {e}"))?;

    // Tests run several invocations in one process.
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init()
    {
        debug!(error = %err, "tracing already initialized");
    }
    Ok(())
}

/// Moves positional `rc.key=value` and `rc.key:value` tokens out of the
/// argument list so clap never sees them. The program name is kept as is.
#[tracing::instrument(skip_all, fields(count = raw.len()))]
pub fn split_rc_tokens(raw: &[OsString]) -> RcSplit {
    let mut split = RcSplit {
        args: Vec::with_capacity(raw.len()),
        overrides: Vec::new(),
    };

    for (idx, arg) in raw.iter().enumerate() {
        let captured = if idx == 0 {
            None
        } else {
            arg.to_str()
                .and_then(|text| text.strip_prefix("rc."))
                .and_then(rc_pair)
        };
        match captured {
            Some(pair) => {
                debug!(key = %pair.0, value = %pair.1, "positional rc override");
                split.overrides.push(pair);
            }
            None => split.args.push(arg.clone()),
        }
    }
    split
}
