//! Binary entry point for the shardsim harness.
#![forbid(unsafe_code)]

use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use shardsim::{
    config::{RunConfig, StrategyKind},
    gen::{GenConfig, GenSummary, LogGenerator},
    metrics::default_output_name,
    stream::{EventReader, RunSummary, StreamProcessor},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "shardsim",
    version,
    about = "Replay-driven evaluation harness for dynamic graph partitioning strategies",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for run reports"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay an event log and write the metrics stream.
    Replay(ReplayCmd),
    /// Generate a synthetic event log.
    Generate(GenerateCmd),
}

#[derive(Args, Debug)]
struct ReplayCmd {
    #[arg(value_name = "LOG", help = "Event log to replay")]
    log: PathBuf,

    #[arg(
        long,
        value_name = "FILE",
        help = "Metrics output path (defaults to the conventional evolution file name)"
    )]
    output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        default_value = ".",
        help = "Directory for the default-named metrics file"
    )]
    output_dir: PathBuf,

    #[arg(long, short = 'p', default_value_t = 4, help = "Number of partitions")]
    partitions: u32,

    #[arg(
        long,
        default_value_t = 1_000,
        help = "Time units between POINT metric flushes"
    )]
    period: u64,

    #[arg(
        long,
        value_enum,
        default_value_t = StrategyArg::Hash,
        help = "Partitioning strategy"
    )]
    strategy: StrategyArg,

    #[arg(long, help = "Locality trigger window (block boundaries)")]
    window: Option<usize>,

    #[arg(long, help = "Locality cross-rate trigger threshold in [0,1]")]
    cross_threshold: Option<f64>,

    #[arg(long, help = "Locality repartition cooldown (time units)")]
    cooldown: Option<u64>,

    #[arg(long, help = "Offline repartition interval (time units)")]
    interval: Option<u64>,
}

#[derive(Args, Debug)]
struct GenerateCmd {
    #[arg(value_name = "OUT", help = "Path of the log to write")]
    out: PathBuf,

    #[arg(long, default_value_t = 100, help = "Account id space size")]
    accounts: u64,

    #[arg(long, default_value_t = 50, help = "Block boundaries to emit")]
    blocks: u64,

    #[arg(long, default_value_t = 20, help = "Transactions per block")]
    tx_per_block: u64,

    #[arg(long, default_value_t = 4, help = "Maximum calls per transaction")]
    max_calls: u64,

    #[arg(long, default_value_t = 100, help = "Timestamp step between blocks")]
    timestamp_step: u64,

    #[arg(long, default_value_t = 0xC0FFEE, help = "Generator seed")]
    seed: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Hash,
    Locality,
    Offline,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Hash => StrategyKind::Hash,
            StrategyArg::Locality => StrategyKind::Locality,
            StrategyArg::Offline => StrategyKind::Offline,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shardsim=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Replay(cmd) => {
            let summary = run_replay(&cmd)?;
            emit(&cli.format, &summary, print_replay_text)?;
        }
        Command::Generate(cmd) => {
            let summary = run_generate(&cmd)?;
            emit(&cli.format, &summary, print_generate_text)?;
        }
    }
    Ok(())
}

fn build_config(cmd: &ReplayCmd) -> RunConfig {
    let mut cfg = RunConfig::new(cmd.partitions, cmd.period, cmd.strategy.into());
    if let Some(window) = cmd.window {
        cfg.locality.window = window;
    }
    if let Some(threshold) = cmd.cross_threshold {
        cfg.locality.cross_threshold = threshold;
    }
    if let Some(cooldown) = cmd.cooldown {
        cfg.locality.cooldown = cooldown;
    }
    if let Some(interval) = cmd.interval {
        cfg.offline.interval = interval;
    }
    cfg
}

fn run_replay(cmd: &ReplayCmd) -> Result<RunSummary, Box<dyn Error>> {
    let cfg = build_config(cmd);
    cfg.validate()?;

    let input = BufReader::new(File::open(&cmd.log)?);
    let output_path = cmd.output.clone().unwrap_or_else(|| {
        cmd.output_dir.join(default_output_name(
            cfg.nparts,
            cfg.log_period,
            &cfg.strategy.to_string(),
        ))
    });
    let output = BufWriter::new(File::create(&output_path)?);

    let mut processor = StreamProcessor::new(cfg, output);
    let summary = processor.run(EventReader::new(input))?;
    Ok(summary)
}

fn run_generate(cmd: &GenerateCmd) -> Result<GenSummary, Box<dyn Error>> {
    let cfg = GenConfig {
        accounts: cmd.accounts,
        blocks: cmd.blocks,
        txs_per_block: cmd.tx_per_block,
        max_calls_per_tx: cmd.max_calls,
        timestamp_step: cmd.timestamp_step,
        ..GenConfig::default()
    };
    let mut out = BufWriter::new(File::create(&cmd.out)?);
    let summary = LogGenerator::new(cmd.seed).write_log(&mut out, &cfg)?;
    Ok(summary)
}

fn emit<T, F>(format: &OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: serde::Serialize,
    F: Fn(&T),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(value),
    }
    Ok(())
}

fn print_replay_text(summary: &RunSummary) {
    println!(
        "strategy={} partitions={} events={}",
        summary.strategy, summary.partitions, summary.events
    );
    println!(
        "vertices={} edges={} repartitions={} points={}",
        summary.vertices, summary.edges, summary.repartitions, summary.points
    );
    println!(
        "edge_access total={} cross={} rate={:.4}",
        summary.total_edge_access,
        summary.cross_edge_access,
        summary.cross_access_rate()
    );
    let balance: Vec<String> = summary.balance.iter().map(u64::to_string).collect();
    println!("balance={}", balance.join(" "));
}

fn print_generate_text(summary: &GenSummary) {
    println!(
        "lines={} blocks={} transactions={} accounts={}",
        summary.lines, summary.blocks, summary.transactions, summary.accounts
    );
}
