//! CLI entrypoint for `logwarden`.
//!
//! Parses command-line arguments, validates the log file, loads it through the
//! library analyzer, prints a terminal summary, and writes the CSV report (and
//! optionally a JSON report).
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use log::{LevelFilter, error, info};
use logwarden::{
    detect::Threshold,
    engine::Analyzer,
    export::DEFAULT_CSV_PATH,
    fields::FieldLayout,
    io::DEFAULT_MMAP_THRESHOLD_BYTES,
    sink::{ConsoleSink, CsvSink, JsonSink, ReportSink},
};

#[derive(Parser, Debug)]
#[command(
    name = "logwarden",
    version,
    about = "Access log analyzer: client counts, top endpoint, failed-login flagging"
)]
struct Args {
    /// Path to the access log file
    log_file: PathBuf,

    /// Flag clients with at least this many failed login attempts
    #[arg(short = 't', long = "threshold", default_value_t = Threshold::default())]
    threshold: Threshold,

    /// Path of the CSV report
    #[arg(short = 'o', long = "output", default_value = DEFAULT_CSV_PATH)]
    output: PathBuf,

    /// Skip writing the CSV report
    #[arg(long = "no-csv")]
    no_csv: bool,

    /// Also write the report as JSON to this path
    #[arg(long = "json")]
    json: Option<PathBuf>,

    /// How fields are located within a line
    #[arg(long = "layout", value_enum, default_value_t = Layout::Positional)]
    layout: Layout,

    /// Override mmap threshold in bytes. If zero, disable mmap.
    #[arg(long = "mmap-threshold", default_value_t = DEFAULT_MMAP_THRESHOLD_BYTES)]
    mmap_threshold: u64,

    /// Run the aggregation passes in parallel
    #[arg(long = "parallel")]
    parallel: bool,

    /// Log counts of blank and short lines encountered during parsing (implies -v)
    #[arg(long = "log-parse-stats")]
    log_parse_stats: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control color output (auto, always, never)
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Suppress summary output (still writes reports)
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Layout {
    /// Whitespace tokens: client at 0, endpoint at 6, status at 8
    Positional,
    /// Common/Combined Log Format
    Combined,
}

impl From<Layout> for FieldLayout {
    fn from(l: Layout) -> Self {
        match l {
            Layout::Positional => FieldLayout::Positional,
            Layout::Combined => FieldLayout::Combined,
        }
    }
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn verify_inputs(args: &Args) -> Result<()> {
    if !args.log_file.exists() {
        bail!("log file not found: {}", args.log_file.display());
    }
    if !args.log_file.is_file() {
        bail!("log file is not a regular file: {}", args.log_file.display());
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    let verbosity = if args.log_parse_stats {
        args.verbose.max(1)
    } else {
        args.verbose
    };
    init_logger(verbosity);
    match args.color {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {}
    }
    if let Err(e) = verify_inputs(&args) {
        error!("{}", e);
        std::process::exit(2);
    }

    let mmap_threshold = if args.mmap_threshold == 0 {
        u64::MAX
    } else {
        args.mmap_threshold
    };
    let analyzer = match Analyzer::from_path(&args.log_file, mmap_threshold) {
        Ok(a) => a
            .with_layout(args.layout.into())
            .with_threshold(args.threshold),
        Err(e) => {
            error!("failed to load {}: {:#}", args.log_file.display(), e);
            std::process::exit(3);
        }
    };
    info!(
        "loaded {} lines from {}",
        analyzer.lines().len(),
        args.log_file.display()
    );

    let report = if args.parallel {
        analyzer.analyze_parallel()
    } else {
        analyzer.analyze()
    };

    if !args.quiet {
        let mut console = ConsoleSink::new(std::io::stdout().lock());
        if let Err(e) = console.emit(&report) {
            error!("failed to print summary: {:#}", e);
            std::process::exit(4);
        }
    }

    if !args.no_csv {
        let mut csv = CsvSink {
            path: args.output.clone(),
        };
        if let Err(e) = csv.emit(&report) {
            error!("failed to write {}: {:#}", args.output.display(), e);
            std::process::exit(5);
        }
        if !args.quiet {
            println!("Results have been saved to {}", args.output.display());
        }
    }

    if let Some(path) = args.json {
        let mut json = JsonSink { path: path.clone() };
        if let Err(e) = json.emit(&report) {
            error!("failed to write {}: {:#}", path.display(), e);
            std::process::exit(6);
        }
    }

    if args.log_parse_stats {
        let stats = report.parse_stats;
        info!(
            "parse stats: total={}, blank={}, unparsed={}, missing_endpoint={}, missing_status={}",
            stats.total_lines,
            stats.blank_lines,
            stats.unparsed_lines,
            stats.missing_endpoint,
            stats.missing_status
        );
    }
}
