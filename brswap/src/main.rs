//! brswap CLI
//!
//! Reads a Bril program as JSON and writes it back with every branch
//! swapped. Without a subcommand it takes the `swap` options directly and
//! by default filters stdin to stdout:
//!
//! ```text
//! bril2json < prog.bril | brswap | bril2txt
//! brswap prog.json -o swapped.json --prefix t
//! ```

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use brswap::config::{DEFAULT_INDENT, DEFAULT_MESSAGE, DEFAULT_PREFIX};
use brswap::report::{self, RunSelection};
use brswap::{swap_source, BrswapError, SwapConfig};

#[derive(Parser)]
#[command(name = "brswap")]
#[command(version)]
#[command(about = "Swap the targets of every branch in a Bril program", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    // Used when no subcommand is given
    #[command(flatten)]
    swap: SwapArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Swap branches in a Bril JSON program (the default)
    Swap(SwapArgs),

    /// Summarize benchmark runs as a speedup table
    Report {
        /// `benchmark,run,result` rows (stdin if omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Output file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run to compare against (default: first run in sorted order)
        #[arg(long)]
        baseline: Option<String>,

        /// Run being measured (default: second run in sorted order)
        #[arg(long)]
        ours: Option<String>,

        /// Emit JSON records instead of CSV
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct SwapArgs {
    /// Input Bril JSON file (stdin if omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Output file path (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Prefix for generated variable names
    #[arg(long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Message encoded into the injected constant
    #[arg(long, default_value = DEFAULT_MESSAGE)]
    message: String,

    /// Spaces per indentation level
    #[arg(long, default_value_t = DEFAULT_INDENT)]
    indent: usize,

    /// Print a summary of the rewrite on stderr
    #[arg(long)]
    stats: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Swap(args)) => cmd_swap(args),
        None => cmd_swap(cli.swap),
        Some(Commands::Report {
            file,
            output,
            baseline,
            ours,
            json,
        }) => cmd_report(file, output, RunSelection { baseline, ours }, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries the program
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("{}: could not install logger: {}", "warning".yellow().bold(), e);
    }
}

fn cmd_swap(args: SwapArgs) -> Result<(), BrswapError> {
    let source = read_input(args.file.as_ref())?;
    let config = SwapConfig::new()
        .with_prefix(args.prefix)
        .with_message(args.message)
        .with_indent(args.indent);

    let (json, stats) = swap_source(&source, &config)?;
    write_output(args.output.as_ref(), &json)?;

    if args.stats {
        eprintln!("{} {}", "Swapped".green().bold(), stats);
    }
    Ok(())
}

fn cmd_report(
    file: Option<PathBuf>,
    output: Option<PathBuf>,
    selection: RunSelection,
    json: bool,
) -> Result<(), BrswapError> {
    let source = read_input(file.as_ref())?;
    let rows = report::parse_rows(&source)?;
    let table = report::speedup_table(&rows, &selection)?;

    let rendered = if json {
        report::to_json(&table, DEFAULT_INDENT)?
    } else {
        // to_csv already ends every line
        let mut csv = report::to_csv(&table);
        csv.pop();
        csv
    };
    write_output(output.as_ref(), &rendered)
}

fn read_input(file: Option<&PathBuf>) -> Result<String, BrswapError> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

/// Write `text` plus a trailing newline
fn write_output(output: Option<&PathBuf>, text: &str) -> Result<(), BrswapError> {
    match output {
        Some(path) => fs::write(path, format!("{}\n", text))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", text)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
