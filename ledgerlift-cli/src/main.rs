use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledgerlift_core::{ParsedStatement, TransactionType};
use ledgerlift_ingest::parse_statement;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(name = "ledgerlift", version, about = "Bank statement spreadsheet ingestion")]
struct Cli {
    /// Log every inference decision to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement export (.xlsx, .xls or .csv)
    Parse {
        file: PathBuf,

        /// Currency code attached to the summary (default from config.toml)
        #[arg(long)]
        currency: Option<String>,

        /// Skip rows without a parseable date
        #[arg(long)]
        strict: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Limit number of transactions printed (default: 20)
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Show the detected header row and column roles
    Columns { file: PathBuf },

    /// Manage ~/.ledgerlift/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Parse {
            file,
            currency,
            strict,
            json,
            limit,
        } => {
            let cfg = config::load_config()?;
            let parsed = parse_file(&file, &cfg, currency, strict)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            } else {
                print_summary(&file, &parsed, limit);
            }
        }

        Command::Columns { file } => {
            let cfg = config::load_config()?;
            let parsed = parse_file(&file, &cfg, None, false)?;
            println!("Header row: {}", parsed.header_row_index + 1);
            for (i, column) in parsed.columns.iter().enumerate() {
                println!("{:>3}  {:<32} {:?}", i + 1, column.label, column.role);
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => match config::init_config()? {
                (path, true) => println!("Wrote {}", path.display()),
                (path, false) => println!("Config already exists: {}", path.display()),
            },
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn parse_file(
    file: &Path,
    cfg: &config::Config,
    currency: Option<String>,
    strict: bool,
) -> Result<ParsedStatement> {
    let bytes = state::read_statement(file, cfg.ingest.max_file_bytes)?;
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("file name is not valid UTF-8")?;
    let options = cfg.parse_options(currency, strict);
    debug!(filename, bytes = bytes.len(), ?options, "parsing statement file");

    parse_statement(&bytes, filename, &options).with_context(|| format!("parsing {}", file.display()))
}

fn print_summary(file: &Path, parsed: &ParsedStatement, limit: usize) {
    let s = &parsed.statement;
    println!("Parsed {} transactions from {}", s.transaction_count, file.display());
    println!(
        "Skipped rows: {} | blank rows: {} | header row: {}\n",
        parsed.skipped_row_count,
        parsed.blank_row_count,
        parsed.header_row_index + 1
    );

    match (s.period_start, s.period_end) {
        (Some(start), Some(end)) => println!("Period:   {start} .. {end}"),
        _ => println!("Period:   (no transactions)"),
    }
    let fmt_balance = |b: Option<f64>| b.map_or("-".to_string(), |v| format!("{v:.2}"));
    println!("Opening:  {} {}", fmt_balance(s.opening_balance), s.currency);
    println!("Closing:  {} {}", fmt_balance(s.closing_balance), s.currency);
    println!("Debits:   {:.2} {}", s.total_debits, s.currency);
    println!("Credits:  {:.2} {}", s.total_credits, s.currency);
    if let Some(gap) = s.reconciliation_gap() {
        println!("Gap:      {gap:.2} (closing - opening - credits + debits)");
    }
    println!();

    for t in parsed.transactions.iter().take(limit) {
        let (sign, amount) = match t.transaction_type {
            TransactionType::Debit => ("-", t.debit_amount),
            TransactionType::Credit => ("+", t.credit_amount),
            TransactionType::Both => ("±", t.net_amount().abs()),
        };
        println!(
            "- {} | {}{:.2} | {} (row {})",
            t.transaction_date, sign, amount, t.description, t.source_row_number
        );
    }
    if parsed.transactions.len() > limit {
        println!("… {} more", parsed.transactions.len() - limit);
    }
}
