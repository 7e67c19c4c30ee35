//! Racecard CLI - Command-line interface for race card parsing

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use racecard::data::{
    collect_inputs, read_document, split_pages, write_csv, write_json, BlockShape,
};
use racecard::{JockeyStrategy, MeetingDate, ParserConfig, RaceCardError, RaceCardParser, StarterRecord};

/// Default output directory
const DEFAULT_OUTPUT_DIR: &str = ".";

#[derive(Parser)]
#[command(name = "racecard")]
#[command(author, version, about = "German race card text parser", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse extracted race card text into starter records
    Parse {
        /// Text files or directories of .txt files
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Meeting date (YYYY-MM-DD format)
        #[arg(short, long)]
        date: String,

        /// Output directory
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Output format (csv or json)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Parser config (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Jockey name heuristic (two-token or comma-three-token)
        #[arg(long)]
        jockey_strategy: Option<JockeyStrategy>,
    },

    /// Show the race header and block segmentation of one page
    Inspect {
        /// Text file
        #[arg(short, long)]
        input: PathBuf,

        /// Meeting date (YYYY-MM-DD format)
        #[arg(short, long)]
        date: String,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Parser config (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    println!("{}", "Racecard CLI v0.1.0".cyan().bold());
    println!();

    match cli.command {
        Commands::Parse {
            input,
            date,
            output,
            format,
            config,
            jockey_strategy,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(strategy) = jockey_strategy {
                config.jockey_strategy = strategy;
            }
            run_parse(&input, &date, &output, &format, config)?;
        }
        Commands::Inspect {
            input,
            date,
            page,
            config,
        } => {
            run_inspect(&input, &date, page, load_config(config.as_deref())?)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ParserConfig> {
    match path {
        Some(path) => ParserConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config: {:?}", path)),
        None => Ok(ParserConfig::default()),
    }
}

/// Read one document and parse all of its pages
fn parse_file(
    parser: &RaceCardParser,
    path: &Path,
    meeting: &MeetingDate,
) -> Result<Vec<StarterRecord>, RaceCardError> {
    let text = read_document(path)?;
    let pages = split_pages(&text);
    if pages.iter().all(|page| page.is_empty()) {
        return Err(RaceCardError::NoPages(path.to_path_buf()));
    }
    Ok(parser.parse_document(&pages, meeting))
}

fn run_parse(
    inputs: &[PathBuf],
    date: &str,
    output_dir: &Path,
    format: &str,
    config: ParserConfig,
) -> Result<()> {
    let meeting: MeetingDate = date.parse()?;
    if format != "csv" && format != "json" {
        anyhow::bail!("Unknown format: {}. Use 'csv' or 'json'", format);
    }

    let mut files = Vec::new();
    for input in inputs {
        files.extend(
            collect_inputs(input).with_context(|| format!("Failed to read input: {:?}", input))?,
        );
    }

    if files.is_empty() {
        println!("{}", "No .txt files found in input".yellow());
        return Ok(());
    }

    println!(
        "{}: {} file(s) for {} -> {}",
        "Parsing".green(),
        files.len(),
        meeting,
        output_dir.display()
    );

    let years = config.years;
    let parser = RaceCardParser::with_config(config);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let starters: Vec<StarterRecord> = files
        .par_iter()
        .map(|path| {
            pb.set_message(path.file_name().unwrap_or_default().to_string_lossy().to_string());
            let records = match parse_file(&parser, path, &meeting) {
                Ok(records) => records,
                Err(e) => {
                    pb.println(format!("{} {}", "Warning".yellow(), e));
                    Vec::new()
                }
            };
            pb.inc(1);
            records
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    pb.finish_and_clear();

    if starters.is_empty() {
        anyhow::bail!("No starters parsed from {} file(s)", files.len());
    }

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let out_path = output_dir.join(format!("horse_starters_{}.{}", meeting, format));
    match format {
        "json" => write_json(&out_path, &starters)?,
        _ => write_csv(&out_path, years, &starters)?,
    }

    let races: HashSet<(&str, u8)> = starters
        .iter()
        .map(|s| (s.race.venue.as_str(), s.race.race_nr))
        .collect();

    println!(
        "{} starters | {} races",
        starters.len().to_string().green().bold(),
        races.len()
    );
    println!("Saved to {}", out_path.display());

    Ok(())
}

fn run_inspect(input: &Path, date: &str, page_no: usize, config: ParserConfig) -> Result<()> {
    let meeting: MeetingDate = date.parse()?;
    let text = read_document(input)?;
    let pages = split_pages(&text);

    let page = page_no
        .checked_sub(1)
        .and_then(|idx| pages.get(idx))
        .with_context(|| format!("Page {} out of range (document has {})", page_no, pages.len()))?;

    let parser = RaceCardParser::with_config(config);

    println!("{} {}/{}", "Page".cyan().bold(), page_no, pages.len());
    match parser.parse_header(page) {
        Some(header) => {
            println!(
                "  {} Rennen #{} | {} | {}",
                header.venue.bold(),
                header.race_nr,
                header.race_time,
                header.race_name
            );
            println!(
                "  Distance: {} m | Prize: {} € | Surface: {}",
                header
                    .distance_m
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                header
                    .prize_eur
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                header.surface
            );
        }
        None => println!("  {}", "No race header on this page".yellow()),
    }
    println!();

    let blocks = parser.segment(page);
    println!("{} {}", "Blocks".cyan().bold(), blocks.len());
    for (i, block) in blocks.iter().enumerate() {
        let shape = match block.shape {
            BlockShape::SingleLine => "single",
            BlockShape::Wrapped => "wrapped",
        };
        println!(
            "  {:>2}. [{:<7}] {} ({} lines)",
            i + 1,
            shape,
            truncate(block.header(), 60),
            block.lines.len()
        );
    }
    println!();

    let starters = parser.parse_page(page, &meeting);
    println!("{} {}", "Starters".cyan().bold(), starters.len());
    for s in &starters {
        println!(
            "  {:>2} {:<24} jockey: {:<24} ML: {:<6} form: {}",
            s.start_nr,
            truncate(&s.horse_name, 24),
            truncate(&s.jockey, 24),
            s.wagering
                .ml_odds
                .map(|o| format!("{:.1}", o))
                .unwrap_or_else(|| "-".to_string()),
            s.form.len()
        );
    }

    Ok(())
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        let head: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
