//! repeat-stitch CLI entry point
//!
//! Chains fragmented repeat annotations into composite elements.

use clap::{Parser, Subcommand, ValueEnum};
use repeat_stitch::core::io::{open_input, open_output, STDIO_PATH};
use repeat_stitch::core::{partition, stitch_all, Feature, StitchConfig, Summary};
use repeat_stitch::core::{DEFAULT_MAX_SEPARATION, DEFAULT_MAX_SPAN};
use repeat_stitch::formats::{self, gff, rmout};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "repeat-stitch")]
#[command(about = "Chain fragmented repeat annotations into composite elements")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Input annotation format
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum InputFormat {
    /// GFF repeat features with a `Repeat` attribute
    #[default]
    #[value(name = "gff")]
    Gff,
    /// RepeatMasker `.out` table
    #[value(name = "rm-out")]
    RmOut,
}

#[derive(Subcommand)]
enum Commands {
    /// Chain repeat records into composites
    Stitch {
        /// Input annotation file (`-` for stdin, .gz/.bz2 accepted)
        input: PathBuf,
        /// Output GFF file (optional, stdout if not specified)
        output: Option<PathBuf>,
        /// Input format
        #[arg(short = 'f', long, default_value = "gff")]
        format: InputFormat,
        /// Number of worker threads (0: number of CPUs)
        #[arg(short = 't', long, env = "STITCH_WORKERS", default_value = "0")]
        workers: usize,
        /// Gap between consecutive right ends that starts a new block
        #[arg(long, default_value_t = DEFAULT_MAX_SEPARATION)]
        max_separation: i64,
        /// Genomic distance beyond which two records never link
        #[arg(long, default_value_t = DEFAULT_MAX_SPAN)]
        max_span: i64,
    },
    /// Convert RepeatMasker .out to GFF repeat features
    Rm2gff {
        /// Input RepeatMasker .out file (stdin if not specified)
        input: Option<PathBuf>,
        /// Output GFF file (optional, stdout if not specified)
        output: Option<PathBuf>,
        /// Mark alignments overlapped by a higher-scoring match
        #[arg(long)]
        mark_other: bool,
    },
    /// Chain RepeatMasker .out alignments by their ID column
    Rmstitch {
        /// Input RepeatMasker .out file (stdin if not specified)
        input: Option<PathBuf>,
        /// Output GFF file (optional, stdout if not specified)
        output: Option<PathBuf>,
    },
    /// Summarise composites per repeat class
    Hem {
        /// Composite GFF from `stitch` or `rmstitch`
        input: PathBuf,
        /// Output table (optional, stdout if not specified)
        output: Option<PathBuf>,
        /// Write discordant composites to stderr
        #[arg(long)]
        discords: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    match cli.command {
        Commands::Stitch {
            input,
            output,
            format,
            workers,
            max_separation,
            max_span,
        } => {
            let config = StitchConfig::default()
                .with_workers(workers)
                .with_max_separation(max_separation)
                .with_max_span(max_span);

            eprintln!("Reading repeats: {:?}", input);
            let reader = open_input(&input)
                .map_err(|e| anyhow::anyhow!("Failed to open {:?}: {}", input, e))?;
            let records = match format {
                InputFormat::Gff => gff::read_repeats(reader)?,
                InputFormat::RmOut => rmout::read_repeats(reader)?,
            };
            let total = records.len();

            let partitions = partition(records);
            let n_partitions = partitions.len();
            eprintln!(
                "Chaining {} records in {} partitions ({} workers)",
                total,
                n_partitions,
                config.effective_workers()
            );

            let assembly = stitch_all(partitions, &config)?;
            let chained = assembly.chained_records();
            let blocks = assembly.batches;
            let composites = assembly.into_result()?;

            let mut writer = open_output(output.as_ref())?;
            let written =
                formats::write_features(&mut writer, composites.iter().map(Feature::from))?;
            writer.flush()?;

            eprintln!("\n=== Chaining Statistics ===");
            eprintln!("Total records:   {}", total);
            eprintln!("Partitions:      {}", n_partitions);
            eprintln!("Blocks chained:  {}", blocks);
            eprintln!("Composites:      {}", written);
            eprintln!("Chained records: {}", chained);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Rm2gff { input, output, mark_other } => {
            let input = input.unwrap_or_else(|| PathBuf::from(STDIO_PATH));
            let reader = open_input(&input)
                .map_err(|e| anyhow::anyhow!("Failed to open {:?}: {}", input, e))?;
            let mut writer = open_output(output.as_ref())?;
            let stats = rmout::convert_rmout(reader, &mut writer, mark_other)?;
            writer.flush()?;

            eprintln!("\n=== Conversion Statistics ===");
            eprintln!("Total records:   {}", stats.total);
            if mark_other {
                eprintln!("Other match:     {}", stats.other_match);
            }
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Rmstitch { input, output } => {
            let input = input.unwrap_or_else(|| PathBuf::from(STDIO_PATH));
            let reader = open_input(&input)
                .map_err(|e| anyhow::anyhow!("Failed to open {:?}: {}", input, e))?;
            let mut writer = open_output(output.as_ref())?;
            let written = rmout::stitch_by_id(reader, &mut writer)?;
            writer.flush()?;

            eprintln!("\n=== Chaining Statistics ===");
            eprintln!("Composites:      {}", written);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Hem { input, output, discords } => {
            eprintln!("Reading composites: {:?}", input);
            let reader = open_input(&input)
                .map_err(|e| anyhow::anyhow!("Failed to open {:?}: {}", input, e))?;
            let composites = gff::read_composites(reader)?;

            let mut summary = Summary::default();
            let stderr = std::io::stderr();
            let mut echo = stderr.lock();
            for composite in &composites {
                if summary.add(composite) && discords {
                    writeln!(echo, "{}", gff::format_feature(Feature::Composite(composite)))?;
                }
            }

            let mut writer = open_output(output.as_ref())?;
            summary.write_table(&mut writer)?;
            writer.flush()?;
        }
    }

    Ok(())
}
