//! HQMF command-line interface

use clap::{Parser, Subcommand};
use octofhir_hqmf::cli::{classify, extract, output};
use std::path::PathBuf;

/// HQMF command-line tool
#[derive(Parser)]
#[command(name = "hqmf")]
#[command(author, version, about = "HQMF data criteria tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract data criteria as JSON
    Extract {
        /// HQMF file to read
        file: PathBuf,

        /// Pretty-print output
        #[arg(short, long)]
        pretty: bool,

        /// Skip entries with unknown templates, value types or demographic codes
        #[arg(short, long)]
        skip_unrecognized: bool,

        /// Keep empty fields in the output
        #[arg(long)]
        raw: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the template type and section of every entry
    Classify {
        /// HQMF file to read
        file: PathBuf,

        /// Skip entries with unknown templates, value types or demographic codes
        #[arg(short, long)]
        skip_unrecognized: bool,
    },
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env().init();
    }

    let result = match cli.command {
        Commands::Extract {
            file,
            pretty,
            skip_unrecognized,
            raw,
            output: output_file,
        } => extract::extract(extract::ExtractConfig {
            file,
            pretty,
            skip_unrecognized,
            raw,
            output_file,
        }),

        Commands::Classify {
            file,
            skip_unrecognized,
        } => classify::classify(classify::ClassifyConfig {
            file,
            skip_unrecognized,
            verbose: cli.verbose,
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
