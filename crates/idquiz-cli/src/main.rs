//! CLI for idquiz: can you still recognise a face after de-identification?

mod commands;
mod tui;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "idquiz")]
#[command(about = "idquiz: face re-identification quiz for blurred, masked and pixelated images")]
#[command(version = idquiz_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take the quiz in an interactive terminal UI
    Run {
        /// Catalog JSON file ({ "images": [...] })
        #[arg(long, default_value = "images-metadata.json")]
        catalog: String,

        /// Root directory the catalog's image files live under
        #[arg(long, default_value = "images")]
        images: String,

        /// Countdown length per trial, in ticks
        #[arg(long, default_value = "5")]
        ticks: u32,

        /// Tick length in milliseconds
        #[arg(long, default_value = "1000")]
        tick_ms: u64,

        /// Show image paths on the trial screen (file names may give the answer away)
        #[arg(long)]
        show_files: bool,

        /// Seed for reproducible option sets
        #[arg(long)]
        seed: Option<u64>,

        /// How timed-out trials are scored: count (as incorrect) or exclude
        #[arg(long, default_value = "count", value_parser = ["count", "exclude"])]
        timeouts: String,

        /// Also write the final report to this file
        #[arg(long)]
        output: Option<String>,
    },

    /// Run the quiz headless with a simulated participant
    Simulate {
        /// Catalog JSON file ({ "images": [...] })
        #[arg(long, default_value = "images-metadata.json")]
        catalog: String,

        /// Probability the participant picks the right person
        #[arg(long, default_value = "0.7", value_parser = commands::parse_probability)]
        accuracy: f64,

        /// Probability the participant lets the countdown run out
        #[arg(long, default_value = "0.1", value_parser = commands::parse_probability)]
        timeout_rate: f64,

        /// Countdown length per trial, in ticks
        #[arg(long, default_value = "5")]
        ticks: u32,

        /// Seed for option sets and participant behaviour
        #[arg(long)]
        seed: Option<u64>,

        /// How timed-out trials are scored: count (as incorrect) or exclude
        #[arg(long, default_value = "count", value_parser = ["count", "exclude"])]
        timeouts: String,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Also write the report to this file
        #[arg(long)]
        output: Option<String>,
    },

    /// Summarise a catalog: references, method pools, intensities, coverage
    Catalog {
        /// Catalog JSON file ({ "images": [...] })
        #[arg(long, default_value = "images-metadata.json")]
        catalog: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            catalog,
            images,
            ticks,
            tick_ms,
            show_files,
            seed,
            timeouts,
            output,
        } => commands::run::run(commands::run::RunCommandConfig {
            catalog_path: &catalog,
            image_root: &images,
            ticks,
            tick_ms,
            show_files,
            seed,
            timeouts: &timeouts,
            output_path: output.as_deref(),
        }),
        Commands::Simulate {
            catalog,
            accuracy,
            timeout_rate,
            ticks,
            seed,
            timeouts,
            json,
            output,
        } => commands::simulate::run(commands::simulate::SimulateCommandConfig {
            catalog_path: &catalog,
            accuracy,
            timeout_rate,
            ticks,
            seed,
            timeouts: &timeouts,
            json,
            output_path: output.as_deref(),
        }),
        Commands::Catalog { catalog } => commands::catalog::run(&catalog),
    }
}
