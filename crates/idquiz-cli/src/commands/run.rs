//! `idquiz run`: take the quiz in the terminal UI.

use std::path::PathBuf;
use std::time::Duration;

use idquiz_core::{Proctor, QuizConfig};

pub struct RunCommandConfig<'a> {
    pub catalog_path: &'a str,
    pub image_root: &'a str,
    pub ticks: u32,
    pub tick_ms: u64,
    pub show_files: bool,
    pub seed: Option<u64>,
    pub timeouts: &'a str,
    pub output_path: Option<&'a str>,
}

pub fn run(cfg: RunCommandConfig<'_>) {
    let index = super::load_catalog(cfg.catalog_path);
    let config = QuizConfig {
        countdown_ticks: cfg.ticks,
        timeout_policy: super::parse_timeouts(cfg.timeouts),
        seed: cfg.seed,
    };

    let proctor = match Proctor::start(index, &config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Cannot start: {e}");
            std::process::exit(1);
        }
    };

    let tick_rate = Duration::from_millis(cfg.tick_ms.max(50));
    let mut app = crate::tui::app::App::new(proctor, PathBuf::from(cfg.image_root), tick_rate)
        .with_file_names(cfg.show_files);
    if let Err(e) = app.run() {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }

    // Printed after the terminal is restored so it can be copied.
    match app.report() {
        Some(report) => {
            let text = report.to_text();
            println!("{text}");
            if let Some(path) = cfg.output_path {
                super::write_report(&PathBuf::from(path), &text);
            }
        }
        None => println!(
            "Quiz stopped after {} of {} trials; no report.",
            app.completed_trials(),
            app.total_trials()
        ),
    }
}
