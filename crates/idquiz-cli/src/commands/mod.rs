pub mod catalog;
pub mod run;
pub mod simulate;

use std::path::Path;

use idquiz_core::{CatalogIndex, TimeoutPolicy};

/// Load and index a catalog, exiting with a "cannot start" message on any
/// configuration error.
pub fn load_catalog(path: &str) -> CatalogIndex {
    match CatalogIndex::from_path(path) {
        Ok(index) => index,
        Err(e) => {
            eprintln!("Cannot start: {e}");
            std::process::exit(1);
        }
    }
}

/// Parse a timeout policy string into the enum.
pub fn parse_timeouts(s: &str) -> TimeoutPolicy {
    match s {
        "count" | "incorrect" => TimeoutPolicy::CountAsIncorrect,
        "exclude" | "skip" => TimeoutPolicy::Exclude,
        _ => {
            eprintln!("Unknown timeout policy '{s}', counting timeouts as incorrect");
            TimeoutPolicy::CountAsIncorrect
        }
    }
}

/// clap value parser for a probability in `[0, 1]`.
pub fn parse_probability(s: &str) -> Result<f64, String> {
    let p: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{s} is outside 0.0..=1.0"))
    }
}

/// Write report text to `path`, reporting failures on stderr.
pub fn write_report(path: &Path, text: &str) -> bool {
    match std::fs::write(path, text) {
        Ok(()) => {
            println!("Report written to {}", path.display());
            true
        }
        Err(e) => {
            eprintln!("Cannot write report to {}: {e}", path.display());
            false
        }
    }
}
