//! Push-up repetition counter: replays recorded keypoints and reports reps and form.

use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use pose_rep_counter::app::{InputSource, ReplayApp, ReplayOptions};
use pose_rep_counter::config::{Config, EXAMPLE_CONFIG};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Keypoint stream, one JSON detection per line (`-` for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Keypoint source (blazepose, coco)
    #[arg(short, long)]
    source: Option<String>,

    /// Smoothing filter, e.g. moving_average, median:5, exponential:0.4
    #[arg(short, long)]
    filter: Option<String>,

    /// Print each frame's status as a JSON line
    #[arg(long)]
    json: bool,

    /// Log the shared status from a background poller every N milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    status_interval_ms: Option<u64>,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Push-up repetition counter");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    // Command line overrides
    if let Some(source) = args.source {
        config.source.detector = source;
    }
    if let Some(filter) = args.filter {
        config.smoothing.filter = filter;
    }

    let options = ReplayOptions {
        input: InputSource::from_arg(&args.input),
        json_output: args.json,
        status_interval: args.status_interval_ms.map(Duration::from_millis),
    };

    let mut app = ReplayApp::new(&config, options)?;
    let summary = app.run()?;

    eprintln!(
        "reps: {}  state: {}  form: {}  ({} frames, {} without detection)",
        summary.final_status.rep_count,
        summary.final_status.phase,
        summary.final_status.form_label,
        summary.frames,
        summary.missed_frames
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_interval_must_be_positive() {
        assert!(Args::try_parse_from(["pose-rep-counter", "--status-interval-ms", "0"]).is_err());

        let args = Args::try_parse_from(["pose-rep-counter", "--status-interval-ms", "250"]).unwrap();
        assert_eq!(args.status_interval_ms, Some(250));
    }
}
