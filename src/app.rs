//! Replay application: feeds a recorded keypoint stream through a session.
//!
//! Input is one JSON value per line: a [`RawDetection`] object for frames
//! where the detector found a person, or `null` when it did not. Blank lines
//! are skipped. Lines that fail to parse are logged and treated as frames
//! without a detection.

use crate::config::Config;
use crate::session::{Session, StatusHandle, StatusSnapshot};
use crate::source::{KeypointSource, RawDetection};
use crate::{Error, Result};
use log::{info, warn};
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Where the keypoint stream comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input
    Stdin,
    /// A file of JSON lines
    File(PathBuf),
}

impl InputSource {
    /// `-` means standard input
    #[must_use]
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }
}

/// Replay run options
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Keypoint stream
    pub input: InputSource,
    /// Write every frame's status snapshot as a JSON line
    pub json_output: bool,
    /// Log the shared status from a background thread at this interval
    pub status_interval: Option<Duration>,
}

/// Totals for a finished replay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Non-blank input lines
    pub frames: u64,
    /// Frames where a usable person was found
    pub analyzed_frames: u64,
    /// Frames with no usable detection, malformed lines included
    pub missed_frames: u64,
    /// Lines that could not be parsed
    pub malformed_lines: u64,
    /// Status after the last frame
    pub final_status: StatusSnapshot,
}

/// Parse one replay line; `Ok(None)` is a frame without a person
///
/// # Errors
///
/// Returns an error if the line is not valid JSON for a detection.
pub fn parse_detection_line(line: &str) -> Result<Option<RawDetection>> {
    let detection: Option<RawDetection> = serde_json::from_str(line)?;
    Ok(detection.filter(|d| !d.keypoints.is_empty()))
}

/// Main application struct
pub struct ReplayApp {
    session: Session,
    source: Box<dyn KeypointSource>,
    options: ReplayOptions,
}

impl ReplayApp {
    /// Create a replay application
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the status
    /// interval is zero.
    pub fn new(config: &Config, options: ReplayOptions) -> Result<Self> {
        config.validate()?;
        if options.status_interval == Some(Duration::ZERO) {
            return Err(Error::InvalidInput("Status interval must be greater than zero".to_string()));
        }
        let source = config.create_source()?;
        info!("Using keypoint source: {}", source.name());

        Ok(Self {
            session: Session::start(config)?,
            source,
            options,
        })
    }

    /// Status handle of the underlying session
    #[must_use]
    pub fn status_handle(&self) -> StatusHandle {
        self.session.status_handle()
    }

    /// Replay the configured input, writing JSON status lines to stdout
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be opened or read, or output
    /// cannot be written.
    pub fn run(&mut self) -> Result<ReplaySummary> {
        let reader: Box<dyn BufRead> = match &self.options.input {
            InputSource::Stdin => {
                info!("Reading keypoints from stdin");
                Box::new(BufReader::new(io::stdin()))
            }
            InputSource::File(path) => {
                info!("Reading keypoints from {}", path.display());
                Box::new(BufReader::new(std::fs::File::open(path)?))
            }
        };

        let stdout = io::stdout();
        self.run_with_status(reader, &mut stdout.lock())
    }

    /// Replay `reader` while the status poller, if configured, runs alongside
    fn run_with_status<R: BufRead, W: Write>(&mut self, reader: R, out: &mut W) -> Result<ReplaySummary> {
        let _poller = self
            .options
            .status_interval
            .map(|interval| StatusPoller::spawn(self.session.status_handle(), interval));

        self.run_reader(reader, out)
    }

    /// Replay every line of `reader`
    ///
    /// # Errors
    ///
    /// Returns an error on read or write failure. Malformed lines are not
    /// errors.
    pub fn run_reader<R: BufRead, W: Write>(&mut self, reader: R, out: &mut W) -> Result<ReplaySummary> {
        let mut frames = 0u64;
        let mut analyzed_frames = 0u64;
        let mut malformed_lines = 0u64;

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            frames += 1;

            let detection = match parse_detection_line(line) {
                Ok(detection) => detection,
                Err(e) => {
                    warn!("Line {}: malformed detection ({}), treating as no detection", line_number + 1, e);
                    malformed_lines += 1;
                    None
                }
            };

            let analysis = self.session.process_detection(self.source.as_ref(), detection.as_ref());
            if analysis.detected() {
                analyzed_frames += 1;
            }

            if self.options.json_output {
                serde_json::to_writer(&mut *out, &analysis.status)?;
                writeln!(out)?;
            }
        }
        out.flush()?;

        let summary = ReplaySummary {
            frames,
            analyzed_frames,
            missed_frames: frames - analyzed_frames,
            malformed_lines,
            final_status: self.session.status(),
        };
        info!(
            "Replay finished: {} frames ({} missed, {} malformed), {} reps",
            summary.frames, summary.missed_frames, summary.malformed_lines, summary.final_status.rep_count
        );
        Ok(summary)
    }
}

/// Background thread that logs the shared status, standing in for a status
/// endpoint polling the session. Stopped and joined on drop.
struct StatusPoller {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl StatusPoller {
    fn spawn(status: StatusHandle, interval: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                let snapshot = status.snapshot();
                info!(
                    "Status: reps={} state={} form={}",
                    snapshot.rep_count, snapshot.phase, snapshot.form_label
                );
                thread::park_timeout(interval);
            }
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                warn!("Status poller thread panicked");
            }
        }
    }
}
