//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements [`ProgressCallback`]
//! to display a spinner while files are gathered and a "processed X of N" bar
//! while they are fingerprinted.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::duplicates::{PHASE_GATHERING, PHASE_HASHING};

/// Progress callback for duplicate scanning phases.
///
/// Implement this trait to receive progress updates from the
/// [`DuplicateScanner`](crate::duplicates::DuplicateScanner).
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ("gathering" or "hashing")
    /// * `total` - Total number of items to process, 0 when unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    gathering: Mutex<Option<ProgressBar>>,
    hashing: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use sweeper::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            gathering: Mutex::new(None),
            hashing: Mutex::new(None),
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] processed {pos} of {len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn set(slot: &Mutex<Option<ProgressBar>>, pb: ProgressBar) {
        if let Ok(mut guard) = slot.lock() {
            *guard = Some(pb);
        }
    }

    fn finish(slot: &Mutex<Option<ProgressBar>>, message: &'static str) {
        if let Some(pb) = slot.lock().ok().and_then(|mut guard| guard.take()) {
            pb.finish_with_message(message);
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_GATHERING => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.set_message("Gathering files");
                pb.enable_steady_tick(Duration::from_millis(100));
                Self::set(&self.gathering, pb);
            }
            PHASE_HASHING => {
                // Unknown total (direct walk): count files with a spinner.
                let pb = if total == 0 {
                    let pb = self.multi.add(ProgressBar::new_spinner());
                    pb.set_style(Self::spinner_style());
                    pb.enable_steady_tick(Duration::from_millis(100));
                    pb
                } else {
                    let pb = self.multi.add(ProgressBar::new(total as u64));
                    pb.set_style(Self::bar_style());
                    pb
                };
                pb.set_message("Hashing");
                Self::set(&self.hashing, pb);
            }
            _ => log::trace!("Ignoring unknown progress phase '{}'", phase),
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        let msg = truncate_path(path, 30);
        if let Ok(guard) = self.hashing.lock() {
            if let Some(ref pb) = *guard {
                pb.set_position(current as u64);
                pb.set_message(msg);
                return;
            }
        }
        if let Ok(guard) = self.gathering.lock() {
            if let Some(ref pb) = *guard {
                pb.set_position(current as u64);
            }
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_GATHERING => Self::finish(&self.gathering, "Gathering complete"),
            PHASE_HASHING => Self::finish(&self.hashing, "Hashing complete"),
            _ => {}
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }

        if let Ok(guard) = self.hashing.lock() {
            if let Some(ref pb) = *guard {
                pb.set_message(message.to_string());
            }
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let chars: Vec<char> = file_name.chars().collect();
    if chars.len() + 4 > max_len {
        let keep = max_len.saturating_sub(3);
        let tail: String = chars[chars.len().saturating_sub(keep)..].iter().collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
