//! Progress reporting utilities using indicatif.
//!
//! The finder talks to a [`ProgressCallback`]; [`Progress`] is the terminal
//! implementation that draws a spinner while walking and a bar for each of
//! the sizing and hashing phases.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress callback for duplicate finding phases.
///
/// Phases are `"walking"`, `"sizing"` and `"hashing"`. Callbacks may be
/// invoked from worker threads concurrently.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts. `total` is 0 when unknown.
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// `current` is a 1-based index; worker phases may report it out of order.
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a file has been hashed, with its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter drawing to stderr.
pub struct Progress {
    multi: MultiProgress,
    active: Mutex<Option<(String, ProgressBar)>>,
    bytes_hashed: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Progress {
    /// Create a reporter; `hidden` suppresses all drawing.
    ///
    /// ```
    /// use filedup::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(hidden: bool) -> Self {
        let target = if hidden {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        };
        Self {
            multi: MultiProgress::with_draw_target(target),
            active: Mutex::new(None),
            bytes_hashed: AtomicU64::new(0),
        }
    }

    /// Bytes reported through [`ProgressCallback::on_item_completed`].
    #[must_use]
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes_hashed.load(Ordering::Relaxed)
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style(colour: &str) -> ProgressStyle {
        let template = format!(
            "[{{elapsed_precise}}] [{{bar:40.{}/blue}}] {{pos}}/{{len}} ({{percent}}%) {{msg}} (ETA: {{eta}})",
            colour
        );
        ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        let pb = match phase {
            "walking" => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.set_message("Walking directories");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            "sizing" => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style("cyan"));
                pb.set_message("Reading sizes");
                pb
            }
            "hashing" => {
                self.bytes_hashed.store(0, Ordering::Relaxed);
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style("green"));
                pb.set_message("Hashing");
                pb
            }
            other => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style("white"));
                pb.set_message(other.to_string());
                pb
            }
        };
        if let Some((_, previous)) = lock(&self.active).replace((phase.to_string(), pb)) {
            previous.finish_and_clear();
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if let Some((ref phase, ref pb)) = *lock(&self.active) {
            if phase == "walking" {
                pb.set_position(current as u64);
                pb.set_message(truncate_path(path, 30));
            } else {
                pb.inc(1);
            }
        }
    }

    fn on_item_completed(&self, bytes: u64) {
        self.bytes_hashed.fetch_add(bytes, Ordering::Relaxed);
    }

    fn on_phase_end(&self, phase: &str) {
        let mut active = lock(&self.active);
        if active.as_ref().is_some_and(|(p, _)| p == phase) {
            if let Some((_, pb)) = active.take() {
                let message = match phase {
                    "walking" => "Walking complete".to_string(),
                    "sizing" => "Sizes read".to_string(),
                    "hashing" => format!(
                        "Hashing complete ({})",
                        bytesize::ByteSize::b(self.bytes_hashed())
                    ),
                    other => format!("{} complete", other),
                };
                pb.finish_with_message(message);
            }
        }
    }

    fn on_message(&self, message: &str) {
        if let Some((_, ref pb)) = *lock(&self.active) {
            pb.set_message(message.to_string());
        }
    }
}

/// Shorten a path to its file name when it does not fit.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let chars: Vec<char> = file_name.chars().collect();
    if chars.len() + 4 > max_len {
        let tail: String = chars[chars.len().saturating_sub(max_len - 3)..].iter().collect();
        return format!("...{}", tail);
    }

    format!(".../{}", file_name)
}
