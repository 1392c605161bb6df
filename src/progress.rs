//! Progress tracking module for crop runs.
//!
//! Stage and page events are delivered through [`ProgressCallback`]. Page
//! events arrive from analysis workers, so implementations must be `Sync`.

use std::fmt;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

/// Processing stages of a crop run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingStage {
    /// Opening the document
    #[default]
    Loading,
    /// Rendering and scanning pages
    Analyzing,
    /// Per-group statistics
    Normalizing,
    /// Final margins
    ApplyingMargins,
    /// Writing the output PDF
    Writing,
    /// Completed
    Completed,
}

impl ProcessingStage {
    /// Get the name of the stage
    pub fn name(&self) -> &'static str {
        match self {
            ProcessingStage::Loading => "Loading",
            ProcessingStage::Analyzing => "Analyzing",
            ProcessingStage::Normalizing => "Normalizing",
            ProcessingStage::ApplyingMargins => "ApplyingMargins",
            ProcessingStage::Writing => "Writing",
            ProcessingStage::Completed => "Completed",
        }
    }

    /// Get a short description of the stage
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::Loading => "opening document",
            ProcessingStage::Analyzing => "scanning pages",
            ProcessingStage::Normalizing => "normalizing page groups",
            ProcessingStage::ApplyingMargins => "applying margins",
            ProcessingStage::Writing => "writing page boxes",
            ProcessingStage::Completed => "done",
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.description())
    }
}

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// No output
    Quiet,
    /// Normal output (stage display only)
    #[default]
    Normal,
    /// Verbose output (page-level progress)
    Verbose,
    /// Very verbose (all items displayed)
    VeryVerbose,
}

impl OutputMode {
    /// Create OutputMode from verbosity level
    pub fn from_verbosity(level: u8) -> Self {
        match level {
            0 => OutputMode::Normal,
            1 => OutputMode::Verbose,
            _ => OutputMode::VeryVerbose,
        }
    }

    /// Check if output should be shown at this mode
    pub fn should_show(&self, required: OutputMode) -> bool {
        use OutputMode::*;
        match (self, required) {
            (Quiet, _) => false,
            (Normal, Quiet | Normal) => true,
            (Verbose, Quiet | Normal | Verbose) => true,
            (VeryVerbose, _) => true,
            _ => false,
        }
    }
}

// ============================================================
// Callbacks
// ============================================================

/// Receives progress events. All methods default to doing nothing.
pub trait ProgressCallback: Sync {
    /// A stage begins; `total` is its page count (0 if not page based)
    fn on_stage_start(&self, _stage: ProcessingStage, _total: usize) {}

    /// A page finished within the current stage. May be called from any
    /// worker thread, in any order.
    fn on_page_complete(&self, _page_index: usize) {}

    /// A stage ended
    fn on_stage_complete(&self, _stage: ProcessingStage, _message: &str) {}
}

/// Discards all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressCallback for NoProgress {}

/// Progress bar template
const BAR_TEMPLATE: &str = "  [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Terminal progress display on stderr
#[derive(Debug)]
pub struct ProgressTracker {
    bar: ProgressBar,
    output_mode: OutputMode,
    start_time: Instant,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(OutputMode::Normal)
    }
}

impl ProgressTracker {
    /// Create a new progress tracker. The page bar is only drawn in verbose
    /// modes.
    pub fn new(output_mode: OutputMode) -> Self {
        let bar = if output_mode.should_show(OutputMode::Verbose) {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template(BAR_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            bar
        } else {
            ProgressBar::hidden()
        };
        Self {
            bar,
            output_mode,
            start_time: Instant::now(),
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    /// Pages completed in the current stage
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Get elapsed time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    fn print(&self, line: String) {
        if self.bar.is_hidden() {
            eprintln!("{}", line);
        } else {
            self.bar.println(line);
        }
    }

    /// Print the completion line
    pub fn finish(&self) {
        self.bar.finish_and_clear();
        if self.output_mode.should_show(OutputMode::Normal) {
            eprintln!("  Completed in {:.2}s", self.elapsed_secs());
        }
    }
}

impl ProgressCallback for ProgressTracker {
    fn on_stage_start(&self, stage: ProcessingStage, total: usize) {
        self.bar.reset();
        self.bar.set_length(total as u64);
        self.bar.set_message(stage.name());
        if self.output_mode.should_show(OutputMode::Normal) {
            self.print(format!("  Stage: {}", stage));
        }
    }

    fn on_page_complete(&self, page_index: usize) {
        self.bar.inc(1);
        if self.output_mode.should_show(OutputMode::VeryVerbose) {
            self.bar.set_message(format!("page {}", page_index + 1));
        }
    }

    fn on_stage_complete(&self, stage: ProcessingStage, message: &str) {
        self.bar.finish_and_clear();
        if self.output_mode.should_show(OutputMode::Verbose) {
            self.print(format!("    {}: {}", stage.name(), message));
        }
    }
}
