//! Terminal output: the colored `log!`/`debug!` macros and the
//! single-line counter shown during the export loop.
//!
//! # Example
//!
//! ```ignore
//! log!("export"; "{} groups found", count);
//!
//! let progress = ProgressCounter::new("thumbs", 5);
//! progress.inc();
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// A progress counter currently owns the bottom terminal line
static COUNTER_SHOWN: AtomicBool = AtomicBool::new(false);

// ============================================================================
// Macros
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Line output
// ============================================================================

/// Write one prefixed line, displacing the progress counter if shown.
///
/// The counter repaints itself below the message on its next update.
pub fn log(module: &str, message: &str) {
    let mut out = stdout().lock();

    if COUNTER_SHOWN.load(Ordering::SeqCst) {
        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    } else {
        execute!(out, Clear(ClearType::UntilNewLine)).ok();
    }

    writeln!(out, "{} {message}", paint(module)).ok();
    out.flush().ok();
}

/// Color a module tag by its role.
fn paint(module: &str) -> String {
    let tag = format!("[{module}]");
    match module {
        "export" => tag.bright_green().bold().to_string(),
        "serve" => tag.bright_blue().bold().to_string(),
        "error" => tag.bright_red().bold().to_string(),
        _ => tag.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Progress counter
// ============================================================================

/// Single-line counter for the export loop.
///
/// Renders as `[export] thumbs(2/5)`, updating in place. `inc` uses
/// `try_lock` so it never blocks on the terminal; a skipped repaint is
/// covered by the next one.
pub struct ProgressCounter {
    label: &'static str,
    total: usize,
    done: AtomicUsize,
    draw: Mutex<()>,
}

impl ProgressCounter {
    pub fn new(label: &'static str, total: usize) -> Self {
        COUNTER_SHOWN.store(true, Ordering::SeqCst);

        let counter = Self {
            label,
            total,
            done: AtomicUsize::new(0),
            draw: Mutex::new(()),
        };
        counter.repaint(false);
        counter
    }

    /// Count one candidate as finished.
    #[inline]
    pub fn inc(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
        if self.draw.try_lock().is_some() {
            self.repaint(false);
        }
    }

    /// Write the final count and keep the line.
    pub fn finish(self) {
        COUNTER_SHOWN.store(false, Ordering::SeqCst);

        {
            let _held = self.draw.lock(); // let a pending repaint complete
            self.repaint(true);
        }

        std::mem::forget(self); // Drop would clear the finished line
    }

    fn text(&self) -> String {
        let done = self.done.load(Ordering::Relaxed);
        format!("{}({}/{})", self.label, done, self.total)
    }

    /// Redraw the counter on the current line; a newline only when final.
    fn repaint(&self, newline: bool) {
        let mut out = stdout().lock();
        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        if newline {
            writeln!(out, "{} {}", paint("export"), self.text()).ok();
        } else {
            write!(out, "{} {}", paint("export"), self.text()).ok();
        }
        out.flush().ok();
    }
}

impl Drop for ProgressCounter {
    fn drop(&mut self) {
        COUNTER_SHOWN.store(false, Ordering::SeqCst);

        // An abandoned counter (error path) clears its line instead of
        // leaving a stale count behind
        let mut out = stdout().lock();
        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        out.flush().ok();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_flag() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }

    #[test]
    fn test_counter_text() {
        let counter = ProgressCounter::new("thumbs", 3);
        assert_eq!(counter.text(), "thumbs(0/3)");
        counter.inc();
        counter.inc();
        assert_eq!(counter.text(), "thumbs(2/3)");
        counter.finish();
    }
}
