//! Running external tools.
//!
//! `Cmd` wraps `std::process::Command` with the two things every caller
//! here needs: a typed error that separates "could not launch" from
//! "ran and failed", and a stderr noise filter so chatty tools do not
//! flood the terminal.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! Cmd::new("inkscape")
//!     .arg(snapshot)
//!     .arg("--export-type=svg")
//!     .filter(&INKSCAPE_NOISE)
//!     .run()?;
//! ```

use crate::log;
use regex::Regex;
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io;
use std::process::{Command, Output};
use std::sync::OnceLock;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Failure of an external tool invocation.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The binary could not be spawned (missing or not executable).
    #[error("failed to launch `{program}`")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The tool ran and exited unsuccessfully.
    #[error("`{program}` exited with {status}{}", fmt_detail(.detail))]
    Failed {
        program: String,
        /// Rendered exit status (e.g. "exit status: 1").
        status: String,
        /// Filtered output, empty when the tool was silent.
        detail: String,
    },
}

fn fmt_detail(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!("\n{detail}")
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for one external tool invocation.
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    noise: &'static NoiseFilter,
}

impl Cmd {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
            noise: &NO_NOISE,
        }
    }

    /// Append one argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    /// Drop stderr lines matching `filter` from logging and error details.
    pub fn filter(mut self, filter: &'static NoiseFilter) -> Self {
        self.noise = filter;
        self
    }

    /// Run the tool to completion and capture its output.
    ///
    /// Stderr that survives the noise filter is logged on success; on a
    /// nonzero exit it becomes the error detail instead.
    pub fn run(self) -> Result<Output, ExecError> {
        let program = self.program.to_string_lossy().into_owned();

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|source| ExecError::Launch {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExecError::Failed {
                program,
                status: output.status.to_string(),
                detail: self.noise.detail(&output),
            });
        }

        self.noise
            .report(&program, &String::from_utf8_lossy(&output.stderr));
        Ok(output)
    }
}

// ============================================================================
// Noise filtering
// ============================================================================

/// Stderr prefixes a tool is known to emit that carry no information.
pub struct NoiseFilter {
    prefixes: &'static [&'static str],
}

/// Filter that keeps everything.
pub static NO_NOISE: NoiseFilter = NoiseFilter::new(&[]);

impl NoiseFilter {
    pub const fn new(prefixes: &'static [&'static str]) -> Self {
        Self { prefixes }
    }

    fn keeps(&self, line: &str) -> bool {
        !line.is_empty() && !self.prefixes.iter().any(|p| line.starts_with(p))
    }

    /// The lines of `text` that survive the filter, ANSI codes stripped.
    fn survivors(&self, text: &str) -> Vec<String> {
        text.lines()
            .map(|line| strip_ansi(line).trim().to_string())
            .filter(|line| self.keeps(line))
            .collect()
    }

    /// Log surviving stderr under the tool's name.
    pub fn report(&self, program: &str, stderr: &str) {
        let kept = self.survivors(stderr);
        if !kept.is_empty() {
            log!(program; "{}", kept.join("\n"));
        }
    }

    /// Error detail for a failed run: surviving stderr, then stdout.
    fn detail(&self, output: &Output) -> String {
        let mut lines = self.survivors(&String::from_utf8_lossy(&output.stderr));
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if !stdout.is_empty() {
            lines.push(stdout.to_string());
        }
        lines.join("\n")
    }
}

/// Strip ANSI escape codes from a line.
fn strip_ansi(s: &str) -> Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

// ============================================================================
// Tests
// ============================================================================
