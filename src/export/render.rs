//! Rendering one candidate group into a standalone file.
//!
//! Rendering is delegated entirely to the Inkscape binary; the trait
//! exists so the pipeline can be exercised in tests without it.

use crate::utils::exec::{Cmd, ExecError, NoiseFilter};
use anyhow::Result;
use std::path::Path;

/// Stderr noise Inkscape emits on headless systems.
static INKSCAPE_NOISE: NoiseFilter = NoiseFilter::new(&[
    "Gtk-Message:",
    "Gtk-WARNING",
    "Unable to init server",
]);

/// Renders a single group of the snapshot document into its own file.
pub trait Renderer {
    /// Render the element with id `export_id` from `snapshot`, cropped to
    /// its drawn extent, into `output`. Overwrites an existing output file.
    fn render(&self, snapshot: &Path, export_id: &str, output: &Path) -> Result<(), ExecError>;
}

/// Inkscape-backed renderer.
pub struct InkscapeRenderer {
    command: String,
}

impl InkscapeRenderer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// The configured executable name.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Check the binary can be found before the first invocation, so a
    /// missing Inkscape fails once instead of once per group.
    pub fn ensure_available(&self) -> Result<()> {
        which::which(&self.command).map(|_| ()).map_err(|_| {
            anyhow::anyhow!(
                "`{}` not found in PATH; install Inkscape or set `export.command` in thumbex.toml",
                self.command
            )
        })
    }
}

impl Renderer for InkscapeRenderer {
    fn render(&self, snapshot: &Path, export_id: &str, output: &Path) -> Result<(), ExecError> {
        Cmd::new(&self.command)
            .arg(snapshot)
            .arg(format!("--export-id={export_id}"))
            .arg("--export-type=svg")
            .arg("--export-area-drawing")
            .arg(format!("--export-filename={}", output.display()))
            .filter(&INKSCAPE_NOISE)
            .run()
            .map(|_| ())
    }
}
